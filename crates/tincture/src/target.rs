//! Compilation target and build mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The platform styles are compiled for.
///
/// Only the web target appends a unit suffix to bare numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Web,
    Native,
}

impl Platform {
    /// Whether numeric values on generic properties receive a unit suffix.
    pub fn needs_units(self) -> bool {
        matches!(self, Platform::Web)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Native => "native",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "native" => Ok(Platform::Native),
            other => Err(format!("unknown platform '{}', expected web or native", other)),
        }
    }
}

/// Development or production build.
///
/// Development keeps output readable and turns on diagnostics; production
/// minifies and stays quiet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn is_development(self) -> bool {
        matches!(self, Mode::Development)
    }

    pub fn is_production(self) -> bool {
        matches!(self, Mode::Production)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Mode::Production),
            "development" | "dev" => Ok(Mode::Development),
            other => Err(format!(
                "unknown mode '{}', expected development or production",
                other
            )),
        }
    }
}
