//! Process flags that select the build flavor.
//!
//! | Variable          | Effect                                           |
//! |-------------------|--------------------------------------------------|
//! | `TINCTURE_TARGET` | `web` (default) or `native`; controls unit suffixes |
//! | `NODE_ENV`        | `production` selects production mode, anything else development |
//! | `TINCTURE_DEBUG`  | any value but `0`/`false` logs alias tables and skipped resolutions |

use std::env;

use serde::Serialize;
use tincture::{Mode, Platform};
use tracing::warn;

pub const TARGET_VAR: &str = "TINCTURE_TARGET";
pub const NODE_ENV_VAR: &str = "NODE_ENV";
pub const DEBUG_VAR: &str = "TINCTURE_DEBUG";

/// The flavor of one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildEnv {
    pub platform: Platform,
    pub mode: Mode,
    /// Building the server-rendering bundle.
    pub is_server: bool,
    pub debug: bool,
}

impl BuildEnv {
    pub fn new(platform: Platform, mode: Mode) -> Self {
        Self {
            platform,
            mode,
            is_server: false,
            debug: false,
        }
    }

    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads flags through `lookup`; unset variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let platform = match lookup(TARGET_VAR) {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!(%raw, %err, "ignoring {}", TARGET_VAR);
                Platform::default()
            }),
            None => Platform::default(),
        };
        let mode = match lookup(NODE_ENV_VAR).as_deref() {
            Some("production") => Mode::Production,
            _ => Mode::Development,
        };
        let debug = lookup(DEBUG_VAR)
            .is_some_and(|v| !matches!(v.trim(), "" | "0" | "false"));

        Self {
            platform,
            mode,
            is_server: false,
            debug,
        }
    }

    pub fn server(mut self, is_server: bool) -> Self {
        self.is_server = is_server;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_development(&self) -> bool {
        self.mode.is_development()
    }

    /// Log prefix distinguishing the two bundles of one build.
    pub fn label(&self) -> &'static str {
        if self.is_server {
            "ssr"
        } else {
            "web"
        }
    }
}
