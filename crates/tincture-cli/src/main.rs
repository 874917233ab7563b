//! The `tincture` command.
//!
//! ```text
//! tincture build styles.json --out-dir dist --production
//! tincture reverse styles.json paddingHorizontal _ph-3f9a0c21d4
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tincture::{Mode, Platform, StyleValue};
use tincture_bundler::{Build, BuildEnv, BuildManifest, BuildOutput};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const STYLESHEET_FILE: &str = "styles.css";
const RUNTIME_FILE: &str = "runtime.json";

#[derive(Parser, Debug)]
#[command(name = "tincture", version)]
#[command(about = "Compile style declarations into atomic CSS")]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a manifest into a stylesheet and a runtime table
    Build(BuildArgs),
    /// Print the value behind a generated class name
    Reverse(ReverseArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct FlavorArgs {
    /// Production build: minified output, no diagnostics
    #[arg(long)]
    production: bool,

    /// Target platform, overriding TINCTURE_TARGET
    #[arg(long)]
    target: Option<Platform>,

    /// Build the server-rendering bundle
    #[arg(long)]
    server: bool,
}

impl FlavorArgs {
    fn env(&self) -> BuildEnv {
        let mut env = BuildEnv::from_env().server(self.server);
        if self.production {
            env = env.with_mode(Mode::Production);
        }
        if let Some(platform) = self.target {
            env = env.with_platform(platform);
        }
        env
    }
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Build manifest (JSON)
    manifest: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist")]
    out_dir: PathBuf,

    #[command(flatten)]
    flavor: FlavorArgs,
}

#[derive(Args, Debug)]
struct ReverseArgs {
    /// Build manifest (JSON)
    manifest: PathBuf,

    /// Style property the class was generated for, e.g. `width`
    property: String,

    /// Generated class name, with or without the leading dot
    class: String,

    #[command(flatten)]
    flavor: FlavorArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Build(args) => build(&args, &mut out),
        Command::Reverse(args) => reverse(&args, &mut out),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "tincture=info",
        1 => "tincture=debug",
        _ => "tincture=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load(manifest_path: &Path, env: BuildEnv) -> Result<(Build, BuildManifest)> {
    let text = fs::read_to_string(manifest_path)
        .with_context(|| format!("failed to read manifest {}", manifest_path.display()))?;
    let manifest = BuildManifest::from_json(&text)
        .with_context(|| format!("failed to parse manifest {}", manifest_path.display()))?;

    let manifest_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let root = manifest.project_root(manifest_dir);
    let build = Build::new(manifest.options.clone(), env, &root)
        .with_context(|| format!("failed to configure build in {}", root.display()))?;
    Ok((build, manifest))
}

fn build(args: &BuildArgs, out: &mut impl Write) -> Result<()> {
    let (build, manifest) = load(&args.manifest, args.flavor.env())?;
    let output = build.run(&manifest.modules);
    write_outputs(&output, &args.out_dir, manifest.options.inline_css, out)
}

fn write_outputs(
    output: &BuildOutput,
    out_dir: &Path,
    inline_css: bool,
    out: &mut impl Write,
) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    if inline_css {
        writeln!(out, "{}", output.style_tag())?;
    } else {
        let path = out_dir.join(STYLESHEET_FILE);
        fs::write(&path, output.css())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), blocks = output.stylesheet.len(), "wrote stylesheet");
    }

    let path = out_dir.join(RUNTIME_FILE);
    let runtime = serde_json::to_string_pretty(&output.runtime)?;
    fs::write(&path, runtime).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), entries = output.runtime.len(), "wrote runtime table");
    Ok(())
}

fn reverse(args: &ReverseArgs, out: &mut impl Write) -> Result<()> {
    let (build, manifest) = load(&args.manifest, args.flavor.env())?;
    build.run(&manifest.modules);

    match build.session().reverse_resolve(&args.property, &args.class) {
        Some(value) => {
            writeln!(out, "{}", render_value(&value)?)?;
            Ok(())
        }
        None => bail!(
            "'{}' was not emitted by this build; its value is only known at runtime",
            args.class
        ),
    }
}

fn render_value(value: &StyleValue) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "modules": [
            { "path": "src/App.tsx", "declarations": [
                { "component": "Card", "style": { "width": 42, "hoverStyle": { "color": "red" } } },
                { "component": "Live", "style": { "height": { "$dynamic": "props.h" } } }
            ] }
        ]
    }"#;

    fn workspace(manifest: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tincture.json");
        fs::write(&path, manifest).unwrap();
        (dir, path)
    }

    fn flavor() -> FlavorArgs {
        FlavorArgs {
            production: true,
            target: Some(Platform::Web),
            server: false,
        }
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "tincture", "build", "m.json", "--out-dir", "out", "--production", "--target", "native",
        ])
        .unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.out_dir, PathBuf::from("out"));
        assert!(args.flavor.production);
        assert_eq!(args.flavor.target, Some(Platform::Native));
    }

    #[test]
    fn test_build_writes_outputs() {
        let (dir, manifest) = workspace(MANIFEST);
        let out_dir = dir.path().join("dist");
        let args = BuildArgs {
            manifest,
            out_dir: out_dir.clone(),
            flavor: flavor(),
        };
        let mut stdout = Vec::new();
        build(&args, &mut stdout).unwrap();

        let css = fs::read_to_string(out_dir.join(STYLESHEET_FILE)).unwrap();
        assert!(css.contains("width:42px"));
        assert!(css.contains(":hover{color:rgba(255,0,0,1)}"));
        let runtime: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out_dir.join(RUNTIME_FILE)).unwrap()).unwrap();
        assert_eq!(runtime.as_object().unwrap().len(), 1);
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_inline_css_prints_style_tag() {
        let manifest = MANIFEST.replacen('{', r#"{ "options": { "inlineCss": true },"#, 1);
        let (dir, manifest) = workspace(&manifest);
        let out_dir = dir.path().join("dist");
        let args = BuildArgs {
            manifest,
            out_dir: out_dir.clone(),
            flavor: flavor(),
        };
        let mut stdout = Vec::new();
        build(&args, &mut stdout).unwrap();

        let printed = String::from_utf8(stdout).unwrap();
        assert!(printed.starts_with("<style"));
        assert!(!out_dir.join(STYLESHEET_FILE).exists());
        assert!(out_dir.join(RUNTIME_FILE).exists());
    }

    #[test]
    fn test_reverse() {
        let (dir, manifest) = workspace(MANIFEST);
        let args = BuildArgs {
            manifest: manifest.clone(),
            out_dir: dir.path().join("dist"),
            flavor: flavor(),
        };
        build(&args, &mut Vec::new()).unwrap();

        let (session_build, parsed) = load(&manifest, flavor().env()).unwrap();
        session_build.run(&parsed.modules);
        let width = session_build
            .session()
            .stylesheet_rules()
            .into_iter()
            .find(|r| r.property == "width")
            .unwrap();

        let mut stdout = Vec::new();
        reverse(
            &ReverseArgs {
                manifest,
                property: "width".into(),
                class: width.identifier.to_string(),
                flavor: flavor(),
            },
            &mut stdout,
        )
        .unwrap();
        assert_eq!(String::from_utf8(stdout).unwrap().trim(), "42.0");
    }

    #[test]
    fn test_reverse_unknown_class() {
        let (_dir, manifest) = workspace(MANIFEST);
        let err = reverse(
            &ReverseArgs {
                manifest,
                property: "width".into(),
                class: "_w-0000000000".into(),
                flavor: flavor(),
            },
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("only known at runtime"));
    }

    #[test]
    fn test_missing_manifest_has_context() {
        let err = load(Path::new("/nonexistent/tincture.json"), flavor().env()).unwrap_err();
        assert!(err.to_string().contains("failed to read manifest"));
    }
}
