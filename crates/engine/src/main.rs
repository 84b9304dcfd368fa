use std::path::{Path, PathBuf};
use std::process::ExitCode;

use relief_engine::{export, field, generate_from_image, PipelineConfig, Result};
use shared::ReliefSettings;

const USAGE: &str =
    "usage: relief <image> [-o out.stl|out.glb] [--settings settings.json] [--config config.json]";

#[derive(Debug, PartialEq)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    settings: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relief=info,relief_engine=info".into()),
        )
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let Some(args) = parse_args(&argv) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}: {e}", args.input.display());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let settings = match &args.settings {
        Some(path) => serde_json::from_str::<ReliefSettings>(&std::fs::read_to_string(path)?)?,
        None => ReliefSettings::default(),
    };
    let config = load_config(args.config.as_deref())?;

    let img = field::load_image(&args.input)?;
    let output = generate_from_image(&img, &settings, &config)?;
    for d in &output.diagnostics {
        tracing::warn!("{d}");
    }

    export::save(&output.mesh, &args.output)
}

/// Explicit `--config`, else the platform config file if present, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<PipelineConfig> {
    if let Some(path) = explicit {
        return PipelineConfig::load(path);
    }
    match PipelineConfig::default_path() {
        Some(path) if path.exists() => {
            tracing::debug!("Using config {}", path.display());
            PipelineConfig::load(&path)
        }
        _ => Ok(PipelineConfig::default()),
    }
}

fn parse_args(argv: &[String]) -> Option<Args> {
    let mut input = None;
    let mut output = None;
    let mut settings = None;
    let mut config = None;

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "-o" | "--output" => {
                output = Some(PathBuf::from(argv.get(i + 1)?));
                i += 1;
            }
            "--settings" => {
                settings = Some(PathBuf::from(argv.get(i + 1)?));
                i += 1;
            }
            "--config" => {
                config = Some(PathBuf::from(argv.get(i + 1)?));
                i += 1;
            }
            flag if flag.starts_with('-') => return None,
            path if input.is_none() => input = Some(PathBuf::from(path)),
            _ => return None,
        }
        i += 1;
    }

    let input: PathBuf = input?;
    let output = output.unwrap_or_else(|| input.with_extension("stl"));
    Some(Args {
        input,
        output,
        settings,
        config,
    })
}
