//! Kube Labeler command-line entry point
//!
//! Reads multi-document YAML manifests, applies common labels and
//! annotations, and writes the result to stdout.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use kube_labeler::{version_info, InjectConfig, ResMap, Transformer};
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "kube-labeler",
    version,
    about = "Propagate common labels and annotations through Kubernetes manifests"
)]
struct Args {
    /// Manifest files to read; stdin when empty or `-`
    files: Vec<PathBuf>,

    /// YAML file with `commonLabels` and `commonAnnotations`
    #[arg(short, long, env = "KUBE_LABELER_CONFIG")]
    config: Option<PathBuf>,

    /// Common label as key=value (repeatable)
    #[arg(short, long = "label", value_name = "KEY=VALUE")]
    labels: Vec<String>,

    /// Common annotation as key=value (repeatable)
    #[arg(short, long = "annotation", value_name = "KEY=VALUE")]
    annotations: Vec<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    output: OutputFormat,

    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "KUBE_LABELER_LOG_FORMAT")]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// Load every listed file in order; `-` (or no files at all) reads `stdin`.
fn read_input(files: &[PathBuf], mut stdin: impl Read) -> anyhow::Result<ResMap> {
    let stdin_path = PathBuf::from("-");
    let sources = if files.is_empty() {
        std::slice::from_ref(&stdin_path)
    } else {
        files
    };

    let mut resmap = ResMap::new();
    for path in sources {
        let (source, origin) = if path.as_os_str() == "-" {
            let mut source = String::new();
            stdin
                .read_to_string(&mut source)
                .context("failed to read manifests from stdin")?;
            (source, "stdin".to_string())
        } else {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            (source, path.display().to_string())
        };
        let loaded = ResMap::from_yaml_str(&source)
            .with_context(|| format!("failed to parse {origin}"))?;
        debug!("Loaded {} resources from {}", loaded.len(), origin);
        resmap.append(loaded)?;
    }
    Ok(resmap)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);
    debug!("kube-labeler {}", version_info());

    let config = match &args.config {
        Some(path) => InjectConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => InjectConfig::default(),
    }
    .with_overrides(&args.labels, &args.annotations)?;

    let transformer = config.transformer()?;
    let mut resources = read_input(&args.files, std::io::stdin().lock())?;
    info!(
        "Applying {} labels and {} annotations to {} resources",
        config.common_labels.len(),
        config.common_annotations.len(),
        resources.len()
    );

    transformer.transform(&mut resources)?;

    let rendered = match args.output {
        OutputFormat::Yaml => resources.to_yaml_string()?,
        OutputFormat::Json => resources.to_json_string()?,
    };
    print!("{rendered}");
    if matches!(args.output, OutputFormat::Json) {
        println!();
    }
    Ok(())
}
