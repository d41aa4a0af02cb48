use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};

use scenefilter::config::{RulesConfig, parse_context_override};
use scenefilter::filter::{Filter, FilterKind, Value};
use scenefilter::pipeline::{MatchStats, run_match};
use scenefilter::scene::{Scene, SceneUpdate, parse_scene_update};
use scenefilter::sinks::{DataSink, GeoJsonSink, GeoJsonlSink};
use scenefilter::source::{InputFormat, read_features};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Select the features a style filter applies to
    Match(MatchArgs),
    /// Apply path updates to a scene configuration
    Update(UpdateArgs),
}

#[derive(Args)]
pub struct MatchArgs {
    /// Input features (.geojson, .geojsonl, or - for stdin)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Rules file (YAML) with the filter and default context
    #[arg(short, long)]
    pub rules: PathBuf,

    /// Output file (.geojson, .geojsonl, or - for stdout)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Input format (auto-detected if omitted)
    #[arg(long, value_enum)]
    pub input_format: Option<InputFormat>,

    /// Output format (auto-detected if omitted)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Context override as key=value; numeric-looking values compare as numbers
    #[arg(short, long = "context", value_parser = parse_context_override)]
    pub context: Vec<(String, Value)>,

    /// Number of threads (default: all cores)
    #[arg(short, long, env = "SCENEFILTER_THREADS")]
    pub threads: Option<usize>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Scene configuration file (YAML)
    #[arg(short, long)]
    pub scene: PathBuf,

    /// Update as path=value, applied in order
    #[arg(long = "set", value_parser = parse_scene_update, required = true)]
    pub updates: Vec<SceneUpdate>,

    /// Output file (default: stdout)
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum OutputFormat {
    #[value(name = "geojson")]
    GeoJson,
    #[value(name = "geojsonl", alias = "jsonl")]
    GeoJsonl,
}

pub fn output_format_label(format: &OutputFormat) -> &'static str {
    match format {
        OutputFormat::GeoJson => "geojson",
        OutputFormat::GeoJsonl => "geojsonl",
    }
}

pub fn detect_output_format(output: &Path) -> Option<OutputFormat> {
    if output == Path::new("-") {
        return Some(OutputFormat::GeoJsonl);
    }
    let ext = output.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "geojson" | "json" => Some(OutputFormat::GeoJson),
        "geojsonl" | "jsonl" | "ndjson" => Some(OutputFormat::GeoJsonl),
        _ => None,
    }
}

pub fn init_sink(format: &OutputFormat, output: &Path) -> Result<Box<dyn DataSink>> {
    match format {
        OutputFormat::GeoJson => {
            if output == Path::new("-") {
                anyhow::bail!(
                    "CLI: GeoJSON output to stdout is not supported; use geojsonl instead"
                );
            }
            tracing::info!("Sink: {} -> {:?}", output_format_label(format), output);
            Ok(Box::new(GeoJsonSink::new(output)?))
        }
        OutputFormat::GeoJsonl => {
            if output == Path::new("-") {
                tracing::info!("Sink: {} -> stdout", output_format_label(format));
                Ok(Box::new(GeoJsonlSink::stdout()?))
            } else {
                tracing::info!("Sink: {} -> {:?}", output_format_label(format), output);
                Ok(Box::new(GeoJsonlSink::new(output)?))
            }
        }
    }
}

/// Kind, leaf count and depth of a filter tree, for logging.
pub fn summarize_filter(filter: &Filter) -> (FilterKind, usize, usize) {
    (filter.kind(), filter.leaf_count(), filter.depth())
}

pub fn run_match_command(args: &MatchArgs) -> Result<MatchStats> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("CLI: Failed to initialize thread pool")?;
    }

    let mut rules = RulesConfig::load(&args.rules)?;
    rules.apply_overrides(&args.context);

    let (kind, leaves, depth) = summarize_filter(&rules.filter);
    tracing::info!(
        "Filter: {} root, {} leaf predicates, depth {}, {} context keys",
        kind,
        leaves,
        depth,
        rules.context.len()
    );

    let input_format = args
        .input_format
        .or_else(|| InputFormat::detect(&args.input))
        .context("CLI: Could not detect input format from extension; use --input-format")?;
    let format = args
        .format
        .or_else(|| detect_output_format(&args.output))
        .context("CLI: Could not detect output format from extension; use --format")?;

    let features = read_features(&args.input, input_format)?;
    tracing::info!("Read {} features from {:?}", features.len(), args.input);

    let mut sink = init_sink(&format, &args.output)?;
    let start = std::time::Instant::now();
    let stats = run_match(&features, &rules.filter, &rules.context, sink.as_mut())?;
    sink.finish().context("Pipeline: Failed to finalize sink")?;

    tracing::info!(
        "Done! Matched {} of {} features in {:.2}s",
        stats.matched,
        stats.total,
        start.elapsed().as_secs_f64()
    );

    Ok(stats)
}

pub fn run_update_command(args: &UpdateArgs) -> Result<usize> {
    let mut scene = Scene::load(&args.scene)?;
    for update in &args.updates {
        scene.queue_update(update.path.clone(), update.value.clone());
    }

    let queued = scene.updates().len();
    let applied = scene.apply_queued();
    if applied < queued {
        tracing::warn!(
            "Scene: {} of {} updates addressed missing paths and were skipped",
            queued - applied,
            queued
        );
    }
    tracing::info!("Scene: applied {} updates", applied);

    let yaml = scene.to_yaml()?;
    if args.output == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(yaml.as_bytes())?;
        stdout.flush()?;
    } else {
        std::fs::write(&args.output, yaml)
            .with_context(|| format!("Scene: Failed to write {:?}", args.output))?;
    }

    Ok(applied)
}
