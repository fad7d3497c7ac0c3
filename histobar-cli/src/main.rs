use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use histobar_common::{Config, HistobarError};
use histobar_core::{
    export_csv, export_json, parse_boundaries, read_samples, write_csv, write_json, Histogram,
    HistogramBuilder, RenderOptions,
};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "histobar", version, about = "Text bar-chart histograms of integer samples")]
struct Cli {
    /// -v for debug, -vv for trace; HISTOBAR_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BucketArgs {
    /// Samples file; stdin when omitted or `-`
    input: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        conflicts_with = "boundaries_file"
    )]
    boundaries: Option<Vec<i64>>,
    #[arg(long)]
    boundaries_file: Option<PathBuf>,
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..),
        conflicts_with_all = ["boundaries", "boundaries_file"]
    )]
    buckets: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    Plot {
        #[command(flatten)]
        bucketing: BucketArgs,
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        bar_scale: Option<u64>,
        #[arg(long)]
        glyph: Option<char>,
    },
    Export {
        #[command(flatten)]
        bucketing: BucketArgs,
        #[arg(long, default_value = "json")]
        format: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Config {
        #[arg(long)]
        save: bool,
    },
    Completions {
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_err) = match Config::load() {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_logging(cli.verbose, &config);
    if let Some(e) = &config_err {
        warn!("ignoring config file: {e}");
    }
    match cli.command {
        Commands::Plot {
            bucketing,
            bar_scale,
            glyph,
        } => run_plot(bucketing, bar_scale, glyph, &config)?,
        Commands::Export {
            bucketing,
            format,
            output,
        } => run_export(bucketing, format, output, &config)?,
        Commands::Config { save } => run_config(save, &config, config_err.as_ref())?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "histobar", &mut io::stdout());
        }
    }
    Ok(())
}

fn init_logging(verbose: u8, config: &Config) {
    let directive = match verbose {
        0 => config.log.level.clone(),
        1 => "debug".into(),
        _ => "trace".into(),
    };
    let filter =
        EnvFilter::try_from_env("HISTOBAR_LOG").unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_samples(input: Option<&str>) -> anyhow::Result<Vec<i64>> {
    let samples = match input {
        None | Some("-") => read_samples(io::stdin().lock())?,
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("cannot open samples file {path}"))?;
            read_samples(BufReader::new(file)).with_context(|| format!("reading {path}"))?
        }
    };
    debug!(count = samples.len(), "samples loaded");
    Ok(samples)
}

fn build_histogram(args: &BucketArgs, config: &Config) -> anyhow::Result<Histogram> {
    let samples = load_samples(args.input.as_deref())?;
    let boundaries = match (&args.boundaries, &args.boundaries_file) {
        (Some(b), _) => Some(b.clone()),
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read boundaries file {}", path.display()))?;
            Some(parse_boundaries(&text)?)
        }
        (None, None) => None,
    };
    let mut builder = HistogramBuilder::new(&samples)
        .auto_buckets(args.buckets.unwrap_or(config.histogram.auto_buckets));
    if let Some(b) = boundaries {
        builder = builder.boundaries(b);
    }
    Ok(builder.build()?)
}

fn run_plot(
    args: BucketArgs,
    bar_scale: Option<u64>,
    glyph: Option<char>,
    config: &Config,
) -> anyhow::Result<()> {
    let histogram = build_histogram(&args, config)?;
    let options = RenderOptions {
        bar_scale: bar_scale.unwrap_or(config.chart.bar_scale),
        bar_glyph: glyph.unwrap_or(config.chart.bar_glyph),
    };
    let chart = histogram.render(&options);
    if histogram.is_empty() {
        println!("{chart}");
    } else {
        print!("{chart}");
    }
    Ok(())
}

fn run_export(
    args: BucketArgs,
    format: String,
    output: Option<PathBuf>,
    config: &Config,
) -> anyhow::Result<()> {
    let histogram = build_histogram(&args, config)?;
    if let Some(parent) = output.as_deref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match (format.as_str(), output) {
        ("json", Some(path)) => {
            export_json(&path, &histogram)?;
            info!("exported to {}", path.display());
        }
        ("csv", Some(path)) => {
            export_csv(&path, &histogram)?;
            info!("exported to {}", path.display());
        }
        ("json", None) => write_json(&mut io::stdout().lock(), &histogram)?,
        ("csv", None) => write_csv(&mut io::stdout().lock(), &histogram)?,
        _ => anyhow::bail!("Unknown format: {format} (use json or csv)"),
    }
    Ok(())
}

/// Refuses `--save` when the file on disk failed to load, so it is never replaced by defaults.
fn run_config(save: bool, config: &Config, load_err: Option<&HistobarError>) -> anyhow::Result<()> {
    if let (true, Some(e)) = (save, load_err) {
        anyhow::bail!(
            "not saving: {} could not be loaded ({e}); fix or remove it first",
            Config::resolved_path().display()
        );
    }
    print!("{}", config.to_toml()?);
    if save {
        let path = config.save()?;
        eprintln!("Config saved to {}", path.display());
    }
    Ok(())
}
