use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::SocketAddr;

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use costpred_pipeline::{CostPredictor, PipelineConfig, TextEncoding};
use costpred_schemas::{CategoryColumn, ClampPolicy, FeatureRequest};
use itertools::Itertools;
use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Predict the cost of an activity from its budget, duration, type, time of
/// day and group size, using a linear model trained on a CSV dataset.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(flatten)]
    pipeline: PipelineArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand. Each flag overrides the
/// corresponding field of the config file.
#[derive(Args)]
struct PipelineArgs {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Dataset CSV path
    #[arg(short, long, global = true)]
    data: Option<Utf8PathBuf>,

    /// Dataset text encoding (utf-8 or latin-1)
    #[arg(long, global = true)]
    encoding: Option<TextEncoding>,

    /// CSV field delimiter
    #[arg(long, global = true)]
    delimiter: Option<char>,

    /// Seed for the train/test shuffle
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Fraction of rows held out for evaluation, in [0, 1)
    #[arg(long, global = true)]
    test_fraction: Option<f64>,

    /// Report negative predictions as-is instead of clamping them to zero
    #[arg(long, global = true)]
    no_clamp: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the model and print its coefficients and fit statistics
    Fit {
        /// Print the model summary as JSON instead of a text report
        #[arg(long)]
        json: bool,

        /// Output file path (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Predict the cost of one activity
    Predict {
        /// Budget allocated to the activity
        #[arg(long)]
        budget: f64,

        /// Time invested in the activity
        #[arg(long)]
        time_invested: f64,

        /// Activity type label, exactly as it appears in the dataset
        #[arg(long)]
        activity_type: String,

        /// Time-of-day label, exactly as it appears in the dataset
        #[arg(long)]
        time_of_day: String,

        /// Number of people taking part
        #[arg(long)]
        people_count: f64,

        /// Also print the unclamped model output
        #[arg(long)]
        show_raw: bool,
    },

    /// List the category labels and their integer codes
    Categories,

    /// Serve the JSON prediction API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8501")]
        addr: SocketAddr,
    },
}

impl PipelineArgs {
    /// Loads the config file (or defaults) and applies flag overrides.
    fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("loading config {path}"))?,
            None => PipelineConfig::default(),
        };
        if let Some(data) = &self.data {
            config.data_path.clone_from(data);
        }
        if let Some(encoding) = self.encoding {
            config.load.encoding = encoding;
        }
        if let Some(delimiter) = self.delimiter {
            config.load.delimiter = delimiter;
        }
        if let Some(seed) = self.seed {
            config.train.seed = seed;
        }
        if let Some(fraction) = self.test_fraction {
            config.train.test_fraction = fraction;
        }
        if self.no_clamp {
            config.clamp = ClampPolicy::Raw;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so reports and JSON on stdout stay pipeable.
    const CRATES: &[&str] = &[
        "costpred",
        "costpred_pipeline",
        "costpred_regression",
        "costpred_server",
    ];
    let level = cli.verbose.tracing_level_filter();
    let allowlist = CRATES.iter().map(|c| format!("{c}={level}")).join(",");
    let filter = EnvFilter::new(format!("warn,{allowlist}"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let config = cli.pipeline.resolve()?;
    let predictor = CostPredictor::build(&config)
        .with_context(|| format!("training on {}", config.data_path))?;

    match cli.command {
        Commands::Fit { json, output } => {
            let stdout = std::io::stdout();
            let mut writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .with_context(|| format!("creating {path}"))?,
                )),
                None => Box::new(stdout.lock()),
            };
            if json {
                let summary = predictor.summary();
                serde_json::to_writer_pretty(&mut writer, &summary)?;
                writeln!(writer)?;
            } else {
                predictor.write_report(&mut writer)?;
            }
            writer.flush()?;
            if let Some(path) = output {
                info!(%path, "report written");
            }
            Ok(())
        }
        Commands::Predict {
            budget,
            time_invested,
            activity_type,
            time_of_day,
            people_count,
            show_raw,
        } => {
            let request = FeatureRequest {
                budget,
                time_invested,
                activity_type,
                time_of_day,
                people_count,
            };
            let prediction = match predictor.predict(&request) {
                Ok(p) => p,
                Err(e) if e.is_unknown_category() => {
                    bail!("{e}; run `costpred categories` for valid labels")
                }
                Err(e) => return Err(e.into()),
            };
            println!("{prediction}");
            if show_raw {
                let note = if prediction.was_clamped() {
                    " (clamped)"
                } else {
                    ""
                };
                println!("raw: {:.2}{note}", prediction.raw);
            }
            Ok(())
        }
        Commands::Categories => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let mappings = predictor.mappings();
            for column in
                [CategoryColumn::ActivityType, CategoryColumn::TimeOfDay]
            {
                writeln!(out, "{column}:")?;
                for (label, code) in mappings.for_column(column).iter() {
                    writeln!(out, "  {code:>3}  {label}")?;
                }
            }
            Ok(())
        }
        Commands::Serve { addr } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(costpred_server::run_server(predictor, addr))?;
            Ok(())
        }
    }
}
