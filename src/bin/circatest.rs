//! circatest CLI - shuffle tests for timestamped samples
//!
//! Commands:
//! - run: shuffle-test a series of timestamped samples
//! - validate: check that an input file parses into a usable series

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use circatest::{CircadianError, DetrendStat, ShuffleMode, ShuffleTest, VERSION};

/// circatest - permutation tests for circadian structure in timestamped data
#[derive(Parser)]
#[command(name = "circatest")]
#[command(version = VERSION)]
#[command(about = "Test timestamped data for circadian non-uniformity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shuffle-test a series of timestamped samples
    Run {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format (auto = pretty on a terminal)
        #[arg(long, default_value = "auto")]
        output_format: OutputFormat,

        /// Number of shuffled resamples
        #[arg(long, default_value = "1000")]
        shuffles: usize,

        /// Shuffle mode: "complete" or "circshift"
        #[arg(long, default_value = "complete")]
        mode: String,

        /// Detrend each day before shuffling
        #[arg(long)]
        detrend: bool,

        /// Detrend statistic: "mean" or "median"
        #[arg(long, default_value = "mean")]
        stat: String,

        /// Random seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Report progress to stderr every 100 shuffles
        #[arg(long)]
        progress: bool,
    },

    /// Check that an input file parses into a usable series
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one sample per line)
    Ndjson,
    /// JSON array of samples
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed when stdout is a terminal, compact otherwise
    Auto,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

/// One timestamped sample; `value` defaults to a unit weight
#[derive(Debug, Deserialize)]
struct Sample {
    timestamp: DateTime<Utc>,
    #[serde(default = "unit_weight")]
    value: f64,
}

fn unit_weight() -> f64 {
    1.0
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse samples: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No samples in input")]
    NoSamples,

    #[error(transparent)]
    Circadian(#[from] CircadianError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("circatest: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Run {
            input,
            output,
            input_format,
            output_format,
            shuffles,
            mode,
            detrend,
            stat,
            seed,
            progress,
        } => cmd_run(
            &input,
            &output,
            input_format,
            output_format,
            shuffles,
            &mode,
            detrend,
            &stat,
            seed,
            progress,
        ),

        Commands::Validate {
            input,
            input_format,
        } => cmd_validate(&input, input_format),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    shuffles: usize,
    mode: &str,
    detrend: bool,
    stat: &str,
    seed: Option<u64>,
    progress: bool,
) -> Result<(), CliError> {
    let samples = read_samples(input, input_format)?;
    if samples.is_empty() {
        return Err(CliError::NoSamples);
    }

    let (timestamps, values): (Vec<DateTime<Utc>>, Vec<f64>) =
        samples.into_iter().map(|s| (s.timestamp, s.value)).unzip();

    let mode: ShuffleMode = mode.parse()?;
    let stat: DetrendStat = stat.parse()?;

    let mut test = ShuffleTest::new().with_shuffles(shuffles).with_mode(mode);
    if detrend {
        test = test.with_detrend(stat);
    }
    if let Some(seed) = seed {
        test = test.with_seed(seed);
    }
    if progress {
        let total = shuffles;
        test = test.with_progress(move |done| eprintln!("shuffle {}/{}", done, total));
    }

    let result = test.run(&timestamps, &values)?;

    let pretty = match output_format {
        OutputFormat::Json => false,
        OutputFormat::JsonPretty => true,
        OutputFormat::Auto => {
            output.to_string_lossy() == "-" && atty::is(atty::Stream::Stdout)
        }
    };
    let rendered = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        result.to_json()?
    };

    if output.to_string_lossy() == "-" {
        println!("{}", rendered);
    } else {
        fs::write(output, rendered)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat) -> Result<(), CliError> {
    let samples = read_samples(input, input_format)?;
    if samples.is_empty() {
        return Err(CliError::NoSamples);
    }

    let days = {
        let timestamps: Vec<DateTime<Utc>> = samples.iter().map(|s| s.timestamp).collect();
        circatest::buckets::day_buckets(&timestamps).len()
    };

    println!("{} samples across {} day(s)", samples.len(), days);
    Ok(())
}

fn read_samples(input: &Path, format: InputFormat) -> Result<Vec<Sample>, CliError> {
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let samples = match format {
        InputFormat::Ndjson => data
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<Sample>, _>>()?,
        InputFormat::Json => serde_json::from_str(&data)?,
    };

    Ok(samples)
}
