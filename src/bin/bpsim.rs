//! Evaluate one or more branch predictors against a text branch trace.
//!
//! ```text
//! bunzip2 -kc trace.bz2 | bpsim --predictor gshare:13
//! ```

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use bpsim::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Predictor descriptor: static, gshare:<history_bits>,
    /// tournament:<global_bits>:<local_bits>:<index_bits>, or
    /// custom:<history_bits>:<num_perceptrons>:<theta> (may be repeated)
    #[arg(short, long, required = true)]
    predictor: Vec<PredictorConfig>,

    /// Path to a text trace (reads stdin when omitted or '-')
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Print every prediction, and the storage used by each predictor
    #[arg(short, long)]
    verbose: bool,

    /// Number of leading branches used only for training
    #[arg(short, long, default_value_t = 0)]
    warmup: usize,

    /// List the N branches with the most mispredictions
    #[arg(short, long, default_value_t = 0, value_name = "N")]
    report: usize,
}

fn open_trace(cli: &Cli) -> anyhow::Result<TraceReader<impl io::BufRead>> {
    match &cli.trace {
        Some(path) => TraceReader::open(path)
            .with_context(|| format!("failed to open trace {}", path.display())),
        None => Ok(TraceReader::stdin()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn")
    ).init();

    let cli = Cli::parse();
    let opts = OutputOptions {
        verbose: cli.verbose,
        worst: cli.report,
        warmup: cli.warmup,
    };

    let trace = open_trace(&cli)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    evaluate(&cli.predictor, trace, opts, &mut out)?;
    out.flush()?;
    Ok(())
}
