//! Writing simulation results in the format read by the experiment scripts.
//!
//! Every run ends with the summary lines of [SimulationResult]. When more
//! than one predictor is evaluated, each run is preceded by a
//! `[*] <descriptor>` header and runs are written in the order they were
//! given.

use std::io::{self, BufRead, Write};

use log::info;

use crate::config::PredictorConfig;
use crate::error::Error;
use crate::sim::*;
use crate::stats::*;
use crate::trace::TraceReader;

/// Controls what is written for each run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Write the storage used by each predictor. With a single predictor,
    /// also write every prediction.
    pub verbose: bool,

    /// Number of worst branches to list (0 disables the list)
    pub worst: usize,

    /// Number of leading records used only to train the predictors
    pub warmup: usize,
}
impl OutputOptions {
    pub fn simulation(&self) -> SimulationOptions {
        SimulationOptions {
            warmup: self.warmup,
            per_branch: self.worst > 0,
        }
    }
}

/// Write the storage header for some configuration.
pub fn write_storage(out: &mut impl Write, cfg: &PredictorConfig)
    -> io::Result<()>
{
    let bits = cfg.storage_bits();
    writeln!(out, "[*] {}: {} storage bits ({:.2} KiB)",
        cfg, bits, bits as f64 / 8.0 / 1024.0)
}

/// Write the branches with the most mispredictions.
pub fn write_worst_branches(out: &mut impl Write, stats: &BranchStats, n: usize)
    -> io::Result<()>
{
    writeln!(out, "[*] {} unique branches ({} always taken, {} never taken)",
        stats.num_unique_branches(),
        stats.num_always_taken(),
        stats.num_never_taken(),
    )?;
    writeln!(out, "[*] Worst branches:")?;
    for (pc, data) in stats.get_worst_branches(n) {
        writeln!(out, "  {:016x} {:8}/{:8} {:.4}",
            pc, data.misses(), data.occ, data.hit_rate())?;
    }
    Ok(())
}

/// Write the results of a single run. The summary always comes last.
pub fn write_report(out: &mut impl Write, report: &SimulationReport, worst: usize)
    -> io::Result<()>
{
    if let Some(stats) = &report.branches {
        write_worst_branches(out, stats, worst)?;
    }
    write!(out, "{}", report.result)
}

/// Evaluate every configuration over a trace, writing the results to `out`.
///
/// A single configuration streams the trace. Several configurations read
/// the whole trace first and then run in parallel.
pub fn evaluate<R: BufRead>(
    configs: &[PredictorConfig],
    trace: TraceReader<R>,
    opts: OutputOptions,
    out: &mut impl Write,
) -> Result<(), Error> {
    match configs {
        [cfg] => evaluate_single(cfg, trace, opts, out),
        _ => evaluate_many(configs, trace, opts, out),
    }
}

fn evaluate_single<R: BufRead>(
    cfg: &PredictorConfig,
    trace: TraceReader<R>,
    opts: OutputOptions,
    out: &mut impl Write,
) -> Result<(), Error> {
    let mut predictor = cfg.build()?;
    if opts.verbose {
        write_storage(out, cfg)?;
    }

    let mut write_err = None;
    let report = Simulator::new(predictor.as_mut())
        .with_options(opts.simulation())
        .run_with(trace, |_, prediction| {
            if opts.verbose && write_err.is_none() {
                if let Err(e) = writeln!(out, "{:?}", prediction) {
                    write_err = Some(e);
                }
            }
        })?;
    if let Some(e) = write_err {
        return Err(e.into());
    }

    write_report(out, &report, opts.worst)?;
    Ok(())
}

fn evaluate_many<R: BufRead>(
    configs: &[PredictorConfig],
    trace: TraceReader<R>,
    opts: OutputOptions,
    out: &mut impl Write,
) -> Result<(), Error> {
    // Reject bad configurations before reading any input
    for cfg in configs {
        cfg.validate()?;
    }
    let records = trace.collect::<Result<Vec<_>, _>>()?;
    info!("loaded {} records", records.len());

    let reports = simulate_all(configs, &records, opts.simulation())?;
    for (cfg, report) in configs.iter().zip(reports.iter()) {
        writeln!(out, "[*] {}", cfg)?;
        if opts.verbose {
            write_storage(out, cfg)?;
        }
        write_report(out, report, opts.worst)?;
    }
    Ok(())
}
