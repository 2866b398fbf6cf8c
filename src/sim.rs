//! Driving a predictor over a trace.

use std::convert::Infallible;

use log::{debug, trace, warn};

use crate::branch::*;
use crate::config::PredictorConfig;
use crate::error::ConfigError;
use crate::predictor::BranchPredictor;
use crate::stats::*;

/// Options for a single simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationOptions {
    /// Number of leading records used only to train the predictor
    pub warmup: usize,

    /// Collect [BranchStats] for every branch
    pub per_branch: bool,
}

/// Output from a single simulation run.
#[derive(Clone, Debug, Default)]
pub struct SimulationReport {
    pub result: SimulationResult,

    /// Per-branch statistics (if requested)
    pub branches: Option<BranchStats>,
}

/// Runs a predictor over a sequence of trace records.
///
/// Each record is predicted, scored, and then used to train the predictor
/// before the next record is read.
pub struct Simulator<'a> {
    predictor: &'a mut dyn BranchPredictor,
    opts: SimulationOptions,
}
impl<'a> Simulator<'a> {
    pub fn new(predictor: &'a mut dyn BranchPredictor) -> Self {
        Self { predictor, opts: SimulationOptions::default() }
    }

    pub fn with_options(mut self, opts: SimulationOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Run the simulation to the end of the trace.
    pub fn run<I, E>(&mut self, records: I) -> Result<SimulationReport, E>
    where
        I: IntoIterator<Item = Result<BranchRecord, E>>,
    {
        self.run_with(records, |_, _| {})
    }

    /// Run the simulation, calling `observe` with every prediction.
    ///
    /// The first malformed record aborts the run and no result is produced.
    pub fn run_with<I, E, F>(&mut self, records: I, mut observe: F)
        -> Result<SimulationReport, E>
    where
        I: IntoIterator<Item = Result<BranchRecord, E>>,
        F: FnMut(&BranchRecord, Outcome),
    {
        let mut result = SimulationResult::default();
        let mut branches = self.opts.per_branch.then(BranchStats::new);
        let mut seen = 0usize;

        debug!("starting simulation with {}", self.predictor.name());
        for record in records {
            let record = record?;
            let prediction = self.predictor.predict(record.pc);
            observe(&record, prediction);
            trace!("{:016x} {:?} predicted {:?}", record.pc, record.outcome, prediction);

            if seen >= self.opts.warmup {
                result.record(prediction, record.outcome);
                if let Some(stats) = branches.as_mut() {
                    stats.update(&record, prediction);
                }
            }
            seen += 1;

            self.predictor.update(record.pc, record.outcome);
        }

        if seen == 0 {
            warn!("trace contained no branch records");
        } else if seen <= self.opts.warmup {
            warn!("warmup ({}) covered the whole trace ({} records)",
                self.opts.warmup, seen);
        }
        debug!("finished: {}/{} mispredicted", result.mispredicted, result.total);
        Ok(SimulationReport { result, branches })
    }
}

/// Run a predictor over records that are already in memory.
pub fn simulate(predictor: &mut dyn BranchPredictor, records: &[BranchRecord])
    -> SimulationResult
{
    let iter = records.iter().copied().map(Ok::<_, Infallible>);
    match Simulator::new(predictor).run(iter) {
        Ok(report) => report.result,
        Err(never) => match never {},
    }
}

/// Run every configuration over the same records.
///
/// Each configuration gets its own predictor on its own thread; nothing is
/// shared between runs except the (read-only) records. Results are returned
/// in the same order as `configs`.
pub fn simulate_all(
    configs: &[PredictorConfig],
    records: &[BranchRecord],
    opts: SimulationOptions,
) -> Result<Vec<SimulationReport>, ConfigError> {
    // Reject bad configurations before any work starts
    let mut predictors = configs.iter()
        .map(|cfg| cfg.build())
        .collect::<Result<Vec<_>, _>>()?;

    let reports = std::thread::scope(|s| {
        let handles: Vec<_> = predictors.iter_mut().map(|p| {
            s.spawn(move || {
                let iter = records.iter().copied().map(Ok::<_, Infallible>);
                Simulator::new(p.as_mut()).with_options(opts).run(iter)
            })
        }).collect();

        handles.into_iter()
            .map(|h| match h.join() {
                Ok(Ok(report)) => report,
                Ok(Err(never)) => match never {},
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect::<Vec<_>>()
    });
    Ok(reports)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::predictor::*;
    use crate::trace::synthetic::*;
    use crate::trace::*;
    use crate::error::TraceError;
    use crate::Outcome::*;

    fn alternating(len: usize, pc: usize) -> Vec<BranchRecord> {
        (0..len).map(|i| BranchRecord::new(pc, if i % 2 == 0 { T } else { N }))
            .collect()
    }

    #[test]
    fn gshare_constant_outcomes_converge() {
        for h in [0, 1, 4, 13] {
            let records = SyntheticTrace::new(0)
                .branch(0x400, BranchPattern::AlwaysTaken)
                .branch(0x408, BranchPattern::AlwaysTaken)
                .generate(10_000);
            let mut p = GSharePredictor::new(h);
            let res = simulate(&mut p, &records);
            assert!(res.rate() < 0.5, "gshare:{} rate {}", h, res.rate());
        }
    }

    #[test]
    fn gshare_one_bit_history_learns_alternation() {
        // The counter selected after a 'taken' outcome only ever sees
        // 'not-taken' updates (and vice-versa), so the alternation is
        // learned after the first miss.
        let mut p = GSharePredictor::new(1);
        let mut misses = Vec::new();
        let opts = SimulationOptions::default();
        Simulator::new(&mut p).with_options(opts)
            .run_with(alternating(100, 0x400).into_iter().map(Ok::<_, Infallible>), |r, pred| {
                misses.push(pred != r.outcome);
            }).unwrap();
        assert_eq!(misses.iter().filter(|m| **m).count(), 1);
        assert!(misses[2..].iter().all(|m| !m));
    }

    #[test]
    fn gshare_zero_history_is_a_majority_vote() {
        let mut p = GSharePredictor::new(0);
        let res = simulate(&mut p, &alternating(100, 0x400));
        // A single 2-bit counter bounces between 'weakly' and 'strongly'
        // taken and misses every not-taken outcome.
        assert_eq!(res.mispredicted, 50);
    }

    #[test]
    fn perceptron_period_four() {
        let records = SyntheticTrace::new(0)
            .branch(0x1000, BranchPattern::Pattern(vec![T, T, N, N]))
            .generate(400);
        let mut p = PerceptronPredictor::new(2, 1, 1);
        let opts = SimulationOptions { warmup: 12, per_branch: false };
        let report = Simulator::new(&mut p).with_options(opts)
            .run(records.into_iter().map(Ok::<_, Infallible>)).unwrap();
        assert_eq!(report.result.total, 388);
        assert_eq!(report.result.mispredicted, 0);
    }

    #[test]
    fn perceptron_learns_periodic_patterns() {
        let records = SyntheticTrace::new(0)
            .branch(0x2000, BranchPattern::Pattern(vec![T, N, T, T, N]))
            .generate(5000);
        let mut p = PerceptronPredictor::new(8, 16, 29);
        let opts = SimulationOptions { warmup: 1000, per_branch: false };
        let report = Simulator::new(&mut p).with_options(opts)
            .run(records.into_iter().map(Ok::<_, Infallible>)).unwrap();
        assert_eq!(report.result.mispredicted, 0);
    }

    #[test]
    fn warmup_excludes_records() {
        let records = alternating(10, 0x40);
        let mut p = TakenPredictor;
        let opts = SimulationOptions { warmup: 4, per_branch: true };
        let report = Simulator::new(&mut p).with_options(opts)
            .run(records.into_iter().map(Ok::<_, Infallible>)).unwrap();
        assert_eq!(report.result.total, 6);
        assert_eq!(report.result.mispredicted, 3);
        let branches = report.branches.unwrap();
        assert_eq!(branches.get(0x40).unwrap().occ, 6);
    }

    #[test]
    fn malformed_record_aborts() {
        let text = "0x10 1\n0x14 0\nnot-a-record\n0x18 1\n";
        let mut p = GSharePredictor::new(4);
        let mut observed = 0;
        let res = Simulator::new(&mut p)
            .run_with(TraceReader::new(text.as_bytes()), |_, _| observed += 1);
        assert!(matches!(res, Err(TraceError::Malformed { line: 3, .. })));
        assert_eq!(observed, 2);
    }

    #[test]
    fn empty_trace() {
        let mut p = TournamentPredictor::new(4, 4, 4);
        let res = simulate(&mut p, &[]);
        assert_eq!(res, SimulationResult::default());
        assert_eq!(res.rate(), 0.0);
    }

    #[test]
    fn runs_are_deterministic() {
        let records = SyntheticTrace::new(42)
            .branch(0x10, BranchPattern::Random { p_taken: 0.7 })
            .branch(0x20, BranchPattern::TakenPeriodic(3))
            .branch(0x30, BranchPattern::Random { p_taken: 0.2 })
            .generate(5000);
        for s in ["gshare:8", "tournament:6:6:6", "custom:12:32:37"] {
            let cfg: PredictorConfig = s.parse().unwrap();
            let first = simulate(cfg.build().unwrap().as_mut(), &records);
            let second = simulate(cfg.build().unwrap().as_mut(), &records);
            assert_eq!(first, second, "{}", s);
        }
    }

    #[test]
    fn parallel_runs_match_sequential_runs() {
        let records = SyntheticTrace::new(3)
            .branch(0x10, BranchPattern::Random { p_taken: 0.9 })
            .branch(0x24, BranchPattern::NotTakenPeriodic(4))
            .generate(4000);
        let configs: Vec<PredictorConfig> = ["static", "gshare:6", "tournament:4:5:3", "custom:10:8:33"]
            .iter().map(|s| s.parse().unwrap()).collect();
        let reports = simulate_all(&configs, &records, SimulationOptions::default()).unwrap();
        assert_eq!(reports.len(), configs.len());
        for (cfg, report) in configs.iter().zip(reports.iter()) {
            let alone = simulate(cfg.build().unwrap().as_mut(), &records);
            assert_eq!(report.result, alone);
        }
    }
}
