//! Write a synthetic branch trace in the text trace format.

use std::io::{self, BufWriter};
use std::str::FromStr;

use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bpsim::*;
use bpsim::trace::synthetic::*;

/// A branch given on the command line as `<pc>:<pattern>[:<arg>]`.
#[derive(Clone, Debug)]
struct BranchSpec {
    pc: usize,
    pat: BranchPattern,
}

impl FromStr for BranchSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        let (raw_pc, kind, arg) = match fields.as_slice() {
            [pc, kind] => (*pc, *kind, None),
            [pc, kind, arg] => (*pc, *kind, Some(*arg)),
            _ => return Err(format!("expected <pc>:<pattern>[:<arg>], got '{}'", s)),
        };
        let digits = raw_pc.trim_start_matches("0x");
        let pc = usize::from_str_radix(digits, 16)
            .map_err(|_| format!("invalid address '{}'", raw_pc))?;

        let period = |arg: Option<&str>| -> Result<usize, String> {
            match arg.map(str::parse::<usize>) {
                Some(Ok(p)) if p > 0 => Ok(p),
                _ => Err(format!("'{}' needs a positive period", kind)),
            }
        };
        let pat = match (kind, arg) {
            ("taken", None) => BranchPattern::AlwaysTaken,
            ("not-taken", None) => BranchPattern::NeverTaken,
            ("taken-every", _) => BranchPattern::TakenPeriodic(period(arg)?),
            ("not-taken-every", _) => BranchPattern::NotTakenPeriodic(period(arg)?),
            ("pattern", Some(bits)) if !bits.is_empty() => {
                let outcomes = bits.chars().map(|c| match c {
                    '1' => Ok(Outcome::T),
                    '0' => Ok(Outcome::N),
                    _ => Err(format!("invalid outcome '{}' in pattern", c)),
                }).collect::<Result<Vec<_>, _>>()?;
                BranchPattern::Pattern(outcomes)
            },
            ("random", Some(p)) => {
                let p_taken = p.parse::<f64>()
                    .ok()
                    .filter(|p| (0.0..=1.0).contains(p))
                    .ok_or_else(|| format!("invalid probability '{}'", p))?;
                BranchPattern::Random { p_taken }
            },
            _ => return Err(format!("unknown pattern '{}'", s)),
        };
        Ok(Self { pc, pat })
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Number of branch records to write
    #[arg(short, long, default_value_t = 100_000)]
    length: usize,

    /// Seed for the random number generator
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// A branch and its pattern, e.g. 0x400:taken, 0x404:taken-every:3,
    /// 0x408:pattern:1100, 0x40c:random:0.7 (may be repeated)
    #[arg(short, long)]
    branch: Vec<BranchSpec>,

    /// Number of randomly-generated branches to use when no '--branch'
    /// is given
    #[arg(short = 'n', long, default_value_t = 16)]
    num_branches: usize,
}

/// Pick a random mix of branch behaviors.
fn random_branches(rng: &mut StdRng, n: usize) -> Vec<BranchSpec> {
    (0..n).map(|i| {
        let pc = 0x40_0000 + (i * 4) + (rng.gen_range(0..64) * 0x40);
        let pat = match rng.gen_range(0..4) {
            0 => BranchPattern::TakenPeriodic(rng.gen_range(2..16)),
            1 => BranchPattern::NotTakenPeriodic(rng.gen_range(2..16)),
            2 => BranchPattern::Pattern(
                (0..rng.gen_range(2..12)).map(|_| Outcome::from(rng.gen_bool(0.5))).collect()
            ),
            _ => BranchPattern::Random { p_taken: rng.gen_range(0.0..=1.0) },
        };
        BranchSpec { pc, pat }
    }).collect()
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn")
    ).init();

    let cli = Cli::parse();
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let branches = if cli.branch.is_empty() {
        random_branches(&mut rng, cli.num_branches)
    } else {
        cli.branch.clone()
    };

    let mut synth = SyntheticTrace::new(rng.gen());
    for spec in branches {
        info!("{:016x} {:?}", spec.pc, spec.pat);
        synth = synth.branch(spec.pc, spec.pat);
    }
    let records = synth.generate(cli.length);

    let stdout = io::stdout();
    write_trace(BufWriter::new(stdout.lock()), &records)?;
    Ok(())
}
