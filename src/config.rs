//! Decoding predictor descriptors (e.g. `gshare:13`) into predictors.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::error::ConfigError;
use crate::predictor::*;

/// Largest number of bits used to index a table of counters.
pub const MAX_INDEX_BITS: u32 = 28;

/// Largest global history length accepted for a perceptron predictor.
pub const MAX_PERCEPTRON_HISTORY: u32 = 1024;

/// Largest number of perceptrons in a table.
pub const MAX_PERCEPTRONS: u32 = 1 << 24;

/// Largest total predictor state, in bits (128 MiB), accepted for any
/// configuration. Checked in addition to the per-field limits, which allow
/// combinations far too large to allocate.
pub const MAX_STORAGE_BITS: u64 = 1 << 30;

/// A predictor configuration.
///
/// The textual form is `<kind>[:<param>]*`:
///
/// - `static`
/// - `gshare:<history_bits>`
/// - `tournament:<global_bits>:<local_bits>:<index_bits>`
/// - `custom:<history_bits>:<num_perceptrons>:<theta>`
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PredictorConfig {
    /// Always predict 'taken'.
    Static,

    GShare { history_bits: u32 },

    Tournament { global_bits: u32, local_bits: u32, index_bits: u32 },

    /// Perceptron predictor (selected with the `custom` descriptor).
    Perceptron { history_bits: u32, num_perceptrons: u32, theta: u32 },
}

impl PredictorConfig {
    /// The descriptor keyword for this kind of predictor.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::GShare { .. } => "gshare",
            Self::Tournament { .. } => "tournament",
            Self::Perceptron { .. } => "custom",
        }
    }

    /// Number of storage bits used by a predictor built from this
    /// configuration (the value reported by [BranchPredictor::storage_bits]).
    pub fn storage_bits(&self) -> u64 {
        let table = |index_bits: u32, cfg: SaturatingCounterConfig| {
            1u64.checked_shl(index_bits)
                .unwrap_or(u64::MAX)
                .saturating_mul(cfg.storage_bits() as u64)
        };
        match *self {
            Self::Static => 0,
            Self::GShare { history_bits } => {
                table(history_bits, SaturatingCounterConfig::TWO_BIT)
                    .saturating_add(history_bits as u64)
            },
            Self::Tournament { global_bits, local_bits, index_bits } => {
                let lht = 1u64.checked_shl(index_bits)
                    .unwrap_or(u64::MAX)
                    .saturating_mul(local_bits as u64);
                (global_bits as u64)
                    .saturating_add(table(global_bits, SaturatingCounterConfig::TWO_BIT))
                    .saturating_add(lht)
                    .saturating_add(table(local_bits, SaturatingCounterConfig::THREE_BIT))
                    .saturating_add(table(global_bits, SaturatingCounterConfig::TWO_BIT))
            },
            Self::Perceptron { history_bits, num_perceptrons, theta } => {
                let h = history_bits as u64;
                let weight_bits = theta.clamp(1, i32::MAX as u32).ilog2() as u64 + 2;
                (h + 1).saturating_mul(weight_bits)
                    .saturating_mul(num_perceptrons as u64)
                    .saturating_add(h)
            },
        }
    }

    /// Check that every parameter is within the supported range, and that
    /// the predictor fits in [MAX_STORAGE_BITS].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let kind = self.kind();
        let check = |field: &'static str, value: u32, lo: u32, hi: u32| {
            if value < lo || value > hi {
                Err(ConfigError::OutOfRange {
                    kind, field,
                    value: value as u64,
                    range: format!("{}..={}", lo, hi),
                })
            } else {
                Ok(())
            }
        };
        match *self {
            Self::Static => {},
            Self::GShare { history_bits } => {
                check("history_bits", history_bits, 0, MAX_INDEX_BITS)?;
            },
            Self::Tournament { global_bits, local_bits, index_bits } => {
                check("global_bits", global_bits, 0, MAX_INDEX_BITS)?;
                check("local_bits", local_bits, 0, MAX_INDEX_BITS)?;
                check("index_bits", index_bits, 0, MAX_INDEX_BITS)?;
            },
            Self::Perceptron { history_bits, num_perceptrons, theta } => {
                check("history_bits", history_bits, 0, MAX_PERCEPTRON_HISTORY)?;
                check("num_perceptrons", num_perceptrons, 1, MAX_PERCEPTRONS)?;
                check("theta", theta, 0, i32::MAX as u32)?;
            },
        }

        let bits = self.storage_bits();
        if bits > MAX_STORAGE_BITS {
            return Err(ConfigError::OutOfRange {
                kind,
                field: "storage_bits",
                value: bits,
                range: format!("0..={}", MAX_STORAGE_BITS),
            });
        }
        Ok(())
    }

    /// Use this configuration to create a new predictor.
    pub fn build(&self) -> Result<Box<dyn BranchPredictor + Send>, ConfigError> {
        self.validate()?;
        let p: Box<dyn BranchPredictor + Send> = match *self {
            Self::Static => Box::new(TakenPredictor),
            Self::GShare { history_bits } => {
                Box::new(GSharePredictor::new(history_bits as usize))
            },
            Self::Tournament { global_bits, local_bits, index_bits } => {
                Box::new(TournamentPredictor::new(
                    global_bits as usize,
                    local_bits as usize,
                    index_bits as usize,
                ))
            },
            Self::Perceptron { history_bits, num_perceptrons, theta } => {
                Box::new(PerceptronPredictor::new(
                    history_bits as usize,
                    num_perceptrons as usize,
                    theta,
                ))
            },
        };
        debug!("built {} ({}) with {} storage bits",
            self, p.name(), p.storage_bits());
        Ok(p)
    }
}

impl fmt::Display for PredictorConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::GShare { history_bits } => write!(f, "gshare:{}", history_bits),
            Self::Tournament { global_bits, local_bits, index_bits } => {
                write!(f, "tournament:{}:{}:{}", global_bits, local_bits, index_bits)
            },
            Self::Perceptron { history_bits, num_perceptrons, theta } => {
                write!(f, "custom:{}:{}:{}", history_bits, num_perceptrons, theta)
            },
        }
    }
}

/// Parse exactly `names.len()` numeric fields for some predictor kind.
fn parse_fields<const N: usize>(
    kind: &'static str,
    expected: &'static str,
    names: [&'static str; N],
    fields: &[&str],
) -> Result<[u32; N], ConfigError> {
    if fields.len() != N {
        return Err(ConfigError::Arity { kind, expected, found: fields.len() });
    }
    let mut res = [0; N];
    for ((out, field), value) in res.iter_mut().zip(names).zip(fields) {
        *out = value.trim().parse::<u32>().map_err(|_| {
            ConfigError::InvalidField { kind, field, value: value.to_string() }
        })?;
    }
    Ok(res)
}

impl FromStr for PredictorConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let kind = parts.next().unwrap_or_default().to_ascii_lowercase();
        let fields: Vec<&str> = parts.collect();

        let cfg = match kind.as_str() {
            "static" => {
                parse_fields::<0>("static", "no parameters", [], &fields)?;
                Self::Static
            },
            "gshare" => {
                let [history_bits] = parse_fields("gshare",
                    "gshare:<history_bits>",
                    ["history_bits"], &fields)?;
                Self::GShare { history_bits }
            },
            "tournament" => {
                let [global_bits, local_bits, index_bits] = parse_fields(
                    "tournament",
                    "tournament:<global_bits>:<local_bits>:<index_bits>",
                    ["global_bits", "local_bits", "index_bits"], &fields)?;
                Self::Tournament { global_bits, local_bits, index_bits }
            },
            "custom" | "perceptron" => {
                let [history_bits, num_perceptrons, theta] = parse_fields(
                    "custom",
                    "custom:<history_bits>:<num_perceptrons>:<theta>",
                    ["history_bits", "num_perceptrons", "theta"], &fields)?;
                Self::Perceptron { history_bits, num_perceptrons, theta }
            },
            _ => return Err(ConfigError::UnknownKind(s.to_string())),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_descriptors() {
        assert_eq!("gshare:13".parse::<PredictorConfig>(), Ok(PredictorConfig::GShare { history_bits: 13 }));
        assert_eq!("tournament:9:10:10".parse::<PredictorConfig>(), Ok(PredictorConfig::Tournament {
            global_bits: 9, local_bits: 10, index_bits: 10,
        }));
        assert_eq!("custom:34:263:79".parse::<PredictorConfig>(), Ok(PredictorConfig::Perceptron {
            history_bits: 34, num_perceptrons: 263, theta: 79,
        }));
        assert_eq!("perceptron:2:1:1".parse::<PredictorConfig>(), Ok(PredictorConfig::Perceptron {
            history_bits: 2, num_perceptrons: 1, theta: 1,
        }));
        assert_eq!("static".parse::<PredictorConfig>(), Ok(PredictorConfig::Static));
    }

    #[test]
    fn display_round_trips() {
        for s in ["static", "gshare:0", "tournament:9:10:10", "custom:34:263:79"] {
            let cfg: PredictorConfig = s.parse().unwrap();
            assert_eq!(cfg.to_string(), s);
        }
    }

    #[test]
    fn wrong_arity() {
        let err = "tournament:9:10".parse::<PredictorConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Arity { kind: "tournament", found: 2, .. }));
        let err = "gshare".parse::<PredictorConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Arity { kind: "gshare", found: 0, .. }));
        let err = "gshare:1:2".parse::<PredictorConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Arity { found: 2, .. }));
        assert!("static:1".parse::<PredictorConfig>().is_err());
    }

    #[test]
    fn non_numeric_field() {
        let err = "custom:34:abc:79".parse::<PredictorConfig>().unwrap_err();
        assert_eq!(err, ConfigError::InvalidField {
            kind: "custom", field: "num_perceptrons", value: "abc".to_string(),
        });
        assert!("gshare:".parse::<PredictorConfig>().is_err());
        assert!("gshare:-1".parse::<PredictorConfig>().is_err());
    }

    #[test]
    fn unknown_kind() {
        let err = "bimodal:4".parse::<PredictorConfig>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownKind("bimodal:4".to_string()));
        assert!("".parse::<PredictorConfig>().is_err());
    }

    #[test]
    fn out_of_range() {
        assert!(matches!("gshare:40".parse::<PredictorConfig>(),
            Err(ConfigError::OutOfRange { field: "history_bits", .. })));
        assert!(matches!("custom:8:0:20".parse::<PredictorConfig>(),
            Err(ConfigError::OutOfRange { field: "num_perceptrons", .. })));
    }

    #[test]
    fn storage_limit() {
        for s in ["tournament:28:28:28", "custom:1024:16777216:10", "tournament:28:0:0"] {
            let err = s.parse::<PredictorConfig>().unwrap_err();
            assert!(matches!(err, ConfigError::OutOfRange { field: "storage_bits", .. }),
                "{}: {:?}", s, err);
        }
        // Rejected before anything is allocated
        let cfg = PredictorConfig::Tournament { global_bits: 28, local_bits: 28, index_bits: 28 };
        assert!(cfg.build().is_err());

        // A single table of the widest index still fits
        let cfg: PredictorConfig = "gshare:28".parse().unwrap();
        assert_eq!(cfg.storage_bits(), (1 << 29) + 28);
        assert!("tournament:27:20:20".parse::<PredictorConfig>().is_ok());
    }

    #[test]
    fn storage_bits_match_predictors() {
        for s in ["static", "gshare:0", "gshare:13", "tournament:9:10:10",
            "tournament:0:2:4", "custom:34:263:79", "custom:0:4:0", "custom:2:1:1"]
        {
            let cfg: PredictorConfig = s.parse().unwrap();
            let p = cfg.build().unwrap();
            assert_eq!(cfg.storage_bits(), p.storage_bits() as u64, "{}", s);
        }
    }

    #[test]
    fn build_every_kind() {
        for s in ["static", "gshare:4", "tournament:3:3:3", "custom:8:16:29"] {
            let cfg: PredictorConfig = s.parse().unwrap();
            let mut p = cfg.build().unwrap();
            p.update(0x40, crate::Outcome::T);
            let _ = p.predict(0x40);
        }
        let gshare = PredictorConfig::GShare { history_bits: 4 }.build().unwrap();
        assert_eq!(gshare.storage_bits(), 16 * 2 + 4);
    }
}
