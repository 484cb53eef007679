//! Replays a pull at one rank through the base and fortune tracks.
//!
//! Both tracks see every token in order. The base track stops taking tokens
//! once an Ends Draws token comes up or both of its measures are final; the
//! fortune track keeps resolving until its own measures are final. Stealing
//! pops the most recent stealable token of each track and takes back what
//! that token added.

use crate::{Contribution, Pool, PullConfig, PullMode, TokenDefinition};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("token `{0}` not found in Token Pool")]
    UnknownToken(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Failure,
    Partial,
    Full,
    Crit,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::Failure,
        Outcome::Partial,
        Outcome::Full,
        Outcome::Crit,
    ];

    pub fn symbol(self) -> char {
        match self {
            Self::Failure => '.',
            Self::Partial => '-',
            Self::Full => '+',
            Self::Crit => '^',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|outcome| outcome.symbol() == symbol)
    }
}

/// The measure a track reports, hits/misses or a running sum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Tally {
    Hits { hits: i64, misses: i64 },
    Sum { sum: i64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackOutcomes {
    pub base: Outcome,
    pub fortune: Outcome,
}

/// Unit counts a resistance pull charges, one per qualifying token.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResistanceCosts {
    pub lost: u32,
    pub taken: u32,
    pub mitigated: u32,
}

impl ResistanceCosts {
    fn charge(&mut self, contribution: Contribution) {
        if contribution.hits > 0 {
            self.mitigated += 1;
        }
        if contribution.misses > 0 {
            self.taken += 1;
        }
    }
}

/// One rank's evaluation. Standard pulls carry `outcome`, resistance pulls
/// carry `costs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct RankResult {
    pub rank: u32,
    pub can_crit: bool,
    pub base: Tally,
    pub fortune: Tally,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TrackOutcomes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<ResistanceCosts>,
    pub pull_order: Vec<String>,
    pub fortune_pull_order: Vec<String>,
}

/// Running totals of one track plus its finalization flags. The measure not
/// in use starts final so only the active one gates the track.
#[derive(Debug, Clone, Copy)]
struct Track {
    hits: i64,
    misses: i64,
    sum: i64,
    hits_final: bool,
    sum_final: bool,
}

impl Track {
    fn new(sums: bool) -> Self {
        Self {
            hits: 0,
            misses: 0,
            sum: 0,
            hits_final: sums,
            sum_final: !sums,
        }
    }

    fn add(&mut self, contribution: Contribution) {
        if !self.hits_final {
            self.hits += contribution.hits;
            self.misses += contribution.misses;
        }
        if !self.sum_final {
            self.sum += contribution.sum;
        }
    }

    fn take_back(&mut self, contribution: Contribution) {
        if !self.hits_final {
            self.hits -= contribution.hits;
            self.misses -= contribution.misses;
        }
        if !self.sum_final {
            self.sum -= contribution.sum;
        }
    }

    fn settle(&mut self, config: &PullConfig, can_crit: bool) {
        let crit_gate = can_crit || !config.hit_ceil_only_on_crit;
        if crit_gate && (self.misses >= config.miss_ceil || self.hits >= config.hit_ceil) {
            self.hits_final = true;
        }
        if self.sum >= config.sum_ceil || self.sum <= config.sum_floor {
            self.sum_final = true;
        }
    }

    fn is_final(&self) -> bool {
        self.hits_final && self.sum_final
    }

    fn classify(&self, config: &PullConfig, can_crit: bool) -> Outcome {
        let (value, ceil, full, partial) = if config.sums {
            (self.sum, config.sum_ceil, config.sum_full, config.sum_partial)
        } else {
            (self.hits, config.hit_ceil, config.hit_full, config.hit_partial)
        };
        if can_crit && value >= ceil {
            Outcome::Crit
        } else if value >= full {
            Outcome::Full
        } else if value >= partial {
            Outcome::Partial
        } else {
            Outcome::Failure
        }
    }

    fn tally(&self, sums: bool) -> Tally {
        if sums {
            Tally::Sum { sum: self.sum }
        } else {
            Tally::Hits {
                hits: self.hits,
                misses: self.misses,
            }
        }
    }
}

/// Latch flags follow the draws but no rule reads them yet.
#[derive(Debug, Default, Clone, Copy)]
struct Latches {
    base: bool,
    fortune: bool,
}

/// Evaluates pulls against a pool under one fixed configuration.
#[derive(Debug, Clone, Copy)]
pub struct RankEvaluator<'a> {
    pool: &'a Pool,
    config: &'a PullConfig,
}

impl<'a> RankEvaluator<'a> {
    pub fn new(pool: &'a Pool, config: &'a PullConfig) -> Self {
        Self { pool, config }
    }

    pub fn evaluate(&self, rank: u32, pull: &[String]) -> Result<RankResult, EvalError> {
        let config = self.config;
        let mut base = Track::new(config.sums);
        let mut fortune = Track::new(config.sums);
        let mut base_ended = false;
        let mut can_crit = false;
        let mut latches = Latches::default();
        let mut costs = ResistanceCosts::default();
        let mut base_stealable: Vec<&TokenDefinition> = Vec::new();
        let mut fortune_stealable: Vec<&TokenDefinition> = Vec::new();
        let mut pull_order = Vec::new();
        let mut fortune_pull_order = Vec::new();

        for name in pull {
            let token = self
                .pool
                .token(name)
                .ok_or_else(|| EvalError::UnknownToken(name.clone()))?;
            fortune_pull_order.push(name.clone());
            if !base_ended {
                pull_order.push(name.clone());
            }
            // Lost counts every Ends Draws token, eligible at this rank or not.
            if token.base.ends_draws {
                costs.lost += 1;
            }

            let has_base = token.base_at(rank).is_some();
            let flipped = token.flipped_at(rank);
            if !has_base && flipped.is_none() {
                continue;
            }
            if token.base.enables_crit_at(rank) {
                can_crit = true;
            }

            let base_share = token.base.resolve(rank);
            if has_base {
                costs.charge(base_share);
                if !base_ended {
                    base.add(base_share);
                }
            }
            match flipped {
                Some(face) => fortune.add(face.resolve(rank)),
                None => fortune.add(base_share),
            }

            if token.base.can_steal && has_base {
                if !base_ended {
                    if let Some(stolen) = base_stealable.pop() {
                        base.take_back(stolen.base.resolve(rank));
                        if stolen.base.can_latch && latches.base {
                            latches.base = false;
                        }
                    }
                }
                if let Some(stolen) = fortune_stealable.pop() {
                    // Rank is fixed for the whole evaluation, so the stolen
                    // token's eligibility now matches its eligibility when drawn.
                    let face = stolen.fortune_face(rank);
                    fortune.take_back(face.resolve(rank));
                    if face.can_latch {
                        latches.fortune = false;
                    }
                }
            }

            if token.base.can_be_stolen {
                base_stealable.push(token);
            }
            let fortune_can_be_stolen = match flipped {
                Some(face) => face.can_be_stolen,
                None => token.base.can_be_stolen,
            };
            if fortune_can_be_stolen {
                fortune_stealable.push(token);
            }

            if latches.fortune {
                latches.fortune = false;
            }
            if token.fortune_face(rank).can_latch {
                latches.fortune = true;
            }
            if latches.base && !base_ended {
                latches.base = false;
            }
            if token.base.can_latch && !base_ended {
                latches.base = true;
            }

            if token.base.ends_draws && !config.ignores_ends_draws {
                base_ended = true;
            }

            base.settle(config, can_crit);
            if base.is_final() {
                base_ended = true;
            }
            fortune.settle(config, can_crit);
            if fortune.is_final() {
                break;
            }
        }

        let (outcome, costs) = match config.mode {
            PullMode::Standard => (
                Some(TrackOutcomes {
                    base: base.classify(config, can_crit),
                    fortune: fortune.classify(config, can_crit),
                }),
                None,
            ),
            PullMode::Resistance => (None, Some(costs)),
        };
        Ok(RankResult {
            rank,
            can_crit,
            base: base.tally(config.sums),
            fortune: fortune.tally(config.sums),
            outcome,
            costs,
            pull_order,
            fortune_pull_order,
        })
    }
}
