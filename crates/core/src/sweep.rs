use crate::{EvalError, Pool, PullConfig, RankEvaluator, RankResult, ReplayablePull};
use serde::{Deserialize, Serialize};

/// Every rank's result when the pull is cut off after `draws` tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawSweep {
    pub draws: usize,
    pub ranks: Vec<RankResult>,
}

/// A drawn pull together with its results matrix.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRun {
    pub pull: ReplayablePull,
    pub sweeps: Vec<DrawSweep>,
}

impl PullRun {
    /// The row for the longest draw count.
    pub fn last(&self) -> Option<&DrawSweep> {
        self.sweeps.last()
    }
}

/// Evaluates `pull` cut at every draw count from 1 to `config.max_draws`, at
/// every rank from 0 to `max_rank`.
pub fn sweep_draws(
    pool: &Pool,
    config: &PullConfig,
    max_rank: u32,
    pull: &ReplayablePull,
) -> Result<Vec<DrawSweep>, EvalError> {
    let evaluator = RankEvaluator::new(pool, config);
    let mut sweeps = Vec::with_capacity(config.max_draws);
    for draws in 1..=config.max_draws {
        let prefix = pull.prefix(draws);
        let ranks = (0..=max_rank)
            .map(|rank| evaluator.evaluate(rank, prefix))
            .collect::<Result<Vec<_>, _>>()?;
        sweeps.push(DrawSweep { draws, ranks });
    }
    Ok(sweeps)
}

/// Sweeps `pull` under the resistance configuration derived from `config`.
pub fn sweep_resistance(
    pool: &Pool,
    config: &PullConfig,
    max_rank: u32,
    pull: &ReplayablePull,
) -> Result<Vec<DrawSweep>, EvalError> {
    sweep_draws(pool, &config.resistance(), max_rank, pull)
}
