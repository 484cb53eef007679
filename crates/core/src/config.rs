use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PullMode {
    #[default]
    Standard,
    Resistance,
}

/// Run parameters for drawing and evaluating pulls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullConfig {
    pub bag_name: String,
    pub ranks: Vec<String>,
    pub max_draws: usize,
    pub ignores_ends_draws: bool,
    pub sums: bool,
    pub hit_ceil_only_on_crit: bool,
    pub hit_ceil: i64,
    pub hit_full: i64,
    pub hit_partial: i64,
    pub miss_ceil: i64,
    pub sum_ceil: i64,
    pub sum_full: i64,
    pub sum_partial: i64,
    pub sum_floor: i64,
    /// `(bag index, draws)` pairs, replayed in a cycle until `max_draws`.
    pub bag_draws: Vec<(usize, usize)>,
    /// Overrides the maximum rank derived from the pool.
    pub max_rank: Option<u32>,
    #[serde(default)]
    pub mode: PullMode,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            bag_name: "Base".to_string(),
            ranks: ["Unranked", "Bronze", "Silver", "Gold"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            max_draws: 10,
            ignores_ends_draws: false,
            sums: false,
            hit_ceil_only_on_crit: true,
            hit_ceil: 3,
            hit_full: 2,
            hit_partial: 1,
            miss_ceil: 2,
            sum_ceil: 4,
            sum_full: 2,
            sum_partial: 0,
            sum_floor: -2,
            bag_draws: vec![(0, 1)],
            max_rank: None,
            mode: PullMode::Standard,
        }
    }
}

impl PullConfig {
    pub const RESISTANCE_DRAWS: usize = 3;

    /// The configuration a resistance pull evaluates under: three draws,
    /// no hit/miss ceilings, Ends Draws counted but never terminating, and
    /// hit/miss tallies.
    pub fn resistance(&self) -> Self {
        Self {
            max_draws: Self::RESISTANCE_DRAWS,
            hit_ceil: i64::MAX,
            miss_ceil: i64::MAX,
            ignores_ends_draws: true,
            sums: false,
            mode: PullMode::Resistance,
            ..self.clone()
        }
    }

    pub fn with_sums(&self, sums: bool) -> Self {
        Self {
            sums,
            ..self.clone()
        }
    }

    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut config = self.clone();
        overrides.apply(&mut config);
        config
    }

    pub fn rank_name(&self, rank: u32) -> Option<&str> {
        self.ranks.get(rank as usize).map(String::as_str)
    }
}

/// A partial [`PullConfig`]: every field that is present replaces the
/// corresponding run parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub bag_name: Option<String>,
    pub ranks: Option<Vec<String>>,
    pub max_draws: Option<usize>,
    pub ignores_ends_draws: Option<bool>,
    pub sums: Option<bool>,
    pub hit_ceil_only_on_crit: Option<bool>,
    pub hit_ceil: Option<i64>,
    pub hit_full: Option<i64>,
    pub hit_partial: Option<i64>,
    pub miss_ceil: Option<i64>,
    pub sum_ceil: Option<i64>,
    pub sum_full: Option<i64>,
    pub sum_partial: Option<i64>,
    pub sum_floor: Option<i64>,
    pub bag_draws: Option<Vec<(usize, usize)>>,
    pub max_rank: Option<u32>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut PullConfig) {
        if let Some(value) = &self.bag_name {
            config.bag_name = value.clone();
        }
        if let Some(value) = &self.ranks {
            config.ranks = value.clone();
        }
        if let Some(value) = self.max_draws {
            config.max_draws = value;
        }
        if let Some(value) = self.ignores_ends_draws {
            config.ignores_ends_draws = value;
        }
        if let Some(value) = self.sums {
            config.sums = value;
        }
        if let Some(value) = self.hit_ceil_only_on_crit {
            config.hit_ceil_only_on_crit = value;
        }
        if let Some(value) = self.hit_ceil {
            config.hit_ceil = value;
        }
        if let Some(value) = self.hit_full {
            config.hit_full = value;
        }
        if let Some(value) = self.hit_partial {
            config.hit_partial = value;
        }
        if let Some(value) = self.miss_ceil {
            config.miss_ceil = value;
        }
        if let Some(value) = self.sum_ceil {
            config.sum_ceil = value;
        }
        if let Some(value) = self.sum_full {
            config.sum_full = value;
        }
        if let Some(value) = self.sum_partial {
            config.sum_partial = value;
        }
        if let Some(value) = self.sum_floor {
            config.sum_floor = value;
        }
        if let Some(value) = &self.bag_draws {
            config.bag_draws = value.clone();
        }
        if let Some(value) = self.max_rank {
            config.max_rank = Some(value);
        }
        log::debug!("updated pull configuration: {config:?}");
    }
}
