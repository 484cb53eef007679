use serde::{Deserialize, Serialize};

/// A token value: either one number for every rank, or one entry per rank
/// counted from the face's minimum rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Scalar(i64),
    ByRank(Vec<i64>),
}

impl Default for TokenValue {
    fn default() -> Self {
        Self::Scalar(0)
    }
}

impl TokenValue {
    /// Looks up the value `offset` ranks above the minimum rank. Offsets past
    /// the end of a rank list clamp to its last entry.
    pub fn at(&self, offset: u32) -> i64 {
        match self {
            Self::Scalar(value) => *value,
            Self::ByRank(values) => values
                .get(offset as usize)
                .or_else(|| values.last())
                .copied()
                .unwrap_or(0),
        }
    }
}

/// One side of a token. Every token has a base face; flippable tokens carry a
/// second face that drives the fortune track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFace {
    pub sum_value: TokenValue,
    pub hit_value: TokenValue,
    pub can_be_stolen: bool,
    pub can_steal: bool,
    pub can_latch: bool,
    pub return_to_bag: bool,
    pub min_rank: u32,
    pub ends_draws: bool,
    pub enable_crit: Option<u32>,
}

impl Default for TokenFace {
    fn default() -> Self {
        Self {
            sum_value: TokenValue::Scalar(0),
            hit_value: TokenValue::Scalar(0),
            can_be_stolen: false,
            can_steal: false,
            can_latch: false,
            return_to_bag: false,
            min_rank: 0,
            ends_draws: false,
            enable_crit: None,
        }
    }
}

impl TokenFace {
    pub fn active_at(&self, rank: u32) -> bool {
        self.min_rank <= rank
    }

    pub fn enables_crit_at(&self, rank: u32) -> bool {
        self.enable_crit.is_some_and(|threshold| threshold <= rank)
    }

    /// Resolves this face at `rank`. An inactive face contributes nothing.
    pub fn resolve(&self, rank: u32) -> Contribution {
        if !self.active_at(rank) {
            return Contribution::default();
        }
        let offset = rank - self.min_rank;
        let hit = self.hit_value.at(offset);
        let (hits, misses) = if hit > 0 { (hit, 0) } else { (0, hit.abs()) };
        Contribution {
            hits,
            misses,
            sum: self.sum_value.at(offset),
        }
    }
}

/// What a single resolved face adds to a track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contribution {
    pub hits: i64,
    pub misses: i64,
    pub sum: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDefinition {
    pub base: TokenFace,
    /// Present iff the token can flip.
    #[serde(default)]
    pub flipped: Option<TokenFace>,
}

impl TokenDefinition {
    pub fn can_flip(&self) -> bool {
        self.flipped.is_some()
    }

    pub fn base_at(&self, rank: u32) -> Option<&TokenFace> {
        Some(&self.base).filter(|face| face.active_at(rank))
    }

    pub fn flipped_at(&self, rank: u32) -> Option<&TokenFace> {
        self.flipped.as_ref().filter(|face| face.active_at(rank))
    }

    /// The face the fortune track reads at `rank`: the flipped face when it is
    /// eligible, the base face otherwise.
    pub fn fortune_face(&self, rank: u32) -> &TokenFace {
        self.flipped_at(rank).unwrap_or(&self.base)
    }

    /// The face consulted while drawing, before any rank is known.
    pub fn draw_face(&self) -> &TokenFace {
        self.flipped.as_ref().unwrap_or(&self.base)
    }

    pub fn highest_min_rank(&self) -> u32 {
        self.flipped
            .as_ref()
            .map_or(self.base.min_rank, |face| face.min_rank.max(self.base.min_rank))
    }
}
