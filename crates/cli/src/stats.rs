use std::collections::BTreeMap;
use tokenbag_core::{Outcome, RankResult, ResistanceCosts, TrackOutcomes};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub failures: u32,
    pub partials: u32,
    pub fulls: u32,
    pub crits: u32,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: Outcome) {
        *self.slot(outcome) += 1;
    }

    pub fn get(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Failure => self.failures,
            Outcome::Partial => self.partials,
            Outcome::Full => self.fulls,
            Outcome::Crit => self.crits,
        }
    }

    fn slot(&mut self, outcome: Outcome) -> &mut u32 {
        match outcome {
            Outcome::Failure => &mut self.failures,
            Outcome::Partial => &mut self.partials,
            Outcome::Full => &mut self.fulls,
            Outcome::Crit => &mut self.crits,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackCounts {
    pub base: OutcomeCounts,
    pub fortune: OutcomeCounts,
}

impl TrackCounts {
    fn record(&mut self, outcomes: TrackOutcomes) {
        self.base.record(outcomes.base);
        self.fortune.record(outcomes.fortune);
    }
}

/// Outcome tallies of standard pulls, per rank and over all ranks.
#[derive(Debug, Clone, Default)]
pub struct OutcomeStats {
    pub per_rank: BTreeMap<u32, TrackCounts>,
    pub total: TrackCounts,
}

impl OutcomeStats {
    /// Counts `result` if it carries outcomes. Returns whether it did.
    pub fn record(&mut self, result: &RankResult) -> bool {
        let Some(outcomes) = result.outcome else {
            return false;
        };
        self.per_rank.entry(result.rank).or_default().record(outcomes);
        self.total.record(outcomes);
        true
    }
}

/// Summed resistance costs, per rank and over all ranks.
#[derive(Debug, Clone, Default)]
pub struct CostStats {
    pub per_rank: BTreeMap<u32, ResistanceCosts>,
    pub total: ResistanceCosts,
}

impl CostStats {
    pub fn record(&mut self, result: &RankResult) -> bool {
        let Some(costs) = result.costs else {
            return false;
        };
        add_costs(self.per_rank.entry(result.rank).or_default(), costs);
        add_costs(&mut self.total, costs);
        true
    }
}

fn add_costs(into: &mut ResistanceCosts, costs: ResistanceCosts) {
    into.lost += costs.lost;
    into.taken += costs.taken;
    into.mitigated += costs.mitigated;
}
