use crate::stats::{OutcomeCounts, TrackCounts};
use tokenbag_core::{Outcome, PullConfig, RankResult, ResistanceCosts, Tally, TestResult};

pub fn rank_label(config: &PullConfig, rank: u32, numeric: bool) -> String {
    if numeric {
        return rank.to_string();
    }
    config
        .rank_name(rank)
        .map_or_else(|| rank.to_string(), str::to_string)
}

fn tally(tally: Tally) -> String {
    match tally {
        Tally::Hits { hits, misses } => format!("{hits}/{misses}"),
        Tally::Sum { sum } => format!("{sum:+}"),
    }
}

/// `    Bronze:^ 2/0b+ 1/1f- pull: A, B` with the outcome symbol after each
/// track and `^` when the rank could crit.
pub fn standard_line(result: &RankResult, label: &str) -> String {
    let crit = if result.can_crit { '^' } else { ' ' };
    let (base, fortune) = match result.outcome {
        Some(outcome) => (outcome.base.symbol(), outcome.fortune.symbol()),
        None => (' ', ' '),
    };
    format!(
        "{label:>10}:{crit} {}b{base} {}f{fortune} pull: {}",
        tally(result.base),
        tally(result.fortune),
        result.fortune_pull_order.join(", ")
    )
}

pub fn pull_header(result: &RankResult) -> String {
    format!("{:12}{}", "", result.pull_order.join(", "))
}

pub fn cost_line(label: &str, costs: &ResistanceCosts) -> String {
    format!(
        "{label:>10}: {:>3}+ {:>3}~ {:>3}$",
        costs.mitigated, costs.taken, costs.lost
    )
}

pub fn outcome_summary_line(label: &str, counts: &TrackCounts) -> String {
    let pair = |base: &OutcomeCounts, fortune: &OutcomeCounts| {
        Outcome::ALL
            .iter()
            .map(|outcome| {
                format!(
                    "{}{}f{}",
                    outcome.symbol(),
                    base.get(*outcome),
                    fortune.get(*outcome)
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!("{label:>14}: {}", pair(&counts.base, &counts.fortune))
}

pub fn test_line(result: &TestResult) -> String {
    let status = if result.passed { "pass" } else { "FAIL" };
    format!(
        "{status} [{}] {}: {}",
        result.pull.join(", "),
        result.test,
        result.detail
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenbag_core::TrackOutcomes;

    fn sample() -> RankResult {
        RankResult {
            rank: 1,
            can_crit: true,
            base: Tally::Hits { hits: 2, misses: 0 },
            fortune: Tally::Hits { hits: 1, misses: 1 },
            outcome: Some(TrackOutcomes {
                base: Outcome::Full,
                fortune: Outcome::Partial,
            }),
            costs: None,
            pull_order: vec!["A".to_string()],
            fortune_pull_order: vec!["A".to_string(), "B".to_string()],
        }
    }

    #[test]
    fn labels_use_rank_names_unless_numeric() {
        let config = PullConfig::default();
        assert_eq!(rank_label(&config, 1, false), "Bronze");
        assert_eq!(rank_label(&config, 1, true), "1");
        assert_eq!(rank_label(&config, 9, false), "9");
    }

    #[test]
    fn standard_line_shows_tracks_and_fortune_order() {
        assert_eq!(
            standard_line(&sample(), "Bronze"),
            "    Bronze:^ 2/0b+ 1/1f- pull: A, B"
        );
        let sums = RankResult {
            base: Tally::Sum { sum: 3 },
            fortune: Tally::Sum { sum: -1 },
            can_crit: false,
            ..sample()
        };
        assert_eq!(standard_line(&sums, "1"), "         1:  +3b+ -1f- pull: A, B");
    }

    #[test]
    fn cost_and_summary_lines_align() {
        let costs = ResistanceCosts {
            lost: 1,
            taken: 12,
            mitigated: 3,
        };
        assert_eq!(cost_line("Gold", &costs), "      Gold:   3+  12~   1$");
        let mut counts = TrackCounts::default();
        counts.base.fulls = 2;
        counts.fortune.crits = 1;
        assert_eq!(
            outcome_summary_line("Totals", &counts),
            "        Totals: .0f0 -0f0 +2f0 ^0f1"
        );
        assert_eq!(pull_header(&sample()), "            A");
    }
}
