use tokenbag_core::{
    ConfigDocument, EvalError, Outcome, PullConfig, RankEvaluator, RankResult, Tally, TokenBag,
    TrackOutcomes,
};

const TOKENS: &str = r#"{
    "Bag Pool": {
        "Base": [{"A": 1, "B": 1, "C": 1, "D": 1, "E": 1, "F": 1, "G": 1, "K": 1, "M": 1, "P": 1}],
        "Sums": [{"N": 1, "R": 1, "U": 1, "V": 1}],
        "Thieves": [{"W": 1, "D": 1}]
    },
    "Token Pool": {
        "A": {"Hit Value": 2},
        "B": {"Sum Value": [1, 2, 3]},
        "C": {"Hit Value": 1, "Can Be Stolen": true},
        "D": {"Hit Value": 1, "Can Steal": true},
        "E": {"Hit Value": 1, "Ends Draws": true},
        "F": {"Hit Value": 1, "Can Flip": true, "Flipped": {"Hit Value": -1}},
        "G": {"Hit Value": 1, "Min Rank": 1},
        "K": {"Hit Value": 1, "Enable Crit": 0},
        "M": {"Hit Value": -1},
        "P": {"Hit Value": 1},
        "N": {"Sum Value": -2},
        "R": {"Sum Value": 2, "Enable Crit": 0},
        "U": {"Sum Value": 3},
        "V": {"Hit Value": 1, "Sum Value": 3, "Can Flip": true, "Flipped": {"Hit Value": -1}},
        "W": {"Hit Value": 1, "Can Flip": true, "Flipped": {"Hit Value": 2, "Can Be Stolen": true}}
    }
}"#;

fn token_bag() -> TokenBag {
    bag_named("Base")
}

fn bag_named(name: &str) -> TokenBag {
    let doc: ConfigDocument = serde_json::from_str(TOKENS).expect("valid document");
    let mut bag = TokenBag::new();
    bag.import_document(&doc, Some(name), false)
        .expect("import");
    bag
}

fn pull(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn evaluate(bag: &TokenBag, config: &PullConfig, rank: u32, names: &[&str]) -> RankResult {
    RankEvaluator::new(&bag.pool, config)
        .evaluate(rank, &pull(names))
        .expect("evaluate")
}

fn outcomes(result: &RankResult) -> TrackOutcomes {
    result.outcome.expect("standard pull has outcomes")
}

#[test]
fn single_hit_token_reaches_full() {
    let bag = token_bag();
    let result = evaluate(&bag, &bag.config, 0, &["A"]);
    assert_eq!(result.base, Tally::Hits { hits: 2, misses: 0 });
    assert_eq!(outcomes(&result).base, Outcome::Full);
    assert!(!result.can_crit);
}

#[test]
fn rank_list_is_indexed_from_min_rank() {
    let bag = token_bag();
    let config = bag.config.with_sums(true);
    let result = evaluate(&bag, &config, 2, &["B"]);
    assert_eq!(result.base, Tally::Sum { sum: 3 });
    assert_eq!(outcomes(&result).base, Outcome::Full);

    let clamped = evaluate(&bag, &config, 3, &["B"]);
    assert_eq!(clamped.base, Tally::Sum { sum: 3 });
}

#[test]
fn steal_takes_back_the_stolen_contribution() {
    let bag = token_bag();
    let result = evaluate(&bag, &bag.config, 0, &["C", "D"]);
    assert_eq!(result.base, Tally::Hits { hits: 1, misses: 0 });
    assert_eq!(result.fortune, Tally::Hits { hits: 1, misses: 0 });
    assert_eq!(outcomes(&result).base, Outcome::Partial);
}

#[test]
fn steal_with_nothing_stealable_is_a_no_op() {
    let bag = token_bag();
    let result = evaluate(&bag, &bag.config, 0, &["P", "D"]);
    assert_eq!(result.base, Tally::Hits { hits: 2, misses: 0 });
}

#[test]
fn ends_draws_stops_only_the_base_track() {
    let bag = token_bag();
    let result = evaluate(&bag, &bag.config, 0, &["P", "E", "P"]);
    assert_eq!(result.base, Tally::Hits { hits: 2, misses: 0 });
    assert_eq!(result.fortune, Tally::Hits { hits: 3, misses: 0 });
    assert_eq!(result.pull_order, pull(&["P", "E"]));
    assert_eq!(result.fortune_pull_order, pull(&["P", "E", "P"]));

    let ignoring = PullConfig {
        ignores_ends_draws: true,
        ..bag.config.clone()
    };
    let result = evaluate(&bag, &ignoring, 0, &["P", "E", "P"]);
    assert_eq!(result.base, Tally::Hits { hits: 3, misses: 0 });
    assert_eq!(result.pull_order.len(), 3);
}

#[test]
fn crit_token_unlocks_the_ceiling() {
    let bag = token_bag();
    let result = evaluate(&bag, &bag.config, 0, &["K", "K", "K", "K"]);
    assert!(result.can_crit);
    assert_eq!(result.base, Tally::Hits { hits: 3, misses: 0 });
    assert_eq!(
        outcomes(&result),
        TrackOutcomes {
            base: Outcome::Crit,
            fortune: Outcome::Crit
        }
    );
    assert_eq!(result.pull_order.len(), 3);
    assert_eq!(result.fortune_pull_order.len(), 3);
}

#[test]
fn hits_past_the_ceiling_without_crit_stay_full() {
    let bag = token_bag();
    let result = evaluate(&bag, &bag.config, 0, &["P", "P", "P", "P"]);
    assert_eq!(result.base, Tally::Hits { hits: 4, misses: 0 });
    assert_eq!(outcomes(&result).base, Outcome::Full);
    assert_eq!(result.fortune_pull_order.len(), 4);
}

#[test]
fn miss_ceiling_finalizes_when_crit_is_not_required() {
    let bag = token_bag();
    let config = PullConfig {
        hit_ceil_only_on_crit: false,
        ..bag.config.clone()
    };
    let result = evaluate(&bag, &config, 0, &["M", "M", "P"]);
    assert_eq!(result.base, Tally::Hits { hits: 0, misses: 2 });
    assert_eq!(outcomes(&result).base, Outcome::Failure);
    assert_eq!(result.fortune_pull_order, pull(&["M", "M"]));
}

#[test]
fn ineligible_tokens_are_consumed_without_effect() {
    let bag = token_bag();
    let low = evaluate(&bag, &bag.config, 0, &["G"]);
    assert_eq!(low.base, Tally::Hits { hits: 0, misses: 0 });
    assert_eq!(outcomes(&low).base, Outcome::Failure);
    assert_eq!(low.fortune_pull_order, pull(&["G"]));

    let high = evaluate(&bag, &bag.config, 1, &["G"]);
    assert_eq!(high.base, Tally::Hits { hits: 1, misses: 0 });
    assert_eq!(outcomes(&high).base, Outcome::Partial);
}

#[test]
fn flipped_face_drives_the_fortune_track() {
    let bag = token_bag();
    let result = evaluate(&bag, &bag.config, 0, &["F"]);
    assert_eq!(result.base, Tally::Hits { hits: 1, misses: 0 });
    assert_eq!(result.fortune, Tally::Hits { hits: 0, misses: 1 });
    assert_eq!(
        outcomes(&result),
        TrackOutcomes {
            base: Outcome::Partial,
            fortune: Outcome::Failure
        }
    );
}

#[test]
fn unknown_tokens_in_a_literal_pull_are_errors() {
    let bag = token_bag();
    let err = RankEvaluator::new(&bag.pool, &bag.config)
        .evaluate(0, &pull(&["P", "Nope"]))
        .expect_err("Nope is not in the pool");
    assert_eq!(err, EvalError::UnknownToken("Nope".to_string()));
}

#[test]
fn empty_pull_fails_every_track() {
    let bag = token_bag();
    let result = evaluate(&bag, &bag.config, 0, &[]);
    assert_eq!(
        outcomes(&result),
        TrackOutcomes {
            base: Outcome::Failure,
            fortune: Outcome::Failure
        }
    );
    assert!(result.pull_order.is_empty());
}

#[test]
fn sum_floor_finalizes_and_ends_the_pull() {
    let bag = bag_named("Sums");
    let config = bag.config.with_sums(true);
    let result = evaluate(&bag, &config, 0, &["N", "U"]);
    assert_eq!(result.base, Tally::Sum { sum: -2 });
    assert_eq!(result.fortune, Tally::Sum { sum: -2 });
    assert_eq!(result.pull_order, pull(&["N"]));
    assert_eq!(result.fortune_pull_order, pull(&["N"]));
    assert_eq!(
        outcomes(&result),
        TrackOutcomes {
            base: Outcome::Failure,
            fortune: Outcome::Failure
        }
    );
}

#[test]
fn sum_ceiling_finalizes_without_crit() {
    let bag = bag_named("Sums");
    let config = bag.config.with_sums(true);
    let result = evaluate(&bag, &config, 0, &["U", "U", "N"]);
    assert_eq!(result.base, Tally::Sum { sum: 6 });
    assert_eq!(result.fortune_pull_order, pull(&["U", "U"]));
    assert!(!result.can_crit);
    assert_eq!(outcomes(&result).base, Outcome::Full);
}

#[test]
fn sum_crit_needs_a_crit_token_and_the_ceiling() {
    let bag = bag_named("Sums");
    let config = bag.config.with_sums(true);
    let result = evaluate(&bag, &config, 0, &["R", "R", "N"]);
    assert!(result.can_crit);
    assert_eq!(result.base, Tally::Sum { sum: 4 });
    assert_eq!(result.fortune_pull_order, pull(&["R", "R"]));
    assert_eq!(
        outcomes(&result),
        TrackOutcomes {
            base: Outcome::Crit,
            fortune: Outcome::Crit
        }
    );

    let short = evaluate(&bag, &config, 0, &["R"]);
    assert!(short.can_crit);
    assert_eq!(outcomes(&short).base, Outcome::Full);
}

#[test]
fn fortune_steal_takes_back_the_flipped_face() {
    let bag = bag_named("Thieves");
    let result = evaluate(&bag, &bag.config, 0, &["W", "D"]);
    // W is stealable only on its flipped face, so the base track keeps it.
    assert_eq!(result.base, Tally::Hits { hits: 2, misses: 0 });
    assert_eq!(result.fortune, Tally::Hits { hits: 1, misses: 0 });
    assert_eq!(
        outcomes(&result),
        TrackOutcomes {
            base: Outcome::Full,
            fortune: Outcome::Partial
        }
    );
}

#[test]
fn flipped_override_keeps_unnamed_base_values() {
    let bag = bag_named("Sums");
    let sums = bag.config.with_sums(true);
    let result = evaluate(&bag, &sums, 0, &["V"]);
    assert_eq!(result.base, Tally::Sum { sum: 3 });
    assert_eq!(result.fortune, Tally::Sum { sum: 3 });

    let hits = evaluate(&bag, &bag.config, 0, &["V"]);
    assert_eq!(hits.base, Tally::Hits { hits: 1, misses: 0 });
    assert_eq!(hits.fortune, Tally::Hits { hits: 0, misses: 1 });
}
