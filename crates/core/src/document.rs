use crate::{ConfigOverrides, TokenFace, TokenValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Token name to count. Counts weight the draw; order follows the document.
pub type BagDefinition = IndexMap<String, u32>;

/// The declarative configuration a pool is built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    #[serde(rename = "Bag Pool", default)]
    pub bag_pool: Option<IndexMap<String, BagEntry>>,
    #[serde(rename = "Token Pool", default)]
    pub token_pool: Option<IndexMap<String, PartialToken>>,
    #[serde(rename = "Config", default)]
    pub config: Option<ConfigOverrides>,
    #[serde(rename = "Test Pulls", default)]
    pub test_pulls: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BagEntry {
    Plain(Vec<BagDefinition>),
    Configured(ConfiguredBag),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfiguredBag {
    #[serde(rename = "Config", default)]
    pub config: Option<ConfigOverrides>,
    #[serde(rename = "Specification", default)]
    pub specification: Vec<BagDefinition>,
}

impl BagEntry {
    pub fn overrides(&self) -> Option<&ConfigOverrides> {
        match self {
            Self::Plain(_) => None,
            Self::Configured(bag) => bag.config.as_ref(),
        }
    }

    pub fn specification(&self) -> &[BagDefinition] {
        match self {
            Self::Plain(defs) => defs,
            Self::Configured(bag) => &bag.specification,
        }
    }
}

/// A literal pull and the assertions it must satisfy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    #[serde(rename = "Pull")]
    pub pull: Vec<String>,
    #[serde(rename = "Tests")]
    pub tests: Vec<String>,
    #[serde(rename = "Config", default)]
    pub config: Option<ConfigOverrides>,
}

/// A token definition as written in the document. Absent fields inherit from
/// the default (`Blank`) token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PartialToken {
    #[serde(rename = "Sum Value")]
    pub sum_value: Option<TokenValue>,
    #[serde(rename = "Hit Value")]
    pub hit_value: Option<TokenValue>,
    #[serde(rename = "Can Be Stolen")]
    pub can_be_stolen: Option<bool>,
    #[serde(rename = "Can Steal")]
    pub can_steal: Option<bool>,
    #[serde(rename = "Can Latch")]
    pub can_latch: Option<bool>,
    #[serde(rename = "Return to Bag", alias = "Return To Bag")]
    pub return_to_bag: Option<bool>,
    #[serde(rename = "Min Rank")]
    pub min_rank: Option<u32>,
    #[serde(rename = "Ends Draws")]
    pub ends_draws: Option<bool>,
    /// Negative disables crits.
    #[serde(rename = "Enable Crit")]
    pub enable_crit: Option<i64>,
    #[serde(rename = "Can Flip")]
    pub can_flip: Option<bool>,
    #[serde(rename = "Flipped")]
    pub flipped: Option<Box<PartialToken>>,
}

impl PartialToken {
    /// Fills a missing Hit Value from the Sum Value, or the reverse, when only
    /// one of the two is given.
    pub fn with_inferred_values(&self) -> Self {
        let mut token = self.clone();
        match (&token.hit_value, &token.sum_value) {
            (None, Some(sum)) => token.hit_value = Some(sum.clone()),
            (Some(hit), None) => token.sum_value = Some(hit.clone()),
            _ => {}
        }
        token
    }

    /// Writes every present field over `face`.
    pub fn overlay(&self, face: &TokenFace) -> TokenFace {
        let mut merged = face.clone();
        if let Some(value) = &self.sum_value {
            merged.sum_value = value.clone();
        }
        if let Some(value) = &self.hit_value {
            merged.hit_value = value.clone();
        }
        if let Some(value) = self.can_be_stolen {
            merged.can_be_stolen = value;
        }
        if let Some(value) = self.can_steal {
            merged.can_steal = value;
        }
        if let Some(value) = self.can_latch {
            merged.can_latch = value;
        }
        if let Some(value) = self.return_to_bag {
            merged.return_to_bag = value;
        }
        if let Some(value) = self.min_rank {
            merged.min_rank = value;
        }
        if let Some(value) = self.ends_draws {
            merged.ends_draws = value;
        }
        if let Some(value) = self.enable_crit {
            merged.enable_crit = u32::try_from(value).ok();
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_token_keys() {
        let err = serde_json::from_str::<PartialToken>(r#"{"Hit Value": 1, "Hits": 2}"#)
            .expect_err("unknown key must fail");
        assert!(err.to_string().contains("Hits"));
    }

    #[test]
    fn rejects_unknown_config_keys() {
        let err = serde_json::from_str::<ConfigOverrides>(r#"{"max_draw": 3}"#)
            .expect_err("unknown key must fail");
        assert!(err.to_string().contains("max_draw"));
    }

    #[test]
    fn parses_both_bag_shapes() {
        let doc: ConfigDocument = serde_json::from_str(
            r#"{
                "Bag Pool": {
                    "Base": [{"A": 2, "B": 1}],
                    "Tuned": {"Config": {"sums": true}, "Specification": [{"B": 3}]}
                },
                "Token Pool": {"A": {"Hit Value": 1}, "B": {"Sum Value": [1, 2]}}
            }"#,
        )
        .expect("parse document");
        let bags = doc.bag_pool.expect("bag pool");
        let base = &bags["Base"];
        assert!(base.overrides().is_none());
        let names: Vec<&str> = base.specification()[0].keys().map(String::as_str).collect();
        assert_eq!(names, vec!["A", "B"]);
        let tuned = &bags["Tuned"];
        assert_eq!(tuned.overrides().and_then(|config| config.sums), Some(true));
        assert_eq!(tuned.specification()[0]["B"], 3);
    }

    #[test]
    fn infers_missing_hit_or_sum() {
        let sum_only = PartialToken {
            sum_value: Some(TokenValue::Scalar(2)),
            ..PartialToken::default()
        };
        assert_eq!(
            sum_only.with_inferred_values().hit_value,
            Some(TokenValue::Scalar(2))
        );
        let hit_only = PartialToken {
            hit_value: Some(TokenValue::ByRank(vec![-1, 1])),
            ..PartialToken::default()
        };
        assert_eq!(
            hit_only.with_inferred_values().sum_value,
            Some(TokenValue::ByRank(vec![-1, 1]))
        );
    }

    #[test]
    fn negative_enable_crit_disables() {
        let token = PartialToken {
            enable_crit: Some(-1),
            ..PartialToken::default()
        };
        let face = token.overlay(&TokenFace {
            enable_crit: Some(2),
            ..TokenFace::default()
        });
        assert_eq!(face.enable_crit, None);
    }
}
