use crate::{BagDefinition, PartialToken, TestCase, TokenDefinition, TokenFace};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub const BLANK_TOKEN: &str = "Blank";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no `Bag Pool` specified in config")]
    MissingBagPool,
    #[error("no `Token Pool` specified in config")]
    MissingTokenPool,
    #[error("requested bag `{0}` not found in Bag Pool")]
    UnknownBag(String),
    #[error("bag {bag} references token `{token}` missing from Token Pool")]
    UnknownToken { bag: usize, token: String },
}

/// Token names in draw order. Duplicates weight the draw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bag {
    pub tokens: Vec<String>,
}

impl Bag {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub bags: Vec<Bag>,
    pub tokens: HashMap<String, TokenDefinition>,
    pub max_rank: u32,
}

impl Pool {
    pub fn token(&self, name: &str) -> Option<&TokenDefinition> {
        self.tokens.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bags.is_empty() && self.tokens.is_empty()
    }
}

/// Expands partial token definitions onto the default token and collects the
/// bags of one bag entry.
#[derive(Debug)]
pub struct PoolBuilder<'a> {
    token_pool: &'a IndexMap<String, PartialToken>,
    blank: PartialToken,
    default_face: TokenFace,
}

impl<'a> PoolBuilder<'a> {
    pub fn new(token_pool: &'a IndexMap<String, PartialToken>) -> Self {
        let blank = token_pool.get(BLANK_TOKEN).cloned().unwrap_or_default();
        let default_face = blank.overlay(&TokenFace::default());
        log::debug!("generated default token: {default_face:?}");
        Self {
            token_pool,
            blank,
            default_face,
        }
    }

    /// The definition every token starts from before its own fields apply.
    pub fn default_token(&self) -> TokenDefinition {
        self.merge(&PartialToken::default())
    }

    /// Builds the pool from bag definitions. When `tests` name tokens, a
    /// trailing bag holding one of each is appended so every test token is
    /// defined.
    pub fn build(&self, specs: &[BagDefinition], tests: &[TestCase]) -> Result<Pool, ConfigError> {
        let mut pool = Pool::default();
        pool.tokens
            .insert(BLANK_TOKEN.to_string(), self.default_token());

        let test_bag = test_bag_definition(tests);
        let all_specs = specs
            .iter()
            .chain((!test_bag.is_empty()).then_some(&test_bag));
        for (index, spec) in all_specs.enumerate() {
            log::debug!("found {} unique tokens in bag {}", spec.len(), index);
            let mut bag = Bag::default();
            for (name, count) in spec {
                let def = self.define(name).ok_or_else(|| ConfigError::UnknownToken {
                    bag: index,
                    token: name.clone(),
                })?;
                log::debug!("adding {count} `{name}` tokens");
                bag.tokens
                    .extend(std::iter::repeat(name.clone()).take(*count as usize));
                pool.max_rank = pool.max_rank.max(def.highest_min_rank());
                pool.tokens.insert(name.clone(), def);
            }
            pool.bags.push(bag);
        }
        Ok(pool)
    }

    fn define(&self, name: &str) -> Option<TokenDefinition> {
        match self.token_pool.get(name) {
            Some(partial) => Some(self.merge(partial)),
            None if name == BLANK_TOKEN => Some(self.default_token()),
            None => None,
        }
    }

    fn merge(&self, partial: &PartialToken) -> TokenDefinition {
        let base = partial.with_inferred_values().overlay(&self.default_face);
        let can_flip = partial
            .can_flip
            .or(self.blank.can_flip)
            .unwrap_or(false);
        let flipped = can_flip.then(|| {
            let overrides = partial
                .flipped
                .as_deref()
                .or(self.blank.flipped.as_deref())
                .cloned()
                .unwrap_or_default();
            if overrides.flipped.is_some() {
                log::warn!("ignoring `Flipped` nested inside a flipped override");
            }
            TokenFace {
                can_steal: false,
                ..overrides.overlay(&base)
            }
        });
        TokenDefinition { base, flipped }
    }
}

fn test_bag_definition(tests: &[TestCase]) -> BagDefinition {
    let mut bag = BagDefinition::new();
    for name in tests.iter().flat_map(|case| case.pull.iter()) {
        bag.entry(name.clone()).or_insert(1);
    }
    bag
}
