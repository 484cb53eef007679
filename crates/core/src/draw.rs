use crate::{Pool, PullConfig, RngState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A drawn sequence of token names. Drawn once per run and evaluated many
/// times; evaluations read prefixes and never consume it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayablePull {
    tokens: Vec<String>,
}

impl ReplayablePull {
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The first `draws` tokens, or the whole pull when it is shorter.
    pub fn prefix(&self, draws: usize) -> &[String] {
        &self.tokens[..draws.min(self.tokens.len())]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("requested bag index {0} not found in pool")]
    UnknownBagIndex(usize),
    #[error("requested token `{0}` not found in Token Pool")]
    UnknownToken(String),
}

/// A draw that stopped on a configuration error, with what was drawn so far.
#[derive(Debug, Error)]
#[error("{source} after {drawn} draws")]
pub struct DrawFailure {
    pub source: DrawError,
    pub drawn: usize,
    pub partial: ReplayablePull,
}

impl DrawFailure {
    fn new(source: DrawError, tokens: Vec<String>) -> Self {
        Self {
            source,
            drawn: tokens.len(),
            partial: ReplayablePull { tokens },
        }
    }
}

/// Draws one pull by following `config.bag_draws` in a cycle until
/// `config.max_draws` tokens are out or an Ends Draws token comes up.
pub fn draw_replayable_pull(
    pool: &Pool,
    config: &PullConfig,
    rng: &mut RngState,
) -> Result<ReplayablePull, DrawFailure> {
    let mut tokens = Vec::with_capacity(config.max_draws);
    if let Some((bag, _)) = config
        .bag_draws
        .iter()
        .find(|(bag, _)| *bag >= pool.bags.len())
    {
        return Err(DrawFailure::new(DrawError::UnknownBagIndex(*bag), tokens));
    }
    if config.bag_draws.iter().all(|(_, draws)| *draws == 0) {
        log::warn!("draw plan {:?} produces no draws", config.bag_draws);
        return Ok(ReplayablePull { tokens });
    }

    // Remaining token indices per bag, shuffled the first time a bag is used.
    let mut remaining: HashMap<usize, Vec<usize>> = HashMap::new();
    'plan: loop {
        for &(bag, draws) in &config.bag_draws {
            for _ in 0..draws {
                if tokens.len() >= config.max_draws {
                    break 'plan;
                }
                let order = remaining.entry(bag).or_insert_with(|| {
                    let mut order: Vec<usize> = (0..pool.bags[bag].len()).collect();
                    rng.shuffle(&mut order);
                    order
                });
                let Some(index) = order.pop() else {
                    log::warn!("bag {bag} is exhausted after {} draws", tokens.len());
                    break 'plan;
                };
                let name = &pool.bags[bag].tokens[index];
                let Some(def) = pool.token(name) else {
                    return Err(DrawFailure::new(
                        DrawError::UnknownToken(name.clone()),
                        tokens,
                    ));
                };
                tokens.push(name.clone());

                let face = def.draw_face();
                if face.return_to_bag {
                    order.push(index);
                    rng.shuffle(order);
                }
                if face.ends_draws && !config.ignores_ends_draws {
                    log::debug!("`{name}` ends the draw after {} tokens", tokens.len());
                    break 'plan;
                }
            }
        }
    }
    Ok(ReplayablePull { tokens })
}
