use serde::Serialize;

pub use tokenbag_core::{
    BagDefinition, BagEntry, ConfigDocument, ConfigOverrides, ConfiguredBag, PartialToken,
    TestCase, TokenValue,
};

/// Names found in a configuration document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentOutline {
    pub bags: Vec<String>,
    pub tokens: Vec<String>,
    pub test_pulls: usize,
}

impl DocumentOutline {
    pub fn of(doc: &ConfigDocument) -> Self {
        Self {
            bags: doc
                .bag_pool
                .iter()
                .flat_map(|bags| bags.keys().cloned())
                .collect(),
            tokens: doc
                .token_pool
                .iter()
                .flat_map(|tokens| tokens.keys().cloned())
                .collect(),
            test_pulls: doc.test_pulls.len(),
        }
    }
}
