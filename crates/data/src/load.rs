use crate::schema::{ConfigDocument, DocumentOutline};
use anyhow::Context;
use std::fs;
use std::path::Path;
use tokenbag_core::TokenBag;

pub fn parse_document(raw: &str) -> anyhow::Result<ConfigDocument> {
    let doc = serde_json::from_str(raw).context("parse configuration document")?;
    Ok(doc)
}

pub fn load_document(path: &Path) -> anyhow::Result<ConfigDocument> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let doc: ConfigDocument =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    log::debug!("loaded {}: {:?}", path.display(), DocumentOutline::of(&doc));
    Ok(doc)
}

/// Loads `path` and builds the bag it selects. `bag_name` replaces the bag
/// named by the document's `Config`.
pub fn load_token_bag(
    path: &Path,
    bag_name: Option<&str>,
    include_tests: bool,
) -> anyhow::Result<TokenBag> {
    let doc = load_document(path)?;
    token_bag_from_document(&doc, bag_name, include_tests)
        .with_context(|| format!("build bag from {}", path.display()))
}

pub fn token_bag_from_document(
    doc: &ConfigDocument,
    bag_name: Option<&str>,
    include_tests: bool,
) -> anyhow::Result<TokenBag> {
    let mut bag = TokenBag::new();
    bag.import_document(doc, bag_name, include_tests)?;
    Ok(bag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_name_the_bad_key() {
        let err = parse_document(r#"{"Bag Pool": {}, "Token Pol": {}}"#)
            .expect_err("misspelled section");
        assert!(format!("{err:#}").contains("Token Pol"));
    }

    #[test]
    fn outline_keeps_document_order() {
        let doc = parse_document(
            r#"{
                "Bag Pool": {"Zed": [{"B": 1}], "Alpha": [{"A": 1}]},
                "Token Pool": {"B": {}, "A": {}},
                "Test Pulls": [{"Pull": ["A"], "Tests": ["0&0/0."]}]
            }"#,
        )
        .expect("parse");
        let outline = DocumentOutline::of(&doc);
        assert_eq!(outline.bags, vec!["Zed", "Alpha"]);
        assert_eq!(outline.tokens, vec!["B", "A"]);
        assert_eq!(outline.test_pulls, 1);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_document(Path::new("does/not/exist.conf")).expect_err("no file");
        assert!(err.to_string().contains("does/not/exist.conf"));
    }

    #[test]
    fn build_errors_keep_the_config_error() {
        let doc = parse_document(r#"{"Bag Pool": {"Base": [{"A": 1}]}, "Token Pool": {}}"#)
            .expect("parse");
        let err = token_bag_from_document(&doc, None, false).expect_err("A is undefined");
        let config_err = err
            .downcast_ref::<tokenbag_core::ConfigError>()
            .expect("typed config error");
        assert_eq!(
            config_err,
            &tokenbag_core::ConfigError::UnknownToken {
                bag: 0,
                token: "A".to_string()
            }
        );
    }
}
