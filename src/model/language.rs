use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LanguageRecord {
    pub code: String,

    pub language: String,

    /// Any other fields the catalog carries for this language.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LanguageRecord {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn field(&self, field: LanguageField) -> &str {
        match field {
            LanguageField::Code => &self.code,
            LanguageField::Language => &self.language,
        }
    }
}

/// One node of the catalog tree. Arrays become groups, objects become records.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum CatalogNode {
    Record(LanguageRecord),
    Group(Vec<CatalogNode>),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LanguageField {
    Code,
    Language,
}

impl Default for LanguageField {
    fn default() -> Self {
        LanguageField::Code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_are_groups_and_objects_are_records() {
        let nodes: Vec<CatalogNode> = serde_json::from_str(
            r#"[{"code":"en","language":"English"},[{"code":"fr","language":"French","rtl":false}]]"#,
        )
        .unwrap();

        assert_eq!(nodes[0], CatalogNode::Record(LanguageRecord::new("en", "English")));
        match &nodes[1] {
            CatalogNode::Group(children) => match &children[0] {
                CatalogNode::Record(r) => {
                    assert_eq!(r.code, "fr");
                    assert_eq!(r.extra.get("rtl"), Some(&Value::Bool(false)));
                }
                other => panic!("expected record, got {other:?}"),
            },
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn object_without_language_is_rejected() {
        let res: Result<Vec<CatalogNode>, _> = serde_json::from_str(r#"[{"code":"en"}]"#);
        assert!(res.is_err());
    }
}
