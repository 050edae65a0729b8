use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Result, TranslateError};
use crate::model::language::{CatalogNode, LanguageField, LanguageRecord};

const BUNDLED_CATALOG: &str = include_str!("../../data/languages.json");

/// The set of languages a translation may be requested in.
///
/// The table is a tree: records may sit at the top level or inside groups
/// nested to any depth. It is read once and never mutated.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    nodes: Vec<CatalogNode>,
}

impl LanguageCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TranslateError::CatalogUnavailable(path.to_path_buf()));
        }

        let data = fs::read_to_string(path)
            .map_err(|e| TranslateError::CatalogMalformed(format!("{}: {e}", path.display())))?;

        let catalog = Self::from_json_str(&data)?;
        info!(path = %path.display(), languages = catalog.len(), "loaded language catalog");
        Ok(catalog)
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_CATALOG)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let nodes: Vec<CatalogNode> =
            serde_json::from_str(data).map_err(|e| TranslateError::CatalogMalformed(e.to_string()))?;
        Ok(Self::from_nodes(nodes))
    }

    pub fn from_nodes(nodes: Vec<CatalogNode>) -> Self {
        Self { nodes }
    }

    /// Depth-first search for the first record whose `field` equals `value`
    /// exactly. Later duplicates are never reached.
    pub fn resolve(&self, value: &str, field: LanguageField) -> Option<&LanguageRecord> {
        search(&self.nodes, value, field)
    }

    pub fn by_code(&self, code: &str) -> Option<&LanguageRecord> {
        self.resolve(code, LanguageField::Code)
    }

    pub fn by_name(&self, name: &str) -> Option<&LanguageRecord> {
        self.resolve(name, LanguageField::Language)
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.by_code(code).is_some()
    }

    /// Code -> display name for the records held directly by top-level groups.
    ///
    /// Top-level records and anything nested deeper than a group's children
    /// stay reachable through [`resolve`](Self::resolve) but are not listed.
    pub fn all_languages(&self) -> BTreeMap<String, String> {
        let mut all = BTreeMap::new();

        for node in &self.nodes {
            let CatalogNode::Group(children) = node else {
                continue;
            };
            for child in children {
                if let CatalogNode::Record(r) = child {
                    all.insert(r.code.clone(), r.language.clone());
                }
            }
        }

        all
    }

    /// Number of records reachable by `resolve`, duplicates included.
    pub fn len(&self) -> usize {
        count(&self.nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn search<'a>(nodes: &'a [CatalogNode], value: &str, field: LanguageField) -> Option<&'a LanguageRecord> {
    for node in nodes {
        match node {
            CatalogNode::Record(r) if r.field(field) == value => return Some(r),
            CatalogNode::Record(_) => {}
            CatalogNode::Group(children) => {
                if let Some(found) = search(children, value, field) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn count(nodes: &[CatalogNode]) -> usize {
    nodes
        .iter()
        .map(|n| match n {
            CatalogNode::Record(_) => 1,
            CatalogNode::Group(children) => count(children),
        })
        .sum()
}
