//! Catalog files as the host application stores them.
//!
//! The core library deliberately has no opinion on storage; this tester
//! reads a flat JSON document of cards.
use gacha_core::Card;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

const DEMO_CATALOG: &str = include_str!("../assets/demo_catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate card id {0}")]
    DuplicateId(String),
}

/// Container for every card on a banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CatalogFile {
    pub cards: Vec<Card>,
}

impl CatalogFile {
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or repeats a card id.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.ensure_unique_ids()?;
        Ok(catalog)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The bundled demo banner.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled asset is corrupt.
    pub fn demo() -> Result<Self, CatalogError> {
        Self::from_json(DEMO_CATALOG)
    }

    fn ensure_unique_ids(&self) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for card in &self.cards {
            if !seen.insert(card.id.as_str()) {
                return Err(CatalogError::DuplicateId(card.id.clone()));
            }
        }
        Ok(())
    }
}
