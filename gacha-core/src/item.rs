//! Catalog item contract and the stock `Card` record.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use crate::constants::DEFAULT_GUARANTEED_RARITY;

/// Anything that can sit in a draw catalog.
///
/// Hosts implement this for their own records; the engine only ever reads
/// the id, the weight and the rarity tag. Everything else rides along
/// untouched and is handed back by reference.
pub trait Drawable {
    type Id: Clone + Eq + Hash;

    /// Stable identifier, used as the key of probability reports.
    fn id(&self) -> &Self::Id;

    /// Relative draw weight. Must be finite and strictly positive.
    fn weight(&self) -> f64;

    /// Rarity tag tested by the pity layer.
    fn rarity(&self) -> &str;
}

impl<T: Drawable + ?Sized> Drawable for &T {
    type Id = T::Id;

    fn id(&self) -> &Self::Id {
        (**self).id()
    }

    fn weight(&self) -> f64 {
        (**self).weight()
    }

    fn rarity(&self) -> &str {
        (**self).rarity()
    }
}

/// Rarity tag in canonical form (trimmed, ASCII lower-case).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Rarity(String);

impl Rarity {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(tag.trim().to_ascii_lowercase())
    }

    /// The tag forced by a default-configured pity guarantee.
    #[must_use]
    pub fn ultra_rare() -> Self {
        Self::new(DEFAULT_GUARANTEED_RARITY)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw item tag.
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        tag.trim().eq_ignore_ascii_case(&self.0)
    }
}

impl From<&str> for Rarity {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Rarity {
    fn from(tag: String) -> Self {
        Self::new(&tag)
    }
}

impl From<Rarity> for String {
    fn from(rarity: Rarity) -> Self {
        rarity.0
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A drawable card as most catalogs describe it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub rarity: Rarity,
}

impl Card {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        weight: f64,
        rarity: impl Into<Rarity>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
            rarity: rarity.into(),
        }
    }
}

impl Drawable for Card {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn rarity(&self) -> &str {
        self.rarity.as_str()
    }
}
