//! Transport projection of a drawn card.
use serde::{Deserialize, Serialize};

use crate::item::{Card, Rarity};

/// `{card_id, name, rarity}` view of a card, ready for JSON responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    pub card_id: String,
    pub name: String,
    pub rarity: Rarity,
}

impl DrawResult {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn rarity(&self) -> &Rarity {
        &self.rarity
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl From<&Card> for DrawResult {
    fn from(card: &Card) -> Self {
        Self {
            card_id: card.id.clone(),
            name: card.name.clone(),
            rarity: card.rarity.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn projects_card_fields() {
        let card = Card::new("ur-1", "Dragon", 1.0, "ultra_rare");
        let result = DrawResult::from(&card);
        assert_eq!(result.name(), "Dragon");
        assert_eq!(result.rarity().as_str(), "ultra_rare");
        assert_eq!(
            result.to_json().unwrap(),
            json!({"card_id": "ur-1", "name": "Dragon", "rarity": "ultra_rare"})
        );
    }
}
