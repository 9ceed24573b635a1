use super::card::Card;
use crate::error::{open_error, CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Ordered card collection, persisted as `{"cards": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardDeck {
    pub cards: Vec<Card>,
    /// RFC3339 timestamp of the pass that wrote the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// Accepted on-disk shapes; legacy passes wrote a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum DeckFile {
    Wrapped(CardDeck),
    Bare(Vec<Card>),
}

impl CardDeck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            generated_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(match serde_json::from_str::<DeckFile>(json)? {
            DeckFile::Wrapped(deck) => deck,
            DeckFile::Bare(cards) => CardDeck::new(cards),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| open_error(path, e))?;
        let deck = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), cards = deck.len(), "loaded deck");
        Ok(deck)
    }

    /// Writes the deck pretty-printed, stamping `generated_at`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut stamped = self.clone();
        stamped.generated_at = Some(chrono::Utc::now().to_rfc3339());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&stamped)?;
        fs::write(path, json)?;
        tracing::debug!(path = %path.display(), cards = self.len(), "saved deck");
        Ok(())
    }

    /// Fails with `EmptyDeck` when there is nothing to print.
    pub fn ensure_not_empty(&self, source: &str) -> Result<()> {
        if self.is_empty() {
            return Err(CoreError::EmptyDeck(source.to_string()));
        }
        Ok(())
    }
}

impl FromIterator<Card> for CardDeck {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        CardDeck::new(iter.into_iter().collect())
    }
}

impl IntoIterator for CardDeck {
    type Item = Card;
    type IntoIter = std::vec::IntoIter<Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.into_iter()
    }
}

impl<'a> IntoIterator for &'a CardDeck {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardBody, Cost};
    use tempfile::TempDir;

    #[test]
    fn test_bare_array_is_accepted() {
        let deck = CardDeck::from_json(r#"[{"title": "A"}, {"title": "B", "cost": {"cp": 2}}]"#).unwrap();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.cards[1].cp(), 2);
        assert!(deck.generated_at.is_none());
    }

    #[test]
    fn test_save_writes_wrapped_form_with_cyrillic() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("out/cards.json");

        let deck = CardDeck::new(vec![Card::new("Переброс", Cost::cp(1), CardBody::default())]);
        deck.save(&path)?;

        let raw = fs::read_to_string(&path)?;
        assert!(raw.contains("\"cards\""));
        assert!(raw.contains("Переброс"));

        let loaded = CardDeck::load(&path)?;
        assert_eq!(loaded.cards, deck.cards);
        assert!(loaded.generated_at.is_some());
        Ok(())
    }

    #[test]
    fn test_missing_file_is_input_not_found() {
        let err = CardDeck::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CoreError::InputNotFound { .. }));
    }

    #[test]
    fn test_ensure_not_empty() {
        assert!(matches!(
            CardDeck::default().ensure_not_empty("cards.json"),
            Err(CoreError::EmptyDeck(_))
        ));
    }
}
