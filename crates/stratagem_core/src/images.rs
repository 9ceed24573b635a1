//! Content-addressed artwork cache
//!
//! Identical cards map to the same file, so each piece of artwork is fetched
//! once no matter how many copies of a card the deck holds.

use crate::models::Card;
use crate::render::ImageProvider;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

const STOP_WORDS: [&str; 10] = ["the", "and", "are", "with", "have", "that", "this", "from", "your", "all"];

/// Appended to every non-empty query.
const QUERY_SUFFIX: &str = " fantasy game art";

/// Body fields in key order, lowercased, trimmed, skipping empty and `none`.
fn content_signature(card: &Card) -> String {
    let mut fields: Vec<(&str, &str)> = card.body.sections().to_vec();
    fields.sort_by_key(|(key, _)| *key);

    let mut parts = vec![card.title.trim().to_lowercase()];
    for (key, value) in fields {
        let value = value.trim().to_lowercase();
        if value.is_empty() || value == "none" {
            continue;
        }
        parts.push(format!("{key}:{value}"));
    }
    parts.join("|")
}

/// SHA-256 hex digest of the card content; stable across copies and runs.
pub fn cache_key(card: &Card) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content_signature(card).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Search terms for a card, or an empty string when nothing is usable.
pub fn search_query(card: &Card) -> String {
    let title = card.title.trim().to_lowercase();
    let mut terms: Vec<String> = title
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .take(2)
        .map(str::to_string)
        .collect();

    for value in [&card.body.effect, &card.body.target] {
        let value = value.trim().to_lowercase();
        if value.is_empty() || value == "none" {
            continue;
        }
        if let Some(word) = value
            .split_whitespace()
            .find(|w| w.chars().count() > 3 && !STOP_WORDS.contains(w))
        {
            terms.push(word.to_string());
        }
    }

    terms.truncate(3);
    if terms.is_empty() {
        return String::new();
    }
    let mut query = terms.join(" ");
    query.push_str(QUERY_SUFFIX);
    query
}

/// Directory of `{cache_key}.{ext}` files.
#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the cache directory if needed.
    pub fn ensure_dir(&self) -> crate::Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// First existing file for `key`, trying extensions in order.
    pub fn lookup(&self, key: &str) -> Option<PathBuf> {
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{key}.{ext}")))
            .find(|path| path.is_file())
    }

    pub fn lookup_card(&self, card: &Card) -> Option<PathBuf> {
        self.lookup(&cache_key(card))
    }

    /// Target path for a download with the given extension.
    pub fn path_for(&self, key: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{key}.{extension}"))
    }
}

impl ImageProvider for ImageCache {
    fn image_for(&mut self, card: &Card) -> Option<PathBuf> {
        self.lookup_card(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardBody, Cost};
    use tempfile::TempDir;

    fn card(title: &str, body: CardBody) -> Card {
        Card::new(title, Cost::cp(1), body)
    }

    #[test]
    fn test_signature_sorts_and_skips() {
        let c = card(
            " Test Strike ",
            CardBody::new("Your turn", "None", "Deal Damage", ""),
        );
        assert_eq!(content_signature(&c), "test strike|effect:deal damage|when:your turn");
    }

    #[test]
    fn test_cache_key_ignores_copy_metadata() {
        let body = CardBody::new("Your turn", "One unit", "Deal damage", "");
        let mut a = card("Test Strike", body.clone());
        a.id = Some("1_en_1".into());
        let mut b = card("test strike", body);
        b.id = Some("1_en_2".into());
        b.color = "#000000".into();

        assert_eq!(cache_key(&a), cache_key(&b));
        assert_eq!(cache_key(&a).len(), 64);
        assert_ne!(cache_key(&a), cache_key(&card("Other", CardBody::default())));
    }

    #[test]
    fn test_search_query() {
        let c = card(
            "Test Strike Now",
            CardBody::new("", "One infantry unit", "Deal the damage", ""),
        );
        // "the" is too short, "deal" passes; "one" is too short, "infantry" passes
        assert_eq!(search_query(&c), "test strike deal fantasy game art");
    }

    #[test]
    fn test_search_query_skips_stop_words() {
        let c = card("Go", CardBody::new("", "", "With your mighty blades", ""));
        assert_eq!(search_query(&c), "mighty fantasy game art");
        assert_eq!(search_query(&card("An", CardBody::default())), "");
    }

    #[test]
    fn test_cache_lookup_order() -> crate::Result<()> {
        let dir = TempDir::new()?;
        let mut cache = ImageCache::new(dir.path().join("cache"));
        cache.ensure_dir()?;

        let c = card("Grenade", CardBody::default());
        assert_eq!(cache.image_for(&c), None);

        let key = cache_key(&c);
        fs::write(cache.path_for(&key, "png"), b"png")?;
        fs::write(cache.path_for(&key, "jpeg"), b"jpeg")?;
        assert_eq!(cache.image_for(&c), Some(cache.path_for(&key, "jpeg")));
        Ok(())
    }
}
