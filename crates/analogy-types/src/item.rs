//! Items returned by the search service.
//!
//! An item is an immutable snippet record carrying the text shown to the user
//! and the embedding vector used for analogy arithmetic. Items are identified
//! by their opaque `identifier` only; two items with the same identifier are
//! the same item regardless of their text.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Identifier of the placeholder item shown before the first resolution.
pub const PLACEHOLDER_ID: i64 = -1;

/// Opaque item identifier.
///
/// The service may send either a number or a string; both are accepted and
/// round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        ItemId::Number(value)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId::Text(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        ItemId::Text(value)
    }
}

/// A record returned by the search service.
///
/// Equality and hashing use `identifier` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Opaque identity key
    pub identifier: ItemId,

    /// Article title
    #[serde(default)]
    pub title: String,

    /// Snippet text
    #[serde(default)]
    pub content: String,

    /// Source URL
    #[serde(default)]
    pub url: String,

    /// Embedding vector (absent on nearest-neighbour responses)
    #[serde(default)]
    pub vector: Vec<f32>,
}

impl Item {
    /// Create an item without url or vector.
    pub fn new(identifier: ItemId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            identifier,
            title: title.into(),
            content: content.into(),
            url: String::new(),
            vector: Vec::new(),
        }
    }

    /// Set the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the embedding vector.
    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = vector;
        self
    }

    /// The help record shown until the first analogy is resolved.
    pub fn placeholder() -> Self {
        Self {
            identifier: ItemId::Number(PLACEHOLDER_ID),
            title: "What is this thing to me?".to_string(),
            content: "This is a 'vector analogy' search engine. Use the search bars to find \
                Wikipedia snippets to construct three of the four parts of an analogy, like \
                'What is to D as A is to B?'. The engine then uses the vector representations \
                of the snippets to try to complete the analogy. Try 'What is to Paris as \
                London is to England?'."
                .to_string(),
            url: "https://github.com/charlesfrye/vector-analogies-wikipedia".to_string(),
            vector: vec![0.0],
        }
    }

    /// Whether this is the placeholder record.
    pub fn is_placeholder(&self) -> bool {
        self.identifier == ItemId::Number(PLACEHOLDER_ID)
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Label shown in the search box once the item is selected.
    ///
    /// The percent-decoded URL path after the host (`wiki/Paris` for
    /// `https://en.wikipedia.org/wiki/Paris`), or the title when the URL has
    /// no path.
    pub fn display_label(&self) -> String {
        let without_scheme = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);

        let path = without_scheme
            .split_once('/')
            .map(|(_, path)| path)
            .unwrap_or("");

        if path.is_empty() {
            return self.title.clone();
        }

        match urlencoding::decode(path) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => path.to_string(),
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}
