//! Core domain records shared by storage, pipeline, and the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// What a command is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// A cooking recipe for a dish.
    Recipe,
    /// A general summary of a topic.
    Topic,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recipe => "recipe",
            Self::Topic => "topic",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Teaching
// ---------------------------------------------------------------------------

/// A manually taught word and its running tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// The taught word, case-sensitive as given.
    pub word: String,
    /// Most recently taught label.
    pub label: String,
    /// How many times this word has been taught.
    pub seen_count: i64,
    /// How many of those teachings were "correct". Manual teaching always
    /// counts as correct, so this tracks `seen_count`.
    pub correct_count: i64,
}

/// One teaching event. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    /// Time-sortable identifier (UUID v7).
    pub id: String,
    pub word: String,
    pub true_label: String,
    pub ai_guess: String,
    pub was_correct: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// WebKnowledge
// ---------------------------------------------------------------------------

/// Cached fetch result for one normalized topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebKnowledge {
    /// Normalized topic, the record's natural key.
    pub topic: String,
    /// Provenance tag (`recipe_api`, `wikipedia`, `topic_fallback`, ...).
    pub source: String,
    /// Fetched content, or the fallback placeholder text.
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
