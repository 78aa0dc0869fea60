//! Manual teaching of word → label concepts.

use tracing::{info, instrument};
use webbaby_shared::{Concept, Result, WebBabyError};
use webbaby_storage::Storage;

/// Teach `word` as `label` and return the updated concept.
///
/// Both are stored as given (no trimming or case folding) but must not be
/// blank. Every call counts as a correct guess.
#[instrument(skip(storage))]
pub async fn teach(storage: &Storage, word: &str, label: &str) -> Result<Concept> {
    if word.trim().is_empty() {
        return Err(WebBabyError::validation("word must not be blank"));
    }
    if label.trim().is_empty() {
        return Err(WebBabyError::validation("true_label must not be blank"));
    }

    let concept = storage.teach(word, label).await?;
    info!(
        word = %concept.word,
        label = %concept.label,
        seen = concept.seen_count,
        "concept taught"
    );
    Ok(concept)
}
