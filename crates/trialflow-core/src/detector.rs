//! Lexical disagreement detection.
//!
//! **Question**: does the clinician's free-text note share any content
//! keyword with the AI finding?
//!
//! This is a presence/absence test, not a similarity score. The finding is
//! reduced to a keyword set; if none of those keywords occur in the note the
//! two texts likely disagree. A single shared keyword suppresses the signal.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    /// Everything that is not a lowercase letter or whitespace.
    static ref NON_LETTER: Regex = Regex::new(r"[^a-z\s]").unwrap();

    /// Words carrying no diagnostic content: articles, copulas, prepositions,
    /// conjunctions, and generic qualifiers.
    static ref STOP_WORDS: HashSet<&'static str> = [
        "a", "an", "the", "study", "detected", "present", "normal",
        "likely", "possible", "suggests", "with", "without", "of",
        "and", "or", "is", "are", "to", "for", "small", "large",
        "multifocal",
    ]
    .into_iter()
    .collect();
}

/// Extract the content keywords of an AI finding.
///
/// Lowercases the text, strips every character that is not a letter or
/// whitespace, splits on whitespace, and drops stop words. Punctuated terms
/// collapse into single tokens ("lower-lobe" becomes "lowerlobe").
pub fn keyword_set(ai_text: &str) -> HashSet<String> {
    let lowered = ai_text.to_lowercase();
    let stripped = NON_LETTER.replace_all(&lowered, "");

    stripped
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .map(str::to_owned)
        .collect()
}

/// Report whether a note likely disagrees with an AI finding.
///
/// Returns true iff the finding yields at least one keyword and none of them
/// occur as substrings of the lowercased note. An empty keyword set gives no
/// signal to disagree about and returns false.
pub fn is_likely_disagreement(note: &str, ai_text: &str) -> bool {
    let keywords = keyword_set(ai_text);
    if keywords.is_empty() {
        return false;
    }

    let note_lower = note.to_lowercase();
    !keywords.iter().any(|kw| note_lower.contains(kw.as_str()))
}
