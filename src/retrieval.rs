//! Naive keyword retrieval over the knowledge collection
//!
//! Matching direction is deliberate and ported as observed: a surviving
//! message token must appear as a substring of the lowercased record
//! title. Matches are unranked and returned in collection order.

use crate::knowledge::{Category, TopicRecord};

/// Tokens dropped regardless of length
const STOP_WORDS: [&str; 8] = [
    "what", "when", "where", "why", "how", "can", "will", "should",
];

/// Minimum token length; shorter tokens are dropped
const MIN_TOKEN_LEN: usize = 4;

/// Extract matchable keywords from a user message
///
/// Lowercases, splits on whitespace, then drops tokens shorter than four
/// characters and the fixed stop-word set. Punctuation is not stripped.
///
/// # Examples
///
/// ```
/// use topika::retrieval::extract_keywords;
///
/// let keywords = extract_keywords("What are effective strategies?");
/// assert_eq!(keywords, vec!["effective", "strategies?"]);
/// ```
pub fn extract_keywords(message: &str) -> Vec<String> {
    message
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() >= MIN_TOKEN_LEN)
        .filter(|word| !STOP_WORDS.contains(word))
        .map(String::from)
        .collect()
}

/// Select the records relevant to a message
///
/// A record matches when its lowercased title contains any keyword as a
/// substring. At most `limit` records are returned, earliest-in-collection
/// first; there is no relevance ranking. An empty collection yields an
/// empty result and the chat proceeds without context.
pub fn find_relevant<'a>(
    records: &'a [TopicRecord],
    message: &str,
    limit: usize,
) -> Vec<&'a TopicRecord> {
    let keywords = extract_keywords(message);
    if keywords.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| {
            let title = record.title.to_lowercase();
            keywords.iter().any(|keyword| title.contains(keyword))
        })
        .take(limit)
        .collect()
}

/// Serialize retrieved records into the context block for the system prompt
///
/// Every entry lists all four metadata sections, empty or not; the
/// conditional-omission rule belongs to the detail view, not to this
/// serialization. Topics lead with `Importance`, subtopics with
/// `Relation to Parent`, falling back to `N/A`.
pub fn build_context_block(entries: &[&TopicRecord]) -> String {
    entries
        .iter()
        .map(|entry| {
            let metadata = &entry.metadata;
            let lead = match entry.category {
                Category::Topic => format!(
                    "Importance: {}",
                    metadata.importance.as_deref().unwrap_or("N/A")
                ),
                Category::Subtopic => format!(
                    "Relation to Parent: {}",
                    metadata.relation_to_parent.as_deref().unwrap_or("N/A")
                ),
            };

            let bullets = |items: &[String]| {
                items
                    .iter()
                    .map(|item| format!("- {}", item))
                    .collect::<Vec<_>>()
                    .join("\n")
            };

            format!(
                "Topic: {}\n{}\nChallenges:\n{}\nStrategies:\n{}\nExamples:\n{}\nAction Steps:\n{}",
                entry.title,
                lead,
                bullets(&metadata.challenges),
                bullets(&metadata.strategies),
                bullets(&metadata.examples),
                bullets(&metadata.action_steps),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
