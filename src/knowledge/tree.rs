//! Pure transforms over the flat topic collection
//!
//! The collection arrives as a flat array with `parent_id` back-references.
//! Everything here is a pure function from that array: building the nested
//! forest, resolving ids, collecting descendants for deletion, and
//! collapsing duplicate titles.
//!
//! Children are found by linear scan per node. That is quadratic over the
//! whole forest and acceptable only because collections are small.

use crate::knowledge::TopicRecord;
use std::collections::HashSet;

/// A record with its resolved children
#[derive(Debug, Clone)]
pub struct TopicNode {
    /// The underlying record
    pub record: TopicRecord,
    /// Direct children in collection order
    pub children: Vec<TopicNode>,
}

/// The nested form of the collection: roots with recursive children
#[derive(Debug, Clone)]
pub struct TopicForest {
    /// Root nodes in collection order
    pub roots: Vec<TopicNode>,
}

impl TopicForest {
    /// Total number of nodes attached to the forest
    ///
    /// Records with an unresolvable parent are not attached and therefore
    /// not counted.
    pub fn len(&self) -> usize {
        fn count(node: &TopicNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }

    /// Returns true when the forest has no nodes
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Build the nested forest from the flat collection
///
/// Roots are records with an absent `parent_id`; each node's direct
/// children are the records referencing its id, in collection order. A
/// visited-set guards against reference cycles in malformed data: a record
/// is attached at most once.
///
/// # Examples
///
/// ```
/// use topika::knowledge::{build_forest, TopicRecord};
///
/// let root = TopicRecord::new("Communication", None);
/// let child = TopicRecord::new("Email", Some(root.id.clone()));
/// let forest = build_forest(&[root, child]);
/// assert_eq!(forest.roots.len(), 1);
/// assert_eq!(forest.roots[0].children.len(), 1);
/// ```
pub fn build_forest(records: &[TopicRecord]) -> TopicForest {
    let mut visited = HashSet::new();
    let roots = records
        .iter()
        .filter(|r| r.parent_id.is_none())
        .filter_map(|r| attach(r, records, &mut visited))
        .collect();
    TopicForest { roots }
}

fn attach(
    record: &TopicRecord,
    records: &[TopicRecord],
    visited: &mut HashSet<String>,
) -> Option<TopicNode> {
    if !visited.insert(record.id.clone()) {
        tracing::warn!("Skipping already-attached record {} (cycle?)", record.id);
        return None;
    }

    let children = records
        .iter()
        .filter(|r| r.parent_id.as_deref() == Some(record.id.as_str()))
        .filter_map(|r| attach(r, records, visited))
        .collect();

    Some(TopicNode {
        record: record.clone(),
        children,
    })
}

/// Find a record by exact id or unique prefix
///
/// Exact matches win; otherwise a prefix match is returned only when it is
/// unambiguous.
pub fn find_record<'a>(records: &'a [TopicRecord], id: &str) -> Option<&'a TopicRecord> {
    if let Some(record) = records.iter().find(|r| r.id == id) {
        return Some(record);
    }
    let mut matches = records.iter().filter(|r| r.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(record), None) => Some(record),
        _ => None,
    }
}

/// Collect the ids of a record and all of its transitive descendants
pub fn descendant_ids(records: &[TopicRecord], id: &str) -> HashSet<String> {
    let mut ids: HashSet<String> = HashSet::new();
    let mut frontier = vec![id.to_string()];
    while let Some(current) = frontier.pop() {
        if !ids.insert(current.clone()) {
            continue;
        }
        for record in records {
            if record.parent_id.as_deref() == Some(current.as_str()) {
                frontier.push(record.id.clone());
            }
        }
    }
    ids
}

/// Remove a record and every transitive descendant
///
/// Siblings and ancestors are unaffected. Returns the surviving records in
/// their original order.
pub fn remove_with_descendants(records: Vec<TopicRecord>, id: &str) -> Vec<TopicRecord> {
    let doomed = descendant_ids(&records, id);
    records
        .into_iter()
        .filter(|r| !doomed.contains(&r.id))
        .collect()
}

/// Collapse records that share a title
///
/// When duplicates exist the first record carrying metadata survives (the
/// first record overall when none do). Returns the surviving records and
/// the number removed. Order follows first occurrence of each title.
pub fn dedupe_by_title(records: Vec<TopicRecord>) -> (Vec<TopicRecord>, usize) {
    let original_len = records.len();
    let mut titles_seen: Vec<String> = Vec::new();
    let mut survivors: Vec<TopicRecord> = Vec::new();

    for title in records.iter().map(|r| r.title.clone()) {
        if titles_seen.contains(&title) {
            continue;
        }
        titles_seen.push(title.clone());

        let group: Vec<&TopicRecord> = records.iter().filter(|r| r.title == title).collect();
        let keeper = group
            .iter()
            .find(|r| !r.metadata.is_empty())
            .unwrap_or(&group[0]);
        survivors.push((*keeper).clone());
    }

    let removed = original_len - survivors.len();
    (survivors, removed)
}
