//! Knowledge collection: record types, HTTP client, and pure transforms
//!
//! The collection is read through [`KnowledgeClient`] and kept as a flat
//! `Vec<TopicRecord>` owned by the caller; there is no ambient module
//! state. Tree building and rendering are pure functions over that vector.

pub mod client;
pub mod render;
pub mod tree;
pub mod types;

pub use client::KnowledgeClient;
pub use render::{detail_sections, render_detail, render_outline, Section, SectionBody};
pub use tree::{
    build_forest, dedupe_by_title, descendant_ids, find_record, remove_with_descendants,
    TopicForest, TopicNode,
};
pub use types::{Category, TopicMetadata, TopicRecord};
