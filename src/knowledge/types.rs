//! Topic record types for the knowledge collection
//!
//! The collection is a flat array of records linked into a forest via
//! `parent_id` back-references. Metadata fields are all optional; absent
//! and empty values are treated identically by the renderer.

use serde::{Deserialize, Serialize};

/// Record category within the taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Top-level topic
    Topic,
    /// Child of a topic (or of another subtopic)
    Subtopic,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Topic => write!(f, "TOPIC"),
            Self::Subtopic => write!(f, "SUBTOPIC"),
        }
    }
}

/// Structured metadata attached to a record
///
/// Topics carry `importance`; subtopics carry `relation_to_parent`. The
/// four list fields are shared by both categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_to_parent: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub challenges: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strategies: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_steps: Vec<String>,
}

impl TopicMetadata {
    /// Returns true when no field carries content
    pub fn is_empty(&self) -> bool {
        self.importance.is_none()
            && self.relation_to_parent.is_none()
            && self.challenges.is_empty()
            && self.strategies.is_empty()
            && self.examples.is_empty()
            && self.action_steps.is_empty()
    }
}

/// A single topic or subtopic record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    /// Unique identifier
    pub id: String,

    /// TOPIC or SUBTOPIC
    pub category: Category,

    /// Display title (also the retrieval match target)
    pub title: String,

    /// Back-reference to the parent record; None for roots
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Structured metadata; a missing object deserializes to the empty form
    #[serde(default)]
    pub metadata: TopicMetadata,
}

impl TopicRecord {
    /// Create a new record with empty metadata
    ///
    /// The category follows from the presence of a parent: records with a
    /// parent are subtopics, roots are topics.
    ///
    /// # Examples
    ///
    /// ```
    /// use topika::knowledge::{Category, TopicRecord};
    ///
    /// let root = TopicRecord::new("Time Management", None);
    /// assert_eq!(root.category, Category::Topic);
    ///
    /// let child = TopicRecord::new("Daily Planning", Some(root.id.clone()));
    /// assert_eq!(child.category, Category::Subtopic);
    /// ```
    pub fn new(title: impl Into<String>, parent_id: Option<String>) -> Self {
        let category = if parent_id.is_some() {
            Category::Subtopic
        } else {
            Category::Topic
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category,
            title: title.into(),
            parent_id,
            metadata: TopicMetadata::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        assert_eq!(serde_json::to_string(&Category::Topic).unwrap(), "\"TOPIC\"");
        assert_eq!(
            serde_json::to_string(&Category::Subtopic).unwrap(),
            "\"SUBTOPIC\""
        );
    }

    #[test]
    fn test_record_deserializes_without_metadata() {
        let json = r#"{"id":"1","category":"TOPIC","title":"Meetings","parent_id":null}"#;
        let record: TopicRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.title, "Meetings");
        assert!(record.metadata.is_empty());
        assert!(record.parent_id.is_none());
    }

    #[test]
    fn test_record_deserializes_partial_metadata() {
        let json = r#"{
            "id": "2",
            "category": "SUBTOPIC",
            "title": "Agendas",
            "parent_id": "1",
            "metadata": {
                "relation_to_parent": "Structure for meetings",
                "strategies": ["Share the agenda in advance"]
            }
        }"#;
        let record: TopicRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.category, Category::Subtopic);
        assert_eq!(
            record.metadata.relation_to_parent.as_deref(),
            Some("Structure for meetings")
        );
        assert_eq!(record.metadata.strategies.len(), 1);
        assert!(record.metadata.challenges.is_empty());
    }

    #[test]
    fn test_new_record_assigns_category_from_parent() {
        let root = TopicRecord::new("Root", None);
        assert_eq!(root.category, Category::Topic);
        assert!(root.metadata.is_empty());

        let child = TopicRecord::new("Child", Some(root.id.clone()));
        assert_eq!(child.category, Category::Subtopic);
        assert_eq!(child.parent_id, Some(root.id));
    }

    #[test]
    fn test_new_records_get_distinct_ids() {
        let a = TopicRecord::new("A", None);
        let b = TopicRecord::new("B", None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_metadata_is_empty_with_empty_lists() {
        let metadata = TopicMetadata {
            challenges: vec![],
            ..Default::default()
        };
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_metadata_not_empty_with_importance() {
        let metadata = TopicMetadata {
            importance: Some("Core skill".to_string()),
            ..Default::default()
        };
        assert!(!metadata.is_empty());
    }

    #[test]
    fn test_collection_roundtrip() {
        let records = vec![
            TopicRecord::new("A", None),
            TopicRecord::new("B", None),
        ];
        let json = serde_json::to_string(&records).unwrap();
        let parsed: Vec<TopicRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records);
    }
}
