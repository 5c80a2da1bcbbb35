//! Pure rendering of records and forests into text fragments
//!
//! The detail view is driven by [`detail_sections`], a pure function from a
//! record to an ordered section list. The conditional-section rule is the
//! contract here: a missing or empty metadata field yields no section at
//! all, never an empty heading. Command handlers add color on top; nothing
//! in this module touches the terminal.

use crate::knowledge::tree::{TopicForest, TopicNode};
use crate::knowledge::{Category, TopicRecord};

/// One rendered section of a record's detail view
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Section heading
    pub heading: &'static str,
    /// Section body
    pub body: SectionBody,
}

/// Body of a detail section
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    /// Single paragraph of prose
    Paragraph(String),
    /// Bulleted list
    Bullets(Vec<String>),
}

/// Compute the detail sections for a record
///
/// Sections appear in a fixed order: the category-specific lead
/// (`Importance` for topics, `Relation to Parent Topic` for subtopics),
/// then `Key Challenges`, `Strategies`, `Examples`, and `Action Steps`.
/// Absent or empty fields produce no section.
///
/// # Examples
///
/// ```
/// use topika::knowledge::{detail_sections, TopicRecord};
///
/// let record = TopicRecord::new("Meetings", None);
/// assert!(detail_sections(&record).is_empty());
/// ```
pub fn detail_sections(record: &TopicRecord) -> Vec<Section> {
    let metadata = &record.metadata;
    let mut sections = Vec::new();

    match record.category {
        Category::Topic => {
            if let Some(importance) = non_empty(&metadata.importance) {
                sections.push(Section {
                    heading: "Importance",
                    body: SectionBody::Paragraph(importance),
                });
            }
        }
        Category::Subtopic => {
            if let Some(relation) = non_empty(&metadata.relation_to_parent) {
                sections.push(Section {
                    heading: "Relation to Parent Topic",
                    body: SectionBody::Paragraph(relation),
                });
            }
        }
    }

    for (heading, items) in [
        ("Key Challenges", &metadata.challenges),
        ("Strategies", &metadata.strategies),
        ("Examples", &metadata.examples),
        ("Action Steps", &metadata.action_steps),
    ] {
        if !items.is_empty() {
            sections.push(Section {
                heading,
                body: SectionBody::Bullets(items.clone()),
            });
        }
    }

    sections
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Render a record's full detail view as plain text
pub fn render_detail(record: &TopicRecord) -> String {
    let mut out = format!("{}\n{}\n", record.title, record.category);

    for section in detail_sections(record) {
        out.push('\n');
        out.push_str(section.heading);
        out.push('\n');
        match &section.body {
            SectionBody::Paragraph(text) => {
                out.push_str(text);
                out.push('\n');
            }
            SectionBody::Bullets(items) => {
                for item in items {
                    out.push_str("- ");
                    out.push_str(item);
                    out.push('\n');
                }
            }
        }
    }

    out
}

/// Render the forest as an indented outline
pub fn render_outline(forest: &TopicForest) -> String {
    fn walk(node: &TopicNode, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let marker = match node.record.category {
            Category::Topic => "*",
            Category::Subtopic => "-",
        };
        out.push_str(&format!("{}{} {}\n", indent, marker, node.record.title));
        for child in &node.children {
            walk(child, depth + 1, out);
        }
    }

    let mut out = String::new();
    for root in &forest.roots {
        walk(root, 0, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{build_forest, TopicMetadata};

    fn topic_with(metadata: TopicMetadata) -> TopicRecord {
        TopicRecord {
            id: "t1".to_string(),
            category: Category::Topic,
            title: "Meetings".to_string(),
            parent_id: None,
            metadata,
        }
    }

    fn subtopic_with(metadata: TopicMetadata) -> TopicRecord {
        TopicRecord {
            id: "s1".to_string(),
            category: Category::Subtopic,
            title: "Agendas".to_string(),
            parent_id: Some("t1".to_string()),
            metadata,
        }
    }

    #[test]
    fn test_missing_challenges_produce_no_heading() {
        let record = topic_with(TopicMetadata {
            importance: Some("Core ritual of office life".to_string()),
            ..Default::default()
        });
        let sections = detail_sections(&record);
        assert!(sections.iter().all(|s| s.heading != "Key Challenges"));
    }

    #[test]
    fn test_empty_challenges_produce_no_heading() {
        let record = topic_with(TopicMetadata {
            challenges: vec![],
            strategies: vec!["Prepare an agenda".to_string()],
            ..Default::default()
        });
        let sections = detail_sections(&record);
        assert!(sections.iter().all(|s| s.heading != "Key Challenges"));
        assert!(sections.iter().any(|s| s.heading == "Strategies"));
    }

    #[test]
    fn test_all_sections_present_in_order() {
        let record = topic_with(TopicMetadata {
            importance: Some("Why it matters".to_string()),
            challenges: vec!["c".to_string()],
            strategies: vec!["s".to_string()],
            examples: vec!["e".to_string()],
            action_steps: vec!["a".to_string()],
            ..Default::default()
        });
        let headings: Vec<&str> = detail_sections(&record)
            .iter()
            .map(|s| s.heading)
            .collect();
        assert_eq!(
            headings,
            vec![
                "Importance",
                "Key Challenges",
                "Strategies",
                "Examples",
                "Action Steps"
            ]
        );
    }

    #[test]
    fn test_topic_lead_section_is_importance() {
        let record = topic_with(TopicMetadata {
            importance: Some("Why it matters".to_string()),
            relation_to_parent: Some("ignored for topics".to_string()),
            ..Default::default()
        });
        let sections = detail_sections(&record);
        assert_eq!(sections[0].heading, "Importance");
        assert!(sections
            .iter()
            .all(|s| s.heading != "Relation to Parent Topic"));
    }

    #[test]
    fn test_subtopic_lead_section_is_relation() {
        let record = subtopic_with(TopicMetadata {
            relation_to_parent: Some("Structure for meetings".to_string()),
            ..Default::default()
        });
        let sections = detail_sections(&record);
        assert_eq!(sections[0].heading, "Relation to Parent Topic");
    }

    #[test]
    fn test_blank_importance_omitted() {
        let record = topic_with(TopicMetadata {
            importance: Some("   ".to_string()),
            ..Default::default()
        });
        assert!(detail_sections(&record).is_empty());
    }

    #[test]
    fn test_render_detail_includes_bullets() {
        let record = topic_with(TopicMetadata {
            challenges: vec!["Hidden agendas".to_string(), "Sensory load".to_string()],
            ..Default::default()
        });
        let rendered = render_detail(&record);
        assert!(rendered.contains("Key Challenges"));
        assert!(rendered.contains("- Hidden agendas"));
        assert!(rendered.contains("- Sensory load"));
    }

    #[test]
    fn test_render_detail_no_heading_without_content() {
        let record = topic_with(TopicMetadata::default());
        let rendered = render_detail(&record);
        assert!(!rendered.contains("Key Challenges"));
        assert!(!rendered.contains("Importance"));
    }

    #[test]
    fn test_render_outline_nests_children() {
        let root = TopicRecord {
            id: "t1".to_string(),
            category: Category::Topic,
            title: "Communication".to_string(),
            parent_id: None,
            metadata: TopicMetadata::default(),
        };
        let child = TopicRecord {
            id: "s1".to_string(),
            category: Category::Subtopic,
            title: "Email".to_string(),
            parent_id: Some("t1".to_string()),
            metadata: TopicMetadata::default(),
        };
        let forest = build_forest(&[root, child]);
        let outline = render_outline(&forest);
        assert!(outline.contains("* Communication"));
        assert!(outline.contains("  - Email"));
    }
}
