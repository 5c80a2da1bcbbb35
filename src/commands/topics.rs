//! Topic browsing and administration commands
//!
//! Viewing is read-only; the admin flows (add, delete, dedupe, generate)
//! mutate a local copy of the collection and bulk-replace it on the
//! service. There is no partial patch.

use crate::config::Config;
use crate::error::{Result, TopikaError};
use crate::knowledge::{
    build_forest, dedupe_by_title, descendant_ids, detail_sections, find_record,
    remove_with_descendants, render_outline, KnowledgeClient, SectionBody, TopicMetadata,
    TopicRecord,
};
use crate::providers::{create_provider, ChatMessage};
use crate::storage::SessionStore;

use colored::Colorize;
use serde::Deserialize;
use std::io::Write;

/// Error panel text when the collection cannot be loaded
const LOAD_ERROR: &str = "Failed to load knowledge base. Please try again later.";

/// Render the taxonomy as an indented outline
pub async fn run_tree(config: &Config) -> Result<()> {
    let client = KnowledgeClient::new(&config.knowledge.base_url)?;
    let records = match client.fetch_all().await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Knowledge load failed: {}", e);
            println!("{}", LOAD_ERROR.red());
            return Ok(());
        }
    };

    if records.is_empty() {
        println!("{}", "The knowledge base is empty.".yellow());
        return Ok(());
    }

    let forest = build_forest(&records);
    print!("{}", render_outline(&forest));
    Ok(())
}

/// Show one record with every present metadata section
pub async fn run_show(config: &Config, id: &str) -> Result<()> {
    let client = KnowledgeClient::new(&config.knowledge.base_url)?;
    let records = match client.fetch_all().await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Knowledge load failed: {}", e);
            println!("{}", LOAD_ERROR.red());
            return Ok(());
        }
    };

    let Some(record) = find_record(&records, id) else {
        println!("{}", format!("No record matching '{}'", id).yellow());
        return Ok(());
    };

    println!("{}", record.title.bold());
    println!("{}", record.category.to_string().dimmed());
    for section in detail_sections(record) {
        println!();
        println!("{}", section.heading.cyan());
        match &section.body {
            SectionBody::Paragraph(text) => println!("{}", text),
            SectionBody::Bullets(items) => {
                for item in items {
                    println!("- {}", item);
                }
            }
        }
    }
    Ok(())
}

/// Create a new record and bulk-replace the collection
pub async fn run_add(config: &Config, title: &str, parent: Option<&str>) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TopikaError::Validation("Title must not be empty".to_string()).into());
    }

    let client = KnowledgeClient::new(&config.knowledge.base_url)?;
    let mut records = client.fetch_all().await?;

    let parent_id = match parent {
        Some(parent) => {
            let record = find_record(&records, parent).ok_or_else(|| {
                TopikaError::Knowledge(format!("No parent record matching '{}'", parent))
            })?;
            Some(record.id.clone())
        }
        None => None,
    };

    let record = TopicRecord::new(title.trim(), parent_id);
    let id = record.id.clone();
    records.push(record);
    client.replace_all(&records).await?;

    println!("{}", format!("Created {} ({})", title.trim(), id).green());
    Ok(())
}

/// Delete a record and all of its descendants, then bulk-replace
pub async fn run_delete(config: &Config, id: &str, yes: bool) -> Result<()> {
    let client = KnowledgeClient::new(&config.knowledge.base_url)?;
    let records = client.fetch_all().await?;

    let Some(record) = find_record(&records, id) else {
        println!("{}", format!("No record matching '{}'", id).yellow());
        return Ok(());
    };
    let record_id = record.id.clone();
    let title = record.title.clone();
    let doomed = descendant_ids(&records, &record_id).len();

    if !yes {
        print!(
            "Delete '{}' and {} descendant(s)? This cannot be undone. [y/N] ",
            title,
            doomed.saturating_sub(1)
        );
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let survivors = remove_with_descendants(records, &record_id);
    client.replace_all(&survivors).await?;

    println!(
        "{}",
        format!("Deleted '{}' ({} record(s) removed)", title, doomed).green()
    );
    Ok(())
}

/// Collapse duplicate titles and bulk-replace
pub async fn run_dedupe(config: &Config) -> Result<()> {
    let client = KnowledgeClient::new(&config.knowledge.base_url)?;
    let records = client.fetch_all().await?;
    let original = records.len();

    let (survivors, removed) = dedupe_by_title(records);
    if removed == 0 {
        println!("No duplicate titles found ({} records).", original);
        return Ok(());
    }

    client.replace_all(&survivors).await?;
    println!(
        "{}",
        format!(
            "Removed {} duplicate(s): {} -> {} records",
            removed,
            original,
            survivors.len()
        )
        .green()
    );
    Ok(())
}

/// Generated metadata payload parsed from the provider reply
#[derive(Debug, Deserialize)]
struct GeneratedMetadata {
    #[serde(default)]
    importance: Option<String>,
    #[serde(default)]
    relation_to_parent: Option<String>,
    challenges: Vec<String>,
    strategies: Vec<String>,
    examples: Vec<String>,
    action_steps: Vec<String>,
}

impl GeneratedMetadata {
    fn validate(&self, is_topic: bool) -> Result<()> {
        if is_topic && self.importance.as_deref().unwrap_or("").trim().is_empty() {
            return Err(
                TopikaError::Provider("Generated metadata is missing importance".to_string())
                    .into(),
            );
        }
        if !is_topic
            && self
                .relation_to_parent
                .as_deref()
                .unwrap_or("")
                .trim()
                .is_empty()
        {
            return Err(TopikaError::Provider(
                "Generated metadata is missing relation_to_parent".to_string(),
            )
            .into());
        }
        for (name, list) in [
            ("challenges", &self.challenges),
            ("strategies", &self.strategies),
            ("examples", &self.examples),
            ("action_steps", &self.action_steps),
        ] {
            if list.is_empty() {
                return Err(TopikaError::Provider(format!(
                    "Generated metadata has an empty {} list",
                    name
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// Generate structured metadata for one record via the completion provider
pub async fn run_generate(config: &Config, id: &str) -> Result<()> {
    let store = SessionStore::new()?;
    let api_key = store.api_key()?.ok_or_else(|| {
        TopikaError::Validation("No API key stored. Run `topika key set` first.".to_string())
    })?;

    let client = KnowledgeClient::new(&config.knowledge.base_url)?;
    let mut records = client.fetch_all().await?;

    let Some(record) = find_record(&records, id).cloned() else {
        println!("{}", format!("No record matching '{}'", id).yellow());
        return Ok(());
    };

    let is_topic = record.category == crate::knowledge::Category::Topic;
    let instructions = crate::prompts::metadata_format_instructions(is_topic);
    let prompt = if is_topic {
        crate::prompts::topic_generation_prompt(&record.title, &instructions)
    } else {
        let parent_title = record
            .parent_id
            .as_deref()
            .and_then(|pid| records.iter().find(|r| r.id == pid))
            .map(|r| r.title.clone())
            .ok_or_else(|| {
                TopikaError::Knowledge(format!(
                    "Parent of '{}' is missing from the collection",
                    record.title
                ))
            })?;
        crate::prompts::subtopic_generation_prompt(&record.title, &parent_title, &instructions)
    };

    println!("Generating metadata for '{}'...", record.title);
    let provider = create_provider(
        &config.provider.provider_type,
        &config.provider,
        &config.chat,
    )?;
    let completion = provider
        .complete(&api_key, &[ChatMessage::user(prompt)])
        .await?;

    let generated: GeneratedMetadata = serde_json::from_str(strip_code_fences(&completion.content))
        .map_err(|e| TopikaError::Provider(format!("Reply was not valid metadata JSON: {}", e)))?;
    generated.validate(is_topic)?;

    let target = records
        .iter_mut()
        .find(|r| r.id == record.id)
        .ok_or_else(|| TopikaError::Knowledge("Record vanished from local copy".to_string()))?;
    target.metadata = TopicMetadata {
        importance: generated.importance.filter(|_| is_topic),
        relation_to_parent: generated.relation_to_parent.filter(|_| !is_topic),
        challenges: generated.challenges,
        strategies: generated.strategies,
        examples: generated.examples,
        action_steps: generated.action_steps,
    };

    client.replace_all(&records).await?;
    println!(
        "{}",
        format!("Metadata generated and saved for '{}'", record.title).green()
    );
    Ok(())
}

/// Strip a Markdown code fence when the provider wraps its JSON anyway
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
