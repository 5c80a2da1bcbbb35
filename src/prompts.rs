//! Prompt construction for chat and metadata generation

/// Build the chat system instruction embedding the context block
///
/// The retrieved knowledge entries arrive pre-serialized; an empty block
/// still produces a usable prompt so the chat works without context.
pub fn chat_system_prompt(context: &str) -> String {
    format!(
        r#"You are a friendly, knowledgeable assistant who helps people navigate the topics in a curated knowledge base. Your personality traits:

- You're conversational and sometimes witty, but always respectful
- You vary your response length based on the complexity of the question
- You prefer natural dialogue over bullet points
- You're concise when possible, but detailed when necessary
- You acknowledge uncertainty when it exists

When using the knowledge base context below, weave the information naturally into your responses rather than just listing facts. Treat this like a friendly chat rather than a formal consultation.

If you don't find relevant information in the context, it's okay to say so and provide general advice based on the topic.

Knowledge Base Context:
{}"#,
        context
    )
}

/// Format instructions for structured metadata generation
///
/// Demands a raw JSON object so the reply can be parsed directly; the
/// field set differs between topics and subtopics.
pub fn metadata_format_instructions(is_topic: bool) -> String {
    let lead = if is_topic {
        r#""importance": one sentence on why this topic matters"#
    } else {
        r#""relation_to_parent": one sentence on how this aspect relates to the broader parent topic"#
    };
    format!(
        r#"Reply with a single raw JSON object and nothing else - no prose, no code fences. The object must have exactly these fields:
- {}
- "challenges": a non-empty array of key challenges
- "strategies": a non-empty array of specific strategies and solutions
- "examples": a non-empty array of clear examples and scenarios
- "action_steps": a non-empty array of actionable steps for improvement"#,
        lead
    )
}

/// Build the generation prompt for a top-level topic
pub fn topic_generation_prompt(title: &str, format_instructions: &str) -> String {
    format!(
        r#"Generate structured information about the topic.

{}

Topic: {}

Focus on:
1. The importance of this topic
2. Key challenges people face in this area
3. Specific strategies and solutions
4. Clear examples and scenarios
5. Actionable steps for improvement

Ensure each section is detailed and specific to the topic."#,
        format_instructions, title
    )
}

/// Build the generation prompt for a subtopic within its parent
pub fn subtopic_generation_prompt(
    title: &str,
    parent_title: &str,
    format_instructions: &str,
) -> String {
    format!(
        r#"Generate structured information about the subtopic within its parent topic.

{}

Parent Topic: {}
Subtopic: {}

Focus on:
1. How this specific aspect relates to the parent topic
2. Particular challenges people face
3. Specific strategies and techniques
4. Real-world examples and scenarios
5. Step-by-step guidance

Ensure each section is detailed and specific to the subtopic."#,
        format_instructions, parent_title, title
    )
}
