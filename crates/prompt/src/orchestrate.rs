use messages::{Message, Role};

use crate::context::{Context, MemorySource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedModule {
    ProjectInstruction,
    Persona,
    Memory,
    ToolHints,
    DeepResearch,
}

/// Runs the orchestrator, never failing: any internal error is logged and
/// swallowed, and the original message list is returned untouched. Callers
/// report `applied` via e.g. an `X-Applied-Prompt-Modules` header.
pub fn orchestrate(context: &Context, messages: Vec<Message>) -> (Vec<Message>, Vec<AppliedModule>) {
    let original = messages.clone();

    match try_orchestrate(context, messages) {
        Ok(result) => result,
        Err(reason) => {
            log::warn!(reason; "prompt orchestration failed, forwarding the original message list unchanged");
            (original, Vec::new())
        }
    }
}

fn try_orchestrate(context: &Context, mut messages: Vec<Message>) -> Result<(Vec<Message>, Vec<AppliedModule>), &'static str> {
    let mut applied = Vec::new();

    if let Some(instruction) = &context.project_instruction
        && !instruction.trim().is_empty()
    {
        let already_present = messages.first().is_some_and(|first| first.role == Role::System && first.text() == *instruction);

        if !already_present {
            messages.insert(0, Message::system(instruction.clone()));
            applied.push(AppliedModule::ProjectInstruction);
        }
    }

    let mut block = String::new();

    if let Some(persona) = context.persona.as_ref().or_else(|| context.preferences.get("persona")) {
        block.push_str(persona.trim());
        block.push('\n');
        applied.push(AppliedModule::Persona);
    }

    if !context.memory.is_empty() {
        for (source, label) in [(MemorySource::User, "User"), (MemorySource::Project, "Project"), (MemorySource::Episodic, "Episodic")] {
            for fragment in context.memory.iter().filter(|f| f.source == source) {
                block.push_str(&format!("{label}: {}\n", fragment.text.trim()));
            }
        }
        applied.push(AppliedModule::Memory);
    }

    if !context.tools.is_empty() {
        let names = context.tools.iter().map(|tool| tool.name.as_str()).collect::<Vec<_>>().join(", ");
        block.push_str(&format!("Tools available: {names}.\n"));
        applied.push(AppliedModule::ToolHints);
    }

    if context.deep_research {
        block.push_str("Deep research mode: prioritize thoroughness and cite sources over speed.\n");
        applied.push(AppliedModule::DeepResearch);
    }

    if !block.trim().is_empty() {
        messages.push(Message::system(block.trim_end().to_string()));
    }

    Ok((messages, applied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MemoryFragment;

    fn context() -> Context {
        Context::default()
    }

    #[test]
    fn project_instruction_is_prepended_once() {
        let mut ctx = context();
        ctx.project_instruction = Some("Be concise.".to_string());

        let (messages, applied) = orchestrate(&ctx, vec![Message::user("hi")]);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].text(), "Be concise.");
        assert!(applied.contains(&AppliedModule::ProjectInstruction));
    }

    #[test]
    fn project_instruction_is_not_duplicated_if_already_first() {
        let mut ctx = context();
        ctx.project_instruction = Some("Be concise.".to_string());

        let (messages, applied) = orchestrate(&ctx, vec![Message::system("Be concise."), Message::user("hi")]);

        assert_eq!(messages.len(), 2);
        assert!(!applied.contains(&AppliedModule::ProjectInstruction));
    }

    #[test]
    fn memory_fragments_are_grouped_by_source() {
        let mut ctx = context();
        ctx.memory = vec![
            MemoryFragment { source: MemorySource::Episodic, text: "said X yesterday".to_string() },
            MemoryFragment { source: MemorySource::User, text: "prefers dark mode".to_string() },
        ];

        let (messages, applied) = orchestrate(&ctx, vec![Message::user("hi")]);

        let appended = messages.last().unwrap().text();
        assert!(appended.find("User:").unwrap() < appended.find("Episodic:").unwrap());
        assert!(applied.contains(&AppliedModule::Memory));
    }

    #[test]
    fn no_augmentation_is_a_no_op() {
        let ctx = context();
        let (messages, applied) = orchestrate(&ctx, vec![Message::user("hi")]);

        assert_eq!(messages.len(), 1);
        assert!(applied.is_empty());
    }

    #[test]
    fn tool_hints_list_tool_names() {
        let mut ctx = context();
        ctx.tools = vec![messages::ToolDefinition { name: "web_search".to_string(), description: String::new(), parameters: serde_json::Value::Null }];

        let (messages, applied) = orchestrate(&ctx, vec![Message::user("hi")]);
        assert!(messages.last().unwrap().text().contains("web_search"));
        assert!(applied.contains(&AppliedModule::ToolHints));
    }
}
