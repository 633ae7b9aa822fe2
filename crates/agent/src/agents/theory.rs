use greenearth_core::domain::theory::TheoryEntry;

use super::{AgentDeps, AgentResult};
use crate::prompts::{AgentPrompt, THEORY_AGENT_SYSTEM};
use crate::session::SessionContext;

pub fn build_theory_context(entries: &[TheoryEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}: {}", entry.topic, entry.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn answer(deps: AgentDeps<'_>, message: &str, session: &SessionContext) -> AgentResult {
    let entries = deps.market.theory().await?;
    let context = build_theory_context(&entries);

    let prompt = AgentPrompt {
        question: message,
        section: "Theory reference",
        context: &context,
        footprint: None,
        session: &session.render(),
        instruction: "Answer clearly and simply.",
    }
    .render();

    Ok(deps.llm.complete(THEORY_AGENT_SYSTEM, &prompt).await?)
}
