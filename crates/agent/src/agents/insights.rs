use greenearth_core::domain::credit::Credit;
use greenearth_core::domain::seller::Seller;
use greenearth_core::scoring::{project_type_distribution, top_by_demand, ScoreCalculator};

use super::{footprint_text, AgentDeps, AgentResult};
use crate::prompts::{AgentPrompt, INSIGHT_AGENT_SYSTEM};
use crate::session::SessionContext;

const TOP_N: usize = 3;

pub fn build_insights(scoring: &ScoreCalculator, credits: &[Credit], sellers: &[Seller]) -> String {
    let mut lines = vec!["Project type distribution:".to_string()];
    for (project_type, count) in project_type_distribution(credits) {
        lines.push(format!("- {project_type}: {count} listings"));
    }

    lines.push("Top trusted sellers:".to_string());
    for seller in scoring.top_trusted_sellers(sellers, TOP_N) {
        lines.push(format!(
            "- {} (trust score {}, volume {})",
            seller.name, seller.trust_score, seller.past_sales_volume
        ));
    }

    lines.push("High demand credits:".to_string());
    for credit in top_by_demand(credits, TOP_N) {
        lines.push(format!(
            "- {} ({}) demand {} at ${}",
            credit.credit_id, credit.project_type, credit.demand_score, credit.price_usd
        ));
    }

    lines.join("\n")
}

pub async fn answer(deps: AgentDeps<'_>, message: &str, session: &SessionContext) -> AgentResult {
    let credits = deps.market.credits().await?;
    let sellers = deps.market.sellers().await?;
    let context = build_insights(deps.scoring, &credits, &sellers);
    let footprint = footprint_text(deps.footprints, session).await;

    let prompt = AgentPrompt {
        question: message,
        section: "Project insights data",
        context: &context,
        footprint: footprint.as_deref(),
        session: &session.render(),
        instruction: "Provide concise insights grounded in the data. Consider the user's carbon footprint if available.",
    }
    .render();

    Ok(deps.llm.complete(INSIGHT_AGENT_SYSTEM, &prompt).await?)
}
