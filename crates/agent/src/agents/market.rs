use greenearth_core::domain::credit::Credit;
use greenearth_core::domain::seller::Seller;
use greenearth_core::scoring::{top_by_demand, ScoreCalculator};

use super::{seller_label, AgentDeps, AgentResult};
use crate::prompts::{AgentPrompt, MARKET_AGENT_SYSTEM};
use crate::session::SessionContext;

const TOP_N: usize = 3;

fn credit_line(credit: &Credit, sellers: &[Seller]) -> String {
    format!(
        "{} ({}) - ${}, demand {}, offset {} tons, seller {}",
        credit.credit_id,
        credit.project_type,
        credit.price_usd,
        credit.demand_score,
        credit.emissions_offset_tons,
        seller_label(credit, sellers)
    )
}

/// Top listings by value score followed by top listings by demand.
pub fn build_market_summary(
    scoring: &ScoreCalculator,
    credits: &[Credit],
    sellers: &[Seller],
) -> String {
    let mut lines = vec!["Top value credits:".to_string()];
    lines.extend(
        scoring.rank_by_value(credits).into_iter().take(TOP_N).map(|c| credit_line(c, sellers)),
    );
    lines.push("Top demand credits:".to_string());
    lines.extend(top_by_demand(credits, TOP_N).into_iter().map(|c| credit_line(c, sellers)));
    lines.join("\n")
}

pub async fn answer(deps: AgentDeps<'_>, message: &str, session: &SessionContext) -> AgentResult {
    let credits = deps.market.credits().await?;
    let sellers = deps.market.sellers().await?;
    let context = build_market_summary(deps.scoring, &credits, &sellers);

    let prompt = AgentPrompt {
        question: message,
        section: "Marketplace snapshot",
        context: &context,
        footprint: None,
        session: &session.render(),
        instruction: "Answer in a clear, professional tone.",
    }
    .render();

    Ok(deps.llm.complete(MARKET_AGENT_SYSTEM, &prompt).await?)
}

#[cfg(test)]
mod tests {
    use greenearth_core::catalog;
    use greenearth_core::domain::seller::SellerId;
    use greenearth_core::scoring::ScoreCalculator;

    use super::build_market_summary;

    #[test]
    fn summary_lists_value_then_demand_leaders() {
        let summary =
            build_market_summary(&ScoreCalculator::new(), &catalog::credits(), &catalog::sellers());
        let lines = summary.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "Top value credits:");
        assert_eq!(
            lines[1],
            "CC-1003 (Forest Conservation) - $18, demand 91, offset 2.4 tons, seller Amazonia Guardians"
        );
        assert_eq!(lines[4], "Top demand credits:");
        assert!(lines[5].starts_with("CC-1003 "));
        assert!(lines[6].starts_with("CC-1006 "));
        assert!(lines[7].starts_with("CC-1005 "));
    }

    #[test]
    fn unknown_seller_shows_its_id() {
        let mut credits = catalog::credits();
        credits[0].seller_id = SellerId("S-999".to_string());
        let summary = build_market_summary(&ScoreCalculator::new(), &credits[..1], &catalog::sellers());

        assert!(summary.contains("seller S-999"));
    }

    #[test]
    fn empty_marketplace_keeps_headers() {
        let summary = build_market_summary(&ScoreCalculator::new(), &[], &[]);
        assert_eq!(summary, "Top value credits:\nTop demand credits:");
    }
}
