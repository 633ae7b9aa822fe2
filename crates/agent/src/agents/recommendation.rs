use greenearth_core::domain::credit::Credit;
use greenearth_core::domain::profile::UserProfile;
use greenearth_core::domain::seller::Seller;
use greenearth_core::errors::DomainError;
use greenearth_core::scoring::ScoreCalculator;

use super::{AgentDeps, AgentResult};
use crate::prompts::{AgentPrompt, RECOMMENDATION_AGENT_SYSTEM};
use crate::session::SessionContext;

const TOP_N: usize = 3;
pub const DEFAULT_PERSONA: &str = "startup";

const PERSONA_KEYWORDS: &[(&str, &[&str])] = &[
    ("corporate_buyer", &["corporate", "enterprise", "company"]),
    ("startup", &["startup", "small business"]),
    ("individual", &["individual", "personal", "myself"]),
    ("ngo", &["ngo", "nonprofit", "foundation"]),
];

/// Persona key guessed from the message; `startup` when nothing matches.
pub fn detect_persona(message: &str) -> &'static str {
    let text = message.to_lowercase();
    PERSONA_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(key, _)| *key)
        .unwrap_or(DEFAULT_PERSONA)
}

/// Picks the persona: an explicit key wins over detection from the message.
pub fn select_persona<'a>(
    profiles: &'a [UserProfile],
    message: &str,
    explicit: Option<&str>,
) -> Result<&'a UserProfile, DomainError> {
    let key = explicit
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| detect_persona(message));
    profiles
        .iter()
        .find(|profile| profile.profile_key == key)
        .ok_or_else(|| DomainError::UnknownUserProfile(key.to_string()))
}

pub fn build_recommendation_context(
    scoring: &ScoreCalculator,
    persona: &UserProfile,
    explicit: bool,
    credits: &[Credit],
    sellers: &[Seller],
) -> String {
    let mut lines = vec![
        format!(
            "{} profile: {} (priority: {}, budget ~${})",
            if explicit { "Selected" } else { "Detected" },
            persona.label,
            persona.priority,
            persona.budget_usd
        ),
        "Top recommendations:".to_string(),
    ];

    for scored in scoring.recommend(credits, sellers, TOP_N) {
        let credit = scored.credit;
        let (seller_name, trust) = match scored.seller {
            Some(seller) => (seller.name.as_str(), seller.trust_score.to_string()),
            None => (credit.seller_id.as_str(), "N/A".to_string()),
        };
        lines.push(format!(
            "- {} ({}) at ${} | demand {} | offset {} tons | seller {} (trust {})",
            credit.credit_id,
            credit.project_type,
            credit.price_usd,
            credit.demand_score,
            credit.emissions_offset_tons,
            seller_name,
            trust
        ));
    }

    lines.join("\n")
}

pub async fn answer(
    deps: AgentDeps<'_>,
    message: &str,
    session: &SessionContext,
    persona_override: Option<&str>,
) -> AgentResult {
    let profiles = deps.market.user_profiles().await?;
    let persona = select_persona(&profiles, message, persona_override)?;
    let explicit = persona_override.map(str::trim).is_some_and(|key| !key.is_empty());

    let credits = deps.market.credits().await?;
    let sellers = deps.market.sellers().await?;
    let context =
        build_recommendation_context(deps.scoring, persona, explicit, &credits, &sellers);

    tracing::debug!(
        event_name = "agent.recommendation.persona",
        persona = %persona.profile_key,
        explicit,
        "persona selected"
    );

    let prompt = AgentPrompt {
        question: message,
        section: "Recommendation context",
        context: &context,
        footprint: None,
        session: &session.render(),
        instruction: "Answer with 2-3 concise recommendations and why they fit the user.",
    }
    .render();

    Ok(deps.llm.complete(RECOMMENDATION_AGENT_SYSTEM, &prompt).await?)
}

#[cfg(test)]
mod tests {
    use greenearth_core::catalog;
    use greenearth_core::domain::seller::SellerId;
    use greenearth_core::errors::DomainError;
    use greenearth_core::scoring::ScoreCalculator;

    use super::{build_recommendation_context, detect_persona, select_persona};

    #[test]
    fn persona_keywords_follow_priority_order() {
        assert_eq!(detect_persona("Our ENTERPRISE needs credits"), "corporate_buyer");
        assert_eq!(detect_persona("a small business like ours"), "startup");
        assert_eq!(detect_persona("for myself"), "individual");
        assert_eq!(detect_persona("our foundation"), "ngo");
        // "company" is checked before "ngo".
        assert_eq!(detect_persona("an ngo company"), "corporate_buyer");
        assert_eq!(detect_persona("anything good?"), "startup");
    }

    #[test]
    fn explicit_persona_overrides_detection() {
        let profiles = catalog::user_profiles();

        let persona = select_persona(&profiles, "for my company", Some("ngo")).expect("ngo");
        assert_eq!(persona.profile_key, "ngo");

        let detected = select_persona(&profiles, "for my company", Some("  ")).expect("detected");
        assert_eq!(detected.profile_key, "corporate_buyer");

        assert_eq!(
            select_persona(&profiles, "x", Some("whale")).err(),
            Some(DomainError::UnknownUserProfile("whale".to_string()))
        );
    }

    #[test]
    fn context_lists_three_scored_credits_with_seller_trust() {
        let profiles = catalog::user_profiles();
        let persona = select_persona(&profiles, "startup", None).expect("startup");
        let context = build_recommendation_context(
            &ScoreCalculator::new(),
            persona,
            false,
            &catalog::credits(),
            &catalog::sellers(),
        );
        let lines = context.lines().collect::<Vec<_>>();

        assert_eq!(
            lines[0],
            "Detected profile: Startup (priority: Cost-effective offsets, budget ~$15000)"
        );
        assert_eq!(lines[1], "Top recommendations:");
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[2],
            "- CC-1003 (Forest Conservation) at $18 | demand 91 | offset 2.4 tons | seller Amazonia Guardians (trust 93)"
        );
    }

    #[test]
    fn unknown_seller_is_listed_with_na_trust() {
        let mut credits = catalog::credits();
        for credit in &mut credits {
            credit.seller_id = SellerId("S-404".to_string());
        }
        let profiles = catalog::user_profiles();
        let persona = select_persona(&profiles, "", None).expect("default persona");
        let context = build_recommendation_context(
            &ScoreCalculator::new(),
            persona,
            true,
            &credits,
            &catalog::sellers(),
        );

        assert!(context.starts_with("Selected profile:"));
        assert!(context.contains("seller S-404 (trust N/A)"));
    }
}
