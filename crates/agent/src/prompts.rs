//! System prompts and the shared user-prompt layout.

pub const ROUTER_SYSTEM_PROMPT: &str = "\
You are a routing agent for a carbon-credit marketplace chatbot.
Your task: classify the user's intent into one of the labels below and return JSON only.
Labels: market_analysis, recommendation, emissions, theory, insights, general
Return JSON format:
{\"label\": \"...\", \"reason\": \"short, user-facing reason\"}";

pub const MARKET_AGENT_SYSTEM: &str = "\
You are a market analysis expert for carbon credits.
Use the provided marketplace data and seller profiles to answer questions about demand, pricing, and top sellers.
Explain your reasoning clearly and cite the data points you use.";

pub const RECOMMENDATION_AGENT_SYSTEM: &str = "\
You are a recommendation expert for carbon credits.
Use user profile hints and marketplace data to recommend credits that fit the user's goals.
Explain tradeoffs (price vs impact vs trust).";

pub const EMISSION_AGENT_SYSTEM: &str = "\
You are an emissions impact analyst.
Use emissions_offset_tons and project types to explain carbon impact and rough offsets.
Provide simple calculations when asked.";

pub const THEORY_AGENT_SYSTEM: &str = "\
You are a climate and carbon market educator.
Explain concepts simply and accurately using the provided theory knowledge.";

pub const INSIGHT_AGENT_SYSTEM: &str = "\
You are a project insight analyst.
Synthesize insights from marketplace data and seller profiles, highlighting patterns and risks.";

/// Pieces of an agent's user prompt, assembled in a fixed order.
#[derive(Clone, Debug)]
pub struct AgentPrompt<'a> {
    pub question: &'a str,
    pub section: &'a str,
    pub context: &'a str,
    pub footprint: Option<&'a str>,
    pub session: &'a str,
    pub instruction: &'a str,
}

impl AgentPrompt<'_> {
    pub fn render(&self) -> String {
        let mut prompt = format!(
            "User question: {}\n\n{}:\n{}\n\n",
            self.question, self.section, self.context
        );
        if let Some(footprint) = self.footprint {
            prompt.push_str("User's Carbon Footprint:\n");
            prompt.push_str(footprint);
            prompt.push_str("\n\n");
        }
        prompt.push_str("User profile context:\n");
        prompt.push_str(self.session);
        prompt.push_str("\n\n");
        prompt.push_str(self.instruction);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentPrompt, ROUTER_SYSTEM_PROMPT};

    #[test]
    fn router_prompt_lists_every_label() {
        for label in ["market_analysis", "recommendation", "emissions", "theory", "insights", "general"]
        {
            assert!(ROUTER_SYSTEM_PROMPT.contains(label), "missing {label}");
        }
        assert!(ROUTER_SYSTEM_PROMPT.ends_with("{\"label\": \"...\", \"reason\": \"short, user-facing reason\"}"));
    }

    #[test]
    fn prompt_places_footprint_between_data_and_profile() {
        let prompt = AgentPrompt {
            question: "How much?",
            section: "Emissions context",
            context: "Quantity: 2",
            footprint: Some("Annual Carbon Footprint: 1.00 tonnes CO2 equivalent"),
            session: "User role: Buyer",
            instruction: "Explain.",
        }
        .render();

        assert_eq!(
            prompt,
            "User question: How much?\n\nEmissions context:\nQuantity: 2\n\n\
             User's Carbon Footprint:\nAnnual Carbon Footprint: 1.00 tonnes CO2 equivalent\n\n\
             User profile context:\nUser role: Buyer\n\nExplain."
        );
    }

    #[test]
    fn prompt_without_footprint_skips_the_block() {
        let prompt = AgentPrompt {
            question: "q",
            section: "Theory reference",
            context: "sdg_13: Climate Action",
            footprint: None,
            session: "",
            instruction: "Answer clearly and simply.",
        }
        .render();

        assert!(!prompt.contains("Carbon Footprint"));
        assert!(prompt.ends_with("User profile context:\n\n\nAnswer clearly and simply."));
    }
}
