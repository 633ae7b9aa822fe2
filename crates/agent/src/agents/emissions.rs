use greenearth_core::domain::credit::Credit;

use super::{footprint_text, AgentDeps, AgentResult};
use crate::prompts::{AgentPrompt, EMISSION_AGENT_SYSTEM};
use crate::session::SessionContext;

const DEFAULT_QUANTITY: u64 = 1;

/// First number directly followed (spaces allowed) by a word starting with
/// `credit` or `ton`, e.g. "50 credits" or "12tons". Defaults to 1; a
/// number too large for `u64` saturates.
pub fn extract_quantity(message: &str) -> u64 {
    let text = message.to_lowercase();
    let bytes = text.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        if !bytes[index].is_ascii_digit() {
            index += 1;
            continue;
        }

        let start = index;
        while index < bytes.len() && bytes[index].is_ascii_digit() {
            index += 1;
        }
        let digits = &text[start..index];
        let rest = text[index..].trim_start();
        if rest.starts_with("credit") || rest.starts_with("ton") {
            // Only digits reach the parse, so the one failure is overflow.
            return digits.parse::<u64>().unwrap_or(u64::MAX);
        }
    }

    DEFAULT_QUANTITY
}

/// Listing named in the message, else the one with the largest offset.
pub fn select_credit<'a>(message: &str, credits: &'a [Credit]) -> Option<&'a Credit> {
    let text = message.to_lowercase();
    credits
        .iter()
        .find(|credit| text.contains(&credit.credit_id.as_str().to_lowercase()))
        .or_else(|| {
            credits.iter().fold(None, |best: Option<&Credit>, credit| match best {
                Some(current) if current.emissions_offset_tons >= credit.emissions_offset_tons => {
                    Some(current)
                }
                _ => Some(credit),
            })
        })
}

pub fn build_emissions_context(message: &str, credits: &[Credit]) -> String {
    let quantity = extract_quantity(message);
    let Some(credit) = select_credit(message, credits) else {
        return format!(
            "No marketplace listings are available to estimate an offset.\nQuantity: {quantity}"
        );
    };

    let total = round_tons(credit.emissions_offset_tons * quantity as f64);
    format!(
        "Selected credit: {} ({})\n\
         Offset per credit: {} tons CO2\n\
         Quantity: {}\n\
         Estimated total offset: {} tons CO2",
        credit.credit_id, credit.project_type, credit.emissions_offset_tons, quantity, total
    )
}

fn round_tons(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub async fn answer(deps: AgentDeps<'_>, message: &str, session: &SessionContext) -> AgentResult {
    let credits = deps.market.credits().await?;
    let context = build_emissions_context(message, &credits);
    let footprint = footprint_text(deps.footprints, session).await;

    let prompt = AgentPrompt {
        question: message,
        section: "Emissions context",
        context: &context,
        footprint: footprint.as_deref(),
        session: &session.render(),
        instruction: "Explain the calculation in plain language, considering the user's carbon footprint, and note assumptions.",
    }
    .render();

    Ok(deps.llm.complete(EMISSION_AGENT_SYSTEM, &prompt).await?)
}

#[cfg(test)]
mod tests {
    use greenearth_core::catalog;

    use super::{build_emissions_context, extract_quantity, select_credit};

    #[test]
    fn quantity_needs_a_credit_or_ton_unit() {
        assert_eq!(extract_quantity("offset for 50 credits please"), 50);
        assert_eq!(extract_quantity("12tons of CO2"), 12);
        assert_eq!(extract_quantity("in 2030 buy 7 Tonnes"), 7);
        assert_eq!(extract_quantity("CC-1003 x 4 credit"), 4);
        assert_eq!(extract_quantity("what about 2030?"), 1);
        assert_eq!(extract_quantity("no numbers"), 1);
    }

    #[test]
    fn oversized_quantity_saturates() {
        assert_eq!(extract_quantity("retire 99999999999999999999999 credits"), u64::MAX);
        assert_eq!(extract_quantity("18446744073709551615 tons"), u64::MAX);

        let context =
            build_emissions_context("CC-1003 for 99999999999999999999 credits", &catalog::credits());
        assert!(context.contains(&format!("Quantity: {}", u64::MAX)));
        assert!(!context.contains("Quantity: 1\n"));
    }

    #[test]
    fn credit_is_named_or_largest_offset() {
        let credits = catalog::credits();

        let named = select_credit("tell me about cc-1002", &credits).expect("named credit");
        assert_eq!(named.credit_id.as_str(), "CC-1002");

        let largest = select_credit("anything", &credits).expect("largest offset");
        assert_eq!(largest.credit_id.as_str(), "CC-1004");

        assert!(select_credit("anything", &[]).is_none());
    }

    #[test]
    fn context_multiplies_offset_by_quantity() {
        let context = build_emissions_context("CC-1003 for 3 credits", &catalog::credits());

        assert_eq!(
            context,
            "Selected credit: CC-1003 (Forest Conservation)\n\
             Offset per credit: 2.4 tons CO2\n\
             Quantity: 3\n\
             Estimated total offset: 7.2 tons CO2"
        );
    }

    #[test]
    fn empty_marketplace_is_reported() {
        let context = build_emissions_context("10 tons", &[]);
        assert!(context.starts_with("No marketplace listings"));
        assert!(context.ends_with("Quantity: 10"));
    }
}
