//! The five answering agents.
//!
//! Each agent gathers reference data, formats it with a pure `build_*`
//! function, and sends one prompt to the model. The pure builders carry all
//! of the formatting and selection logic so they can be tested without a model.

use greenearth_core::domain::credit::Credit;
use greenearth_core::domain::footprint::format_footprint_for_chat;
use greenearth_core::domain::seller::Seller;
use greenearth_core::errors::ApplicationError;
use greenearth_core::scoring::ScoreCalculator;
use greenearth_db::repositories::{FootprintRepository, MarketRepository};

use crate::llm::LlmClient;
use crate::session::SessionContext;

pub mod emissions;
pub mod insights;
pub mod market;
pub mod recommendation;
pub mod theory;

/// Borrowed collaborators shared by every agent.
#[derive(Clone, Copy)]
pub struct AgentDeps<'a> {
    pub llm: &'a dyn LlmClient,
    pub market: &'a dyn MarketRepository,
    pub footprints: &'a dyn FootprintRepository,
    pub scoring: &'a ScoreCalculator,
}

pub type AgentResult = Result<String, ApplicationError>;

/// Rendered footprint for the session's user, if one is saved.
///
/// Lookup failures are logged and treated as "no footprint".
pub(crate) async fn footprint_text(
    footprints: &dyn FootprintRepository,
    session: &SessionContext,
) -> Option<String> {
    let user_id = session.user_id.as_deref()?;
    match footprints.get(user_id).await {
        Ok(Some(footprint)) => Some(format_footprint_for_chat(Some(&footprint))),
        Ok(None) => None,
        Err(error) => {
            tracing::warn!(
                event_name = "agent.footprint.lookup_failed",
                user_id,
                error = %error,
                "could not retrieve user footprint"
            );
            None
        }
    }
}

/// Seller display name, or the raw id when the seller is unknown.
pub(crate) fn seller_label<'a>(credit: &'a Credit, sellers: &'a [Seller]) -> &'a str {
    sellers
        .iter()
        .find(|seller| seller.seller_id == credit.seller_id)
        .map(|seller| seller.name.as_str())
        .unwrap_or_else(|| credit.seller_id.as_str())
}
