use std::sync::Arc;

use serde::Serialize;

use greenearth_core::domain::profile::Role;
use greenearth_core::errors::{ApplicationError, DomainError};
use greenearth_core::scoring::ScoreCalculator;
use greenearth_db::repositories::{FootprintRepository, MarketRepository};

use crate::agents::{self, AgentDeps};
use crate::llm::LlmClient;
use crate::router::{self, Intent};
use crate::session::SessionContext;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub intent: Intent,
    pub response: String,
}

/// Routes a message to one agent and returns the model's answer.
pub struct ChatRuntime {
    llm: Arc<dyn LlmClient>,
    market: Arc<dyn MarketRepository>,
    footprints: Arc<dyn FootprintRepository>,
    scoring: ScoreCalculator,
}

impl ChatRuntime {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        market: Arc<dyn MarketRepository>,
        footprints: Arc<dyn FootprintRepository>,
    ) -> Self {
        Self { llm, market, footprints, scoring: ScoreCalculator::new() }
    }

    pub fn market(&self) -> &dyn MarketRepository {
        self.market.as_ref()
    }

    pub fn footprints(&self) -> &dyn FootprintRepository {
        self.footprints.as_ref()
    }

    fn deps(&self) -> AgentDeps<'_> {
        AgentDeps {
            llm: self.llm.as_ref(),
            market: self.market.as_ref(),
            footprints: self.footprints.as_ref(),
            scoring: &self.scoring,
        }
    }

    /// Session for `role`, carrying the stored persona for that role when one exists.
    pub async fn session_for(
        &self,
        role: Option<Role>,
        user_id: Option<&str>,
    ) -> Result<SessionContext, ApplicationError> {
        let session = match role {
            Some(role) => match self.market.session_profile(role).await? {
                Some(profile) => SessionContext::with_profile(profile),
                None => SessionContext::with_role(role),
            },
            None => SessionContext::anonymous(),
        };
        Ok(session.user(user_id))
    }

    pub async fn route(&self, message: &str) -> Result<Intent, ApplicationError> {
        let message = require_message(message)?;
        Ok(router::route(self.llm.as_ref(), message).await)
    }

    pub async fn respond(
        &self,
        message: &str,
        session: &SessionContext,
        persona_override: Option<&str>,
    ) -> Result<ChatReply, ApplicationError> {
        let message = require_message(message)?;
        let intent = router::route(self.llm.as_ref(), message).await;

        tracing::info!(
            event_name = "agent.chat.routed",
            intent = %intent,
            role = session.role.map(|role| role.as_str()).unwrap_or("unknown"),
            has_user = session.user_id.is_some(),
            "message routed"
        );

        let response = self.dispatch(intent, message, session, persona_override).await?;
        Ok(ChatReply { intent, response })
    }

    /// Runs the agent for `intent`. General questions go to the market agent.
    pub async fn dispatch(
        &self,
        intent: Intent,
        message: &str,
        session: &SessionContext,
        persona_override: Option<&str>,
    ) -> Result<String, ApplicationError> {
        let deps = self.deps();
        match intent {
            Intent::Recommendation => {
                agents::recommendation::answer(deps, message, session, persona_override).await
            }
            Intent::Emissions => agents::emissions::answer(deps, message, session).await,
            Intent::Theory => agents::theory::answer(deps, message, session).await,
            Intent::Insights => agents::insights::answer(deps, message, session).await,
            Intent::MarketAnalysis | Intent::General => {
                agents::market::answer(deps, message, session).await
            }
        }
    }
}

fn require_message(message: &str) -> Result<&str, ApplicationError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvariantViolation("message is required".to_string()).into());
    }
    Ok(trimmed)
}
