//! Chat orchestration for the carbon-credit marketplace.
//!
//! A message is classified by [`router`], then answered by one of the
//! [`agents`]. Each agent formats reference data into a prompt and forwards it
//! to the model through the [`llm::LlmClient`] seam. The model only phrases
//! answers; rankings and calculations are done here, deterministically.

pub mod agents;
pub mod features;
pub mod llm;
pub mod prompts;
pub mod router;
pub mod runtime;
pub mod session;

pub use llm::{HttpLlmClient, LlmClient, LlmError, ScriptedLlmClient};
pub use router::Intent;
pub use runtime::{ChatReply, ChatRuntime};
pub use session::SessionContext;
