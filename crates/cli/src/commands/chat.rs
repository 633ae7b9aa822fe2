use std::io::{self, BufRead, Write};
use std::sync::Arc;

use greenearth_agent::features::{
    detect_feature, is_exit_message, is_thanks_message, CHAT_ERROR_REPLY, FAREWELL, FEATURE_MENU,
    ROLE_QUESTION, ROLE_RETRY,
};
use greenearth_agent::{ChatRuntime, HttpLlmClient, SessionContext};
use greenearth_core::config::AppConfig;
use greenearth_core::domain::profile::Role;
use greenearth_db::repositories::{SqlFootprintRepository, SqlMarketRepository};
use greenearth_db::{connect_from_config, migrations, ReferenceDataset};

use crate::commands::{prepare, CommandResult};

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub role: Option<String>,
    pub user_id: Option<String>,
    pub profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTurn {
    /// Blank input; nothing to print.
    Silent,
    /// Conversation scaffolding: role retry, feature menu.
    Prompt(String),
    Answer(String),
    Farewell,
}

/// One interactive conversation. Asks for a role first, then answers.
pub struct ChatSession {
    runtime: Arc<ChatRuntime>,
    user_id: Option<String>,
    persona: Option<String>,
    context: Option<SessionContext>,
}

impl ChatSession {
    pub fn new(runtime: Arc<ChatRuntime>, user_id: Option<String>, persona: Option<String>) -> Self {
        Self { runtime, user_id, persona, context: None }
    }

    pub fn has_role(&self) -> bool {
        self.context.is_some()
    }

    pub async fn handle(&mut self, input: &str) -> ChatTurn {
        let input = input.trim();
        if input.is_empty() {
            return ChatTurn::Silent;
        }

        let Some(context) = &self.context else {
            return self.choose_role(input).await;
        };

        if is_exit_message(input) || is_thanks_message(input) {
            return ChatTurn::Farewell;
        }

        if let Some(feature) = detect_feature(input) {
            return ChatTurn::Answer(feature.response());
        }

        match self.runtime.respond(input, context, self.persona.as_deref()).await {
            Ok(reply) => ChatTurn::Answer(reply.response),
            Err(error) => ChatTurn::Answer(format!("{CHAT_ERROR_REPLY}\nDetails: {error}")),
        }
    }

    async fn choose_role(&mut self, input: &str) -> ChatTurn {
        let Ok(role) = input.parse::<Role>() else {
            return ChatTurn::Prompt(ROLE_RETRY.to_string());
        };

        match self.runtime.session_for(Some(role), self.user_id.as_deref()).await {
            Ok(context) => {
                self.context = Some(context);
                ChatTurn::Prompt(FEATURE_MENU.to_string())
            }
            Err(error) => ChatTurn::Prompt(format!("{CHAT_ERROR_REPLY}\nDetails: {error}")),
        }
    }
}

/// Reads lines until end of input or a farewell.
pub fn run_loop<R: BufRead, W: Write>(
    runtime: &tokio::runtime::Runtime,
    session: &mut ChatSession,
    mut input: R,
    output: &mut W,
) -> io::Result<()> {
    loop {
        if session.has_role() {
            write!(output, "\nYou: ")?;
        } else {
            write!(output, "{ROLE_QUESTION} ")?;
        }
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(());
        }

        match runtime.block_on(session.handle(&line)) {
            ChatTurn::Silent => {}
            ChatTurn::Prompt(text) => writeln!(output, "{text}")?,
            ChatTurn::Answer(text) => writeln!(output, "\nAssistant:\n{text}")?,
            ChatTurn::Farewell => {
                writeln!(output, "{FAREWELL}")?;
                return Ok(());
            }
        }
    }
}

pub fn run(options: ChatOptions) -> CommandResult {
    let (config, runtime) = match prepare("chat") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let chat_runtime = match runtime.block_on(open_runtime(&config)) {
        Ok(chat_runtime) => chat_runtime,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("chat", error_class, message, exit_code);
        }
    };

    let mut session = ChatSession::new(chat_runtime, options.user_id, options.profile);
    let stdout = io::stdout();
    let mut output = stdout.lock();

    if let Some(role) = options.role.as_deref() {
        match runtime.block_on(session.handle(role)) {
            ChatTurn::Prompt(text) if session.has_role() => {
                if let Err(error) = writeln!(output, "{text}") {
                    return CommandResult::failure("chat", "io", error.to_string(), 8);
                }
            }
            _ => {
                return CommandResult::failure(
                    "chat",
                    "invalid_argument",
                    format!("unknown role `{role}` (expected buyer|seller)"),
                    2,
                );
            }
        }
    }

    let stdin = io::stdin();
    match run_loop(&runtime, &mut session, stdin.lock(), &mut output) {
        Ok(()) => CommandResult::success("chat", "chat session ended"),
        Err(error) => CommandResult::failure("chat", "io", error.to_string(), 8),
    }
}

async fn open_runtime(
    config: &AppConfig,
) -> Result<Arc<ChatRuntime>, (&'static str, String, u8)> {
    let pool = connect_from_config(&config.database)
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
    migrations::run_pending(&pool).await.map_err(|error| ("migration", error.to_string(), 5u8))?;
    ReferenceDataset::load(&pool)
        .await
        .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

    let llm = HttpLlmClient::from_config(&config.llm)
        .map_err(|error| ("llm_setup", error.to_string(), 7u8))?;

    Ok(Arc::new(ChatRuntime::new(
        Arc::new(llm),
        Arc::new(SqlMarketRepository::new(pool.clone())),
        Arc::new(SqlFootprintRepository::new(pool)),
    )))
}
