use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use greenearth_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    render(&config, resolve_config_path(None))
}

/// One line per setting: value, then where it came from.
pub fn render(config: &AppConfig, config_file_path: Option<PathBuf>) -> String {
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];

    lines.push(render_line(
        "database.url",
        &config.database.url,
        source("database.url", &["GREENEARTH_DATABASE_URL"]),
    ));
    lines.push(render_line(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        source("database.max_connections", &["GREENEARTH_DATABASE_MAX_CONNECTIONS"]),
    ));
    lines.push(render_line(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        source("database.timeout_secs", &["GREENEARTH_DATABASE_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "llm.provider",
        config.llm.provider.as_str(),
        source("llm.provider", &["GREENEARTH_LLM_PROVIDER"]),
    ));
    lines.push(render_line(
        "llm.model",
        &config.llm.model,
        source("llm.model", &["GREENEARTH_LLM_MODEL", "GROQ_MODEL"]),
    ));
    lines.push(render_line(
        "llm.base_url",
        &config.llm.endpoint_base(),
        source("llm.base_url", &["GREENEARTH_LLM_BASE_URL"]),
    ));
    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    lines.push(render_line(
        "llm.api_key",
        llm_api_key,
        source("llm.api_key", &["GREENEARTH_LLM_API_KEY", "GROQ_API_KEY"]),
    ));
    lines.push(render_line(
        "llm.temperature",
        &config.llm.temperature.to_string(),
        source("llm.temperature", &["GREENEARTH_LLM_TEMPERATURE", "GROQ_TEMPERATURE"]),
    ));
    lines.push(render_line(
        "llm.max_tokens",
        &config.llm.max_tokens.to_string(),
        source("llm.max_tokens", &["GREENEARTH_LLM_MAX_TOKENS", "GROQ_MAX_TOKENS"]),
    ));
    lines.push(render_line(
        "llm.timeout_secs",
        &config.llm.timeout_secs.to_string(),
        source("llm.timeout_secs", &["GREENEARTH_LLM_TIMEOUT_SECS"]),
    ));
    lines.push(render_line(
        "llm.max_retries",
        &config.llm.max_retries.to_string(),
        source("llm.max_retries", &["GREENEARTH_LLM_MAX_RETRIES"]),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", &["GREENEARTH_SERVER_BIND_ADDRESS"]),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", &["GREENEARTH_SERVER_PORT", "PORT"]),
    ));
    lines.push(render_line(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        source("server.graceful_shutdown_secs", &["GREENEARTH_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["GREENEARTH_LOGGING_LEVEL", "GREENEARTH_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format).to_lowercase(),
        source("logging.format", &["GREENEARTH_LOGGING_FORMAT", "GREENEARTH_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

/// First env key that is set wins, matching the loader's alias order.
fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
