use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use hotelscout_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::{CommandResult, EXIT_OK};

const COMMAND: &str = "config";

pub fn run(config_path: Option<PathBuf>) -> CommandResult {
    let options = LoadOptions {
        require_file: config_path.is_some(),
        config_path: config_path.clone(),
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_config_error(COMMAND, &error),
    };

    CommandResult { exit_code: EXIT_OK, output: render(&config, config_path.as_deref()) }
}

/// Effective configuration, one line per key, with the layer each value came from.
pub fn render(config: &AppConfig, explicit_path: Option<&Path>) -> String {
    let config_file_path = resolve_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let api_key = match &config.llm.api_key {
        Some(key) => redact_token(key.expose_secret()),
        None => "<unset>".to_string(),
    };

    let lines = [
        "effective config (source precedence: env > file > default):".to_string(),
        render_line(
            "llm.api_key",
            &api_key,
            source("llm.api_key", &["HOTELSCOUT_LLM_API_KEY", "OPENAI_API_KEY"]),
        ),
        render_line(
            "llm.base_url",
            &config.llm.base_url,
            source("llm.base_url", &["HOTELSCOUT_LLM_BASE_URL"]),
        ),
        render_line(
            "llm.model",
            &config.llm.model,
            source("llm.model", &["HOTELSCOUT_LLM_MODEL", "OPENAI_MODEL"]),
        ),
        render_line(
            "llm.timeout_secs",
            &config.llm.timeout_secs.to_string(),
            source("llm.timeout_secs", &["HOTELSCOUT_LLM_TIMEOUT_SECS"]),
        ),
        render_line(
            "trace.level",
            &config.trace.level.to_string(),
            source("trace.level", &["HOTELSCOUT_TRACE_LEVEL", "TRACE_LEVEL"]),
        ),
        render_line(
            "planner.budget_policy",
            &format!("{:?}", config.planner.budget_policy).to_ascii_lowercase(),
            source("planner.budget_policy", &["HOTELSCOUT_PLANNER_BUDGET_POLICY"]),
        ),
        render_line(
            "logging.level",
            &config.logging.level,
            source("logging.level", &["HOTELSCOUT_LOG_LEVEL"]),
        ),
        render_line(
            "logging.format",
            &format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source("logging.format", &["HOTELSCOUT_LOG_FORMAT"]),
        ),
    ];

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let set_env = env_keys
        .iter()
        .find(|key| env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false));
    if let Some(env_key) = set_env {
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

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
