use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use opsdesk_core::config::AppConfig;
use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::load_config;

pub fn run() -> String {
    let config = match load_config() {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for entry in effective_values(&config) {
        let source = field_source(
            entry.key_path,
            entry.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(entry.key_path, &entry.value, source));
    }

    lines.join("\n")
}

struct Entry {
    key_path: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

fn entry(key_path: &'static str, value: String, env_keys: &'static [&'static str]) -> Entry {
    Entry { key_path, value, env_keys }
}

fn effective_values(config: &AppConfig) -> Vec<Entry> {
    let token = match &config.api.token {
        Some(token) => redact_token(token.expose_secret()),
        None => "<unset>".to_string(),
    };

    vec![
        entry("api.base_url", config.api.base_url.clone(), &["OPSDESK_API_BASE_URL"]),
        entry("api.token", token, &["OPSDESK_API_TOKEN"]),
        entry("api.timeout_secs", config.api.timeout_secs.to_string(), &["OPSDESK_API_TIMEOUT_SECS"]),
        entry(
            "session.user_id",
            config.session.user_id.clone().unwrap_or_else(|| "<unset>".to_string()),
            &["OPSDESK_SESSION_USER_ID"],
        ),
        entry("session.role", config.session.role.as_str().to_string(), &["OPSDESK_SESSION_ROLE"]),
        entry(
            "uploads.max_file_size_mb",
            config.uploads.max_file_size_mb.to_string(),
            &["OPSDESK_UPLOADS_MAX_FILE_SIZE_MB"],
        ),
        entry(
            "uploads.accepted_extensions",
            config.uploads.accepted_extensions.join(","),
            &["OPSDESK_UPLOADS_ACCEPTED_EXTENSIONS"],
        ),
        entry("listing.page_size", config.listing.page_size.to_string(), &["OPSDESK_LISTING_PAGE_SIZE"]),
        entry(
            "logging.level",
            config.logging.level.clone(),
            &["OPSDESK_LOGGING_LEVEL", "OPSDESK_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            config.logging.format.as_str().to_string(),
            &["OPSDESK_LOGGING_FORMAT", "OPSDESK_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("opsdesk.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/opsdesk.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
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

/// Keeps at most a four character prefix so operators can tell tokens apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if trimmed.len() > 12 {
        let prefix: String = trimmed.chars().take(4).collect();
        return format!("{prefix}***");
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use super::{contains_path, redact_token};

    #[test]
    fn short_tokens_are_fully_redacted() {
        assert_eq!(redact_token("  "), "<empty>");
        assert_eq!(redact_token("abc123"), "<redacted>");
        assert_eq!(redact_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJh***");
    }

    #[test]
    fn dotted_paths_walk_nested_tables() {
        let doc: toml::Value = "[api]\nbase_url = \"https://ops.example.com/api\"\n"
            .parse()
            .expect("valid toml");
        assert!(contains_path(&doc, "api.base_url"));
        assert!(!contains_path(&doc, "api.token"));
        assert!(!contains_path(&doc, "listing.page_size"));
    }
}
