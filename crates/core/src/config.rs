use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::attachment::UploadPolicy;
use crate::policy::Role;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub uploads: UploadsConfig,
    pub listing: ListingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub user_id: Option<String>,
    pub role: Role,
}

#[derive(Clone, Debug)]
pub struct UploadsConfig {
    pub max_file_size_mb: u64,
    pub accepted_extensions: Vec<String>,
}

impl UploadsConfig {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            accepted_extensions: self.accepted_extensions.clone(),
            max_file_size_bytes: self.max_file_size_mb * 1024 * 1024,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ListingConfig {
    pub page_size: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub session_user_id: Option<String>,
    pub session_role: Option<Role>,
    pub page_size: Option<u32>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let uploads = UploadPolicy::default();
        Self {
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                token: None,
                timeout_secs: 30,
            },
            session: SessionConfig { user_id: None, role: Role::Employee },
            uploads: UploadsConfig {
                max_file_size_mb: uploads.max_file_size_bytes / (1024 * 1024),
                accepted_extensions: uploads.accepted_extensions,
            },
            listing: ListingConfig { page_size: 10 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("opsdesk.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn has_token(&self) -> bool {
        self.api.token.as_ref().is_some_and(|token| !token.expose_secret().trim().is_empty())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(api) = patch.api {
            if let Some(base_url) = api.base_url {
                self.api.base_url = base_url;
            }
            if let Some(api_token_value) = api.token {
                self.api.token = Some(secret_value(api_token_value));
            }
            if let Some(timeout_secs) = api.timeout_secs {
                self.api.timeout_secs = timeout_secs;
            }
        }

        if let Some(session) = patch.session {
            if let Some(user_id) = session.user_id {
                self.session.user_id = Some(user_id);
            }
            if let Some(role) = session.role {
                self.session.role = parse_role("session.role", &role)?;
            }
        }

        if let Some(uploads) = patch.uploads {
            if let Some(max_file_size_mb) = uploads.max_file_size_mb {
                self.uploads.max_file_size_mb = max_file_size_mb;
            }
            if let Some(accepted_extensions) = uploads.accepted_extensions {
                self.uploads.accepted_extensions = normalize_extensions(accepted_extensions);
            }
        }

        if let Some(listing) = patch.listing {
            if let Some(page_size) = listing.page_size {
                self.listing.page_size = page_size;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("OPSDESK_API_BASE_URL") {
            self.api.base_url = value;
        }
        if let Some(value) = read_env("OPSDESK_API_TOKEN") {
            self.api.token = Some(secret_value(value));
        }
        if let Some(value) = read_env("OPSDESK_API_TIMEOUT_SECS") {
            self.api.timeout_secs = parse_u64("OPSDESK_API_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("OPSDESK_SESSION_USER_ID") {
            self.session.user_id = Some(value);
        }
        if let Some(value) = read_env("OPSDESK_SESSION_ROLE") {
            self.session.role = Role::parse(&value).ok_or_else(|| ConfigError::InvalidEnvOverride {
                key: "OPSDESK_SESSION_ROLE".to_string(),
                value: value.clone(),
            })?;
        }

        if let Some(value) = read_env("OPSDESK_UPLOADS_MAX_FILE_SIZE_MB") {
            self.uploads.max_file_size_mb = parse_u64("OPSDESK_UPLOADS_MAX_FILE_SIZE_MB", &value)?;
        }
        if let Some(value) = read_env("OPSDESK_UPLOADS_ACCEPTED_EXTENSIONS") {
            self.uploads.accepted_extensions =
                normalize_extensions(value.split(',').map(str::to_string).collect());
        }

        if let Some(value) = read_env("OPSDESK_LISTING_PAGE_SIZE") {
            self.listing.page_size = parse_u32("OPSDESK_LISTING_PAGE_SIZE", &value)?;
        }

        let log_level =
            read_env("OPSDESK_LOGGING_LEVEL").or_else(|| read_env("OPSDESK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("OPSDESK_LOGGING_FORMAT").or_else(|| read_env("OPSDESK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(api_base_url) = overrides.api_base_url {
            self.api.base_url = api_base_url;
        }
        if let Some(api_token) = overrides.api_token {
            self.api.token = Some(secret_value(api_token));
        }
        if let Some(user_id) = overrides.session_user_id {
            self.session.user_id = Some(user_id);
        }
        if let Some(role) = overrides.session_role {
            self.session.role = role;
        }
        if let Some(page_size) = overrides.page_size {
            self.listing.page_size = page_size;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_api(&self.api)?;
        validate_uploads(&self.uploads)?;
        validate_listing(&self.listing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("opsdesk.toml"), PathBuf::from("config/opsdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_api(api: &ApiConfig) -> Result<(), ConfigError> {
    let base_url = api.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "api.base_url must start with http:// or https://".to_string(),
        ));
    }

    if api.timeout_secs == 0 || api.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "api.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_uploads(uploads: &UploadsConfig) -> Result<(), ConfigError> {
    if uploads.max_file_size_mb == 0 || uploads.max_file_size_mb > 100 {
        return Err(ConfigError::Validation(
            "uploads.max_file_size_mb must be in range 1..=100".to_string(),
        ));
    }

    if uploads.accepted_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "uploads.accepted_extensions must list at least one extension".to_string(),
        ));
    }

    Ok(())
}

fn validate_listing(listing: &ListingConfig) -> Result<(), ConfigError> {
    if listing.page_size == 0 || listing.page_size > 100 {
        return Err(ConfigError::Validation(
            "listing.page_size must be in range 1..=100".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn normalize_extensions(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}

fn parse_role(key: &str, value: &str) -> Result<Role, ConfigError> {
    Role::parse(value).ok_or_else(|| {
        ConfigError::Validation(format!("{key} has unknown role `{value}`"))
    })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    api: Option<ApiPatch>,
    session: Option<SessionPatch>,
    uploads: Option<UploadsPatch>,
    listing: Option<ListingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiPatch {
    base_url: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    user_id: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UploadsPatch {
    max_file_size_mb: Option<u64>,
    accepted_extensions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ListingPatch {
    page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::policy::Role;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid_without_a_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.api.base_url == "http://localhost:5000/api", "default base url")?;
        ensure(!config.has_token(), "no token by default")?;
        ensure(config.session.role == Role::Employee, "default role is employee")?;
        ensure(config.listing.page_size == 10, "default page size is 10")?;
        ensure(
            config.uploads.policy().max_file_size_bytes == 10 * 1024 * 1024,
            "default upload ceiling is 10 MiB",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_OPSDESK_TOKEN", "token-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("opsdesk.toml");
            fs::write(
                &path,
                r#"
[api]
token = "${TEST_OPSDESK_TOKEN}"

[session]
role = "it-support"

[uploads]
accepted_extensions = [".PDF", "png"]
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.api.token.as_ref().map(|token| token.expose_secret().to_string())
                    == Some("token-from-env".to_string()),
                "token should be loaded from environment",
            )?;
            ensure(config.session.role == Role::ItSupport, "role should be read from file")?;
            ensure(
                config.uploads.accepted_extensions == vec!["pdf".to_string(), "png".to_string()],
                "extensions should be normalised",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_OPSDESK_TOKEN"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("OPSDESK_LOG_LEVEL", "warn");
        env::set_var("OPSDESK_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["OPSDESK_LOG_LEVEL", "OPSDESK_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("OPSDESK_API_BASE_URL", "https://env.example.com/api");
        env::set_var("OPSDESK_LISTING_PAGE_SIZE", "25");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("opsdesk.toml");
            fs::write(
                &path,
                r#"
[api]
base_url = "https://file.example.com/api"
timeout_secs = 12

[listing]
page_size = 50

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    api_base_url: Some("https://override.example.com/api".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.api.base_url == "https://override.example.com/api",
                "override base url should win",
            )?;
            ensure(config.api.timeout_secs == 12, "file timeout should win over default")?;
            ensure(config.listing.page_size == 25, "env page size should win over file")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            Ok(())
        })();

        clear_vars(&["OPSDESK_API_BASE_URL", "OPSDESK_LISTING_PAGE_SIZE"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("OPSDESK_UPLOADS_MAX_FILE_SIZE_MB", "500");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("uploads.max_file_size_mb")
            );
            ensure(has_message, "validation failure should mention uploads.max_file_size_mb")
        })();

        clear_vars(&["OPSDESK_UPLOADS_MAX_FILE_SIZE_MB"]);
        result
    }

    #[test]
    fn unknown_role_in_env_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("OPSDESK_SESSION_ROLE", "overlord");
        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "OPSDESK_SESSION_ROLE", "error should name the variable")
            }
            Ok(_) => Err("unknown role should fail".to_string()),
            Err(other) => Err(format!("unexpected error: {other}")),
        };

        clear_vars(&["OPSDESK_SESSION_ROLE"]);
        result
    }

    #[test]
    fn token_is_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("OPSDESK_API_TOKEN", "bearer-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("bearer-secret-value"), "debug output should not contain token")?;
            ensure(config.has_token(), "token should be present")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&["OPSDESK_API_TOKEN"]);
        result
    }
}
