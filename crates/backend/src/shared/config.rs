use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::shared::session::DEFAULT_MAX_SESSIONS;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub report: ReportConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Сколько сессий держать в памяти; самая старая вытесняется
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Spreadsheet template with the "Summary" and "Filtered Data" sheets
    pub template_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Name of the environment variable that holds the API key
    pub api_key_env: String,
    /// OpenAI-compatible base URL
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: i32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000
max_sessions = 256

[report]
template_path = "assets/sales_report_template.xlsx"

[llm]
api_key_env = "GEMINI_KEY"
endpoint = "https://generativelanguage.googleapis.com/v1beta/openai"
model = "gemini-2.5-flash"
temperature = 0.7
max_tokens = 512
timeout_secs = 30
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Current working directory
/// 3. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    let mut candidates = Vec::new();
    if let Some(exe_dir) = exe_dir() {
        candidates.push(exe_dir.join("config.toml"));
    }
    candidates.push(PathBuf::from("config.toml"));

    for config_path in candidates {
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            return Ok(config);
        }
        tracing::debug!("config.toml not found at: {}", config_path.display());
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Resolve the report template path from configuration.
///
/// Relative paths are tried next to the executable first, then against
/// the working directory. The returned path may not exist: a missing
/// template is reported when a report is requested.
pub fn get_template_path(config: &Config) -> PathBuf {
    let template_path = Path::new(&config.report.template_path);

    if template_path.is_absolute() {
        return template_path.to_path_buf();
    }

    if let Some(exe_dir) = exe_dir() {
        let resolved_path = exe_dir.join(template_path);
        if resolved_path.exists() {
            return resolved_path;
        }
    }

    template_path.to_path_buf()
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe_path| exe_path.parent().map(Path::to_path_buf))
}
