use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub history: HistoryConfig,
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub advisor: AdvisorSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub path: String,
    /// Snapshots used as the baseline for anomaly checks and forecasts.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_window_size() -> usize {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub sample_interval_ms: u64,
    /// How often to log app stats (samples taken, issues flagged) at INFO level.
    pub stats_log_interval_secs: u64,
    #[serde(default = "default_top_processes")]
    pub top_processes: usize,
}

fn default_top_processes() -> usize {
    5
}

/// Chat-completions settings. The API key never lives here; it comes from
/// OPENAI_API_KEY when the advisor is constructed.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.4
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.history.path.is_empty(), "history.path must be non-empty");
        anyhow::ensure!(
            self.history.window_size > 0,
            "history.window_size must be > 0, got {}",
            self.history.window_size
        );
        anyhow::ensure!(
            self.monitoring.sample_interval_ms > 0,
            "monitoring.sample_interval_ms must be > 0, got {}",
            self.monitoring.sample_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            !self.advisor.model.is_empty(),
            "advisor.model must be non-empty"
        );
        anyhow::ensure!(
            self.advisor.base_url.starts_with("http://")
                || self.advisor.base_url.starts_with("https://"),
            "advisor.base_url must be an http(s) URL, got {:?}",
            self.advisor.base_url
        );
        anyhow::ensure!(
            self.advisor.timeout_secs > 0,
            "advisor.timeout_secs must be > 0, got {}",
            self.advisor.timeout_secs
        );
        anyhow::ensure!(
            self.advisor.max_tokens > 0,
            "advisor.max_tokens must be > 0, got {}",
            self.advisor.max_tokens
        );
        anyhow::ensure!(
            (0.0..=2.0).contains(&self.advisor.temperature),
            "advisor.temperature must be within 0.0..=2.0, got {}",
            self.advisor.temperature
        );
        Ok(())
    }
}
