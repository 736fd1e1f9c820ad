use serde::{Deserialize, Serialize};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOOL_PATH: &str = "yt-dlp";
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONTENT_WAIT_SECS: u64 = 10;
const DEFAULT_SETTLE_DELAY_MS: u64 = 1500;
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// External media-info tool settings (primary tier).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_tool_path")]
    pub path: String,

    /// Hard deadline for one metadata invocation.
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_TOOL_PATH.to_string(),
            timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

/// Headless-browser settings (secondary tier).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Browser binary override; falls back to CHROME_PATH, then the
    /// system default.
    #[serde(default)]
    pub chrome_path: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Bounded wait for the platform's readiness selector.
    #[serde(default = "default_content_wait_secs")]
    pub content_wait_secs: u64,

    /// Fixed delay for script-delivered media to start loading.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            content_wait_secs: DEFAULT_CONTENT_WAIT_SECS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_tool_path() -> String {
    DEFAULT_TOOL_PATH.to_string()
}

fn default_tool_timeout_secs() -> u64 {
    DEFAULT_TOOL_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_navigation_timeout_secs() -> u64 {
    DEFAULT_NAVIGATION_TIMEOUT_SECS
}

fn default_content_wait_secs() -> u64 {
    DEFAULT_CONTENT_WAIT_SECS
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default)]
    pub tool: ToolConfig,

    #[serde(default)]
    pub scrape: ScrapeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            tool: ToolConfig::default(),
            scrape: ScrapeConfig::default(),
        }
    }
}

impl Config {
    fn validate(&self) {
        if self.tool.path.is_empty() {
            panic!("tool.path must not be empty");
        }
        if self.tool.timeout_secs == 0 {
            panic!("tool.timeout_secs must be greater than 0");
        }
        if self.scrape.navigation_timeout_secs == 0 {
            panic!("scrape.navigation_timeout_secs must be greater than 0");
        }
        if self.scrape.content_wait_secs == 0 {
            panic!("scrape.content_wait_secs must be greater than 0");
        }
    }

    /// Load from a YAML file, creating it with defaults when absent.
    pub fn load_with(path: &str) -> Self {
        if !std::path::Path::new(path).exists() {
            let config = Self::default();
            config.save(path);
            return config;
        }

        let config_str = std::fs::read_to_string(path).expect("config file is not readable");
        let config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.validate();

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config).unwrap() {
            config.save(path);
        }

        config
    }

    pub fn save(&self, path: &str) {
        let config_str = serde_yml::to_string(&self).unwrap();
        if let Err(err) = std::fs::write(path, config_str) {
            log::warn!("could not write config to {path}: {err}");
        }
    }
}
