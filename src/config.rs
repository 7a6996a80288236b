//! Built-in defaults and the immutable run settings.
//!
//! Everything the pipeline needs to know up front (which pages to visit,
//! how labels map to fields, where the client configs live) is gathered
//! here and handed to the components when they are built.

use std::path::PathBuf;
use std::time::Duration;

use scraper::Selector;
use url::Url;

use crate::error::{FreeSsError, Result};

/// Group tag attached to every harvested record.
pub const DEFAULT_GROUP: &str = "free-ss";

/// Cipher used when a page does not name one.
pub const DEFAULT_METHOD: &str = "aes-256-cfb";

/// Port used when a page does not name one.
pub const DEFAULT_PORT: u16 = 443;

pub const DEFAULT_SS_CONFIG: &str = "gui-config.json";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Pages known to publish free servers, with the selector matching one
/// server block each.
pub const DEFAULT_SOURCES: &[(&str, &str)] = &[
    ("http://55service.yaozeyuan.online:8733/whitelist/", "table"),
    ("https://ss.ishadowx.net", "#portfolio .hover-text"),
    ("https://freessr.win", ".text-center"),
];

/// Human labels seen on source pages, mapped to canonical field names.
///
/// Order matters: the containment fallbacks in [`crate::normalize`] take the
/// first entry that matches, top to bottom.
pub const DEFAULT_LABELS: &[(&str, &str)] = &[
    ("加密方式", "method"),
    ("服务器地址", "server"),
    ("服务地址", "server"),
    ("服务密码", "password"),
    ("服务器端口", "server_port"),
    ("服务端口", "server_port"),
    ("端口号", "server_port"),
    ("状态", "remarks"),
    ("ip address", "server"),
    ("port", "server_port"),
];

/// One page to harvest.
#[derive(Debug, Clone)]
pub struct Source {
    pub url: Url,
    pub selector: Selector,
    /// Selector as written, kept for log lines.
    pub selector_text: String,
}

impl Source {
    pub fn new(url: &str, selector: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| FreeSsError::InvalidUrl(format!("{}: {}", url, e)))?;
        let parsed = Selector::parse(selector)
            .map_err(|e| FreeSsError::InvalidSelector(format!("{}: {}", selector, e)))?;

        Ok(Self {
            url,
            selector: parsed,
            selector_text: selector.to_string(),
        })
    }

    /// Parse `"<url> <selector>"`. URLs never contain whitespace, so the
    /// first whitespace run ends the URL and the rest is the selector.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        match spec.split_once(char::is_whitespace) {
            Some((url, selector)) if !selector.trim().is_empty() => {
                Self::new(url, selector.trim())
            }
            _ => Err(FreeSsError::InvalidSource(spec.to_string())),
        }
    }
}

pub fn default_sources() -> Result<Vec<Source>> {
    DEFAULT_SOURCES
        .iter()
        .map(|(url, selector)| Source::new(url, selector))
        .collect()
}

/// Where COW keeps its rc file on this platform.
pub fn default_cow_config() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("rc.txt")
    } else {
        dirs::home_dir()
            .unwrap_or_default()
            .join(".cow")
            .join("rc")
    }
}

/// HTTP client knobs.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

/// Settings for one harvest run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sources: Vec<Source>,
    /// Page label to canonical field name, in lookup order.
    pub labels: Vec<(String, String)>,
    pub prior_url: Option<Url>,
    pub group: String,
    pub fallback_method: String,
    pub ss_config: PathBuf,
    pub cow_config: PathBuf,
    /// Write the Shadowsocks GUI config even if it does not exist yet.
    pub force_ss: bool,
    /// Write the COW config even if it does not exist yet.
    pub force_cow: bool,
    pub dry_run: bool,
    pub http: HttpOptions,
}

impl Settings {
    pub fn new(sources: Vec<Source>) -> Self {
        Self {
            sources,
            labels: DEFAULT_LABELS
                .iter()
                .map(|(label, field)| (label.to_string(), field.to_string()))
                .collect(),
            prior_url: None,
            group: DEFAULT_GROUP.to_string(),
            fallback_method: DEFAULT_METHOD.to_string(),
            ss_config: PathBuf::from(DEFAULT_SS_CONFIG),
            cow_config: default_cow_config(),
            force_ss: false,
            force_cow: false,
            dry_run: false,
            http: HttpOptions::default(),
        }
    }
}
