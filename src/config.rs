use std::{env, net::IpAddr, str::FromStr, sync::Arc};

use dotenvy::dotenv;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::errors::ConfigError;

// Default naming pools
const DEFAULT_CARRIER_PARAM_NAMES: &[&str] = &[
    "ref", "redirect", "target", "url", "destination",
    "goto", "link", "forward", "next", "return",
];

const DEFAULT_DECOY_PATHS: &[&str] = &[
    "track", "redirect", "r", "go", "fwd", "link", "out",
    "click", "visit", "forward", "gateway", "portal", "jump",
];

const DEFAULT_UTM_SOURCES: &[&str] = &[
    "google_ads", "facebook_campaign", "twitter_promo", "linkedin_marketing",
    "email_newsletter", "instagram_story", "tiktok_ad", "reddit_sponsored",
    "youtube_video", "pinterest_pin", "snapchat_ad", "bing_ads",
];

const DEFAULT_UTM_MEDIUMS: &[&str] = &[
    "cpc", "banner", "email", "social", "affiliate", "display",
    "video", "native", "retargeting", "organic", "referral", "paid_search",
];

const DEFAULT_UTM_CAMPAIGNS: &[&str] = &[
    "spring_sale", "summer_promo", "fall_campaign", "winter_special",
    "holiday_deals", "flash_sale", "clearance_event", "new_launch",
    "retargeting_v2", "awareness_campaign", "conversion_push", "brand_lift",
];

const DEFAULT_UTM_CONTENTS: &[&str] = &[
    "ad_variant_a", "ad_variant_b", "hero_banner", "sidebar_ad",
    "footer_link", "popup_modal", "inline_text", "image_ad",
    "video_pre_roll", "carousel_item", "story_swipe", "feed_post",
];

const DEFAULT_UTM_TERMS: &[&str] = &[
    "buy_now", "shop_today", "limited_offer", "exclusive_deal",
    "free_shipping", "discount_code", "save_money", "best_price",
    "last_chance", "trending_now", "popular_item", "top_seller",
];

const DEFAULT_FAKE_EXTENSIONS: &[&str] = &[".php", ".aspx", ".jsp", ".do", ".action"];

// Security defaults
const DEFAULT_ALLOWED_SCHEMES: &[&str] = &["http", "https"];
const DEFAULT_BLOCKED_PATTERNS: &[&str] = &[
    "javascript:", "data:", "file:", "vbscript:", "about:", "blob:",
];
pub const DEFAULT_MAX_URL_LENGTH: usize = 8192;

// Server-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub workers: usize,
}

// Application-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub environment: Environment,
    pub log_level: String,
}

// Environment enum for different deployment environments
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Testing,
    Production,
}

// Implement FromStr trait for Environment enum to enable parsing from string
impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!(
                "Invalid environment: {}. Must be one of: development, testing, production",
                s
            )),
        }
    }
}

// Result type for configuration functions
type ConfigResult<T> = Result<T, ConfigError>;

/// Vocabularies shared read-only by the uglifier and the decoder.
///
/// `carrier_param_names` is order-sensitive: the decoder searches it front to
/// back, and the uglifier must only ever pick carrier names from it.
#[derive(Debug, Clone, Deserialize)]
pub struct NamingPools {
    pub carrier_param_names: Vec<String>,
    pub decoy_paths: Vec<String>,
    pub utm_sources: Vec<String>,
    pub utm_mediums: Vec<String>,
    pub utm_campaigns: Vec<String>,
    pub utm_contents: Vec<String>,
    pub utm_terms: Vec<String>,
    pub fake_extensions: Vec<String>,
}

impl Default for NamingPools {
    fn default() -> Self {
        Self {
            carrier_param_names: to_owned_list(DEFAULT_CARRIER_PARAM_NAMES),
            decoy_paths: to_owned_list(DEFAULT_DECOY_PATHS),
            utm_sources: to_owned_list(DEFAULT_UTM_SOURCES),
            utm_mediums: to_owned_list(DEFAULT_UTM_MEDIUMS),
            utm_campaigns: to_owned_list(DEFAULT_UTM_CAMPAIGNS),
            utm_contents: to_owned_list(DEFAULT_UTM_CONTENTS),
            utm_terms: to_owned_list(DEFAULT_UTM_TERMS),
            fake_extensions: to_owned_list(DEFAULT_FAKE_EXTENSIONS),
        }
    }
}

impl NamingPools {
    /// Every pool is drawn from with a uniform choice, so none may be empty.
    pub fn ensure_non_empty(&self) -> ConfigResult<()> {
        let pools = [
            ("CARRIER_PARAM_NAMES", &self.carrier_param_names),
            ("DECOY_PATHS", &self.decoy_paths),
            ("FAKE_UTM_SOURCES", &self.utm_sources),
            ("FAKE_UTM_MEDIUMS", &self.utm_mediums),
            ("FAKE_UTM_CAMPAIGNS", &self.utm_campaigns),
            ("FAKE_UTM_CONTENTS", &self.utm_contents),
            ("FAKE_UTM_TERMS", &self.utm_terms),
            ("FAKE_EXTENSIONS", &self.fake_extensions),
        ];

        match pools.iter().find(|(_, pool)| pool.is_empty()) {
            Some((key, _)) => Err(ConfigError::InvalidValue(format!(
                "{} must contain at least one entry",
                key
            ))),
            None => Ok(()),
        }
    }
}

/// Limits applied to every decoded URL before it is used as a redirect target.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_schemes: Vec<String>,
    pub blocked_patterns: Vec<String>,
    pub max_url_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: to_owned_list(DEFAULT_ALLOWED_SCHEMES),
            blocked_patterns: to_owned_list(DEFAULT_BLOCKED_PATTERNS),
            max_url_length: DEFAULT_MAX_URL_LENGTH,
        }
    }
}

// Uglifier configuration
#[derive(Debug, Clone)]
pub struct UglifierConfig {
    pub pools: Arc<NamingPools>,
    pub security: Arc<SecurityConfig>,
    /// Used when the submitted ugliness is missing or not an integer.
    pub default_ugliness: i64,
    /// Overrides the base URL otherwise derived from the incoming request.
    pub base_url: Option<String>,
}

impl Default for UglifierConfig {
    fn default() -> Self {
        Self {
            pools: Arc::new(NamingPools::default()),
            security: Arc::new(SecurityConfig::default()),
            default_ugliness: 5,
            base_url: None,
        }
    }
}

// Config struct that matches our environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub uglifier: UglifierConfig,
}

impl Config {
    // Load configuration from environment variables
    pub fn load() -> ConfigResult<Self> {
        // Load .env file if it exists
        match dotenv() {
            Ok(_) => debug!(".env file loaded successfully"),
            Err(e) => warn!("Could not load .env file: {}", e),
        }

        // Create the server config
        let server = ServerConfig {
            host: get_env_or_default("SERVER_HOST", "127.0.0.1")?,
            port: get_env_or_default("SERVER_PORT", "8000")?,
            workers: get_env_or_default("SERVER_WORKERS", "4")?,
        };

        // Get version from Cargo.toml or environment
        let version = option_env!("CARGO_PKG_VERSION")
            .unwrap_or("0.1.0")
            .to_string();

        // Create the app config
        let app = AppConfig {
            name: get_env_or_default("APP_NAME", "ugly-url")?,
            version: env::var("APP_VERSION").unwrap_or(version),
            environment: get_env_or_default("APP_ENVIRONMENT", "development")?,
            log_level: get_env_or_default("RUST_LOG", "info")?,
        };

        let pools = NamingPools {
            carrier_param_names: get_env_list_or_default(
                "CARRIER_PARAM_NAMES",
                DEFAULT_CARRIER_PARAM_NAMES,
            )?,
            decoy_paths: get_env_list_or_default("DECOY_PATHS", DEFAULT_DECOY_PATHS)?,
            utm_sources: get_env_list_or_default("FAKE_UTM_SOURCES", DEFAULT_UTM_SOURCES)?,
            utm_mediums: get_env_list_or_default("FAKE_UTM_MEDIUMS", DEFAULT_UTM_MEDIUMS)?,
            utm_campaigns: get_env_list_or_default("FAKE_UTM_CAMPAIGNS", DEFAULT_UTM_CAMPAIGNS)?,
            utm_contents: get_env_list_or_default("FAKE_UTM_CONTENTS", DEFAULT_UTM_CONTENTS)?,
            utm_terms: get_env_list_or_default("FAKE_UTM_TERMS", DEFAULT_UTM_TERMS)?,
            fake_extensions: to_owned_list(DEFAULT_FAKE_EXTENSIONS),
        };
        pools.ensure_non_empty()?;

        let security = SecurityConfig {
            allowed_schemes: get_env_list_or_default("ALLOWED_SCHEMES", DEFAULT_ALLOWED_SCHEMES)?,
            blocked_patterns: get_env_list_or_default(
                "BLOCKED_PATTERNS",
                DEFAULT_BLOCKED_PATTERNS,
            )?,
            max_url_length: get_env_or_default("MAX_URL_LENGTH", "8192")?,
        };

        let uglifier = UglifierConfig {
            pools: Arc::new(pools),
            security: Arc::new(security),
            default_ugliness: get_env_or_default("DEFAULT_UGLINESS", "5")?,
            base_url: env::var("BASE_URL")
                .ok()
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
        };

        let config = Config {
            server,
            app,
            uglifier,
        };
        info!("Configuration loaded successfully");
        debug!("Loaded config: {:?}", config);

        Ok(config)
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Splits a comma-separated list, dropping blank entries.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Helper function to get an env variable with a default value
fn get_env_or_default<T: std::str::FromStr>(key: &str, default: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(format!("Could not parse {}: {}", key, e))),
        Err(env::VarError::NotPresent) => {
            debug!("{} not set, using default: {}", key, default);
            default.parse::<T>().map_err(|e| {
                ConfigError::ParseError(format!("Could not parse default for {}: {}", key, e))
            })
        }
        Err(e) => Err(ConfigError::EnvVarError(e)),
    }
}

/// Same as `get_env_or_default`, for comma-separated lists.
fn get_env_list_or_default(key: &str, default: &[&str]) -> ConfigResult<Vec<String>> {
    match env::var(key) {
        Ok(val) => Ok(parse_list(&val)),
        Err(env::VarError::NotPresent) => {
            debug!("{} not set, using {} built-in entries", key, default.len());
            Ok(to_owned_list(default))
        }
        Err(e) => Err(ConfigError::EnvVarError(e)),
    }
}
