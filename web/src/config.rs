use anyhow::{Context, Result, anyhow};
use libentree::{
    cosmic::DEFAULT_API_URL,
    map::{DEFAULT_PLACEHOLDER_TOKENS, DEFAULT_STYLE, MapCredential, MapViewConfig},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::{collections::HashMap, path::Path};
use tracing::debug;

pub(crate) const READ_KEY_ENV: &str = "ENTREEWEB_COSMIC_READ_KEY";
pub(crate) const MAP_TOKEN_ENV: &str = "ENTREEWEB_MAP_TOKEN";

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ListenConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
}

const DEFAULT_HTTP_PORT: u16 = 80;
const DEFAULT_HOST: &str = "0.0.0.0";
fn default_listen() -> ListenConfig {
    ListenConfig {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_HTTP_PORT,
    }
}

// This handles the case where the `listen` block is PRESENT, but a field may be missing.
fn deserialize_listen_with_default_port<'de, D>(deserializer: D) -> Result<ListenConfig, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct PartialListenConfig {
        host: Option<String>,
        port: Option<u16>,
    }

    let partial_config = PartialListenConfig::deserialize(deserializer)?;

    Ok(ListenConfig {
        host: partial_config
            .host
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: partial_config.port.unwrap_or(DEFAULT_HTTP_PORT),
    })
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Where the site content comes from
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct CmsConfig {
    #[serde(default = "default_api_url")]
    pub(crate) api_url: String,
    pub(crate) bucket_slug: String,
    #[serde(default)]
    pub(crate) read_key_file: String,
    #[serde(skip)]
    pub(crate) read_key: SecretString,
}

impl PartialEq for CmsConfig {
    fn eq(&self, other: &Self) -> bool {
        self.api_url == other.api_url
            && self.bucket_slug == other.bucket_slug
            && self.read_key_file == other.read_key_file
            && self.read_key.expose_secret() == other.read_key.expose_secret()
    }
}

fn default_placeholder_tokens() -> Vec<String> {
    DEFAULT_PLACEHOLDER_TOKENS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct MapConfig {
    #[serde(default)]
    pub(crate) access_token_file: String,
    #[serde(skip)]
    pub(crate) access_token: Option<SecretString>,
    /// Token values that mean "no token configured"
    #[serde(default = "default_placeholder_tokens")]
    pub(crate) placeholder_tokens: Vec<String>,
    #[serde(default = "default_style")]
    pub(crate) style: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            access_token_file: String::new(),
            access_token: None,
            placeholder_tokens: default_placeholder_tokens(),
            style: default_style(),
        }
    }
}

impl PartialEq for MapConfig {
    fn eq(&self, other: &Self) -> bool {
        self.access_token_file == other.access_token_file
            && self.access_token.as_ref().map(|t| t.expose_secret())
                == other.access_token.as_ref().map(|t| t.expose_secret())
            && self.placeholder_tokens == other.placeholder_tokens
            && self.style == other.style
    }
}

impl MapConfig {
    pub(crate) fn credential(&self) -> MapCredential {
        MapCredential::new(self.access_token.clone(), self.placeholder_tokens.clone())
    }

    /// The view configuration before any site settings are applied
    pub(crate) fn view_config(&self) -> MapViewConfig {
        MapViewConfig {
            style: self.style.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    #[serde(default = "default_listen")]
    #[serde(deserialize_with = "deserialize_listen_with_default_port")]
    pub(crate) listen: ListenConfig,
    pub(crate) cms: CmsConfig,
    #[serde(default)]
    pub(crate) map: MapConfig,
}

fn read_secret(path: &str, what: &str) -> Result<SecretString> {
    debug!("Looking up {what} from file '{path}'");
    Ok(std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} from file '{path}'"))?
        .trim()
        .to_string()
        .into())
}

impl EnvConfig {
    /// Load the configuration for `envname` from a yaml file that holds a
    /// config block per environment
    pub(crate) fn load(path: &Path, envname: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file '{}'", path.display()))?;
        let mut configs: HashMap<String, EnvConfig> = serde_yaml::from_str(&contents)
            .with_context(|| format!("Unable to parse config file '{}'", path.display()))?;
        let mut config = configs.remove(envname).ok_or_else(|| {
            anyhow!(
                "No configuration for environment '{envname}' in '{}'",
                path.display()
            )
        })?;
        config.init()?;
        Ok(config)
    }

    pub(crate) fn init(&mut self) -> Result<()> {
        self.init_with(|name| std::env::var(name).ok())
    }

    /// Resolve the secrets. A file named in the config takes priority over the
    /// environment variable.
    fn init_with(&mut self, getenv: impl Fn(&str) -> Option<String>) -> Result<()> {
        self.cms.read_key = if !self.cms.read_key_file.is_empty() {
            read_secret(&self.cms.read_key_file, "CMS read key")?
        } else {
            debug!("Looking up CMS read key from environment variable");
            getenv(READ_KEY_ENV)
                .with_context(|| {
                    format!("Failed to get CMS read key from env variable {READ_KEY_ENV}")
                })?
                .into()
        };

        self.map.access_token = if !self.map.access_token_file.is_empty() {
            Some(read_secret(&self.map.access_token_file, "map access token")?)
        } else {
            debug!("Looking up map access token from environment variable");
            getenv(MAP_TOKEN_ENV).map(SecretString::from)
        };
        if self.map.access_token.is_none() {
            debug!("No map access token configured, the map will not be shown");
        }
        Ok(())
    }
}
