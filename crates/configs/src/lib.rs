use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

pub const DEFAULT_MAGIC_COOKIE_KEY: &str = "ITEM_STORE_PLUGIN";
pub const DEFAULT_MAGIC_COOKIE_VALUE: &str = "d3f1a7c4-item-store-plugin";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub plugin: PluginConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Address of the `/healthz` + `/metrics` side server; disabled when unset.
    #[serde(default)]
    pub admin_addr: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            admin_addr: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    /// JSON file of `{name: item}` loaded into the store at startup.
    #[serde(default)]
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    #[serde(default = "default_cookie_key")]
    pub magic_cookie_key: String,
    #[serde(default = "default_cookie_value")]
    pub magic_cookie_value: String,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            magic_cookie_key: default_cookie_key(),
            magic_cookie_value: default_cookie_value(),
            protocol_version: default_protocol_version(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_cookie_key() -> String { DEFAULT_MAGIC_COOKIE_KEY.into() }
fn default_cookie_value() -> String { DEFAULT_MAGIC_COOKIE_VALUE.into() }
fn default_protocol_version() -> u32 { 1 }

/// Config file location: `CONFIG_PATH`, else `config.toml`.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&config_path())
    }

    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = load_from_file(path)?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.normalize();
        self.plugin.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if let Some(addr) = &self.admin_addr {
            if addr.trim().is_empty() {
                self.admin_addr = None;
            }
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    fn normalize(&mut self) {
        if let Some(p) = &self.seed_path {
            if p.trim().is_empty() {
                self.seed_path = None;
            }
        }
    }
}

impl PluginConfig {
    pub fn validate(&self) -> Result<()> {
        if self.magic_cookie_key.trim().is_empty() {
            return Err(anyhow!("plugin.magic_cookie_key must not be empty"));
        }
        if self.magic_cookie_value.is_empty() {
            return Err(anyhow!("plugin.magic_cookie_value must not be empty"));
        }
        if self.protocol_version == 0 {
            return Err(anyhow!("plugin.protocol_version must be >= 1"));
        }
        Ok(())
    }
}
