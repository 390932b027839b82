use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// What `load_all` does when the backing file is unreadable or not a
/// valid JSON array. `Recover` rewrites the file to an empty collection;
/// `Fail` surfaces an I/O error to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorruptPolicy {
    #[default]
    Recover,
    Fail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default)]
    pub on_corrupt: CorruptPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_file: default_data_file(), on_corrupt: CorruptPolicy::default() }
    }
}

fn default_data_file() -> String {
    "data/todos.json".to_string()
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

/// Load the config file if present. A missing file is the legitimate
/// optional-config case and yields defaults; a present-but-malformed
/// file is an error and must not be masked.
pub fn load_optional_from_file(path: &str) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(e.into()),
    }
}

pub fn load_optional() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_optional_from_file(&path)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_optional()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env()?;
        self.storage.normalize_from_env()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize_from_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.port = port
                .parse::<u16>()
                .map_err(|_| anyhow!("SERVER_PORT must be a number in 1..=65535"))?;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) || self.worker_threads.is_none() {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    fn normalize_from_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("TODO_DATA_FILE") {
            self.data_file = path;
        }
        if let Ok(policy) = std::env::var("TODO_ON_CORRUPT") {
            self.on_corrupt = match policy.as_str() {
                "recover" => CorruptPolicy::Recover,
                "fail" => CorruptPolicy::Fail,
                other => return Err(anyhow!("TODO_ON_CORRUPT must be 'recover' or 'fail', got '{other}'")),
            };
        }
        if self.data_file.trim().is_empty() {
            return Err(anyhow!("storage.data_file must not be empty"));
        }
        Ok(())
    }
}
