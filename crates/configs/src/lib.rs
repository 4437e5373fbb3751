use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

/// In-memory customer store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Insert the sample customers at start-up.
    #[serde(default = "default_seed_sample_data")]
    pub seed_sample_data: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { seed_sample_data: default_seed_sample_data() }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_seed_sample_data() -> bool { true }

/// Path of the config file: `CONFIG_PATH`, or `config.toml` in the working directory.
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
    /// Strict loader: the file at `path` must exist and parse.
    pub fn load_and_validate(path: &str) -> Result<Self> {
        let mut cfg = load_from_file(path)?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Build configuration purely from environment variables, used when no config file exists.
    /// `SERVER_HOST`, `SERVER_PORT`, `TOKIO_WORKER_THREADS`, `SEED_SAMPLE_DATA`.
    pub fn from_env() -> Self {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        if let Some(seed) = std::env::var("SEED_SAMPLE_DATA").ok().and_then(|v| parse_bool(&v)) {
            cfg.store.seed_sample_data = seed;
        }
        cfg
    }

    /// Config file at `config_path()`, or the environment when that file does not exist.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    /// Only a missing file falls back to the environment; unreadable or malformed files are errors.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        match Self::load_and_validate(path) {
            Ok(cfg) => Ok(cfg),
            Err(e) if is_not_found(&e) => {
                let mut cfg = AppConfig::from_env();
                cfg.normalize_and_validate()?;
                Ok(cfg)
            }
            Err(e) => Err(e.context(format!("config file {path}"))),
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let mut cfg = parse("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert!(cfg.store.seed_sample_data);
    }

    #[test]
    fn parses_sections() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 5000
            worker_threads = 2

            [store]
            seed_sample_data = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.bind_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert!(!cfg.store.seed_sample_data);
    }

    #[test]
    fn normalize_fixes_blank_host_and_zero_threads() {
        let mut cfg = parse("[server]\nhost = \"  \"\nport = 9000\nworker_threads = 0\n").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));
    }

    #[test]
    fn zero_port_rejected() {
        let mut cfg = parse("[server]\nport = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    fn temp_config(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("configs_{}_{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn malformed_file_is_an_error_not_env_fallback() {
        let path = temp_config(
            "malformed",
            "[server]\nport = \"not-a-number\"\n\n[store]\nseed_sample_data = false\n",
        );
        let path_str = path.to_str().unwrap();
        assert!(AppConfig::load_or_env_from(path_str).is_err());

        std::env::set_var("CONFIG_PATH", path_str);
        let res = AppConfig::load_or_env();
        std::env::remove_var("CONFIG_PATH");
        assert!(res.is_err());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn existing_file_wins_and_is_normalized() {
        let path = temp_config("valid", "[server]\nport = 5050\nworker_threads = 0\n\n[store]\nseed_sample_data = false\n");
        let cfg = AppConfig::load_or_env_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 5050);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert!(!cfg.store.seed_sample_data);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_falls_back_to_env_defaults() {
        let path = std::env::temp_dir().join(format!("configs_absent_{}.toml", std::process::id()));
        assert!(AppConfig::load_and_validate(path.to_str().unwrap()).is_err());
        let cfg = AppConfig::load_or_env_from(path.to_str().unwrap()).unwrap();
        assert!(cfg.server.worker_threads.is_some());
    }

    #[test]
    fn bool_parsing() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
