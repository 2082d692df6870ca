use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;

/// How a failed variable refresh shows up in the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableErrorPolicy {
    /// Log only; the variable panel keeps its previous contents.
    #[default]
    Silent,
    /// Log and overwrite the status line.
    Status,
}

impl VariableErrorPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "silent" | "log" => Some(Self::Silent),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        let mut cfg = Self::from_file(config_path);
        // Environment variables take precedence over the rc file
        cfg.overlay(env::vars());
        cfg
    }

    fn from_file(config_path: &Path) -> Self {
        let mut map = default_map();

        // Read .cfplrc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        Self { inner: map, config_path: config_path.to_path_buf() }
    }

    fn overlay(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (k, v) in vars {
            if is_config_key(&k) {
                self.inner.insert(k, v);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    /// Command-line flags win over both the rc file and the environment.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn engine_url(&self) -> String {
        self.get("ENGINE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64("REQUEST_TIMEOUT").unwrap_or(30))
    }

    pub fn variable_error_policy(&self) -> VariableErrorPolicy {
        match self.get("VARIABLE_ERRORS") {
            Some(raw) => VariableErrorPolicy::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown VARIABLE_ERRORS value, using silent");
                VariableErrorPolicy::Silent
            }),
            None => VariableErrorPolicy::Silent,
        }
    }

    pub fn default_example(&self) -> String {
        self.get("DEFAULT_EXAMPLE").unwrap_or_else(|| "input".to_string())
    }

    pub fn log_level(&self) -> String {
        self.get("LOG_LEVEL").unwrap_or_else(|| "warn".to_string())
    }

    pub fn log_file(&self) -> PathBuf {
        self.get("LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("cfpl_playground").join("cfpl.log"))
    }
}

pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8000";

fn is_config_key(k: &str) -> bool {
    // Accept known keys or CFPL_* for forward-compat
    const KEYS: &[&str] = &[
        "ENGINE_URL",
        "REQUEST_TIMEOUT",
        "VARIABLE_ERRORS",
        "DEFAULT_EXAMPLE",
        "LOG_LEVEL",
        "LOG_FILE",
    ];

    KEYS.contains(&k) || k.starts_with("CFPL_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("cfpl_playground").join(".cfplrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert("ENGINE_URL".into(), DEFAULT_ENGINE_URL.into());
    m.insert("REQUEST_TIMEOUT".into(), "30".into());
    m.insert("VARIABLE_ERRORS".into(), "silent".into());
    m.insert("DEFAULT_EXAMPLE".into(), "input".into());
    m.insert("LOG_LEVEL".into(), "warn".into());

    m
}
