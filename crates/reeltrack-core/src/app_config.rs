use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Directory holding the JSON-file key-value store.
    pub data_dir: PathBuf,
    /// Optional YAML file with creator handle, linked accounts and payment methods.
    pub creator_path: PathBuf,
    pub tick_interval_secs: u64,
    pub submit_latency_ms: u64,
    pub batch_size: usize,
    pub batch_pacing_ms: u64,
    pub refresh_latency_ms: u64,
    /// Fixed RNG seed for the growth simulator; entropy-seeded when `None`.
    pub sim_seed: Option<u64>,
}
