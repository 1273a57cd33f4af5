use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        api_base_url: get_env_or_default("SEARCH_API_URL", DEFAULT_API_URL),
        log_file: get_env_opt("GLEANER_LOG_FILE").map(PathBuf::from),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub log_file: Option<PathBuf>,
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_env_opt(key).unwrap_or_else(|| default.to_string())
}
