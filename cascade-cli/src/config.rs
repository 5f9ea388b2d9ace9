use anyhow::{Context, Result};
use cascade_core::{CascadeConfig, PollConfig};

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub conductor_url: String,
    pub log_level: String,
    pub poll: PollConfig,
}

impl CliConfig {
    pub fn load() -> Result<Self> {
        load_dotenv_files();

        let config = CascadeConfig::load().context(
            "Failed to load Cascade configuration. \n\
             Check ~/.config/cascade/config.toml and CASCADE_* environment variables.",
        )?;

        // plain-variable alias for the nested CASCADE_CONDUCTOR__URL form
        let conductor_url = std::env::var("CASCADE_CONDUCTOR_URL")
            .unwrap_or_else(|_| config.conductor.url.clone());

        let log_level = std::env::var("CASCADE_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| config.logging.level.clone());

        Ok(Self {
            conductor_url,
            log_level,
            poll: PollConfig::from(&config.poll),
        })
    }
}

fn load_dotenv_files() {
    let current_dir = std::env::current_dir().ok();

    let env_paths = [
        current_dir.as_ref().map(|d| d.join(".env")),
        current_dir.as_ref().map(|d| d.join(".env.local")),
        dirs::home_dir().map(|d| d.join(".cascade").join(".env")),
        dirs::config_dir().map(|d| d.join("cascade").join(".env")),
    ];

    for path in env_paths.iter().flatten() {
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
