//! Server configuration, read from flags with environment fallbacks.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Development => f.write_str("development"),
            RunMode::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "server", about = "Categorized todo API server")]
pub struct ServerConfig {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// SQLite file; defaults to `todos.db` in the working directory
    #[arg(long, env = "DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    #[arg(long, env = "APP_ENV", value_enum, default_value_t = RunMode::Development)]
    pub mode: RunMode,

    /// Exported frontend build, only served in production
    #[arg(long, env = "FRONTEND_PATH")]
    pub frontend_path: Option<PathBuf>,

    /// Route prefix for the API; `/api` in production and none in
    /// development unless set
    #[arg(long, env = "API_PREFIX")]
    pub api_prefix: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            database_path: None,
            mode: RunMode::Development,
            frontend_path: None,
            api_prefix: None,
        }
    }
}

impl ServerConfig {
    /// Normalised mount point for the API routes, `None` for the root.
    pub fn api_prefix(&self) -> Option<String> {
        let raw = match (&self.api_prefix, self.mode) {
            (Some(prefix), _) => prefix.as_str(),
            (None, RunMode::Production) => "/api",
            (None, RunMode::Development) => "",
        };

        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(format!("/{}", trimmed))
        }
    }

    pub fn frontend_dir(&self) -> Option<&Path> {
        match self.mode {
            RunMode::Production => self.frontend_path.as_deref(),
            RunMode::Development => None,
        }
    }
}
