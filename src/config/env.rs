use crate::utils::error::{GenError, Result};
use std::fmt;
use std::str::FromStr;

pub const APP_ENV_VAR: &str = "APP_ENV";

/// Runtime mode, read once at process start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

impl AppEnv {
    /// 讀取 APP_ENV，未設定時視為開發環境
    pub fn from_env() -> Result<Self> {
        Self::from_value(std::env::var(APP_ENV_VAR).ok().as_deref())
    }

    pub fn from_value(value: Option<&str>) -> Result<Self> {
        match value {
            Some(raw) => raw.parse(),
            None => Ok(Self::default()),
        }
    }
}

impl FromStr for AppEnv {
    type Err = GenError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "dev" | "development" => Ok(AppEnv::Development),
            "prod" | "production" => Ok(AppEnv::Production),
            other => Err(GenError::ConfigError {
                message: format!("{}='{}' is not one of: prod, dev", APP_ENV_VAR, other),
            }),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEnv::Development => f.write_str("dev"),
            AppEnv::Production => f.write_str("prod"),
        }
    }
}
