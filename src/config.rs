use std::path::PathBuf;

use getset::Getters;
use thiserror::Error;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_DB_PATH: &str = "inventory.db";
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing value for --log-dir")]
    MissingLogDir,
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
}

#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Config {
    data_dir: PathBuf,
    db_path: PathBuf,
    log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl Config {
    /// `[data_dir] [db_path] [--log-dir <dir>]`
    pub fn for_loader(args: &[String]) -> Result<Config, ConfigError> {
        let (positional, mut config) = Config::split_log_dir(args)?;

        let mut positional = positional.into_iter();
        if let Some(data_dir) = positional.next() {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(db_path) = positional.next() {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(extra) = positional.next() {
            return Err(ConfigError::UnexpectedArgument(extra));
        }

        Ok(config)
    }

    /// `[db_path] [--log-dir <dir>]`
    pub fn for_summary(args: &[String]) -> Result<Config, ConfigError> {
        let (positional, mut config) = Config::split_log_dir(args)?;

        let mut positional = positional.into_iter();
        if let Some(db_path) = positional.next() {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(extra) = positional.next() {
            return Err(ConfigError::UnexpectedArgument(extra));
        }

        Ok(config)
    }

    pub fn log_file(&self, file_name: &str) -> PathBuf {
        self.log_dir.join(file_name)
    }

    fn split_log_dir(args: &[String]) -> Result<(Vec<String>, Config), ConfigError> {
        let mut config = Config::default();
        let mut positional = Vec::new();

        let mut args = args.iter();
        while let Some(arg) = args.next() {
            if arg == "--log-dir" {
                let dir = args.next().ok_or(ConfigError::MissingLogDir)?;
                config.log_dir = PathBuf::from(dir);
            } else {
                positional.push(arg.clone());
            }
        }

        Ok((positional, config))
    }
}
