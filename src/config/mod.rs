use std::fs;

use log::{debug, trace, LevelFilter};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{config_error, core::StreamResult};

mod opt;

pub use opt::Opt;

#[derive(Default, Debug, Serialize, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    #[serde(default)]
    pub log: Log,

    #[validate(nested)]
    #[serde(default)]
    pub fetch: Fetch,

    #[validate(nested)]
    #[serde(default)]
    pub scheduler: Scheduler,
}

// Config file load and validation
impl Config {
    pub fn load_from_yaml<P>(path: P) -> StreamResult<Self>
    where
        P: AsRef<std::path::Path> + std::fmt::Display,
    {
        let conf_str = fs::read_to_string(&path)
            .map_err(|e| config_error!("Unable to read conf file from {path}: {e}"))?;
        debug!("Conf file read from {path}");
        Self::from_yaml(&conf_str)
    }

    // config entry point: file if given, defaults otherwise, then CLI overrides
    pub fn load_yaml_with_opt_override(opt: &Opt) -> StreamResult<Self> {
        let mut conf = match &opt.conf {
            Some(path) => Self::load_from_yaml(path)?,
            None => Self::default(),
        };
        conf.merge_with_opt(opt);
        conf.validate()
            .map_err(|e| config_error!("Conf validation failed after overrides: {e}"))?;
        Ok(conf)
    }

    pub fn from_yaml(conf_str: &str) -> StreamResult<Self> {
        trace!("Read conf file: {conf_str}");
        let conf: Config = serde_yaml::from_str(conf_str)
            .map_err(|e| config_error!("Unable to parse yaml conf: {e}"))?;

        trace!("Loaded conf: {conf:?}");

        conf.validate()
            .map_err(|e| config_error!("Conf file validation failed: {e}"))?;

        Ok(conf)
    }

    pub fn to_yaml(&self) -> StreamResult<String> {
        serde_yaml::to_string(self).map_err(|e| config_error!("Unable to render yaml conf: {e}"))
    }

    pub fn merge_with_opt(&mut self, opt: &Opt) {
        if let Some(url) = &opt.primary {
            self.fetch.primary_url = url.clone();
        }
        if let Some(url) = &opt.secondary {
            self.fetch.secondary_url = url.clone();
        }
        if opt.verbose {
            self.log.level = LogLevel::Trace;
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct Log {
    #[serde(default)]
    pub level: LogLevel,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct Fetch {
    #[validate(url, custom(function = "Fetch::validate_http_scheme"))]
    #[serde(default = "Fetch::default_primary_url")]
    pub primary_url: String,

    #[validate(url, custom(function = "Fetch::validate_http_scheme"))]
    #[serde(default = "Fetch::default_secondary_url")]
    pub secondary_url: String,

    #[validate(length(min = 1))]
    #[serde(default = "Fetch::default_user_agent")]
    pub user_agent: String,

    #[validate(range(min = 1))]
    pub timeout_secs: Option<u64>,
}

impl Fetch {
    fn default_primary_url() -> String {
        "https://www.rust-lang.org/".to_string()
    }

    fn default_secondary_url() -> String {
        "https://www.example.com/".to_string()
    }

    fn default_user_agent() -> String {
        concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
    }

    fn validate_http_scheme(url: &str) -> Result<(), ValidationError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            let mut err = ValidationError::new("unsupported_scheme");
            err.add_param("url".into(), &url);
            Err(err)
        }
    }
}

impl Default for Fetch {
    fn default() -> Self {
        Self {
            primary_url: Self::default_primary_url(),
            secondary_url: Self::default_secondary_url(),
            user_agent: Self::default_user_agent(),
            timeout_secs: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct Scheduler {
    #[validate(range(min = 1, max = 64))]
    #[serde(default = "Scheduler::default_io_threads")]
    pub io_threads: usize,

    #[validate(length(min = 1))]
    #[serde(default = "Scheduler::default_looper_name")]
    pub looper_name: String,
}

impl Scheduler {
    fn default_io_threads() -> usize {
        4
    }

    fn default_looper_name() -> String {
        "main".to_string()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            io_threads: Self::default_io_threads(),
            looper_name: Self::default_looper_name(),
        }
    }
}
