use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;

const ENV_PREFIX: &str = "LOG_";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file_name: Option<String>,
    pub file_dir: Option<String>,
    pub use_json: bool,
    // console output goes to stderr, stdout may carry chunk records
    pub use_console: bool,
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self {
            level: None,
            file_name: None,
            file_dir: None,
            use_json: false,
            use_console: true,
        }
    }

    fn level_filter(&self) -> LevelFilter {
        self.level
            .as_deref()
            .and_then(|l| tracing::Level::from_str(l).ok())
            .map(LevelFilter::from_level)
            .unwrap_or(LevelFilter::INFO)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_tracing_config_from_env() -> Result<LoggingConfig> {
    envy::prefixed(ENV_PREFIX)
        .from_env::<LoggingConfig>()
        .context("cannot read logging config from env:")
}

pub fn load_tracing_config_from_vars<I>(vars: I) -> Result<LoggingConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    envy::prefixed(ENV_PREFIX)
        .from_iter::<_, LoggingConfig>(vars)
        .context("cannot read logging config from vars:")
}

pub fn tracing_init(conf: LoggingConfig) -> Result<()> {
    let layer = setup_layer_from_logging_config(&conf)?;
    tracing::subscriber::set_global_default(layer).context("setting default subscriber failed")?;
    Ok(())
}

pub fn tracing_init_from_env() -> Result<()> {
    match load_tracing_config_from_env() {
        Ok(conf) => tracing_init(conf),
        Err(e) => {
            eprintln!("failed to load logging config from env: {:?}", e);
            Err(e)
        }
    }
}

fn create_log_file(conf: &LoggingConfig) -> Result<Option<Arc<File>>> {
    let Some(file_name) = conf.file_name.as_deref() else {
        return Ok(None);
    };
    let dir = match conf.file_dir.as_deref() {
        Some(d) => PathBuf::from(d),
        None => env::current_dir().context("cannot resolve current directory")?,
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create log file directory {:?}", dir.as_os_str()))?;
    let path = dir.join(file_name);
    let file = File::create(&path)
        .with_context(|| format!("create log file to {:?}", path.as_os_str()))?;
    Ok(Some(Arc::new(file)))
}

pub fn setup_layer_from_logging_config(
    conf: &LoggingConfig,
) -> Result<Box<dyn Subscriber + Send + Sync + 'static>> {
    // RUST_LOG directives win over the configured level
    let env_filter = EnvFilter::builder()
        .with_default_directive(conf.level_filter().into())
        .from_env_lossy();
    let log_file = create_log_file(conf)?;

    let subscriber = Box::new(
        tracing_subscriber::registry()
            .with(env_filter)
            .with(match log_file.clone() {
                // for json case
                Some(f) if conf.use_json => Some(Layer::new().with_writer(f).with_ansi(false).json()),
                _ => None,
            })
            .with(match log_file {
                // for not json case
                Some(f) if !conf.use_json => Some(Layer::new().with_writer(f).with_ansi(false)),
                _ => None,
            })
            .with(if !conf.use_json && conf.use_console {
                Some(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
            } else {
                None
            })
            .with(if conf.use_json && conf.use_console {
                Some(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
            } else {
                None
            }),
    );
    Ok(subscriber)
}

// for simple stderr logging
pub fn tracing_init_test(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
