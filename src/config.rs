use std::{env::VarError, time::Duration};

use anyhow::{Result, anyhow, bail};
use config::{Config, File};
use serde::Deserialize;

use crate::orchestrator::DEFAULT_POLL_DELAY;

const DEFAULT_CONFIG_PATH: &str = "invalidate.yml";

pub const DISTRIBUTION_IDS_ENV: &str = "DISTRIBUTION_IDS";
pub const PATHS_ENV: &str = "PATHS";
pub const AWS_REGIONS_ENV: &str = "AWS_REGIONS";
pub const AWS_ACCESS_KEY_IDS_ENV: &str = "AWS_ACCESS_KEY_IDS";
pub const AWS_SECRET_ACCESS_KEYS_ENV: &str = "AWS_SECRET_ACCESS_KEYS";
pub const DELAY_ENV: &str = "DELAY";
pub const MAX_POLL_ATTEMPTS_ENV: &str = "MAX_POLL_ATTEMPTS";

/// Comma-separated inputs exactly as configured. Validation happens in the resolver.
///
/// Deliberately not `Debug`: two of the fields hold secrets.
#[derive(Clone, Default)]
pub struct RawInputs {
    pub distribution_ids: Option<String>,
    pub paths: Option<String>,
    pub aws_regions: Option<String>,
    pub aws_access_key_ids: Option<String>,
    pub aws_secret_access_keys: Option<String>,
}

impl RawInputs {
    fn is_complete(&self) -> bool {
        self.distribution_ids.is_some()
            && self.paths.is_some()
            && self.aws_regions.is_some()
            && self.aws_access_key_ids.is_some()
            && self.aws_secret_access_keys.is_some()
    }
}

pub struct Settings {
    pub inputs: RawInputs,
    pub delay: Duration,
    /// `None` keeps polling until the provider reports a terminal status
    pub max_poll_attempts: Option<u32>,
}

#[derive(Default, Deserialize)]
struct FileConfig {
    distribution_ids: Option<String>,
    paths: Option<String>,
    aws_regions: Option<String>,
    aws_access_key_ids: Option<String>,
    aws_secret_access_keys: Option<String>,
    delay: Option<u64>,
    max_poll_attempts: Option<u32>,
}

fn load_file_config(path: &str) -> Result<FileConfig> {
    let settings = Config::builder()
        .add_source(File::with_name(path).required(false))
        .build()
        .map_err(|_| anyhow!("Failed to read config file"))?;

    settings
        .try_deserialize::<FileConfig>()
        .map_err(|_| anyhow!("Failed to deserialize config file"))
}

/// Try to parse env variable. If it's not set, return None. If it's invalid, treat it as an error.
fn try_from_env<L, T, F>(lookup: &L, env_var: &str, f: F) -> Result<Option<T>>
where
    L: Fn(&str) -> Result<String, VarError>,
    F: FnOnce(String) -> Result<T>,
{
    match lookup(env_var) {
        Ok(raw) => {
            let val = f(raw).map_err(|_| anyhow!("Failed to parse {}", env_var))?;
            Ok(Some(val))
        }
        Err(VarError::NotPresent) => Ok(None),
        Err(_) => bail!("Could not read {env_var} from env"),
    }
}

/// Wraps `lookup` so that a blank value counts as not set
fn non_blank<L>(lookup: L) -> impl Fn(&str) -> Result<String, VarError>
where
    L: Fn(&str) -> Result<String, VarError>,
{
    move |key| match lookup(key) {
        Ok(raw) if raw.trim().is_empty() => Err(VarError::NotPresent),
        other => other,
    }
}

fn raw_input<L>(lookup: &L, env_var: &str) -> Result<Option<String>>
where
    L: Fn(&str) -> Result<String, VarError>,
{
    try_from_env(lookup, env_var, Ok)
}

/// Polling always makes at least one status check
fn check_poll_limit(max_poll_attempts: Option<u32>) -> Result<Option<u32>> {
    if max_poll_attempts == Some(0) {
        bail!("{MAX_POLL_ATTEMPTS_ENV} must be at least 1");
    }
    Ok(max_poll_attempts)
}

fn delay(delay_ms: Option<u64>) -> Duration {
    delay_ms.map_or(DEFAULT_POLL_DELAY, Duration::from_millis)
}

fn or_from_file<T>(value: Option<T>, from_file: Option<T>, env_var: &str, path: &str) -> Option<T> {
    if value.is_some() {
        return value;
    }
    if from_file.is_some() {
        tracing::warn!("{env_var} is not set, using value from {path}");
    }
    from_file
}

/// Load configuration from env with fallback to the optional config file.
pub fn load() -> Result<Settings> {
    load_from(|key| std::env::var(key), DEFAULT_CONFIG_PATH)
}

/// Same as [`load`], reading variables through `lookup` and falling back to the file at `path`.
/// Early returns if every input is set in env.
pub fn load_from<L>(lookup: L, path: &str) -> Result<Settings>
where
    L: Fn(&str) -> Result<String, VarError>,
{
    let lookup = non_blank(lookup);

    let inputs = RawInputs {
        distribution_ids: raw_input(&lookup, DISTRIBUTION_IDS_ENV)?,
        paths: raw_input(&lookup, PATHS_ENV)?,
        aws_regions: raw_input(&lookup, AWS_REGIONS_ENV)?,
        aws_access_key_ids: raw_input(&lookup, AWS_ACCESS_KEY_IDS_ENV)?,
        aws_secret_access_keys: raw_input(&lookup, AWS_SECRET_ACCESS_KEYS_ENV)?,
    };

    let delay_ms: Option<u64> = try_from_env(&lookup, DELAY_ENV, |env_str| {
        env_str.trim().parse::<u64>().map_err(|e| e.into())
    })?;

    let max_poll_attempts: Option<u32> = try_from_env(&lookup, MAX_POLL_ATTEMPTS_ENV, |env_str| {
        env_str.trim().parse::<u32>().map_err(|e| e.into())
    })?;

    if inputs.is_complete() {
        return Ok(Settings {
            inputs,
            delay: delay(delay_ms),
            max_poll_attempts: check_poll_limit(max_poll_attempts)?,
        });
    }

    let file = load_file_config(path)?;

    let inputs = RawInputs {
        distribution_ids: or_from_file(
            inputs.distribution_ids,
            file.distribution_ids,
            DISTRIBUTION_IDS_ENV,
            path,
        ),
        paths: or_from_file(inputs.paths, file.paths, PATHS_ENV, path),
        aws_regions: or_from_file(
            inputs.aws_regions,
            file.aws_regions,
            AWS_REGIONS_ENV,
            path,
        ),
        aws_access_key_ids: or_from_file(
            inputs.aws_access_key_ids,
            file.aws_access_key_ids,
            AWS_ACCESS_KEY_IDS_ENV,
            path,
        ),
        aws_secret_access_keys: or_from_file(
            inputs.aws_secret_access_keys,
            file.aws_secret_access_keys,
            AWS_SECRET_ACCESS_KEYS_ENV,
            path,
        ),
    };
    let delay_ms = or_from_file(delay_ms, file.delay, DELAY_ENV, path);
    let max_poll_attempts = or_from_file(
        max_poll_attempts,
        file.max_poll_attempts,
        MAX_POLL_ATTEMPTS_ENV,
        path,
    );

    Ok(Settings {
        inputs,
        delay: delay(delay_ms),
        max_poll_attempts: check_poll_limit(max_poll_attempts)?,
    })
}
