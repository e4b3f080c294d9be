use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::{
        AWS_ACCESS_KEY_IDS_ENV, AWS_REGIONS_ENV, AWS_SECRET_ACCESS_KEYS_ENV, DISTRIBUTION_IDS_ENV,
        PATHS_ENV, RawInputs,
    },
    domain::{Credentials, Target},
    redact::Redactor,
};

/// Ceiling on distributions x paths per run, keeps provider costs bounded
pub const MAX_INVALIDATION_UNITS: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{0} is not set in environment")]
    Missing(&'static str),
    #[error("{field} has an empty item at position {index}")]
    EmptyItem { field: &'static str, index: usize },
    #[error(
        "invalidating {distributions} distributions x {paths} paths exceeds the limit of {limit} per run"
    )]
    QuotaExceeded {
        distributions: usize,
        paths: usize,
        limit: usize,
    },
    #[error("{field} has {actual} items, expected {expected} (one per distribution)")]
    CountMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl ResolveError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    /// Input the error is about, if it concerns a single one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Missing(field) => Some(*field),
            Self::EmptyItem { field, .. } => Some(*field),
            Self::CountMismatch { field, .. } => Some(*field),
            Self::QuotaExceeded { .. } => None,
        }
    }
}

fn require<'a>(raw: &'a Option<String>, field: &'static str) -> Result<&'a str, ResolveError> {
    raw.as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ResolveError::Missing(field))
}

fn split(raw: &str) -> Vec<String> {
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

fn ensure_no_empty(items: &[String], field: &'static str) -> Result<(), ResolveError> {
    match items.iter().position(|item| item.is_empty()) {
        Some(index) => Err(ResolveError::EmptyItem { field, index }),
        None => Ok(()),
    }
}

fn ensure_count(items: &[String], field: &'static str, expected: usize) -> Result<(), ResolveError> {
    if items.len() != expected {
        return Err(ResolveError::CountMismatch {
            field,
            expected,
            actual: items.len(),
        });
    }
    Ok(())
}

/// Validates raw inputs and builds one [`Target`] per distribution.
///
/// Credentials are registered with `redactor` as soon as they are split, before any
/// other check can fail.
#[tracing::instrument(name = "resolver::resolve", skip_all)]
pub fn resolve(raw: &RawInputs, redactor: &Redactor) -> Result<Vec<Target>, ResolveError> {
    let distribution_ids = require(&raw.distribution_ids, DISTRIBUTION_IDS_ENV)?;
    let paths = require(&raw.paths, PATHS_ENV)?;
    let regions = require(&raw.aws_regions, AWS_REGIONS_ENV)?;
    let access_key_ids = require(&raw.aws_access_key_ids, AWS_ACCESS_KEY_IDS_ENV)?;
    let secret_access_keys = require(&raw.aws_secret_access_keys, AWS_SECRET_ACCESS_KEYS_ENV)?;

    let distribution_ids = split(distribution_ids);
    let paths = split(paths);
    let regions = split(regions);
    let access_key_ids = split(access_key_ids);
    let secret_access_keys = split(secret_access_keys);

    for secret in access_key_ids.iter().chain(secret_access_keys.iter()) {
        redactor.register(secret);
    }

    ensure_no_empty(&distribution_ids, DISTRIBUTION_IDS_ENV)?;
    ensure_no_empty(&paths, PATHS_ENV)?;
    ensure_no_empty(&regions, AWS_REGIONS_ENV)?;
    ensure_no_empty(&access_key_ids, AWS_ACCESS_KEY_IDS_ENV)?;
    ensure_no_empty(&secret_access_keys, AWS_SECRET_ACCESS_KEYS_ENV)?;

    let n = distribution_ids.len();
    if n * paths.len() > MAX_INVALIDATION_UNITS {
        return Err(ResolveError::QuotaExceeded {
            distributions: n,
            paths: paths.len(),
            limit: MAX_INVALIDATION_UNITS,
        });
    }

    ensure_count(&regions, AWS_REGIONS_ENV, n)?;
    ensure_count(&access_key_ids, AWS_ACCESS_KEY_IDS_ENV, n)?;
    ensure_count(&secret_access_keys, AWS_SECRET_ACCESS_KEYS_ENV, n)?;

    tracing::info!(
        distributions = n,
        paths = paths.len(),
        "Resolved invalidation targets"
    );

    let paths: Arc<[String]> = paths.into();
    let targets = distribution_ids
        .into_iter()
        .zip(regions)
        .zip(access_key_ids.into_iter().zip(secret_access_keys))
        .map(|((distribution_id, region), (access_key_id, secret_access_key))| {
            Target::new(
                distribution_id,
                region,
                Credentials::new(access_key_id, secret_access_key),
                Arc::clone(&paths),
            )
        })
        .collect();

    Ok(targets)
}
