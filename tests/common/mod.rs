#![allow(dead_code)]

pub mod mock_provider;

use std::sync::Arc;

use cdn_invalidate::domain::{Credentials, Target};

pub fn paths(items: &[&str]) -> Arc<[String]> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Target in `us-east-1` with credentials derived from its distribution id
pub fn target(distribution_id: &str, paths: &Arc<[String]>) -> Target {
    Target::new(
        distribution_id,
        "us-east-1",
        Credentials::new(
            format!("AKIA{distribution_id}"),
            format!("secret-{distribution_id}"),
        ),
        Arc::clone(paths),
    )
}

pub fn targets(distribution_ids: &[&str]) -> Vec<Target> {
    let paths = paths(&["/index.html", "/assets/*"]);
    distribution_ids
        .iter()
        .map(|id| target(id, &paths))
        .collect()
}
