use std::{fmt, sync::Arc};

use uuid::Uuid;

/// Access key pair for one target's account. `Debug` never prints the values.
#[derive(Clone)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &"***")
            .field("secret_access_key", &"***")
            .finish()
    }
}

/// One unit of invalidation work: a distribution reached with its own credentials and region.
#[derive(Debug, Clone)]
pub struct Target {
    trace_id: Uuid,
    distribution_id: String,
    region: String,
    credentials: Credentials,
    paths: Arc<[String]>,
}

impl Target {
    /// Builds a target with a freshly generated trace id
    pub fn new(
        distribution_id: impl Into<String>,
        region: impl Into<String>,
        credentials: Credentials,
        paths: Arc<[String]>,
    ) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            distribution_id: distribution_id.into(),
            region: region.into(),
            credentials,
            paths,
        }
    }

    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    pub fn distribution_id(&self) -> &str {
        &self.distribution_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}
