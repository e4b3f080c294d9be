use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use time::OffsetDateTime;

/// Last millisecond value handed out, so two submissions in the same clock tick still differ
static LAST_ISSUED_MS: AtomicU64 = AtomicU64::new(0);

/// Idempotency token sent with each invalidation request.
///
/// A wall-clock timestamp in milliseconds, bumped forward when needed so that values are
/// strictly increasing within one process. Uniqueness across processes is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerReference(String);

impl CallerReference {
    pub fn generate() -> Self {
        let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64;

        let mut last = LAST_ISSUED_MS.load(Ordering::Relaxed);
        loop {
            let next = now_ms.max(last + 1);
            match LAST_ISSUED_MS.compare_exchange_weak(
                last,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Self(next.to_string()),
                Err(actual) => last = actual,
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
