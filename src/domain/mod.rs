mod caller_reference;
mod status;
mod target;

pub use caller_reference::CallerReference;
pub use status::InvalidationStatus;
pub use target::{Credentials, Target};
