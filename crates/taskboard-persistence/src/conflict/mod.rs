pub mod detector;
pub mod retry;

pub use detector::{check_version, ExpectedVersion};
pub use retry::RetryPolicy;
