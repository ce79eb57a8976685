mod ugly_url;

pub use ugly_url::{rejection_reason, sanitize_url, validate_url};
