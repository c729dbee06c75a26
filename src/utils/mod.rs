pub mod url;

pub use url::{apply_utm, transform_outbound, validate_url, wrap_affiliate};
