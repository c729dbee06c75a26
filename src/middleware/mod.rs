pub mod auth;
pub mod ratelimit;

pub use auth::AdminAuth;
pub use ratelimit::admin_rate_limit_config;
