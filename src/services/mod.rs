pub mod admin;
pub mod click;
pub mod health;
pub mod link_health;
pub mod redirect;
pub mod resolver;

pub use admin::{admin_routes, AdminService};
pub use click::ClickRecorder;
pub use health::{AppStartTime, HealthService};
pub use link_health::{DeactivatedOffer, HttpProbe, LinkHealthService, LinkProbe, ProbeOutcome};
pub use redirect::RedirectService;
pub use resolver::Resolver;
