//! Application services - the refresh pipeline and the dashboard

pub mod dashboard;
pub mod poller;

pub use dashboard::Dashboard;
pub use poller::{Poller, PollerHandle, PollerRequest, PollerResponse};
