//! Page components, one per route.

mod add_traffic;
mod alerts;
mod compare;
mod dashboard;
mod history;
mod login;
mod onboarding;
mod predict;
mod roads;

pub use add_traffic::AddTraffic;
pub use alerts::Alerts;
pub use compare::Compare;
pub use dashboard::Dashboard;
pub use history::History;
pub use login::Login;
pub use onboarding::Onboarding;
pub use predict::Predict;
pub use roads::Roads;
