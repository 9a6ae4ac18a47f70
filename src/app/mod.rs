//! Dioxus fullstack application entry point.
//!
//! The root component installs the session and notification contexts and
//! renders the router. Pages talk to the REST API through [`api`] and fall
//! back to [`demo`] data when the backend is unreachable.

use dioxus::prelude::*;

pub mod api;
pub mod components;
pub mod demo;
pub mod format;
pub mod notify;
pub mod pages;
pub mod session;
pub mod timer;

use notify::use_notifier_provider;
use pages::{AddTraffic, Alerts, Compare, Dashboard, History, Login, Onboarding, Predict, Roads};
use session::use_session_provider;

/// Root app component with routing
#[component]
pub fn App() -> Element {
    use_session_provider();
    use_notifier_provider();

    rsx! {
        Router::<Route> {}
    }
}

/// Application routes
#[derive(Clone, Routable, Debug, PartialEq)]
pub enum Route {
    #[route("/")]
    Login {},
    #[route("/onboarding")]
    Onboarding {},
    #[route("/dashboard")]
    Dashboard {},
    #[route("/predict?:road")]
    Predict { road: String },
    #[route("/history")]
    History {},
    #[route("/add-traffic")]
    AddTraffic {},
    #[route("/alerts")]
    Alerts {},
    #[route("/roads")]
    Roads {},
    #[route("/compare")]
    Compare {},
}
