//! Layout component wrapping all pages with Pico CSS and common elements.

use dioxus::prelude::*;

use super::nav::Nav;
use super::theme::{ThemeSwitcher, THEME_SCRIPT};
use crate::app::notify::Notifications;
use crate::app::session::use_session;
use crate::app::Route;

/// CSS styles for the application (extends Pico CSS).
const CUSTOM_STYLES: &str = r#"
:root { --pico-font-size: 15px; }
small { color: var(--pico-muted-color); }
.text-muted { color: var(--pico-muted-color); }
.navbar-brand { display: flex; align-items: center; gap: .4rem; text-decoration: none; letter-spacing: .08em; }
.navbar-city { font-size: .85rem; padding: .25rem .6rem; border-radius: 999px; border: 1px solid var(--pico-muted-border-color); text-decoration: none; }
.navbar-avatar { width: 2rem; height: 2rem; border-radius: 50%; display: inline-flex; align-items: center; justify-content: center; background: var(--pico-primary-background); color: var(--pico-primary-inverse); font-weight: 700; }
.navbar-user { display: flex; align-items: center; gap: .4rem; }
.navbar-logout { margin: 0; padding: .3rem .7rem; font-size: .8rem; }
.page-header { display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 1.5rem; }
.page-clock { font-family: monospace; color: var(--pico-muted-color); }
.stat-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(170px, 1fr)); gap: 1rem; margin-bottom: 1.5rem; }
.stat-tile { display: flex; gap: .8rem; align-items: center; margin: 0; }
.stat-icon { font-size: 1.6rem; }
.stat-value { font-size: 1.4rem; font-weight: 700; }
.chart-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(360px, 1fr)); gap: 1rem; }
.chart svg { display: block; }
.chart.doughnut { display: flex; align-items: center; gap: 1rem; }
.chart-legend { display: flex; flex-wrap: wrap; gap: .8rem; font-size: .8rem; margin-top: .4rem; }
.legend-item { display: inline-flex; align-items: center; gap: .3rem; }
.legend-swatch { width: .7rem; height: .7rem; border-radius: 2px; display: inline-block; }
.badge { display: inline-block; padding: .1rem .5rem; border-radius: 999px; font-size: .75rem; font-weight: 600; white-space: nowrap; }
.heatmap { display: grid; grid-template-columns: repeat(12, 1fr); gap: 4px; }
.heat-cell { border-radius: 4px; padding: .5rem 0; text-align: center; font-size: .7rem; }
.empty-state { text-align: center; padding: 2rem 1rem; color: var(--pico-muted-color); }
.empty-icon { font-size: 2rem; }
.chips { display: flex; flex-wrap: wrap; gap: .5rem; margin-bottom: 1rem; }
.chip { margin: 0; padding: .3rem .9rem; font-size: .85rem; border-radius: 999px; }
.chip.active { background: var(--pico-primary-background); color: var(--pico-primary-inverse); }
.road-card { cursor: pointer; display: flex; justify-content: space-between; align-items: center; }
.road-num { font-family: monospace; color: var(--pico-muted-color); margin-right: .6rem; }
.alert-item { border-left: 4px solid; padding-left: 1rem; }
.alert-card { display: flex; gap: 1rem; align-items: flex-start; border-left: 4px solid; padding: .75rem 1rem; margin-bottom: .75rem; background: var(--pico-card-sectioning-background-color); border-radius: 6px; }
.alert-row { display: flex; gap: .75rem; align-items: center; padding: .5rem 0; border-bottom: 1px solid var(--pico-muted-border-color); }
.alert-dot { width: 10px; height: 10px; border-radius: 50%; flex-shrink: 0; }
.toolbar { display: flex; gap: .75rem; align-items: center; flex-wrap: wrap; margin-bottom: 1rem; }
.toolbar input { margin: 0; flex: 1; min-width: 12rem; }
.compare-metric { display: flex; justify-content: space-between; padding: .35rem 0; border-bottom: 1px solid var(--pico-muted-border-color); }
.pager { display: flex; gap: .5rem; align-items: center; justify-content: flex-end; }
.pager button { margin: 0; padding: .25rem .7rem; }
.steps { display: flex; gap: .5rem; margin-bottom: 1rem; }
.step { flex: 1; height: 4px; border-radius: 2px; background: var(--pico-muted-border-color); }
.step.done { background: var(--pico-primary-background); }
.demo-banner { position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 50; display: flex; gap: 1rem; align-items: center; padding: .5rem 1rem; border-radius: 8px; background: rgba(245,158,11,.15); border: 1px solid #f59e0b; color: #f59e0b; }
.demo-banner button { margin: 0; padding: 0 .5rem; background: none; border: none; color: inherit; }
.loading-overlay { position: fixed; inset: 0; z-index: 60; display: flex; align-items: center; justify-content: center; background: rgba(0,0,0,.45); }
.loading-box { padding: 1.5rem 2rem; border-radius: 8px; background: var(--pico-card-background-color); }
.toast-container { position: fixed; top: 1rem; right: 1rem; z-index: 70; display: flex; flex-direction: column; gap: .5rem; }
.toast { display: flex; gap: .6rem; align-items: center; min-width: 260px; padding: .6rem .9rem; border-radius: 8px; background: var(--pico-card-background-color); border-left: 4px solid; box-shadow: 0 4px 14px rgba(0,0,0,.25); }
.toast-info { border-color: #3b82f6; }
.toast-success { border-color: #22c55e; }
.toast-error { border-color: #ef4444; }
.toast-warning { border-color: #f59e0b; }
.toast-msg { flex: 1; }
.toast-close { margin: 0; padding: 0 .4rem; background: none; border: none; color: inherit; }
/* Theme switcher */
.theme-switcher { display: flex; gap: 0.25rem; }
.theme-switcher button { padding: 0.25rem 0.5rem; font-size: 0.8rem; margin: 0; }
.theme-switcher button.active { background: var(--pico-primary-background); color: var(--pico-primary-inverse); }
"#;

#[derive(Props, Clone, PartialEq)]
pub struct LayoutProps {
    /// Page title (shown in browser tab)
    pub title: String,
    /// Active navigation item ID
    pub nav_active: String,
    /// Page content
    pub children: Element,
    /// Redirect to the sign-in page when nobody is signed in
    #[props(default = true)]
    pub protected: bool,
    /// Show the top navigation bar
    #[props(default = true)]
    pub show_nav: bool,
}

/// Main layout component wrapping all pages.
#[component]
pub fn Layout(props: LayoutProps) -> Element {
    let version = env!("CARGO_PKG_VERSION");
    let full_title = format!("{} - FlowGuard", props.title);
    let session = use_session();
    let nav = use_navigator();

    // Auth guard, evaluated once the stored session has been read
    let protected = props.protected;
    use_effect(move || {
        let s = session.read();
        if protected && s.loaded && !s.is_signed_in() {
            tracing::debug!("No session, redirecting to sign-in");
            let _ = nav.replace(Route::Login {});
        }
    });

    rsx! {
        // Head elements - Dioxus hoists these to the real <head>
        document::Title { "{full_title}" }
        document::Link { rel: "stylesheet", href: "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css" }
        document::Style { {CUSTOM_STYLES} }
        // Theme init runs immediately (no DOM needed) to prevent flash
        document::Script { {THEME_SCRIPT} }

        // Body content
        if props.show_nav {
            header { class: "container",
                Nav { active: props.nav_active.clone() }
            }
        }
        main { class: "container",
            {props.children}
        }
        footer {
            class: "container",
            style: "display:flex;justify-content:space-between;align-items:center;",
            small { "FlowGuard v{version}" }
            ThemeSwitcher {}
        }
        Notifications {}
    }
}
