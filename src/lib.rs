//! FlowGuard - road-traffic telemetry dashboard
//!
//! This library provides:
//! - A REST API for roads, traffic readings, analytics and predictions
//! - An embedded backend (in-memory tables with JSON snapshots and a demo seed)
//! - A remote backend forwarding to an external service with the same contract
//! - Web UI (Dioxus fullstack, hydrated in the browser)

// =============================================================================
// Lints - Enforce code quality and consistency
// =============================================================================

// Deny truly dangerous patterns (these will fail the build)
#![deny(unsafe_code)]
#![deny(unused_must_use)]

// Dioxus UI app (shared between server SSR and WASM client)
pub mod app;

// Server-only modules (excluded from WASM build)
#[cfg(feature = "server")]
pub mod analytics;
#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod backend;
#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod predict;
#[cfg(feature = "server")]
pub mod store;
