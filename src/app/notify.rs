//! Toasts, the loading overlay and the offline banner.
//!
//! One [`Notifier`] lives at the app root; pages grab it with
//! [`use_notifier`] and the layout renders whatever it holds.

use dioxus::core::spawn_forever;
use dioxus::prelude::*;

use super::api::FetchError;
use super::timer::sleep;

/// How long a toast stays on screen.
pub const TOAST_MS: i32 = 4000;

/// Outcome of a fetch once the offline fallback has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Sourced<T> {
    Live(T),
    Demo(T),
    Failed(FetchError),
}

impl<T> Sourced<T> {
    /// `demo` runs only when the backend could not be reached.
    pub fn from_fetch(result: Result<T, FetchError>, demo: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => Self::Live(value),
            Err(e) if e.is_offline() => {
                tracing::warn!("Request failed, using demo data: {}", e);
                Self::Demo(demo())
            }
            Err(e) => {
                tracing::warn!("Request rejected: {}", e);
                Self::Failed(e)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
    Warning,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "\u{2139}",
            Self::Success => "\u{2713}",
            Self::Error => "\u{2715}",
            Self::Warning => "\u{26A0}",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::Info => "toast toast-info",
            Self::Success => "toast toast-success",
            Self::Error => "toast toast-error",
            Self::Warning => "toast toast-warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Clone, Copy, PartialEq)]
pub struct Notifier {
    pub toasts: Signal<Vec<Toast>>,
    /// Overlay message while a blocking request runs
    pub loading: Signal<Option<String>>,
    /// Offline banner visibility
    pub demo: Signal<bool>,
    next_id: Signal<u64>,
}

impl Notifier {
    pub fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        let id = {
            let mut next = self.next_id.write();
            *next += 1;
            *next
        };
        self.toasts.write().push(Toast {
            id,
            kind,
            message: message.into(),
        });

        // Outlives the page that raised it
        let mut toasts = self.toasts;
        spawn_forever(async move {
            sleep(TOAST_MS).await;
            toasts.write().retain(|t| t.id != id);
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.toast(ToastKind::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.toast(ToastKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.toast(ToastKind::Error, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.toast(ToastKind::Warning, message);
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.write().retain(|t| t.id != id);
    }

    pub fn show_loading(&mut self, message: &str) {
        let message = if message.is_empty() { "Loading..." } else { message };
        self.loading.set(Some(message.to_string()));
    }

    pub fn hide_loading(&mut self) {
        self.loading.set(None);
    }

    /// Raise the offline banner (idempotent).
    pub fn demo_mode(&mut self) {
        if !*self.demo.peek() {
            tracing::info!("Backend unreachable, switching to demo data");
            self.demo.set(true);
        }
    }

    /// Report where a page's data came from and hand it over. Offline
    /// fetches raise the banner; other failures become an error toast and
    /// yield nothing.
    pub fn settle<T>(&mut self, sourced: Sourced<T>) -> Option<T> {
        match sourced {
            Sourced::Live(value) => Some(value),
            Sourced::Demo(value) => {
                self.demo_mode();
                Some(value)
            }
            Sourced::Failed(e) => {
                self.error(e.user_message("Request failed."));
                None
            }
        }
    }

    /// Unwrap a fetch result, substituting `demo` data when the backend is
    /// unreachable and an empty value when it rejected the request.
    pub fn or_demo<T: Default>(
        &mut self,
        result: Result<T, FetchError>,
        demo: impl FnOnce() -> T,
    ) -> T {
        self.settle(Sourced::from_fetch(result, demo))
            .unwrap_or_default()
    }

    pub fn dismiss_demo(&mut self) {
        self.demo.set(false);
    }
}

pub fn use_notifier_provider() -> Notifier {
    use_context_provider(|| Notifier {
        toasts: Signal::new(Vec::new()),
        loading: Signal::new(None),
        demo: Signal::new(false),
        next_id: Signal::new(0),
    })
}

pub fn use_notifier() -> Notifier {
    use_context::<Notifier>()
}

/// Renders the toast stack, the loading overlay and the offline banner.
#[component]
pub fn Notifications() -> Element {
    let mut notifier = use_notifier();
    let toasts = notifier.toasts.read().clone();
    let loading = notifier.loading.read().clone();

    rsx! {
        if (notifier.demo)() {
            div { class: "demo-banner",
                span { "\u{26A1} Backend offline \u{2014} showing demo data" }
                button { onclick: move |_| notifier.dismiss_demo(), "\u{00D7}" }
            }
        }

        if let Some(message) = loading {
            div { class: "loading-overlay",
                div { class: "loading-box", aria_busy: "true",
                    p { "{message}" }
                }
            }
        }

        div { class: "toast-container",
            for toast in toasts {
                div { key: "{toast.id}", class: toast.kind.class(),
                    span { class: "toast-icon", "{toast.kind.icon()}" }
                    span { class: "toast-msg", "{toast.message}" }
                    button {
                        class: "toast-close",
                        onclick: move |_| notifier.dismiss(toast.id),
                        "\u{00D7}"
                    }
                }
            }
        }
    }
}
