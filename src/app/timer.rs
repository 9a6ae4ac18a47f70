//! Browser timers and the live clock hook.

use chrono::NaiveDateTime;
use dioxus::prelude::*;

/// Local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Resolve after `ms` milliseconds (browser `setTimeout`).
#[cfg(target_arch = "wasm32")]
pub async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

/// Timers only fire in the browser; server-side renders never wake.
#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(_ms: i32) {
    std::future::pending::<()>().await
}

/// Current time, refreshed every second once hydrated.
///
/// `None` during server rendering so the markup matches on hydration.
pub fn use_clock() -> Signal<Option<NaiveDateTime>> {
    let mut now = use_signal(|| None);
    use_future(move || async move {
        #[cfg(target_arch = "wasm32")]
        now.set(Some(local_now()));
        loop {
            sleep(1000).await;
            now.set(Some(local_now()));
        }
    });
    now
}
