//! Browser-side REST client.
//!
//! Requests go to the same origin under [`API_BASE`]. During server-side
//! rendering there is no network access, so every call stays pending and
//! resources render their loading state until the client hydrates.

use serde::{de::DeserializeOwned, Serialize};

/// Prefix the server mounts the REST router under.
pub const API_BASE: &str = "/api";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (backend offline, CORS, ...)
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Message suitable for a toast.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Whether demo data should stand in for the response. A gateway
    /// status means the server is up but its upstream backend is not.
    /// A body that fails to decode is a real failure, not an outage.
    pub fn is_offline(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => matches!(status, 502..=504),
            Self::Decode(_) => false,
        }
    }
}

fn url(path: &str) -> String {
    format!("{}{}", API_BASE, path)
}

/// Decode a response body, turning `{"error": ...}` bodies into [`FetchError::Status`].
pub fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, FetchError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<flowguard_model::ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_default();
        return Err(FetchError::Status { status, message });
    }
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// GET `path` (relative to [`API_BASE`]) and decode the JSON body.
pub async fn fetch_json<T: DeserializeOwned>(path: &str) -> Result<T, FetchError> {
    let (status, body) = transport::send("GET", &url(path), None).await?;
    decode(status, &body)
}

/// POST `body` as JSON to `path` and decode the JSON reply.
pub async fn post_json<B: Serialize, T: DeserializeOwned>(
    path: &str,
    body: &B,
) -> Result<T, FetchError> {
    let payload = serde_json::to_string(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    let (status, body) = transport::send("POST", &url(path), Some(payload)).await?;
    decode(status, &body)
}

#[cfg(target_arch = "wasm32")]
mod transport {
    use super::FetchError;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Headers, Request, RequestInit, Response};

    fn js_err(e: JsValue) -> FetchError {
        FetchError::Network(format!("{:?}", e))
    }

    pub async fn send(
        method: &str,
        url: &str,
        body: Option<String>,
    ) -> Result<(u16, String), FetchError> {
        let window =
            web_sys::window().ok_or_else(|| FetchError::Network("no window".to_string()))?;

        let init = RequestInit::new();
        init.set_method(method);
        if let Some(body) = body {
            let headers = Headers::new().map_err(js_err)?;
            headers
                .set("Content-Type", "application/json")
                .map_err(js_err)?;
            init.set_headers(&headers);
            init.set_body(&JsValue::from_str(&body));
        }

        let request = Request::new_with_str_and_init(url, &init).map_err(js_err)?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;

        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?
            .as_string()
            .unwrap_or_default();
        Ok((response.status(), text))
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod transport {
    use super::FetchError;

    pub async fn send(
        _method: &str,
        _url: &str,
        _body: Option<String>,
    ) -> Result<(u16, String), FetchError> {
        std::future::pending().await
    }
}
