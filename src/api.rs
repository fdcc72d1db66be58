//! JSON-over-HTTP client for the CP Mentor backend.
//!
//! Every call is a `POST` with a JSON body. Endpoints are described by the
//! [`Endpoint`] trait so the transport, the error mapping and the controller can stay
//! generic over the payload type.

use crate::controller::Cancel;
use crate::defaults::{API_BASE, PER_TOPIC, REQUEST_TIMEOUT_MS};
use crate::{AuthResponse, DashboardSnapshot, RecommendationSheet};
use futures::future::{self, Either};
use gloo_timers::future::TimeoutFuture;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, Headers, Request, RequestInit, Response};

/// Shown whenever the backend could not be reached at all.
pub const BACKEND_UNREACHABLE: &str =
    "Cannot reach backend API. Make sure the CP Mentor server is running.";

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Non-2xx answer. `message` is the server's own text when it sent one.
    Server { status: u16, message: String },
    /// The request never produced a response.
    Network(String),
    Timeout { after_ms: u32 },
    /// 2xx answer whose JSON did not match the expected shape.
    Decode(String),
    /// The browser refused to build or send the request.
    Browser(String),
    /// Cancelled by a newer request or by the view going away.
    Aborted,
}

impl ApiError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ApiError::Aborted)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Server { message, .. } => write!(f, "{}", message),
            ApiError::Network(_) => write!(f, "{}", BACKEND_UNREACHABLE),
            ApiError::Timeout { after_ms } => write!(
                f,
                "The backend did not answer within {} seconds",
                after_ms / 1000
            ),
            ApiError::Decode(detail) => write!(f, "Unexpected response from backend: {}", detail),
            ApiError::Browser(detail) => write!(f, "Browser error: {}", detail),
            ApiError::Aborted => write!(f, "Request was cancelled"),
        }
    }
}

impl std::error::Error for ApiError {}

/// One backend route.
pub trait Endpoint {
    const PATH: &'static str;
    /// Fields of an error body checked, in order, for a human-readable message.
    const MESSAGE_FIELDS: &'static [&'static str];
    type Body: Serialize;
    type Payload: DeserializeOwned;

    /// Message used when a failed response carries none of its own.
    fn failure_message(status: u16) -> String;
}

/// Route whose payload belongs to one Codeforces handle.
pub trait UserEndpoint: Endpoint {
    fn body(codeforces_id: &str, force_refresh: bool) -> Self::Body;
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupBody {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "codeforcesId")]
    pub codeforces_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardBody {
    #[serde(rename = "codeforcesId")]
    pub codeforces_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakTopicsBody {
    pub codeforces_id: String,
    pub per_topic: u32,
    pub force_refresh: bool,
}

pub struct Signup;
pub struct Login;
pub struct Dashboard;
pub struct WeakTopics;

const AUTH_MESSAGE_FIELDS: &[&str] = &["message", "detail", "alert"];

impl Endpoint for Signup {
    const PATH: &'static str = "/api/signup";
    const MESSAGE_FIELDS: &'static [&'static str] = AUTH_MESSAGE_FIELDS;
    type Body = SignupBody;
    type Payload = AuthResponse;

    fn failure_message(status: u16) -> String {
        format!(
            "Unable to sign up (HTTP {}). Check backend server logs.",
            status
        )
    }
}

impl Endpoint for Login {
    const PATH: &'static str = "/api/login";
    const MESSAGE_FIELDS: &'static [&'static str] = AUTH_MESSAGE_FIELDS;
    type Body = LoginBody;
    type Payload = AuthResponse;

    fn failure_message(_status: u16) -> String {
        "Invalid email or password".to_string()
    }
}

impl Endpoint for Dashboard {
    const PATH: &'static str = "/api/dashboard";
    const MESSAGE_FIELDS: &'static [&'static str] = &["detail"];
    type Body = DashboardBody;
    type Payload = DashboardSnapshot;

    fn failure_message(status: u16) -> String {
        format!("Unable to load dashboard (HTTP {})", status)
    }
}

impl UserEndpoint for Dashboard {
    fn body(codeforces_id: &str, _force_refresh: bool) -> DashboardBody {
        DashboardBody {
            codeforces_id: codeforces_id.to_owned(),
        }
    }
}

impl Endpoint for WeakTopics {
    const PATH: &'static str = "/api/recommendations/weak-topics";
    const MESSAGE_FIELDS: &'static [&'static str] = &["detail"];
    type Body = WeakTopicsBody;
    type Payload = RecommendationSheet;

    fn failure_message(status: u16) -> String {
        format!("Unable to generate sheet (HTTP {})", status)
    }
}

impl UserEndpoint for WeakTopics {
    fn body(codeforces_id: &str, force_refresh: bool) -> WeakTopicsBody {
        WeakTopicsBody {
            codeforces_id: codeforces_id.to_owned(),
            per_topic: PER_TOPIC,
            force_refresh,
        }
    }
}

/// Cancellation handle backed by the browser's `AbortController`.
#[derive(Clone)]
pub struct AbortHandle(AbortController);

impl AbortHandle {
    pub fn new() -> Result<Self, ApiError> {
        AbortController::new()
            .map(AbortHandle)
            .map_err(|e| ApiError::Browser(describe_js_error(&e)))
    }

    pub fn signal(&self) -> AbortSignal {
        self.0.signal()
    }

    pub fn is_aborted(&self) -> bool {
        self.0.signal().aborted()
    }
}

impl Cancel for AbortHandle {
    fn cancel(&self) {
        self.0.abort();
    }
}

/// Pull a readable message out of an error body.
///
/// FastAPI validation failures put a list of `{"msg": ...}` objects under `detail`;
/// those are joined into one line.
pub fn server_message(body: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match body.get(*field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    })
}

/// Turn a finished HTTP exchange into the endpoint's payload.
///
/// A body is only parsed when the content type says JSON; anything else counts as
/// no payload at all.
pub fn interpret_response<E: Endpoint>(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<Option<E::Payload>, ApiError> {
    let is_json = content_type
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);
    let parsed = is_json.then(|| serde_json::from_str::<Value>(body));

    if !(200..300).contains(&status) {
        let message = parsed
            .and_then(Result::ok)
            .and_then(|v| server_message(&v, E::MESSAGE_FIELDS))
            .unwrap_or_else(|| E::failure_message(status));
        return Err(ApiError::Server { status, message });
    }

    match parsed {
        Some(Ok(value)) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string())),
        Some(Err(e)) => Err(ApiError::Decode(e.to_string())),
        None => Ok(None),
    }
}

/// `POST` `body` to `E::PATH` and decode the answer.
///
/// The request is aborted through `abort` after [`REQUEST_TIMEOUT_MS`].
pub async fn post_json<E: Endpoint>(
    body: &E::Body,
    abort: Option<&AbortHandle>,
) -> Result<Option<E::Payload>, ApiError> {
    let url = format!("{}{}", API_BASE, E::PATH);
    let json = serde_json::to_string(body).map_err(|e| ApiError::Browser(e.to_string()))?;

    let headers = Headers::new().map_err(browser_error)?;
    headers
        .set("Content-Type", "application/json")
        .map_err(browser_error)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&json));
    if let Some(handle) = abort {
        init.set_signal(Some(&handle.signal()));
    }
    let request = Request::new_with_str_and_init(&url, &init).map_err(browser_error)?;

    debug!("POST {}", url);
    let exchange = exchange(request, abort);
    let timer = TimeoutFuture::new(REQUEST_TIMEOUT_MS);
    futures::pin_mut!(exchange, timer);

    match future::select(exchange, timer).await {
        Either::Left((result, _)) => {
            let (status, content_type, text) = result?;
            interpret_response::<E>(status, content_type.as_deref(), &text)
        }
        Either::Right(_) => {
            warn!("POST {} timed out after {} ms", url, REQUEST_TIMEOUT_MS);
            if let Some(handle) = abort {
                handle.cancel();
            }
            Err(ApiError::Timeout {
                after_ms: REQUEST_TIMEOUT_MS,
            })
        }
    }
}

async fn exchange(
    request: Request,
    abort: Option<&AbortHandle>,
) -> Result<(u16, Option<String>, String), ApiError> {
    let aborted = || abort.map(AbortHandle::is_aborted).unwrap_or(false);
    let transport_error = |err: JsValue| {
        if aborted() {
            ApiError::Aborted
        } else {
            let detail = describe_js_error(&err);
            warn!("request failed: {}", detail);
            ApiError::Network(detail)
        }
    };

    let window = gloo_utils::window();
    let value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport_error)?;
    let response: Response = value.dyn_into().map_err(browser_error)?;

    let status = response.status();
    let content_type = response.headers().get("content-type").ok().flatten();
    let text = JsFuture::from(response.text().map_err(browser_error)?)
        .await
        .map_err(transport_error)?
        .as_string()
        .unwrap_or_default();

    Ok((status, content_type, text))
}

fn browser_error(err: JsValue) -> ApiError {
    ApiError::Browser(describe_js_error(&err))
}

fn describe_js_error(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}
