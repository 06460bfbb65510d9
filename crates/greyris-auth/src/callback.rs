//! One-shot local callback server for the OAuth redirect.
//!
//! `build_callback_router` is public so the scenario tests in `tests/` can
//! drive the bare router without binding a socket.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use reqwest::Url;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::AuthError;

type Outcome = Result<String, AuthError>;

/// Query string Spotify appends to the redirect URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Shared state of one pending authorization. The sender is taken by the
/// first callback, so only one outcome is ever delivered.
#[derive(Debug)]
pub struct CallbackState {
    expected_state: String,
    tx: Mutex<Option<oneshot::Sender<Outcome>>>,
}

impl CallbackState {
    pub fn new(expected_state: impl Into<String>) -> (Arc<Self>, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let st = Arc::new(Self {
            expected_state: expected_state.into(),
            tx: Mutex::new(Some(tx)),
        });
        (st, rx)
    }

    fn take_sender(&self) -> Option<oneshot::Sender<Outcome>> {
        self.tx.lock().ok().and_then(|mut g| g.take())
    }
}

/// Router with a single GET handler on `path`.
pub fn build_callback_router(path: &str, state: Arc<CallbackState>) -> Router {
    Router::new()
        .route(path, get(callback))
        .with_state(state)
}

fn evaluate(expected_state: &str, params: CallbackParams) -> Outcome {
    if params.state.as_deref() != Some(expected_state) {
        return Err(AuthError::StateMismatch);
    }
    if let Some(reason) = params.error {
        return Err(AuthError::Denied(reason));
    }
    params.code.ok_or(AuthError::MissingCode)
}

pub(crate) async fn callback(
    State(st): State<Arc<CallbackState>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(tx) = st.take_sender() else {
        return (
            StatusCode::GONE,
            Html("<h1>Authorization already handled</h1>"),
        )
            .into_response();
    };

    let outcome = evaluate(&st.expected_state, params);
    let page = match &outcome {
        Ok(_) => (
            StatusCode::OK,
            Html("<h1>Login Completed!</h1><h3>You can close this page</h3>".to_string()),
        ),
        Err(AuthError::StateMismatch) => (
            StatusCode::FORBIDDEN,
            Html("<h1>Couldn't get token</h1><h3>State mismatch</h3>".to_string()),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Html(format!(
                "<h1>Couldn't get token</h1><h3>{}</h3>",
                escape_html(&e.to_string())
            )),
        ),
    };

    // Receiver gone means the wait already ended (timeout/cancel).
    let _ = tx.send(outcome);
    page.into_response()
}

/// The provider's `error` parameter ends up in the page.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Listener bound to the redirect URL's host and port.
#[derive(Debug)]
pub struct CallbackServer {
    listener: TcpListener,
    path: String,
}

impl CallbackServer {
    /// Bind the redirect URL. `localhost` binds the IPv4 loopback; port 0
    /// picks a free port (tests).
    pub async fn bind(redirect_url: &str) -> Result<Self, AuthError> {
        let url = Url::parse(redirect_url).map_err(|e| AuthError::InvalidRedirect(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(AuthError::InvalidRedirect(format!(
                "scheme must be http, got {}",
                url.scheme()
            )));
        }
        let host = match url.host_str() {
            Some("localhost") => "127.0.0.1",
            Some(h) => h,
            None => return Err(AuthError::InvalidRedirect("missing host".to_string())),
        };
        let port = url.port_or_known_default().unwrap_or(80);

        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| AuthError::Bind(format!("{host}:{port}: {e}")))?;

        let path = match url.path() {
            "" => "/".to_string(),
            p => p.to_string(),
        };
        Ok(Self { listener, path })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AuthError> {
        self.listener
            .local_addr()
            .map_err(|e| AuthError::Bind(e.to_string()))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Serve until the first callback, `timeout`, or `cancel` completes,
    /// whichever comes first. The server is shut down before returning.
    pub async fn wait<C>(self, expected_state: &str, timeout: Duration, cancel: C) -> Outcome
    where
        C: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        let (st, rx) = CallbackState::new(expected_state);
        let app = build_callback_router(&self.path, st).layer(TraceLayer::new_for_http());

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = stop_rx.await;
                })
                .await
        });
        info!("waiting for authorization callback on http://{}", addr);

        let outcome = tokio::select! {
            r = rx => r.unwrap_or(Err(AuthError::Cancelled)),
            _ = tokio::time::sleep(timeout) => Err(AuthError::Timeout { secs: timeout.as_secs() }),
            _ = cancel => Err(AuthError::Cancelled),
        };

        let _ = stop_tx.send(());
        match tokio::time::timeout(Duration::from_secs(5), server).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => warn!(error = %e, "callback server error"),
            Ok(Err(e)) => warn!(error = %e, "callback server task failed"),
            Err(_) => warn!("callback server did not shut down in time"),
        }

        outcome
    }
}
