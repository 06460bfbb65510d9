//! greyris-auth
//!
//! Spotify OAuth2 authorization-code flow.
//!
//! - [`Authenticator`] builds the authorize URL and talks to the token
//!   endpoint (code exchange, refresh).
//! - [`CallbackServer`] is a one-shot local HTTP server on the redirect URL.
//!   Waiting for the browser is a single call with a timeout and a caller
//!   supplied cancellation future.
//!
//! Persisting the token is the caller's job; [`Token`] is serde-ready.

mod authenticator;
mod callback;
mod error;
mod token;

pub use authenticator::{new_state, Authenticator, SCOPES};
pub use callback::{build_callback_router, CallbackParams, CallbackServer, CallbackState};
pub use error::AuthError;
pub use token::Token;
