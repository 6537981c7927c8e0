//! Authenticated HTTP client for the Supply Chain Management API.
//!
//! The client attaches a bearer token to every request. When a request
//! comes back 401 it refreshes the access token once, retries the
//! original request, and serializes concurrent refreshes so only one
//! refresh call is ever in flight.

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod token;

pub use client::ApiClient;
pub use envelope::Envelope;
pub use error::{ClientError, ClientResult};
pub use token::{StoredTokens, TokenStore};
