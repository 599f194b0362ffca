//! Sentinel API Client
//!
//! Typed access to the Sentinel backend.
//!
//! ## Endpoints
//!
//! - `POST /auth/login`, `POST /auth/register`
//! - `GET /auth/profile`, `GET /auth/tenant/api-key`
//! - `POST /upload`
//! - `GET /documents`, `DELETE /documents/{id}`, `GET /download/{id}`
//! - `GET /chatlogs`
//!
//! Every authenticated endpoint takes the [`Session`](crate::session::Session)
//! explicitly; there is no ambient token lookup.

mod dto;
mod error;
mod http;

pub use dto::{
    parse_timestamp, ApiDocument, ChatLogEntry, DocumentQuery, LoginResponse, Profile,
    RegisterResponse,
};
pub use error::{ClientError, ClientResult};
pub use http::{ClientConfig, DashboardApi, SentinelClient, DEFAULT_API_BASE};
