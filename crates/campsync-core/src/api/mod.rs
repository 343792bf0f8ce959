//! HTTP client for the remote camp document endpoint.
//!
//! The endpoint is an opaque key-value store holding exactly one document:
//! `GET /camp` returns it and `POST /camp` replaces it. Only the status code
//! of a save is consulted.

pub mod client;
pub mod error;

pub use client::DocumentClient;
pub use error::ApiError;
