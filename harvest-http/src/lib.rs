//! # Harvest HTTP
//!
//! HTTP seam for the drive-harvest workspace.
//!
//! ## Overview
//!
//! This crate provides:
//! - The [`HttpClient`] trait that the auth and drive crates program against
//! - Request/response value types with builder-style construction
//! - [`TransportError`], the typed failure for all remote calls
//! - [`ReqwestHttpClient`], the production implementation
//!
//! Keeping the trait and its single production implementation in one crate is
//! deliberate: there is exactly one host environment, and the trait exists so
//! the higher layers can be tested against mock transports.

pub mod client;
pub mod error;
pub mod http;

pub use client::ReqwestHttpClient;
pub use error::{Result, TransportError};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
