//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_hosting_api;

pub use http_hosting_api::{DEFAULT_HOSTING_API_BASE_URL, HostingCredentials, HttpHostingApi};
