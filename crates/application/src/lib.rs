//! Application services and ports.

#![forbid(unsafe_code)]

mod cleanup_service;
mod hosting_ports;
mod keepalive_service;

#[cfg(test)]
mod fake_hosting_api;

pub use cleanup_service::{CleanupReport, CleanupService, ServerCleanupReport, calendar_day};
pub use hosting_ports::HostingApi;
pub use keepalive_service::{KeepaliveReport, KeepaliveService};
