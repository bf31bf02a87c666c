//! JSON-over-HTTP client shared by the catalog clients.

mod client;

pub use client::{HttpClient, status_of};
