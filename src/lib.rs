pub mod app;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod digest;
pub mod error;
pub mod http;
pub mod pack;
pub mod reconcile;
pub mod resolve;
pub mod runtime;
