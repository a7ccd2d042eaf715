#![recursion_limit = "512"]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod sync;

#[cfg(feature = "csr")]
pub mod app;
#[cfg(feature = "csr")]
pub mod browser;
#[cfg(feature = "csr")]
pub mod components;
#[cfg(feature = "csr")]
pub mod pages;

// Re-export for convenience
pub use config::ClientConfig;
pub use error::{ClientError, Field, Result};

#[cfg(feature = "csr")]
pub use app::App;
