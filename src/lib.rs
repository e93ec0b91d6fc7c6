//! Edge handlers and stack declaration for a static website served from a bucket
//! behind a CDN, with security headers added to every page response.

#[cfg(feature = "auth")]
pub mod awsv4;
pub mod config;
pub mod error;
pub mod event;
pub mod headers;
pub mod site;
pub mod stack;

pub use error::{Error, Result};
