//! Async Rust client library for the Armis device-security REST API.
//!
//! Authenticates with a long-lived secret key, exchanges it for a short-lived
//! access token, and keeps that token fresh across concurrent callers: the
//! token is refreshed lazily by the first request that finds it expired, and
//! at most one exchange is in flight at a time.
//!
//! # Modules
//!
//! - [`auth`]: Secret-key exchange and token response parsing.
//! - [`session`]: Shared token cache with single-flight refresh.
//! - [`client`]: Authenticated request builder and executor.
//! - [`error`]: Typed error hierarchy (`ArmisError`).
//! - [`collectors`], [`sites`], [`users`]: Resource CRUD.
//! - [`search`]: AQL queries.
//!
//! # Quick Start
//!
//! ```ignore
//! use armis_client::client::{ArmisClient, ClientOptions};
//! use armis_client::search::{SearchQuery, search};
//!
//! let options = ClientOptions::default().base_url("https://acme.armis.com");
//! let client = ArmisClient::with_options(&secret_key, options).await?;
//! let page = search(&client, &SearchQuery::new("in:devices riskLevel:High")).await?;
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod collectors;
pub mod error;
pub mod search;
pub mod session;
pub mod sites;
pub mod users;

pub use client::{ArmisClient, ClientOptions};
pub use error::{ArmisError, Result};
