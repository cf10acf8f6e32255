//! # Taskboard API Client
//!
//! Typed client for the Taskboard REST API. Wraps `reqwest` with token
//! handling, typed errors, and the client-side workflow pre-flight: the
//! one-click task advance validates the move against the shared transition
//! graph before any request is sent, so a stale view fails locally instead
//! of bouncing off the server.
//!
//! Tokens live behind the [`store::TokenStore`] trait; callers inject
//! whatever persistence suits them (the bundled
//! [`store::MemoryTokenStore`] keeps the token in process memory).
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskboard_client::{client::ApiClient, store::MemoryTokenStore};
//!
//! # async fn example() -> Result<(), taskboard_client::error::ClientError> {
//! let client = ApiClient::new("http://localhost:8080", Arc::new(MemoryTokenStore::new()))?;
//!
//! let session = client.login("user@example.com", "SecurePass123").await?;
//! println!("Logged in as {}", session.user.display_name());
//!
//! for task in client.list_tasks().await? {
//!     println!("{} [{}]", task.title, task.status.label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod session;
pub mod store;

/// Client library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
