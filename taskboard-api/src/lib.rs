//! # Taskboard API Server Library
//!
//! This library provides the core functionality for the Taskboard API server.
//!
//! ## Modules
//!
//! - `app`: Application state, auth middleware, and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
