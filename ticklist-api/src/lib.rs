//! # Ticklist API Server Library
//!
//! Core functionality for the ticklist API server: a multi-user to-do list
//! backend speaking JSON over HTTP with bearer-token auth.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
