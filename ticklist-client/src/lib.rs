//! # TickList Client
//!
//! Client-side state and API layer for the TickList to-do application.
//!
//! ## Architecture
//!
//! - [`api::Api`]: the async contract every backend implementation fulfils
//! - [`http::HttpApi`]: the real HTTP implementation (reqwest)
//! - [`mock::MockApi`]: an in-memory implementation for tests and demos
//! - [`session::SessionStore`]: token persistence with a load/set/clear
//!   lifecycle, owned explicitly rather than held as ambient global state
//! - [`state`]: [`state::AuthState`] and [`state::TaskList`], the pieces a
//!   UI drives

pub mod api;
pub mod error;
pub mod http;
pub mod mock;
pub mod session;
pub mod state;
