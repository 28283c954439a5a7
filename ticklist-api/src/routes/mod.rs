/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (signup, login, me)
/// - `tasks`: Task management endpoints
pub mod auth;
pub mod health;
pub mod tasks;
