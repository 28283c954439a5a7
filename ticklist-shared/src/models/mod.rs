/// Database models for ticklist
///
/// Each model carries its own CRUD operations, taking a `&PgPool` and
/// returning `sqlx::Error` for the caller to translate.
///
/// # Models
///
/// - `user`: User accounts (created at signup, never mutated in-scope)
/// - `task`: Per-user ordered to-do items
///
/// # Example
///
/// ```no_run
/// use ticklist_shared::models::user::{CreateUser, User};
/// use ticklist_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```
pub mod task;
pub mod user;
