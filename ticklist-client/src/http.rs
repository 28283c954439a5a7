/// HTTP implementation of the [`Api`] trait
///
/// Thin reqwest wrapper around the REST endpoints. Success bodies
/// deserialize into the shared wire types; non-success bodies parse the
/// `{error}` envelope into [`ClientError::Api`] so callers see the
/// server's own message alongside the status code.
///
/// # Example
///
/// ```no_run
/// use ticklist_client::api::Api;
/// use ticklist_client::http::HttpApi;
/// use ticklist_shared::models::task::StatusFilter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = HttpApi::new("http://localhost:8080");
/// let session = api.login("a@x.com", "password1").await?;
/// let tasks = api.list_tasks(&session.token, StatusFilter::All).await?;
/// # Ok(())
/// # }
/// ```
use crate::api::{Api, AuthSession, SessionUser, TaskChanges};
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use ticklist_shared::models::task::{StatusFilter, Task};
use uuid::Uuid;

/// HTTP client for the TickList REST API
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

/// Server error envelope
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `GET /tasks` and `POST /tasks/reorder` envelope
#[derive(Debug, Deserialize)]
struct ItemsBody {
    items: Vec<Task>,
}

/// `DELETE /tasks/completed` envelope
#[derive(Debug, Deserialize)]
struct DeletedBody {
    deleted: u64,
}

impl HttpApi {
    /// Creates a client against the given base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-success response into [`ClientError::Api`], preferring
    /// the server's `{error}` message when the body carries one.
    async fn check(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };

        tracing::debug!(status = status.as_u16(), message = %message, "Request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> ClientResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl Api for HttpApi {
    async fn signup(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        let response = self
            .client
            .post(self.url("/auth/signup"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn login(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn me(&self, token: &str) -> ClientResult<SessionUser> {
        self.get_json("/me", token).await
    }

    async fn list_tasks(&self, token: &str, filter: StatusFilter) -> ClientResult<Vec<Task>> {
        let path = match filter {
            StatusFilter::All => "/tasks".to_string(),
            StatusFilter::Active => "/tasks?status=active".to_string(),
            StatusFilter::Completed => "/tasks?status=completed".to_string(),
        };
        let body: ItemsBody = self.get_json(&path, token).await?;
        Ok(body.items)
    }

    async fn create_task(&self, token: &str, title: &str) -> ClientResult<Task> {
        let response = self
            .client
            .post(self.url("/tasks"))
            .bearer_auth(token)
            .json(&json!({ "title": title }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn update_task(
        &self,
        token: &str,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> ClientResult<Task> {
        let response = self
            .client
            .patch(self.url(&format!("/tasks/{}", task_id)))
            .bearer_auth(token)
            .json(&changes)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_task(&self, token: &str, task_id: Uuid) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/tasks/{}", task_id)))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn clear_completed(&self, token: &str) -> ClientResult<u64> {
        let response = self
            .client
            .delete(self.url("/tasks/completed"))
            .bearer_auth(token)
            .send()
            .await?;
        let body: DeletedBody = Self::check(response).await?.json().await?;
        Ok(body.deleted)
    }

    async fn reorder(&self, token: &str, ordered_ids: &[Uuid]) -> ClientResult<Vec<Task>> {
        let response = self
            .client
            .post(self.url("/tasks/reorder"))
            .bearer_auth(token)
            .json(&json!({ "orderedIds": ordered_ids }))
            .send()
            .await?;
        let body: ItemsBody = Self::check(response).await?.json().await?;
        Ok(body.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let api = HttpApi::new("http://localhost:8080/");
        assert_eq!(api.url("/tasks"), "http://localhost:8080/tasks");

        let api = HttpApi::new("http://localhost:8080");
        assert_eq!(api.url("/me"), "http://localhost:8080/me");
    }
}
