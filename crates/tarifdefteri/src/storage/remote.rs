//! Remote recipe storage over HTTP.
//!
//! Recipes live in a document API under `users/{owner}/recipes/{id}` and
//! images in a blob store under `users/{owner}/recipes/{recipe}/{file}`.
//! Every request carries the configured API key as a bearer token. There are
//! no retries: an unconfigured or unreachable backend fails the call.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{BackendMode, ImageUpload, RecipeStore};
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::recipe::{sort_newest_first, Recipe, RecipeId, RecipeInput, RecipePatch};

#[derive(Debug, Deserialize)]
struct Created {
    id: RecipeId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Uploaded {
    download_url: String,
}

/// Recipe store backed by the remote document API and blob store.
#[derive(Clone)]
pub struct RemoteRecipeStore {
    client: Client,
    api_url: Option<String>,
    storage_url: Option<String>,
    api_key: Option<String>,
}

impl std::fmt::Debug for RemoteRecipeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRecipeStore")
            .field("api_url", &self.api_url)
            .field("storage_url", &self.storage_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl RemoteRecipeStore {
    /// Create a store from backend settings.
    ///
    /// Missing URLs are not an error here; each call that needs one fails
    /// with [`Error::BackendNotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("tarifdefteri/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: non_blank(config.api_url.as_deref()),
            storage_url: non_blank(config.storage_url.as_deref()),
            api_key: non_blank(config.api_key.as_deref()),
        })
    }

    fn api_base(&self) -> Result<&str> {
        self.api_url
            .as_deref()
            .ok_or(Error::BackendNotConfigured {
                setting: "backend.api_url",
            })
    }

    fn storage_base(&self) -> Result<&str> {
        self.storage_url
            .as_deref()
            .ok_or(Error::BackendNotConfigured {
                setting: "backend.storage_url",
            })
    }

    fn recipes_url(&self, owner: &str, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["users", owner, "recipes"];
        segments.extend_from_slice(rest);
        join_url(self.api_base()?, &segments)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response> {
        self.authorize(request).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                Error::BackendUnreachable {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            } else {
                Error::Http(e)
            }
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().trim_end_matches('/'))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Append path segments to a base URL, escaping each segment.
fn join_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| Error::ConfigValidation {
        message: format!("invalid backend URL {base}: {e}"),
    })?;
    url.path_segments_mut()
        .map_err(|()| Error::ConfigValidation {
            message: format!("backend URL cannot take a path: {base}"),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a non-success response into [`Error::RemoteRejected`].
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown").to_string()
    } else {
        body
    };
    Err(Error::RemoteRejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RecipeStore for RemoteRecipeStore {
    fn mode(&self) -> BackendMode {
        BackendMode::Remote
    }

    async fn list_recipes(&self, owner: &str) -> Result<Vec<Recipe>> {
        let url = self.recipes_url(owner, &[])?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        let mut recipes: Vec<Recipe> = ensure_success(response).await?.json().await?;
        sort_newest_first(&mut recipes);
        debug!(owner, count = recipes.len(), "Listed remote recipes");
        Ok(recipes)
    }

    async fn get_recipe(&self, owner: &str, id: &str) -> Result<Option<Recipe>> {
        let url = self.recipes_url(owner, &[id])?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(ensure_success(response).await?.json().await?))
    }

    async fn create_recipe(&self, owner: &str, input: RecipeInput) -> Result<RecipeId> {
        let url = self.recipes_url(owner, &[])?;
        let response = self
            .send(self.client.post(url.clone()).json(&input), &url)
            .await?;
        let created: Created = ensure_success(response).await?.json().await?;
        debug!(owner, id = %created.id, "Created remote recipe");
        Ok(created.id)
    }

    async fn update_recipe(&self, owner: &str, id: &str, patch: RecipePatch) -> Result<()> {
        let url = self.recipes_url(owner, &[id])?;
        let response = self
            .send(self.client.patch(url.clone()).json(&patch), &url)
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::recipe_not_found(id));
        }
        ensure_success(response).await?;
        debug!(owner, id, "Updated remote recipe");
        Ok(())
    }

    async fn delete_recipe(&self, owner: &str, id: &str) -> Result<()> {
        let url = self.recipes_url(owner, &[id])?;
        let response = self.send(self.client.delete(url.clone()), &url).await?;
        if response.status() != StatusCode::NOT_FOUND {
            ensure_success(response).await?;
        }
        // Uploaded blobs under the recipe are left in place.
        debug!(owner, id, "Deleted remote recipe");
        Ok(())
    }

    async fn upload_image(
        &self,
        owner: &str,
        recipe_id: &str,
        upload: ImageUpload,
    ) -> Result<String> {
        let file_name = format!("{}.{}", Utc::now().timestamp_millis(), upload.extension());
        let url = join_url(
            self.storage_base()?,
            &["users", owner, "recipes", recipe_id, file_name.as_str()],
        )?;
        let content_type = upload.content_type();
        debug!(
            owner,
            recipe_id,
            %url,
            bytes = upload.bytes.len(),
            "Uploading image"
        );
        let request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, content_type)
            .body(upload.bytes);
        let response = self.send(request, &url).await?;
        let uploaded: Uploaded = ensure_success(response).await?.json().await?;
        Ok(uploaded.download_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::TextStyle;

    fn config(api_url: Option<&str>, storage_url: Option<&str>) -> BackendConfig {
        BackendConfig {
            api_url: api_url.map(str::to_string),
            storage_url: storage_url.map(str::to_string),
            api_key: Some("secret".to_string()),
            ..BackendConfig::default()
        }
    }

    fn store(api_url: Option<&str>, storage_url: Option<&str>) -> RemoteRecipeStore {
        RemoteRecipeStore::new(&config(api_url, storage_url), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_join_url_escapes_segments() {
        let url = join_url("https://api.example.com/v1/", &["users", "a b", "recipes"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users/a%20b/recipes");
    }

    #[test]
    fn test_join_url_rejects_garbage() {
        let err = join_url("not a url", &["users"]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_blank_urls_are_unset() {
        let store = store(Some("  "), Some("https://blobs.example.com/"));
        assert!(store.api_url.is_none());
        assert_eq!(store.storage_url.as_deref(), Some("https://blobs.example.com"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", store(None, None));
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }

    #[tokio::test]
    async fn test_unconfigured_api_fails_fast() {
        let store = store(None, None);
        let err = store.list_recipes("u1").await.unwrap_err();
        assert!(matches!(
            err,
            Error::BackendNotConfigured {
                setting: "backend.api_url"
            }
        ));
        assert!(err.is_configuration());

        let err = store
            .create_recipe("u1", RecipeInput::placeholder(&TextStyle::default()))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_unconfigured_storage_fails_fast() {
        let store = store(Some("http://127.0.0.1:9"), None);
        let err = store
            .upload_image("u1", "r1", ImageUpload::new("a.png", vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::BackendNotConfigured {
                setting: "backend.storage_url"
            }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_is_configuration_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = store(Some(&format!("http://{addr}")), None);
        let err = store.list_recipes("u1").await.unwrap_err();
        assert!(matches!(err, Error::BackendUnreachable { .. }), "{err:?}");
        assert!(err.is_configuration());
    }
}
