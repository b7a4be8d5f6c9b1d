//! Recipe persistence.
//!
//! Every caller talks to a single [`RecipeStore`]. Which implementation sits
//! behind it is decided once per process by [`BackendMode::from_config`]:
//! a remote document API plus blob store when credentials are configured,
//! otherwise the on-device [`DeviceStore`] with images inlined as data URIs.

pub mod device;
pub mod local;
pub mod migrations;
pub mod remote;
pub mod schema;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::recipe::{categories_of, Recipe, RecipeId, RecipeInput, RecipePatch};

pub use device::DeviceStore;
pub use local::LocalRecipeStore;
pub use remote::RemoteRecipeStore;

/// Which backend the process persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendMode {
    /// Remote document API and blob store.
    Remote,
    /// On-device storage ("demo" mode).
    Local,
}

impl BackendMode {
    /// Remote when an API key is configured, local otherwise.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        if config.backend.has_credentials() {
            Self::Remote
        } else {
            Self::Local
        }
    }

    /// Whether this is local mode.
    #[must_use]
    pub fn is_local(self) -> bool {
        self == Self::Local
    }
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Raw image bytes to attach to a recipe.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name; its extension decides the content type.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Create an upload from a name and its bytes.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an image file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is empty.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(Error::validation(format!(
                "image file is empty: {}",
                path.display()
            )));
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// Content type guessed from the file name.
    #[must_use]
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    /// Lowercased file extension, or `bin` when there is none.
    #[must_use]
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .map_or_else(|| "bin".to_string(), |ext| ext.to_string_lossy().to_lowercase())
    }
}

/// Recipe CRUD and image storage, identical across backends.
///
/// `owner` is the signed-in user's id. Implementations are shared as
/// `Arc<dyn RecipeStore>`.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// The backend this store talks to.
    fn mode(&self) -> BackendMode;

    /// All recipes of `owner`, newest created first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unconfigured or unreachable, or the
    /// stored data cannot be read.
    async fn list_recipes(&self, owner: &str) -> Result<Vec<Recipe>>;

    /// Distinct non-blank categories across `owner`'s recipes, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if listing recipes fails.
    async fn list_categories(&self, owner: &str) -> Result<Vec<String>> {
        let recipes = self.list_recipes(owner).await?;
        Ok(categories_of(&recipes))
    }

    /// A single recipe, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unconfigured or unreachable.
    async fn get_recipe(&self, owner: &str, id: &str) -> Result<Option<Recipe>>;

    /// Store a new recipe and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    async fn create_recipe(&self, owner: &str, input: RecipeInput) -> Result<RecipeId>;

    /// Merge `patch` into an existing recipe and refresh its `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecipeNotFound`] if the recipe does not exist.
    async fn update_recipe(&self, owner: &str, id: &str, patch: RecipePatch) -> Result<()>;

    /// Remove a recipe. Removing an absent id succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    async fn delete_recipe(&self, owner: &str, id: &str) -> Result<()>;

    /// Store image bytes for a recipe and return a locator usable as an
    /// image `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unconfigured or rejects the upload.
    async fn upload_image(
        &self,
        owner: &str,
        recipe_id: &str,
        upload: ImageUpload,
    ) -> Result<String>;
}

/// Build the store for this process.
///
/// Local mode opens the device store at the configured database path.
///
/// # Errors
///
/// Returns an error if the local database cannot be opened or the HTTP
/// client cannot be built.
pub fn open_store(config: &Config, device: Arc<DeviceStore>) -> Result<Arc<dyn RecipeStore>> {
    let mode = BackendMode::from_config(config);
    info!(%mode, "Selected recipe backend");
    let store: Arc<dyn RecipeStore> = match mode {
        BackendMode::Remote => Arc::new(RemoteRecipeStore::new(
            &config.backend,
            config.request_timeout(),
        )?),
        BackendMode::Local => Arc::new(LocalRecipeStore::new(device)),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_config() {
        let mut config = Config::default();
        assert_eq!(BackendMode::from_config(&config), BackendMode::Local);

        config.backend.api_key = Some("key".to_string());
        assert_eq!(BackendMode::from_config(&config), BackendMode::Remote);

        config.backend.api_key = Some(String::new());
        assert_eq!(BackendMode::from_config(&config), BackendMode::Local);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(BackendMode::Local.to_string(), "local");
        assert_eq!(BackendMode::Remote.to_string(), "remote");
        assert!(BackendMode::Local.is_local());
    }

    #[test]
    fn test_upload_content_type() {
        let upload = ImageUpload::new("kek.PNG", vec![1, 2, 3]);
        assert_eq!(upload.content_type(), "image/png");
        assert_eq!(upload.extension(), "png");

        let upload = ImageUpload::new("photo.jpg", vec![1]);
        assert_eq!(upload.content_type(), "image/jpeg");

        let upload = ImageUpload::new("noext", vec![1]);
        assert_eq!(upload.content_type(), "application/octet-stream");
        assert_eq!(upload.extension(), "bin");
    }

    #[test]
    fn test_upload_debug_hides_bytes() {
        let upload = ImageUpload::new("a.png", vec![0; 1024]);
        let debug = format!("{upload:?}");
        assert!(debug.contains("1024"));
        assert!(!debug.contains("0, 0"));
    }

    #[tokio::test]
    async fn test_upload_read_from_disk() {
        let path = std::env::temp_dir().join(format!("tarif_upload_{}.gif", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"GIF89a").await.unwrap();

        let upload = ImageUpload::read(&path).await.unwrap();
        assert!(upload.file_name.ends_with(".gif"));
        assert_eq!(upload.bytes, b"GIF89a");

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_upload_read_empty_file() {
        let path = std::env::temp_dir().join(format!("tarif_empty_{}.png", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"").await.unwrap();

        let err = ImageUpload::read(&path).await.unwrap_err();
        assert!(err.is_validation());

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn test_open_store_selects_local() {
        let device = Arc::new(DeviceStore::open_in_memory().unwrap());
        let store = open_store(&Config::default(), device).unwrap();
        assert_eq!(store.mode(), BackendMode::Local);
    }

    #[test]
    fn test_open_store_selects_remote() {
        let mut config = Config::default();
        config.backend.api_key = Some("key".to_string());
        let device = Arc::new(DeviceStore::open_in_memory().unwrap());
        let store = open_store(&config, device).unwrap();
        assert_eq!(store.mode(), BackendMode::Remote);
    }
}
