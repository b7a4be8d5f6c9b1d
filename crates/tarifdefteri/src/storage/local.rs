//! Local ("demo") recipe storage on the device store.
//!
//! The whole recipe list lives as one JSON array under a single key, newest
//! first. Images are not stored separately; they are inlined into the
//! placement `url` as `data:` URIs.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{BackendMode, DeviceStore, ImageUpload, RecipeStore};
use crate::error::{Error, Result};
use crate::recipe::{sort_newest_first, Recipe, RecipeId, RecipeInput, RecipePatch};

/// Device store key holding the recipe list.
pub const RECIPES_KEY: &str = "tarif_defteri_demo_recipes";

/// Recipe store backed by the on-device key-value store.
///
/// The list is shared by every local account on the device; `owner` is not
/// used to partition it.
#[derive(Debug, Clone)]
pub struct LocalRecipeStore {
    device: Arc<DeviceStore>,
}

impl LocalRecipeStore {
    /// Create a store over `device`.
    #[must_use]
    pub fn new(device: Arc<DeviceStore>) -> Self {
        Self { device }
    }

    /// When the recipe list was last written on this device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device store cannot be read.
    pub fn last_saved(&self) -> Result<Option<DateTime<Utc>>> {
        self.device.updated_at(RECIPES_KEY)
    }

    fn load(&self) -> Result<Vec<Recipe>> {
        Ok(self.device.get_json(RECIPES_KEY)?.unwrap_or_default())
    }

    fn save(&self, recipes: &[Recipe]) -> Result<()> {
        self.device.set_json(RECIPES_KEY, recipes)
    }

    fn new_id() -> RecipeId {
        format!("recipe-{}", uuid::Uuid::new_v4())
    }
}

/// Encode bytes as a `data:` URI with the given content type.
#[must_use]
pub fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

#[async_trait]
impl RecipeStore for LocalRecipeStore {
    fn mode(&self) -> BackendMode {
        BackendMode::Local
    }

    async fn list_recipes(&self, _owner: &str) -> Result<Vec<Recipe>> {
        let mut recipes = self.load()?;
        sort_newest_first(&mut recipes);
        debug!(count = recipes.len(), "Listed local recipes");
        Ok(recipes)
    }

    async fn get_recipe(&self, _owner: &str, id: &str) -> Result<Option<Recipe>> {
        Ok(self.load()?.into_iter().find(|r| r.id == id))
    }

    async fn create_recipe(&self, _owner: &str, input: RecipeInput) -> Result<RecipeId> {
        let mut recipes = self.load()?;
        let id = Self::new_id();
        recipes.insert(0, Recipe::from_input(id.clone(), input, Utc::now()));
        self.save(&recipes)?;
        debug!(%id, "Created local recipe");
        Ok(id)
    }

    async fn update_recipe(&self, _owner: &str, id: &str, patch: RecipePatch) -> Result<()> {
        let mut recipes = self.load()?;
        let recipe = recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::recipe_not_found(id))?;
        recipe.apply_patch(patch, Utc::now());
        self.save(&recipes)?;
        debug!(id, "Updated local recipe");
        Ok(())
    }

    async fn delete_recipe(&self, _owner: &str, id: &str) -> Result<()> {
        let mut recipes = self.load()?;
        let before = recipes.len();
        recipes.retain(|r| r.id != id);
        if recipes.len() != before {
            self.save(&recipes)?;
        }
        debug!(id, removed = before - recipes.len(), "Deleted local recipe");
        Ok(())
    }

    async fn upload_image(
        &self,
        _owner: &str,
        recipe_id: &str,
        upload: ImageUpload,
    ) -> Result<String> {
        let content_type = upload.content_type();
        debug!(
            recipe_id,
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "Inlining image"
        );
        Ok(data_uri(&content_type, &upload.bytes))
    }
}
