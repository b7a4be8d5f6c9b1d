//! The recipe editing workflow.
//!
//! Starting a new recipe creates a placeholder record right away so images
//! uploaded before the first save already belong to a recipe id. Nothing
//! else is written until [`Editor::save`]. Cancelling an unsaved new recipe
//! deletes the placeholder again.

use std::sync::Arc;

use rand::Rng;
use tarifdefteri_layout::{FractionRect, PageLayout, PixelPoint, PixelRect, PlacementMode};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::draft::Draft;
use crate::error::{Error, Result};
use crate::recipe::{ImagePlacement, Page, Recipe, RecipeId, RecipeInput, RecipePatch};
use crate::storage::{ImageUpload, RecipeStore};

/// What the open draft will be saved over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// A new recipe, saved over its placeholder.
    New(RecipeId),
    /// An existing recipe.
    Existing(RecipeId),
}

impl EditTarget {
    /// The recipe id the draft is saved to.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::New(id) | Self::Existing(id) => id,
        }
    }
}

#[derive(Debug)]
struct OpenDraft {
    target: EditTarget,
    draft: Draft,
}

/// Drives one user's edits against a [`RecipeStore`].
pub struct Editor {
    store: Arc<dyn RecipeStore>,
    owner: String,
    settings: EditorConfig,
    open: Option<OpenDraft>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("mode", &self.store.mode())
            .field("owner", &self.owner)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Create an editor for `owner`.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecipeStore>,
        owner: impl Into<String>,
        settings: EditorConfig,
    ) -> Self {
        Self {
            store,
            owner: owner.into(),
            settings,
            open: None,
        }
    }

    /// Whether a draft is open.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.open.is_some()
    }

    /// The target of the open draft.
    #[must_use]
    pub fn target(&self) -> Option<&EditTarget> {
        self.open.as_ref().map(|o| &o.target)
    }

    /// The open draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEditing`] when no draft is open.
    pub fn draft(&self) -> Result<&Draft> {
        self.open.as_ref().map(|o| &o.draft).ok_or(Error::NotEditing)
    }

    /// The open draft, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEditing`] when no draft is open.
    pub fn draft_mut(&mut self) -> Result<&mut Draft> {
        self.open
            .as_mut()
            .map(|o| &mut o.draft)
            .ok_or(Error::NotEditing)
    }

    fn ensure_idle(&self) -> Result<()> {
        if let Some(open) = &self.open {
            return Err(Error::validation(format!(
                "recipe {} is already being edited",
                open.target.id()
            )));
        }
        Ok(())
    }

    /// Start a new recipe.
    ///
    /// Creates the placeholder record and opens a blank draft over it.
    ///
    /// # Errors
    ///
    /// Returns an error if a draft is already open or the placeholder cannot
    /// be created.
    pub async fn begin_new(&mut self) -> Result<RecipeId> {
        self.ensure_idle()?;
        let style = self.settings.text_style();
        let id = self
            .store
            .create_recipe(&self.owner, RecipeInput::placeholder(&style))
            .await?;
        info!(%id, "Started new recipe");
        self.open = Some(OpenDraft {
            target: EditTarget::New(id.clone()),
            draft: Draft::blank(style),
        });
        Ok(id)
    }

    /// Open a draft over an existing recipe.
    ///
    /// # Errors
    ///
    /// Returns an error if a draft is already open.
    pub fn begin_edit(&mut self, recipe: &Recipe) -> Result<()> {
        self.ensure_idle()?;
        debug!(id = %recipe.id, "Editing recipe");
        self.open = Some(OpenDraft {
            target: EditTarget::Existing(recipe.id.clone()),
            draft: Draft::from_recipe(recipe, &self.settings.text_style()),
        });
        Ok(())
    }

    /// Upload an image and place it on `page` of the draft.
    ///
    /// The placement lands at a random spot 10-40 % from the top-left corner,
    /// pulled back inside the page when the configured size would overflow
    /// it, and on top of the page's existing images. Returns the new placement's id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEditing`] with no draft open, or the store's error
    /// if the upload fails. A failed upload leaves the draft unchanged.
    pub async fn upload_image(&mut self, page: Page, upload: ImageUpload) -> Result<String> {
        let recipe_id = self
            .target()
            .map(|t| t.id().to_string())
            .ok_or(Error::NotEditing)?;
        let url = self
            .store
            .upload_image(&self.owner, &recipe_id, upload)
            .await?;

        let size = self.settings.new_image_size_pct;
        let (x, y) = random_origin();
        let rect = FractionRect::new(x, y, size, size).clamped();
        let images = self.draft_mut()?.images_mut(page);
        let placement = ImagePlacement {
            id: format!("img-{}", uuid::Uuid::new_v4()),
            url,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            z_index: i32::try_from(images.len()).unwrap_or(i32::MAX),
        };
        let id = placement.id.clone();
        images.push(placement);
        debug!(%recipe_id, %page, image = %id, "Placed uploaded image");
        Ok(id)
    }

    /// A layout for one page of the open draft, measured at `width` x `height`
    /// pixels. The layout is unmeasured if the size is not positive.
    #[must_use]
    pub fn page_layout(&self, width: f64, height: f64) -> PageLayout {
        let mut layout = PageLayout::new(PlacementMode::for_page(self.is_editing()))
            .with_min_pixel_size(f64::from(self.settings.min_image_px));
        layout.measure(width, height);
        layout
    }

    /// Apply a finished drag to an image.
    ///
    /// Returns the stored rectangle, or `None` if `layout` ignores the gesture
    /// (unmeasured or in view mode).
    ///
    /// # Errors
    ///
    /// Returns an error with no draft open or if the image does not exist.
    pub fn move_image(
        &mut self,
        page: Page,
        id: &str,
        layout: &PageLayout,
        position: PixelPoint,
    ) -> Result<Option<FractionRect>> {
        let placement = self.draft_mut()?.image_mut(page, id)?;
        let Some(rect) = layout.drag_end(position, placement.rect()) else {
            debug!(image = id, "Ignored drag on inactive page");
            return Ok(None);
        };
        placement.set_rect(rect);
        Ok(Some(rect))
    }

    /// Apply a finished resize to an image.
    ///
    /// # Errors
    ///
    /// Returns an error with no draft open or if the image does not exist.
    pub fn resize_image(
        &mut self,
        page: Page,
        id: &str,
        layout: &PageLayout,
        rect: PixelRect,
    ) -> Result<Option<FractionRect>> {
        let placement = self.draft_mut()?.image_mut(page, id)?;
        let Some(fraction) = layout.resize_end(rect) else {
            debug!(image = id, "Ignored resize on inactive page");
            return Ok(None);
        };
        placement.set_rect(fraction);
        Ok(Some(fraction))
    }

    /// Take an image off a page. The uploaded bytes are not deleted.
    ///
    /// # Errors
    ///
    /// Returns an error with no draft open or if the image does not exist.
    pub fn remove_image(&mut self, page: Page, id: &str) -> Result<ImagePlacement> {
        self.draft_mut()?.remove_image(page, id)
    }

    /// Validate and persist the draft, then close it.
    ///
    /// On failure the draft stays open and unchanged.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title, or the store's error.
    pub async fn save(&mut self) -> Result<RecipeId> {
        let open = self.open.as_ref().ok_or(Error::NotEditing)?;
        open.draft.validate()?;
        let id = open.target.id().to_string();
        let patch = RecipePatch::from(open.draft.to_input());

        self.store.update_recipe(&self.owner, &id, patch).await?;
        self.open = None;
        info!(%id, "Saved recipe");
        Ok(id)
    }

    /// Close the draft without saving.
    ///
    /// An unsaved placeholder is deleted. That delete is best-effort: a
    /// failure is logged and otherwise ignored.
    pub async fn cancel(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        if let EditTarget::New(id) = open.target {
            if let Err(e) = self.store.delete_recipe(&self.owner, &id).await {
                warn!(%id, error = %e, "Could not delete placeholder recipe");
            } else {
                debug!(%id, "Deleted placeholder recipe");
            }
        }
    }

    /// Close the draft after a failed step, keeping the work done so far.
    ///
    /// A draft that validates is saved. Otherwise the stored record, a new
    /// recipe's placeholder included, is left as it is so a later edit can
    /// finish it. Returns the id of the kept recipe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEditing`] with no draft open, or the store's error
    /// if the save fails; the draft stays open then.
    pub async fn keep(&mut self) -> Result<RecipeId> {
        let open = self.open.as_ref().ok_or(Error::NotEditing)?;
        if open.draft.validate().is_ok() {
            return self.save().await;
        }
        let id = open.target.id().to_string();
        self.open = None;
        info!(%id, "Kept unsaved recipe");
        Ok(id)
    }

    /// Delete the recipe behind the open draft and close it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEditing`] with no draft open, or the store's error;
    /// the draft stays open on failure.
    pub async fn delete_current(&mut self) -> Result<RecipeId> {
        let id = self
            .target()
            .map(|t| t.id().to_string())
            .ok_or(Error::NotEditing)?;
        self.store.delete_recipe(&self.owner, &id).await?;
        self.open = None;
        info!(%id, "Deleted recipe");
        Ok(id)
    }
}

fn random_origin() -> (f64, f64) {
    let mut rng = rand::rng();
    (
        10.0 + rng.random_range(0.0..30.0),
        10.0 + rng.random_range(0.0..30.0),
    )
}
