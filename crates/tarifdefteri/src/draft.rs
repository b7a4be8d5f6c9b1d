//! In-memory edit buffers for a recipe.
//!
//! A draft is never persisted on its own. The editor turns it into a
//! [`RecipeInput`] on save.

use crate::error::{Error, Result};
use crate::recipe::{ImagePlacement, Page, Recipe, RecipeInput, TextStyle, FONT_SIZE_RANGE};

/// Unsaved state of the recipe being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    /// Title; must be non-blank to save.
    pub title: String,
    /// Category label.
    pub category: String,
    /// Text of the left page.
    pub left_page_content: String,
    /// Text of the right page.
    pub right_page_content: String,
    /// Images on the left page.
    pub left_page_images: Vec<ImagePlacement>,
    /// Images on the right page.
    pub right_page_images: Vec<ImagePlacement>,
    /// Font attributes.
    pub style: TextStyle,
}

impl Draft {
    /// An empty draft with the given text style.
    #[must_use]
    pub fn blank(style: TextStyle) -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            left_page_content: String::new(),
            right_page_content: String::new(),
            left_page_images: Vec::new(),
            right_page_images: Vec::new(),
            style,
        }
    }

    /// A draft holding a copy of `recipe`.
    ///
    /// Zero or blank font attributes are replaced from `defaults`.
    #[must_use]
    pub fn from_recipe(recipe: &Recipe, defaults: &TextStyle) -> Self {
        Self {
            title: recipe.title.clone(),
            category: recipe.category.clone(),
            left_page_content: recipe.left_page_content.clone(),
            right_page_content: recipe.right_page_content.clone(),
            left_page_images: recipe.left_page_images.clone(),
            right_page_images: recipe.right_page_images.clone(),
            style: recipe.text_style_or(defaults),
        }
    }

    /// Check the draft can be saved.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the title is blank.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("title is required"));
        }
        Ok(())
    }

    /// The recipe fields this draft would save.
    #[must_use]
    pub fn to_input(&self) -> RecipeInput {
        RecipeInput {
            title: self.title.trim().to_string(),
            category: self.category.trim().to_string(),
            left_page_content: self.left_page_content.clone(),
            right_page_content: self.right_page_content.clone(),
            left_page_images: self.left_page_images.clone(),
            right_page_images: self.right_page_images.clone(),
            font_size: self.style.font_size,
            font_family: self.style.font_family.clone(),
            font_color: self.style.font_color.clone(),
        }
    }

    /// Images on the given page.
    #[must_use]
    pub fn images(&self, page: Page) -> &[ImagePlacement] {
        match page {
            Page::Left => &self.left_page_images,
            Page::Right => &self.right_page_images,
        }
    }

    /// Mutable images of the given page.
    pub fn images_mut(&mut self, page: Page) -> &mut Vec<ImagePlacement> {
        match page {
            Page::Left => &mut self.left_page_images,
            Page::Right => &mut self.right_page_images,
        }
    }

    /// Mutable text of the given page.
    pub fn content_mut(&mut self, page: Page) -> &mut String {
        match page {
            Page::Left => &mut self.left_page_content,
            Page::Right => &mut self.right_page_content,
        }
    }

    /// One image on a page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageNotFound`] if no placement has that id.
    pub fn image_mut(&mut self, page: Page, id: &str) -> Result<&mut ImagePlacement> {
        self.images_mut(page)
            .iter_mut()
            .find(|img| img.id == id)
            .ok_or_else(|| Error::ImageNotFound {
                id: id.to_string(),
                page: page.to_string(),
            })
    }

    /// Remove an image from a page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageNotFound`] if no placement has that id.
    pub fn remove_image(&mut self, page: Page, id: &str) -> Result<ImagePlacement> {
        let images = self.images_mut(page);
        let index = images
            .iter()
            .position(|img| img.id == id)
            .ok_or_else(|| Error::ImageNotFound {
                id: id.to_string(),
                page: page.to_string(),
            })?;
        Ok(images.remove(index))
    }

    /// Set the font size.
    ///
    /// # Errors
    ///
    /// Returns a validation error outside the offered size range.
    pub fn set_font_size(&mut self, size: u32) -> Result<()> {
        if !FONT_SIZE_RANGE.contains(&size) {
            return Err(Error::validation(format!(
                "font size must be between {} and {}",
                FONT_SIZE_RANGE.start(),
                FONT_SIZE_RANGE.end()
            )));
        }
        self.style.font_size = size;
        Ok(())
    }
}
