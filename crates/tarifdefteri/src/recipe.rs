//! Recipe data model.
//!
//! A recipe is a two-page spread: each page has free text and an ordered list
//! of image placements. The serialized shape uses camelCase field names and
//! RFC 3339 timestamps, identical for both storage backends.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tarifdefteri_layout::FractionRect;

/// Font size for new recipes, in pixels.
pub const DEFAULT_FONT_SIZE: u32 = 16;

/// Font family for new recipes.
pub const DEFAULT_FONT_FAMILY: &str = "Georgia, serif";

/// Font color for new recipes.
pub const DEFAULT_FONT_COLOR: &str = "#5D4037";

/// Font sizes offered by the editor.
pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 12..=24;

/// Title given to the placeholder created when a new recipe is started.
pub const PLACEHOLDER_TITLE: &str = "Yeni Tarif";

/// A named choice in one of the editor palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontChoice {
    /// Stored value.
    pub value: &'static str,
    /// Label shown to the user.
    pub label: &'static str,
}

/// Font families offered by the editor.
pub const FONT_FAMILIES: &[FontChoice] = &[
    FontChoice {
        value: "Georgia, serif",
        label: "El Yazısı",
    },
    FontChoice {
        value: "Arial, sans-serif",
        label: "Modern",
    },
    FontChoice {
        value: "\"Times New Roman\", serif",
        label: "Klasik",
    },
    FontChoice {
        value: "\"Courier New\", monospace",
        label: "Daktilo",
    },
    FontChoice {
        value: "\"Comic Sans MS\", cursive",
        label: "Eğlenceli",
    },
];

/// Font colors offered by the editor.
pub const FONT_COLORS: &[FontChoice] = &[
    FontChoice {
        value: "#5D4037",
        label: "Kahverengi",
    },
    FontChoice {
        value: "#333333",
        label: "Siyah",
    },
    FontChoice {
        value: "#1a365d",
        label: "Lacivert",
    },
    FontChoice {
        value: "#744210",
        label: "Koyu Turuncu",
    },
    FontChoice {
        value: "#7b341e",
        label: "Bordo",
    },
    FontChoice {
        value: "#22543d",
        label: "Yeşil",
    },
];

/// Identifier assigned to a recipe by its storage backend.
pub type RecipeId = String;

/// One of the two pages of a recipe spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    /// The left-hand page.
    Left,
    /// The right-hand page.
    Right,
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Text presentation shared by both pages of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: u32,
    /// CSS font family.
    pub font_family: String,
    /// `#rrggbb` color.
    pub font_color: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_color: DEFAULT_FONT_COLOR.to_string(),
        }
    }
}

/// Position, size and stacking of one image on a page.
///
/// `x`, `y`, `width` and `height` are percentages of the page container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePlacement {
    /// Client-generated identifier.
    pub id: String,
    /// Remote URL or inline data URI.
    pub url: String,
    /// Left edge, percent.
    pub x: f64,
    /// Top edge, percent.
    pub y: f64,
    /// Width, percent.
    pub width: f64,
    /// Height, percent.
    pub height: f64,
    /// Stacking order; higher draws on top.
    pub z_index: i32,
}

impl ImagePlacement {
    /// The stored rectangle of this placement.
    #[must_use]
    pub fn rect(&self) -> FractionRect {
        FractionRect::new(self.x, self.y, self.width, self.height)
    }

    /// Replace the stored rectangle.
    pub fn set_rect(&mut self, rect: FractionRect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

fn default_font_color() -> String {
    DEFAULT_FONT_COLOR.to_string()
}

/// Everything a caller supplies when creating a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    /// Recipe title.
    pub title: String,
    /// Free-form category label; may be empty.
    #[serde(default)]
    pub category: String,
    /// Text of the left page.
    #[serde(default)]
    pub left_page_content: String,
    /// Text of the right page.
    #[serde(default)]
    pub right_page_content: String,
    /// Images on the left page.
    #[serde(default)]
    pub left_page_images: Vec<ImagePlacement>,
    /// Images on the right page.
    #[serde(default)]
    pub right_page_images: Vec<ImagePlacement>,
    /// Font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// CSS font family.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// `#rrggbb` font color.
    #[serde(default = "default_font_color")]
    pub font_color: String,
}

impl RecipeInput {
    /// The near-empty recipe created when a new-recipe flow starts.
    #[must_use]
    pub fn placeholder(style: &TextStyle) -> Self {
        Self {
            title: PLACEHOLDER_TITLE.to_string(),
            category: String::new(),
            left_page_content: String::new(),
            right_page_content: String::new(),
            left_page_images: Vec::new(),
            right_page_images: Vec::new(),
            font_size: style.font_size,
            font_family: style.font_family.clone(),
            font_color: style.font_color.clone(),
        }
    }
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New left page text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_page_content: Option<String>,
    /// New right page text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_page_content: Option<String>,
    /// New left page images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_page_images: Option<Vec<ImagePlacement>>,
    /// New right page images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_page_images: Option<Vec<ImagePlacement>>,
    /// New font size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    /// New font family.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// New font color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
}

impl RecipePatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<RecipeInput> for RecipePatch {
    fn from(input: RecipeInput) -> Self {
        Self {
            title: Some(input.title),
            category: Some(input.category),
            left_page_content: Some(input.left_page_content),
            right_page_content: Some(input.right_page_content),
            left_page_images: Some(input.left_page_images),
            right_page_images: Some(input.right_page_images),
            font_size: Some(input.font_size),
            font_family: Some(input.font_family),
            font_color: Some(input.font_color),
        }
    }
}

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Backend-assigned identifier.
    pub id: RecipeId,
    /// Recipe title.
    pub title: String,
    /// Free-form category label; may be empty.
    #[serde(default)]
    pub category: String,
    /// Text of the left page.
    #[serde(default)]
    pub left_page_content: String,
    /// Text of the right page.
    #[serde(default)]
    pub right_page_content: String,
    /// Images on the left page.
    #[serde(default)]
    pub left_page_images: Vec<ImagePlacement>,
    /// Images on the right page.
    #[serde(default)]
    pub right_page_images: Vec<ImagePlacement>,
    /// Font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// CSS font family.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// `#rrggbb` font color.
    #[serde(default = "default_font_color")]
    pub font_color: String,
    /// When the recipe was created.
    pub created_at: DateTime<Utc>,
    /// When the recipe was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Build a stored recipe from input, stamping both timestamps with `now`.
    #[must_use]
    pub fn from_input(id: RecipeId, input: RecipeInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            category: input.category,
            left_page_content: input.left_page_content,
            right_page_content: input.right_page_content,
            left_page_images: input.left_page_images,
            right_page_images: input.right_page_images,
            font_size: input.font_size,
            font_family: input.font_family,
            font_color: input.font_color,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the fields present in `patch` and refresh `updated_at`.
    pub fn apply_patch(&mut self, patch: RecipePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(content) = patch.left_page_content {
            self.left_page_content = content;
        }
        if let Some(content) = patch.right_page_content {
            self.right_page_content = content;
        }
        if let Some(images) = patch.left_page_images {
            self.left_page_images = images;
        }
        if let Some(images) = patch.right_page_images {
            self.right_page_images = images;
        }
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(family) = patch.font_family {
            self.font_family = family;
        }
        if let Some(color) = patch.font_color {
            self.font_color = color;
        }
        self.updated_at = now.max(self.created_at);
    }

    /// Images on the given page.
    #[must_use]
    pub fn images(&self, page: Page) -> &[ImagePlacement] {
        match page {
            Page::Left => &self.left_page_images,
            Page::Right => &self.right_page_images,
        }
    }

    /// Text of the given page.
    #[must_use]
    pub fn content(&self, page: Page) -> &str {
        match page {
            Page::Left => &self.left_page_content,
            Page::Right => &self.right_page_content,
        }
    }

    /// The recipe's text style, with blank or zero values replaced by `fallback`.
    #[must_use]
    pub fn text_style_or(&self, fallback: &TextStyle) -> TextStyle {
        TextStyle {
            font_size: if self.font_size == 0 {
                fallback.font_size
            } else {
                self.font_size
            },
            font_family: if self.font_family.trim().is_empty() {
                fallback.font_family.clone()
            } else {
                self.font_family.clone()
            },
            font_color: if self.font_color.trim().is_empty() {
                fallback.font_color.clone()
            } else {
                self.font_color.clone()
            },
        }
    }
}

/// Distinct non-blank category labels across `recipes`, sorted.
#[must_use]
pub fn categories_of(recipes: &[Recipe]) -> Vec<String> {
    recipes
        .iter()
        .map(|r| r.category.as_str())
        .filter(|c| !c.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Sort recipes newest-created first, keeping input order among equal times.
pub fn sort_newest_first(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
