//! A loaded snapshot of one user's notebook.

use serde::Serialize;
use tracing::debug;

use crate::contents::{table_of_contents, Section};
use crate::error::Result;
use crate::recipe::Recipe;
use crate::storage::RecipeStore;

/// Recipes and categories of one owner, fetched together.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Notebook {
    /// Recipes, newest created first.
    pub recipes: Vec<Recipe>,
    /// Distinct non-blank categories, sorted.
    pub categories: Vec<String>,
}

impl Notebook {
    /// Fetch the recipe list and the category list concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error from either fetch.
    pub async fn load(store: &dyn RecipeStore, owner: &str) -> Result<Self> {
        let (recipes, categories) =
            tokio::try_join!(store.list_recipes(owner), store.list_categories(owner))?;
        debug!(
            owner,
            recipes = recipes.len(),
            categories = categories.len(),
            "Loaded notebook"
        );
        Ok(Self {
            recipes,
            categories,
        })
    }

    /// Recipes filed under `category`, ignoring surrounding whitespace.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Recipe> + 'a {
        let category = category.trim();
        self.recipes
            .iter()
            .filter(move |r| r.category.trim() == category)
    }

    /// Recipes grouped into table-of-contents sections.
    #[must_use]
    pub fn contents(&self) -> Vec<Section<'_>> {
        table_of_contents(&self.recipes)
    }

    /// Number of recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the notebook has no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
