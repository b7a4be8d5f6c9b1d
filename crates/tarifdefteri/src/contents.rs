//! Table of contents: recipes grouped by category.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::recipe::Recipe;

/// Section name for recipes without a category.
pub const UNCATEGORIZED: &str = "Diğer";

/// One category heading and its recipes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section<'a> {
    /// Category label, or [`UNCATEGORIZED`].
    pub name: String,
    /// Recipes in list order.
    pub recipes: Vec<&'a Recipe>,
}

/// Group `recipes` by category, sections sorted by name.
///
/// Recipes with a blank category are listed under [`UNCATEGORIZED`].
#[must_use]
pub fn table_of_contents(recipes: &[Recipe]) -> Vec<Section<'_>> {
    let mut sections: BTreeMap<&str, Vec<&Recipe>> = BTreeMap::new();
    for recipe in recipes {
        let category = recipe.category.trim();
        let name = if category.is_empty() {
            UNCATEGORIZED
        } else {
            category
        };
        sections.entry(name).or_default().push(recipe);
    }

    sections
        .into_iter()
        .map(|(name, recipes)| Section {
            name: name.to_string(),
            recipes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{RecipeInput, TextStyle};
    use chrono::Utc;

    fn recipe(id: &str, category: &str) -> Recipe {
        let input = RecipeInput {
            title: id.to_string(),
            category: category.to_string(),
            ..RecipeInput::placeholder(&TextStyle::default())
        };
        Recipe::from_input(id.to_string(), input, Utc::now())
    }

    #[test]
    fn test_empty() {
        assert!(table_of_contents(&[]).is_empty());
    }

    #[test]
    fn test_groups_and_sorts() {
        let recipes = vec![
            recipe("kek", "Tatlı"),
            recipe("mercimek", "Çorba"),
            recipe("pilav", ""),
            recipe("baklava", "Tatlı"),
            recipe("ayran", "İçecek"),
        ];
        let toc = table_of_contents(&recipes);

        let names: Vec<_> = toc.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Diğer", "Tatlı", "Çorba", "İçecek"]);

        let tatli: Vec<_> = toc[1].recipes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(tatli, vec!["kek", "baklava"]);
        assert_eq!(toc[0].recipes[0].id, "pilav");
    }

    #[test]
    fn test_whitespace_category_is_uncategorized() {
        let recipes = vec![recipe("a", "  ")];
        let toc = table_of_contents(&recipes);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].name, UNCATEGORIZED);
    }
}
