//! Recipe, search and pantry data types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recipe identifier as issued by the backend.
pub type RecipeId = i64;

/// Minimal recipe projection used in list and grid views.
///
/// The backend sends the picture under either `image` or `images`; both are
/// accepted. Any other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    #[serde(default, alias = "images", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl RecipeSummary {
    pub fn new(id: RecipeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Which backend search variant a session queries.
///
/// The modes are mutually exclusive; selecting one replaces the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Match against every recipe field.
    #[default]
    All,
    ByIngredients,
    ByName,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ByIngredients => "ingredients",
            Self::ByName => "name",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "ingredients" | "by_ingredients" => Ok(Self::ByIngredients),
            "name" | "by_name" => Ok(Self::ByName),
            other => Err(format!("unknown search mode: {}", other)),
        }
    }
}

/// One page request against a search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    /// Sent untrimmed; trimming only decides whether a search runs at all.
    #[serde(rename = "q")]
    pub term: String,
    #[serde(skip)]
    pub mode: SearchMode,
    /// 1-based page cursor.
    pub page: u32,
    pub per_page: u32,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, mode: SearchMode, page: u32, per_page: u32) -> Self {
        Self {
            term: term.into(),
            mode,
            page,
            per_page,
        }
    }
}

/// A single pantry line. An `amount` of zero deletes the item server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItem {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub units: String,
}

impl PantryItem {
    pub fn new(name: impl Into<String>, amount: f64, units: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            units: units.into(),
        }
    }

    /// The deletion marker understood by the pantry endpoint.
    pub fn removal(name: impl Into<String>) -> Self {
        Self::new(name, 0.0, "")
    }

    pub fn is_removal(&self) -> bool {
        self.amount == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_summary_accepts_images_alias() {
        let recipe: RecipeSummary =
            serde_json::from_str(r#"{"id": 7, "name": "Soup", "images": "soup.png", "rating": 4}"#)
                .unwrap();
        assert_eq!(recipe.image.as_deref(), Some("soup.png"));
    }

    #[test]
    fn test_recipe_summary_without_image() {
        let recipe: RecipeSummary = serde_json::from_str(r#"{"id": 1, "name": "Toast"}"#).unwrap();
        assert_eq!(recipe, RecipeSummary::new(1, "Toast"));
    }

    #[test]
    fn test_search_mode_parses_cli_spellings() {
        assert_eq!("Ingredients".parse::<SearchMode>(), Ok(SearchMode::ByIngredients));
        assert_eq!("by_name".parse::<SearchMode>(), Ok(SearchMode::ByName));
        assert!("fuzzy".parse::<SearchMode>().is_err());
    }

    #[test]
    fn test_pantry_removal_has_zero_amount() {
        let item = PantryItem::removal("Rice");
        assert!(item.is_removal());
        assert!(item.units.is_empty());
    }
}
