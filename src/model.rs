//! Structured documents produced by site collaborators

use serde::{Deserialize, Serialize};

/// A named group of ingredient lines, e.g. "Sos" with its items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientsGroup {
    pub name: String,
    pub ingredients: Vec<String>,
}

/// A recipe extracted from a single page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// The page the recipe was extracted from
    pub url: String,
    pub name: String,
    /// Number of portions, `-1` when the page does not say
    pub portions: i32,
    pub ingredients: Vec<IngredientsGroup>,
    pub steps: Vec<String>,
    /// Absolute image URLs as found on the page
    pub imgs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keys() {
        let recipe = Recipe {
            url: "https://example.com/r".to_string(),
            name: "Pierogi".to_string(),
            portions: 4,
            ingredients: vec![IngredientsGroup {
                name: String::new(),
                ingredients: vec!["mąka".to_string()],
            }],
            steps: vec!["Zagnieść ciasto.".to_string()],
            imgs: vec![],
        };

        let value = serde_json::to_value(&recipe).unwrap();
        for key in ["url", "name", "portions", "ingredients", "steps", "imgs"] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["ingredients"][0]["ingredients"][0], "mąka");
    }
}
