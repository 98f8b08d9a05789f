use serde::{Deserialize, Serialize};

/// The closed set of categories that an expense row may carry. Rows with any other category are
/// dropped when the sheet is read.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Grocery,
    Healthcare,
    Other,
    Entertainment,
    Utility,
    Transport,
    Education,
    Housing,
    #[serde(rename = "Dada's Toys")]
    DadasToys,
    Shopping,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// All known categories in the order they are listed in the sheet's validation list.
    pub const ALL: [Category; 11] = [
        Category::Food,
        Category::Grocery,
        Category::Healthcare,
        Category::Other,
        Category::Entertainment,
        Category::Utility,
        Category::Transport,
        Category::Education,
        Category::Housing,
        Category::DadasToys,
        Category::Shopping,
    ];

    /// Returns true if `value` is exactly the name of a known category.
    pub fn is_known(value: &str) -> bool {
        value.parse::<Category>().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for category in Category::ALL {
            let name = category.to_string();
            assert_eq!(name.parse::<Category>().unwrap(), category);
        }
        assert_eq!(Category::DadasToys.to_string(), "Dada's Toys");
    }

    #[test]
    fn test_is_known_is_exact() {
        assert!(Category::is_known("Food"));
        assert!(Category::is_known("Dada's Toys"));
        assert!(!Category::is_known("food"));
        assert!(!Category::is_known("Travel"));
        assert!(!Category::is_known(""));
    }
}
