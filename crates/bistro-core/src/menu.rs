//! Menu catalog - static dish definitions loaded from a JSON manifest.
//!
//! The catalog is read-only configuration supplied at startup. A missing or
//! invalid manifest is a fatal configuration error: the engine refuses to
//! start rather than produce guests with unorderable menus.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::components::Order;

/// One dish definition: name, timings and price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dish {
    pub name: String,
    /// Base preparation time in seconds
    pub prep_time: f32,
    /// How long a guest takes to eat it, in seconds
    pub eating_duration: f32,
    pub price: f32,
}

impl Dish {
    /// Construct a fresh (undelivered) order for this dish.
    pub fn to_order(&self) -> Order {
        Order::new(&self.name, self.prep_time, self.eating_duration, self.price)
    }
}

/// The restaurant's menu. Validated once at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCatalog {
    dishes: Vec<Dish>,
}

impl MenuCatalog {
    /// Build a catalog from already-parsed dishes, validating them.
    pub fn new(dishes: Vec<Dish>) -> Result<Self, ConfigError> {
        if dishes.is_empty() {
            return Err(ConfigError::EmptyMenu);
        }
        for dish in &dishes {
            if dish.name.is_empty()
                || dish.prep_time <= 0.0
                || dish.eating_duration <= 0.0
                || dish.price < 0.0
            {
                return Err(ConfigError::InvalidDish {
                    name: dish.name.clone(),
                });
            }
        }
        Ok(Self { dishes })
    }

    /// Parse and validate a JSON manifest string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let dishes: Vec<Dish> = serde_json::from_str(json)?;
        Self::new(dishes)
    }

    /// Parse and validate a JSON manifest from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ConfigError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_json_str(&buf)
    }

    pub fn dishes(&self) -> &[Dish] {
        &self.dishes
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }

    /// Dishes the guest can afford with the given budget.
    pub fn affordable(&self, budget: f32) -> Vec<&Dish> {
        self.dishes.iter().filter(|d| d.price <= budget).collect()
    }

    /// Pick a dish uniformly at random among those the budget allows.
    /// Returns `None` when the guest cannot afford anything.
    pub fn choose<R: Rng>(&self, rng: &mut R, budget: f32) -> Option<&Dish> {
        let options = self.affordable(budget);
        if options.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..options.len());
        Some(options[idx])
    }
}

/// Errors raised while loading the menu manifest.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The manifest parsed but contains no dishes
    EmptyMenu,
    /// A dish has a missing name or non-positive timing
    InvalidDish { name: String },
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "Menu manifest parse error: {}", e),
            ConfigError::EmptyMenu => write!(f, "Menu manifest contains no dishes"),
            ConfigError::InvalidDish { name } => {
                write!(f, "Invalid dish definition: {:?}", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const MANIFEST: &str = r#"[
        { "name": "Salad",  "prep_time": 5.0,  "eating_duration": 6.0, "price": 4.0 },
        { "name": "Burger", "prep_time": 10.0, "eating_duration": 7.0, "price": 8.0 }
    ]"#;

    #[test]
    fn test_manifest_parses() {
        let menu = MenuCatalog::from_json_str(MANIFEST).unwrap();
        assert_eq!(menu.len(), 2);
        assert_eq!(menu.dishes()[0].name, "Salad");
    }

    #[test]
    fn test_empty_menu_is_fatal() {
        assert!(matches!(
            MenuCatalog::from_json_str("[]"),
            Err(ConfigError::EmptyMenu)
        ));
    }

    #[test]
    fn test_invalid_dish_is_fatal() {
        let bad = r#"[{ "name": "Soup", "prep_time": 0.0, "eating_duration": 5.0, "price": 2.0 }]"#;
        assert!(matches!(
            MenuCatalog::from_json_str(bad),
            Err(ConfigError::InvalidDish { .. })
        ));
    }

    #[test]
    fn test_choose_respects_budget() {
        let menu = MenuCatalog::from_json_str(MANIFEST).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        // Budget only covers the salad
        for _ in 0..20 {
            let dish = menu.choose(&mut rng, 5.0).unwrap();
            assert_eq!(dish.name, "Salad");
        }

        // No budget at all
        assert!(menu.choose(&mut rng, 1.0).is_none());
    }

    #[test]
    fn test_order_from_dish() {
        let menu = MenuCatalog::from_json_str(MANIFEST).unwrap();
        let order = menu.dishes()[1].to_order();
        assert_eq!(order.dish, "Burger");
        assert_eq!(order.prep_time, 10.0);
        assert!(!order.delivered);
    }
}
