//! Product catalog consulted by cart operations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemTier {
    Daily,
    Medium,
    Luxury,
}

impl ItemTier {
    /// Daily and medium items both offset luxury-only patterns.
    pub fn is_low_medium(self) -> bool {
        matches!(self, ItemTier::Daily | ItemTier::Medium)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    /// Whole currency units.
    pub price: u64,
    pub tier: ItemTier,
}

impl CatalogItem {
    pub fn new(id: &str, name: &str, price: u64, tier: ItemTier) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            tier,
        }
    }
}

pub fn default_items() -> Vec<CatalogItem> {
    use ItemTier::*;
    vec![
        CatalogItem::new("usb-c-cable", "USB-C Cable", 15, Daily),
        CatalogItem::new("phone-case", "Phone Case", 25, Daily),
        CatalogItem::new("wireless-mouse", "Wireless Mouse", 40, Daily),
        CatalogItem::new("bluetooth-speaker", "Bluetooth Speaker", 75, Daily),
        CatalogItem::new("gaming-headset", "Gaming Headset", 120, Medium),
        CatalogItem::new("smartwatch", "Smartwatch", 180, Medium),
        CatalogItem::new("laptop-backpack", "Laptop Backpack", 60, Daily),
        CatalogItem::new("portable-ssd-1tb", "Portable SSD 1TB", 150, Medium),
        CatalogItem::new(
            "noise-cancelling-headphones",
            "Noise-Cancelling Headphones",
            250,
            Medium,
        ),
        CatalogItem::new("gaming-laptop", "High-End Gaming Laptop", 1800, Luxury),
        CatalogItem::new("dslr-camera", "Premium DSLR Camera", 1500, Luxury),
        CatalogItem::new("smart-tv-65", "4K Smart TV 65-inch", 900, Luxury),
    ]
}

#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Looks an item up by id, falling back to a case-insensitive name match.
    pub fn find(&self, key: &str) -> Option<&CatalogItem> {
        let key = key.trim();
        self.items
            .iter()
            .find(|item| item.id == key)
            .or_else(|| self.items.iter().find(|item| item.name.eq_ignore_ascii_case(key)))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(default_items())
    }
}
