//! Marketplace product listing.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as returned by the backend.
///
/// The client never mutates these; each page fetch produces fresh copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub quantity: i32,
    /// Image reference. Older listing endpoints call this `image_url`.
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
    /// Address of the seller, when the backend joins it in.
    #[serde(default, alias = "full_address")]
    pub owner_address: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_listing_shape() {
        let json = r#"{
            "id": 1,
            "name": "Lamp",
            "description": "Brass desk lamp",
            "price": 49.9,
            "quantity": 3,
            "image_url": "lamp.png"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price.to_string(), "49.90");
        assert_eq!(product.image.as_deref(), Some("lamp.png"));
        assert_eq!(product.owner_address, None);
    }

    #[test]
    fn test_deserialize_dashboard_shape() {
        let json = r#"{
            "id": 9,
            "name": "Chair",
            "description": "Oak",
            "price": 120,
            "quantity": 1,
            "image": "chair.jpg",
            "owner_address": "12 Herzl St, Haifa, Israel"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.image.as_deref(), Some("chair.jpg"));
        assert_eq!(
            product.owner_address.as_deref(),
            Some("12 Herzl St, Haifa, Israel")
        );
    }

    #[test]
    fn test_missing_image_is_none() {
        let json = r#"{"id":2,"name":"x","description":"y","price":1.0,"quantity":0}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.image.is_none());
    }
}
