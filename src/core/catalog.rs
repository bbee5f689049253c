use crate::domain::model::Product;
use crate::utils::error::{Result, SmartFitError};

/// Fixed, read-only product list served by the API.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn seeded() -> Self {
        Self::new(seed_products())
    }

    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: u32) -> Result<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| SmartFitError::NotFound {
                resource: "Product".to_string(),
                id: id.to_string(),
            })
    }

    /// Identifier as it arrives in a URL path; anything that is not an
    /// integer cannot match and is reported as not found.
    pub fn get_by_path_id(&self, raw: &str) -> Result<&Product> {
        match raw.trim().parse::<u32>() {
            Ok(id) => self.get(id),
            Err(_) => Err(SmartFitError::NotFound {
                resource: "Product".to_string(),
                id: raw.to_string(),
            }),
        }
    }
}

fn product(id: u32, name: &str, price: f64, image: &str, description: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        price,
        image: image.to_string(),
        description: description.to_string(),
    }
}

pub fn seed_products() -> Vec<Product> {
    vec![
        product(
            1,
            "Floral Summer Dress",
            49.99,
            "https://images.pexels.com/photos/1488463/pexels-photo-1488463.jpeg",
            "A light, floral dress perfect for summer outings.",
        ),
        product(
            2,
            "Classic Blue Jeans",
            39.99,
            "https://images.pexels.com/photos/2983464/pexels-photo-2983464.jpeg",
            "Timeless blue jeans with a comfortable fit.",
        ),
        product(
            3,
            "White Cotton Shirt",
            29.99,
            "https://images.pexels.com/photos/532220/pexels-photo-532220.jpeg",
            "A crisp, white cotton shirt for any occasion.",
        ),
        product(
            4,
            "Green T-Shirt",
            19.99,
            "https://images.pexels.com/photos/936075/pexels-photo-936075.jpeg",
            "Soft green t-shirt, great for casual wear.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids_return_seeded_record() {
        let catalog = ProductCatalog::seeded();
        for seeded in seed_products() {
            assert_eq!(catalog.get(seeded.id).unwrap(), &seeded);
        }
        assert_eq!(catalog.get(2).unwrap().name, "Classic Blue Jeans");
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let catalog = ProductCatalog::seeded();
        for id in [0, 5, 99, u32::MAX] {
            assert!(matches!(catalog.get(id), Err(SmartFitError::NotFound { .. })));
        }
        for raw in ["abc", "-1", "", "2.5"] {
            assert!(matches!(
                catalog.get_by_path_id(raw),
                Err(SmartFitError::NotFound { .. })
            ));
        }
        assert_eq!(catalog.get_by_path_id("3").unwrap().id, 3);
    }

    #[test]
    fn test_list_preserves_seed_order() {
        let ids: Vec<u32> = ProductCatalog::seeded().list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
