// Catalog Domain Model

use serde::{Deserialize, Serialize};

use super::money::Money;

pub type CategoryId = i64;
pub type ProductId = i64;
pub type TagId = i64;

/// Media prefix for every stored file path
pub const MEDIA_URL: &str = "/media/";

/// Image reference as the storefront client renders it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

impl Image {
    /// Build from a path relative to the media root
    pub fn from_media_path(path: &str, alt: impl Into<String>) -> Self {
        Self {
            src: format!("{}{}", MEDIA_URL, path.trim_start_matches('/')),
            alt: alt.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub active: bool,
    pub favourite: bool,
    pub parent_id: Option<CategoryId>,
    pub icon: Option<Image>,
    pub subcategories: Vec<Category>,
}

impl Category {
    pub fn href(&self) -> String {
        format!("/catalog/{}", self.id)
    }

    /// Assemble the two-level tree from a flat list.
    ///
    /// Roots are categories without a parent; children of a root are attached
    /// in input order. Deeper levels are not rendered by the storefront.
    pub fn build_tree(flat: Vec<Category>) -> Vec<Category> {
        let (mut roots, children): (Vec<_>, Vec<_>) =
            flat.into_iter().partition(|c| c.parent_id.is_none());

        for child in children {
            if let Some(root) = roots.iter_mut().find(|r| Some(r.id) == child.parent_id) {
                root.subcategories.push(child);
            }
        }
        roots
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub email: String,
    pub text: String,
    pub rate: u8,
    pub created_at: i64, // epoch ms
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specification {
    pub name: String,
    pub value: String,
}

/// Product as listed in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub price: Money,
    pub count: i64, // stock
    pub created_at: i64,
    pub title: String,
    pub description: String,
    pub full_description: String,
    pub free_delivery: bool,
    pub active: bool,
    pub limited_edition: bool,
    pub rating: f64,
    pub images: Vec<Image>,
    pub tags: Vec<Tag>,
    pub reviews_count: i64,
}

impl Product {
    pub fn in_stock(&self, quantity: u32) -> bool {
        self.count >= i64::from(quantity)
    }
}

/// Product page: listing fields plus reviews and specifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: Product,
    pub reviews: Vec<Review>,
    pub specifications: Vec<Specification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub product_id: ProductId,
    pub price: Money,
    pub sale_price: Money,
    pub date_from: chrono::NaiveDate,
    pub date_to: Option<chrono::NaiveDate>,
    pub title: String,
    pub images: Vec<Image>,
}

impl Sale {
    pub fn href(&self) -> String {
        format!("/product/{}", self.product_id)
    }
}

/// Review submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub author: String,
    pub email: String,
    pub text: String,
    pub rate: u8,
}

/// Average of review rates rounded to two decimals (0 when there are none)
pub fn average_rating(rates: &[u8]) -> f64 {
    if rates.is_empty() {
        return 0.0;
    }
    let sum: u32 = rates.iter().map(|&r| u32::from(r)).sum();
    let avg = f64::from(sum) / rates.len() as f64;
    (avg * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, parent_id: Option<i64>) -> Category {
        Category {
            id,
            title: format!("c{}", id),
            active: true,
            favourite: false,
            parent_id,
            icon: None,
            subcategories: Vec::new(),
        }
    }

    #[test]
    fn test_build_tree_nests_children() {
        let tree = Category::build_tree(vec![
            category(1, None),
            category(2, Some(1)),
            category(3, None),
            category(4, Some(1)),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].subcategories.len(), 2);
        assert_eq!(tree[0].subcategories[1].id, 4);
        assert!(tree[1].subcategories.is_empty());
        assert_eq!(tree[0].href(), "/catalog/1");
    }

    #[test]
    fn test_build_tree_drops_orphans() {
        let tree = Category::build_tree(vec![category(1, None), category(2, Some(99))]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].subcategories.is_empty());
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[5, 4]), 4.5);
        assert_eq!(average_rating(&[5, 4, 4]), 4.33);
    }

    #[test]
    fn test_image_from_media_path() {
        let image = Image::from_media_path("/products/product_1/images/a.png", "Phone");
        assert_eq!(image.src, "/media/products/product_1/images/a.png");
        assert_eq!(image.alt, "Phone");
    }
}
