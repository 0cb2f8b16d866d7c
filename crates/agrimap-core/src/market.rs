//! Farm-input marketplace: a fixed listing of fertilizers, pesticides and
//! seeds from nearby vendors, with search, category filter and sorting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Fertilizer,
    Pesticide,
    Seeds,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Listing order.
    #[default]
    Relevance,
    PriceLow,
    PriceHigh,
    Rating,
    /// Nearest vendor first.
    Distance,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: &'static str,
    pub name: &'static str,
    pub location: &'static str,
    /// Kilometres from the farmer.
    pub distance: f64,
    pub phone: &'static str,
    pub rating: f64,
    pub verified: bool,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ProductCategory,
    /// Rupees per `unit`.
    pub price: f64,
    pub unit: &'static str,
    pub rating: f64,
    pub reviews: u32,
    pub description: &'static str,
    pub vendor: &'static Vendor,
    pub in_stock: bool,
}

static GREEN_VALLEY: Vendor = Vendor {
    id: "v1",
    name: "Green Valley Agro",
    location: "Ludhiana, Punjab",
    distance: 5.2,
    phone: "+91 98765 43210",
    rating: 4.7,
    verified: true,
};

static ORGANIC_SOLUTIONS: Vendor = Vendor {
    id: "v2",
    name: "Organic Solutions",
    location: "Amritsar, Punjab",
    distance: 12.8,
    phone: "+91 87654 32109",
    rating: 4.6,
    verified: true,
};

static PUNJAB_SEEDS: Vendor = Vendor {
    id: "v3",
    name: "Punjab Seeds Co.",
    location: "Patiala, Punjab",
    distance: 18.5,
    phone: "+91 76543 21098",
    rating: 4.8,
    verified: true,
};

static HARYANA_AGRI: Vendor = Vendor {
    id: "v4",
    name: "Haryana Agri Mart",
    location: "Karnal, Haryana",
    distance: 25.3,
    phone: "+91 65432 10987",
    rating: 4.5,
    verified: false,
};

pub static PRODUCTS: [Product; 5] = [
    Product {
        id: "1",
        name: "NPK Fertilizer 12:32:16",
        category: ProductCategory::Fertilizer,
        price: 850.0,
        unit: "50kg bag",
        rating: 4.5,
        reviews: 128,
        description: "High-quality balanced NPK fertilizer perfect for wheat and mustard crops",
        vendor: &GREEN_VALLEY,
        in_stock: true,
    },
    Product {
        id: "2",
        name: "Neem Oil Organic Pesticide",
        category: ProductCategory::Pesticide,
        price: 320.0,
        unit: "1 liter",
        rating: 4.8,
        reviews: 89,
        description: "100% organic neem oil for effective pest control without harmful chemicals",
        vendor: &ORGANIC_SOLUTIONS,
        in_stock: true,
    },
    Product {
        id: "3",
        name: "HD-2967 Wheat Seeds",
        category: ProductCategory::Seeds,
        price: 45.0,
        unit: "1kg",
        rating: 4.6,
        reviews: 156,
        description: "High-yielding wheat variety suitable for Punjab climate conditions",
        vendor: &PUNJAB_SEEDS,
        in_stock: false,
    },
    Product {
        id: "4",
        name: "Urea Fertilizer",
        category: ProductCategory::Fertilizer,
        price: 280.0,
        unit: "50kg bag",
        rating: 4.3,
        reviews: 203,
        description: "High-grade urea fertilizer for nitrogen supplementation",
        vendor: &GREEN_VALLEY,
        in_stock: true,
    },
    Product {
        id: "5",
        name: "Mustard Seeds - Pusa Bold",
        category: ProductCategory::Seeds,
        price: 180.0,
        unit: "1kg",
        rating: 4.7,
        reviews: 94,
        description: "Premium mustard seeds with high oil content and disease resistance",
        vendor: &HARYANA_AGRI,
        in_stock: true,
    },
];

pub fn find(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}

/// Products whose name or description contains `query` (ignoring case), in
/// `category` if given, ordered by `sort`. Equal keys keep listing order.
pub fn search(query: &str, category: Option<ProductCategory>, sort: SortOrder) -> Vec<&'static Product> {
    let query = query.trim().to_lowercase();
    let mut hits: Vec<&'static Product> = PRODUCTS
        .iter()
        .filter(|p| {
            query.is_empty()
                || p.name.to_lowercase().contains(&query)
                || p.description.to_lowercase().contains(&query)
        })
        .filter(|p| category.map_or(true, |c| p.category == c))
        .collect();

    match sort {
        SortOrder::Relevance => {}
        SortOrder::PriceLow => hits.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOrder::PriceHigh => hits.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOrder::Rating => hits.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortOrder::Distance => hits.sort_by(|a, b| a.vendor.distance.total_cmp(&b.vendor.distance)),
    }
    hits
}
