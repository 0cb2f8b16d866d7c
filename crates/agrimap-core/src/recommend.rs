//! Crop suggestions sized to a farm.
//!
//! The three built-in suggestions are fixed; any catalog crop can be added on
//! top of them.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogCrop;
use crate::generate::{slugify, ColorGenerator, PaletteColors};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Suggested allocation in hectares.
    pub ideal_area: f64,
    /// Largest sensible allocation in hectares.
    pub max_area: f64,
    pub growth_period: String,
    pub water_requirement: String,
    pub profitability: String,
    pub difficulty: String,
    pub market_price: String,
    pub benefits: Vec<String>,
    pub color: String,
}

struct Builtin {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    ideal_share: f64,
    max_share: f64,
    growth_period: &'static str,
    water: &'static str,
    profitability: &'static str,
    difficulty: &'static str,
    market_price: &'static str,
    benefits: [&'static str; 2],
    color: &'static str,
}

const BUILTIN: [Builtin; 3] = [
    Builtin {
        id: "wheat",
        name: "Winter Wheat",
        description: "High-yield grain crop suitable for your soil type.",
        ideal_share: 0.4,
        max_share: 0.6,
        growth_period: "8-10 months",
        water: "Medium",
        profitability: "High",
        difficulty: "Easy",
        market_price: "₹2,500/quintal",
        benefits: ["Stable market demand", "Good storage life"],
        color: "#F59E0B",
    },
    Builtin {
        id: "corn",
        name: "Sweet Corn",
        description: "Fast-growing crop with excellent market demand.",
        ideal_share: 0.3,
        max_share: 0.5,
        growth_period: "3-4 months",
        water: "High",
        profitability: "High",
        difficulty: "Medium",
        market_price: "₹3,200/quintal",
        benefits: ["Quick returns", "High nutrition value"],
        color: "#10B981",
    },
    Builtin {
        id: "vegetables",
        name: "Mixed Vegetables",
        description: "Diverse vegetable crops for local market supply.",
        ideal_share: 0.2,
        max_share: 0.4,
        growth_period: "2-6 months",
        water: "Medium",
        profitability: "Medium",
        difficulty: "Medium",
        market_price: "₹1,800/quintal",
        benefits: ["Diverse income", "Local market"],
        color: "#8B5CF6",
    },
];

/// Share of the farm suggested for a crop added from the catalog.
const CUSTOM_IDEAL_SHARE: f64 = 0.1;
const CUSTOM_MAX_SHARE: f64 = 0.8;

/// Colours for catalog crops, picked after the ones the built-ins use.
pub fn custom_colors() -> PaletteColors {
    PaletteColors::starting_at(BUILTIN.len())
}

/// The built-in suggestions, with areas rounded to whole hectares.
pub fn initial_recommendations(farm_area: f64) -> Vec<Recommendation> {
    BUILTIN
        .iter()
        .map(|b| Recommendation {
            id: b.id.to_string(),
            name: b.name.to_string(),
            description: b.description.to_string(),
            ideal_area: (farm_area * b.ideal_share).round(),
            max_area: (farm_area * b.max_share).round(),
            growth_period: b.growth_period.to_string(),
            water_requirement: b.water.to_string(),
            profitability: b.profitability.to_string(),
            difficulty: b.difficulty.to_string(),
            market_price: b.market_price.to_string(),
            benefits: b.benefits.iter().map(|s| s.to_string()).collect(),
            color: b.color.to_string(),
        })
        .collect()
}

pub fn custom_recommendation(
    crop: &CatalogCrop,
    farm_area: f64,
    colors: &mut dyn ColorGenerator,
) -> Recommendation {
    let description = if crop.notes.is_empty() {
        format!("A {} for the {} season.", crop.category, crop.season)
    } else {
        crop.notes.to_string()
    };
    Recommendation {
        id: slugify(crop.crop),
        name: crop.crop.to_string(),
        description,
        ideal_area: (farm_area * CUSTOM_IDEAL_SHARE).round(),
        max_area: (farm_area * CUSTOM_MAX_SHARE).round(),
        growth_period: format!("{} to {}", crop.sowing_months, crop.harvest_months),
        water_requirement: "Medium".into(),
        profitability: "Medium".into(),
        difficulty: "Medium".into(),
        market_price: "Varies".into(),
        benefits: vec![crop.category.to_string(), crop.season.to_string()],
        color: colors.next_color(),
    }
}

/// The suggestion list shown for one farm.
#[derive(Debug, Clone)]
pub struct Recommendations {
    farm_area: f64,
    items: Vec<Recommendation>,
}

impl Recommendations {
    pub fn for_area(farm_area: f64) -> Self {
        Self {
            farm_area,
            items: initial_recommendations(farm_area),
        }
    }

    /// Append a catalog crop. Returns false if a crop with the same name is
    /// already listed. A crop whose slug is taken by a differently named one
    /// gets a numbered id (`wheat-2`), so every id stays unique.
    pub fn add_custom(&mut self, crop: &CatalogCrop, colors: &mut dyn ColorGenerator) -> bool {
        if self.items.iter().any(|r| r.name.eq_ignore_ascii_case(crop.crop)) {
            return false;
        }
        let mut rec = custom_recommendation(crop, self.farm_area, colors);
        if self.get(&rec.id).is_some() {
            let base = rec.id.clone();
            let mut n = 2;
            while self.get(&format!("{}-{}", base, n)).is_some() {
                n += 1;
            }
            rec.id = format!("{}-{}", base, n);
        }
        self.items.push(rec);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Recommendation> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn items(&self) -> &[Recommendation] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Recommendation> {
        self.items
    }
}
