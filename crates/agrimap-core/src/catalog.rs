//! Reference table of common Indian field crops.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCrop {
    pub crop: &'static str,
    pub category: &'static str,
    pub season: &'static str,
    pub sowing_months: &'static str,
    pub harvest_months: &'static str,
    pub major_states: &'static str,
    pub notes: &'static str,
}

const fn crop(
    crop: &'static str,
    category: &'static str,
    season: &'static str,
    sowing_months: &'static str,
    harvest_months: &'static str,
    major_states: &'static str,
    notes: &'static str,
) -> CatalogCrop {
    CatalogCrop {
        crop,
        category,
        season,
        sowing_months,
        harvest_months,
        major_states,
        notes,
    }
}

pub const CROPS: &[CatalogCrop] = &[
    crop("Rice", "Cereal", "Kharif/Rabi", "Jun-Jul / Sep-Oct", "Sep-Dec / Mar-May", "West Bengal; Uttar Pradesh; Punjab", "Main staple; irrigated and rainfed ecologies"),
    crop("Wheat", "Cereal", "Rabi", "Oct-Dec", "Mar-May", "Punjab; Haryana; Uttar Pradesh", "Temperate/rainfed-irrigated; major rabi cereal"),
    crop("Maize", "Cereal", "Kharif/Rabi/Zaid", "Jun-Jul / Oct-Nov / Mar-Apr", "Sep-Dec / Jan-Mar / Apr-Jun", "Madhya Pradesh; Karnataka; Maharashtra", "Used as food, feed, and industrial"),
    crop("Sorghum (Jowar)", "Cereal", "Kharif/Rabi", "Jun-Jul / Oct-Nov", "Sep-Dec / Mar-May", "Maharashtra; Karnataka; Telangana", "Drought tolerant; used as staple and fodder"),
    crop("Pearl Millet (Bajra)", "Cereal", "Kharif", "Jun-Jul", "Sep-Nov", "Rajasthan; Gujarat; Haryana", "Rainfed, arid zones"),
    crop("Chickpea (Gram)", "Pulse", "Rabi", "Oct-Dec", "Mar-May", "Madhya Pradesh; Rajasthan; Maharashtra", "Major rabi pulse"),
    crop("Pigeon Pea (Arhar/Toor)", "Pulse", "Kharif/Rabi", "Jun-Jul / Nov-Dec", "Sep-Dec / Feb-Apr", "Madhya Pradesh; Maharashtra; Karnataka", "Important kharif pulse"),
    crop("Groundnut (Peanut)", "Oilseed", "Kharif/Rabi", "Jun-Jul / Oct-Nov", "Sep-Dec / Feb-Apr", "Gujarat; Andhra Pradesh; Tamil Nadu", "Major oilseed; rainfed and irrigated"),
    crop("Soybean", "Oilseed", "Kharif", "Jun-Jul", "Sep-Oct", "Madhya Pradesh; Maharashtra; Rajasthan", "Key oilseed and protein source"),
    crop("Rapeseed & Mustard", "Oilseed", "Rabi", "Oct-Nov", "Mar-Apr", "Rajasthan; Uttar Pradesh; Haryana", "Rabi oilseed"),
    crop("Cotton", "Fiber", "Kharif", "Jun-Jul", "Oct-Dec", "Maharashtra; Gujarat; Telangana", "Major fiber crop; Bt cotton widely adopted"),
    crop("Sugarcane", "Cash", "Year-round", "Oct-Mar", "Oct-Dec", "Uttar Pradesh; Maharashtra; Karnataka", "Long-duration ratoonable crop"),
    crop("Potato", "Vegetable", "Rabi/Kharif/Zaid", "Oct-Dec / Feb-Mar / Mar-Apr", "Feb-Apr / May-Jun / Jun-Jul", "West Bengal; Uttar Pradesh; Bihar", "Staple tuber; multiple planting windows"),
    crop("Onion", "Vegetable", "Rabi/Kharif/Zaid", "Sep-Nov / Feb-Mar / Mar-Apr", "Feb-May / Jun-Jul / Jun-Aug", "Maharashtra; Karnataka; Gujarat", "Bulb crop with storability"),
    crop("Tomato", "Vegetable", "Kharif/Rabi/Zaid", "Oct-Dec / Jun-Jul / Feb-Mar", "Jan-Mar / Sep-Nov / Apr-May", "Andhra Pradesh; Karnataka; Maharashtra", "Perishable, warm-season varieties"),
];

pub fn all() -> &'static [CatalogCrop] {
    CROPS
}

/// Exact crop name, ignoring case.
pub fn find(name: &str) -> Option<&'static CatalogCrop> {
    CROPS.iter().find(|c| c.crop.eq_ignore_ascii_case(name.trim()))
}

/// Crops whose name or category contains `term`, ignoring case. A blank term
/// matches everything.
pub fn search(term: &str) -> Vec<&'static CatalogCrop> {
    let term = term.trim().to_lowercase();
    CROPS
        .iter()
        .filter(|c| {
            term.is_empty()
                || c.crop.to_lowercase().contains(&term)
                || c.category.to_lowercase().contains(&term)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_fifteen_crops() {
        assert_eq!(all().len(), 15);
    }

    #[test]
    fn find_ignores_case() {
        assert_eq!(find("  soybean ").unwrap().category, "Oilseed");
        assert!(find("quinoa").is_none());
    }

    #[test]
    fn search_matches_name_and_category() {
        let pulses: Vec<_> = search("PULSE").iter().map(|c| c.crop).collect();
        assert_eq!(pulses, vec!["Chickpea (Gram)", "Pigeon Pea (Arhar/Toor)"]);
        assert_eq!(search("mill").len(), 1);
        assert_eq!(search("").len(), 15);
    }
}
