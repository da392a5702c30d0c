//! Category/location vocabulary and category colors.
//!
//! Supplied by the persistence side at load time. The built-in default is the
//! vocabulary of the deployed wound annotation service.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color_utils::{Rgba, parse_or_default};

/// Vocabulary the annotation form draws from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// Wound etiologies, in display order
    #[serde(alias = "etiologyOptions")]
    pub categories: Vec<String>,

    /// Body locations, in display order
    #[serde(alias = "bodyLocations")]
    pub locations: Vec<String>,

    /// Stroke color (`#RRGGBB`) per category
    #[serde(default, rename = "colorByCategory", alias = "categoryColors")]
    pub color_by_category: HashMap<String, String>,
}

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("INSECT BITE", "#FF0000"),
    ("DOG BITE", "#FF4500"),
    ("CAT BITE", "#FF6347"),
    ("HUMAN BITE", "#FF7F50"),
    ("BITE (OTHER)", "#FF8C00"),
    ("SURGICAL", "#800080"),
    ("AUTOIMMUNE", "#9370DB"),
    ("TRAUMA", "#FF1493"),
    ("INFECTIOUS ABCESS", "#8B0000"),
    ("CYST LESION", "#DA70D6"),
    ("VASCULITUS", "#0000FF"),
    ("MALIGNANT", "#000080"),
    ("MASD", "#4169E1"),
    ("CHRONIC SKIN ULCER", "#1E90FF"),
    ("PRESSURE / DEVICE RELATED PRESSURE", "#00BFFF"),
    ("DIABETIC SKIN ULCER (FOOT)", "#00FF00"),
    ("DIABETIC SKIN ULCER (NON-FOOT)", "#32CD32"),
    ("BURN", "#FFA500"),
    ("STOMA", "#8B4513"),
    ("FISTULA/SINUS TRACT", "#A0522D"),
    ("DERMATOLOLICAL", "#6B8E23"),
    ("CALCIPHYLAXIS", "#556B2F"),
    ("NOT A WOUND", "#808080"),
    ("RADIATION WOUND", "#4B0082"),
    ("EDEMA RELATED", "#483D8B"),
];

const DEFAULT_LOCATIONS: &[&str] = &[
    "HEAD",
    "NECK",
    "LOWER EXTREMITY",
    "TORSO ABDOMEN",
    "TORSO BACK",
    "BUTTOCKS SACRUM",
    "PERINEUM",
];

impl AnnotationConfig {
    /// Stroke color for a category, default color if unmapped or unparseable.
    pub fn color_for(&self, category: &str) -> Rgba {
        Rgba::opaque(parse_or_default(
            self.color_by_category.get(category).map(String::as_str),
        ))
    }

    /// First category, used as the working default after load.
    pub fn default_category(&self) -> &str {
        self.categories.first().map(String::as_str).unwrap_or("")
    }

    /// First location, used as the working default after load.
    pub fn default_location(&self) -> &str {
        self.locations.first().map(String::as_str).unwrap_or("")
    }
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
            locations: DEFAULT_LOCATIONS.iter().map(|l| l.to_string()).collect(),
            color_by_category: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, color)| (name.to_string(), color.to_string()))
                .collect(),
        }
    }
}
