#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Safety/recommendation classification of a zone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Safe,
    Caution,
    Restricted,
    Recommended,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MarkerCategory {
    Hotel,
    Restaurant,
    Attraction,
    Event,
    Villa,
    Service,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PriceRange {
    Budget,
    Moderate,
    Luxury,
    UltraLuxury,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 4] = [
        ZoneKind::Safe,
        ZoneKind::Caution,
        ZoneKind::Restricted,
        ZoneKind::Recommended,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneKind::Safe => "safe",
            ZoneKind::Caution => "caution",
            ZoneKind::Restricted => "restricted",
            ZoneKind::Recommended => "recommended",
        }
    }
}

impl MarkerCategory {
    pub const ALL: [MarkerCategory; 6] = [
        MarkerCategory::Hotel,
        MarkerCategory::Restaurant,
        MarkerCategory::Attraction,
        MarkerCategory::Event,
        MarkerCategory::Villa,
        MarkerCategory::Service,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MarkerCategory::Hotel => "hotel",
            MarkerCategory::Restaurant => "restaurant",
            MarkerCategory::Attraction => "attraction",
            MarkerCategory::Event => "event",
            MarkerCategory::Villa => "villa",
            MarkerCategory::Service => "service",
        }
    }
}

impl PriceRange {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceRange::Budget => "budget",
            PriceRange::Moderate => "moderate",
            PriceRange::Luxury => "luxury",
            PriceRange::UltraLuxury => "ultra-luxury",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MarkerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
