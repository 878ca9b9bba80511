#![forbid(unsafe_code)]

use crate::category::{MarkerCategory, PriceRange, ZoneKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// User-selected filter predicates. Every field is optional and an unset
/// field (or an empty set) imposes no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_types: Option<BTreeSet<ZoneKind>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_categories: Option<BTreeSet<MarkerCategory>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_ranges: Option<BTreeSet<PriceRange>>,

    /// Minimum rating (0..=5). Zero behaves like unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f32>,

    /// Maximum distance from the user in meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_only_nearby: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_only_favorites: Option<bool>,
}

impl MapFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_zone_types(mut self, kinds: impl IntoIterator<Item = ZoneKind>) -> Self {
        self.zone_types = Some(kinds.into_iter().collect());
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = MarkerCategory>) -> Self {
        self.marker_categories = Some(categories.into_iter().collect());
        self
    }

    pub fn with_price_ranges(mut self, ranges: impl IntoIterator<Item = PriceRange>) -> Self {
        self.price_ranges = Some(ranges.into_iter().collect());
        self
    }

    pub fn with_min_rating(mut self, rating: f32) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn with_max_distance(mut self, meters: f64) -> Self {
        self.max_distance = Some(meters);
        self
    }

    pub fn only_nearby(mut self) -> Self {
        self.show_only_nearby = Some(true);
        self
    }

    pub fn only_favorites(mut self) -> Self {
        self.show_only_favorites = Some(true);
        self
    }

    /// Set of zone kinds to keep, if it constrains anything.
    pub fn zone_constraint(&self) -> Option<&BTreeSet<ZoneKind>> {
        self.zone_types.as_ref().filter(|set| !set.is_empty())
    }

    pub fn category_constraint(&self) -> Option<&BTreeSet<MarkerCategory>> {
        self.marker_categories.as_ref().filter(|set| !set.is_empty())
    }

    pub fn price_constraint(&self) -> Option<&BTreeSet<PriceRange>> {
        self.price_ranges.as_ref().filter(|set| !set.is_empty())
    }

    pub fn rating_constraint(&self) -> Option<f32> {
        self.min_rating.filter(|rating| *rating > 0.0)
    }

    pub fn distance_constraint(&self) -> Option<f64> {
        self.max_distance.filter(|meters| *meters > 0.0)
    }

    pub fn nearby_only(&self) -> bool {
        self.show_only_nearby.unwrap_or(false)
    }

    pub fn favorites_only(&self) -> bool {
        self.show_only_favorites.unwrap_or(false)
    }
}
