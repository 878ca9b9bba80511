use crate::geometry::distance_meters;
use crate::ids::MarkerId;
use crate::location::{LngLat, UserLocation};
use config::{MarkerCategory, PriceRange};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerMetadata {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    pub amenities: Vec<String>,
}

/// A point of interest.
///
/// `distance_from_user`, `is_nearby` and `is_favorite` are derived fields. They
/// are never read from a catalog and are only written while annotating a
/// snapshot for a particular user location and favorites set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub category: MarkerCategory,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub metadata: Option<MarkerMetadata>,

    #[serde(skip)]
    pub distance_from_user: Option<f64>,
    #[serde(skip)]
    pub is_nearby: bool,
    #[serde(skip)]
    pub is_favorite: bool,
}

impl Marker {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        lat: f64,
        lng: f64,
        category: MarkerCategory,
    ) -> Self {
        Self {
            id: MarkerId(id),
            name: name.into(),
            lat,
            lng,
            category,
            rating: None,
            price_range: None,
            description: None,
            image_url: None,
            metadata: None,
            distance_from_user: None,
            is_nearby: false,
            is_favorite: false,
        }
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_price_range(mut self, price_range: PriceRange) -> Self {
        self.price_range = Some(price_range);
        self
    }

    pub fn position(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }

    pub fn distance_to(&self, location: &UserLocation) -> f64 {
        distance_meters(location.lat, location.lng, self.lat, self.lng)
    }

    /// Copy annotated with its distance to `location` and whether that
    /// distance is within `radius` meters.
    pub fn annotated(&self, location: &UserLocation, radius: f64) -> Self {
        let distance = self.distance_to(location);
        Self {
            distance_from_user: Some(distance),
            is_nearby: distance <= radius,
            ..self.clone()
        }
    }

    /// Rating used by filters; an unrated marker counts as zero.
    pub fn effective_rating(&self) -> f32 {
        self.rating.unwrap_or(0.0)
    }
}
