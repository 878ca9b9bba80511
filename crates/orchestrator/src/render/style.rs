#![forbid(unsafe_code)]

use config::{MarkerCategory, ZoneKind};
use kernel::geometry::format_distance;
use kernel::{LngLat, Marker, MarkerId, UserLocation, Zone, ZoneId};

const SELECTED_SIZE: u32 = 56;
const NEARBY_SIZE: u32 = 48;
const DEFAULT_SIZE: u32 = 40;

/// Distances below this get a badge on the marker.
const BADGE_MAX_DISTANCE: f64 = 1000.0;

/// The accuracy circle is only drawn for fixes better than this.
const ACCURACY_CIRCLE_MAX: f64 = 100.0;
const ACCURACY_RADIUS_CAP: f64 = 50.0;

pub fn zone_color(kind: ZoneKind) -> &'static str {
    match kind {
        ZoneKind::Safe => "#10b981",
        ZoneKind::Caution => "#f59e0b",
        ZoneKind::Restricted => "#ef4444",
        ZoneKind::Recommended => "#D4AF37",
    }
}

pub fn marker_color(category: MarkerCategory) -> &'static str {
    match category {
        MarkerCategory::Hotel => "#D4AF37",
        MarkerCategory::Restaurant => "#f59e0b",
        MarkerCategory::Attraction => "#3b82f6",
        MarkerCategory::Event => "#a855f7",
        MarkerCategory::Villa => "#ec4899",
        MarkerCategory::Service => "#6b7280",
    }
}

pub fn category_icon(category: MarkerCategory) -> &'static str {
    match category {
        MarkerCategory::Hotel => "🏨",
        MarkerCategory::Restaurant => "🍽️",
        MarkerCategory::Attraction => "🎭",
        MarkerCategory::Event => "🎉",
        MarkerCategory::Villa => "🏖️",
        MarkerCategory::Service => "🛎️",
    }
}

/// Lighten (positive `amount`) or darken a `#rrggbb` colour channel-wise.
/// Anything that is not a six digit hex colour comes back unchanged.
///
/// ```
/// use orchestrator::render::shade;
///
/// assert_eq!(shade("#D4AF37", -20), "#c09b23");
/// assert_eq!(shade("#ffffff", 10), "#ffffff");
/// ```
pub fn shade(color: &str, amount: i16) -> String {
    let Some(rgb) = color
        .strip_prefix('#')
        .filter(|hex| hex.len() == 6)
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
    else {
        return color.to_owned();
    };

    let channel = |shift: u32| {
        let value = i16::try_from((rgb >> shift) & 0xff).unwrap_or(0);
        u32::try_from((value + amount).clamp(0, 255)).unwrap_or(0)
    };
    let shaded = (channel(16) << 16) | (channel(8) << 8) | channel(0);
    format!("#{shaded:06x}")
}

/// Everything a surface needs to draw one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSprite {
    pub id: MarkerId,
    pub position: LngLat,
    pub color: &'static str,
    pub icon: &'static str,
    pub size: u32,
    pub nearby: bool,
    pub selected: bool,
    pub favorite: bool,
    pub distance_badge: Option<String>,
}

impl MarkerSprite {
    pub fn new(marker: &Marker, selected: bool) -> Self {
        let size = if selected {
            SELECTED_SIZE
        } else if marker.is_nearby {
            NEARBY_SIZE
        } else {
            DEFAULT_SIZE
        };

        Self {
            id: marker.id,
            position: marker.position(),
            color: marker_color(marker.category),
            icon: category_icon(marker.category),
            size,
            nearby: marker.is_nearby,
            selected,
            favorite: marker.is_favorite,
            distance_badge: marker
                .distance_from_user
                .filter(|d| *d < BADGE_MAX_DISTANCE)
                .map(format_distance),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneShape {
    pub id: ZoneId,
    pub name: String,
    pub kind: ZoneKind,
    pub color: &'static str,
    pub ring: Vec<LngLat>,
}

impl From<&Zone> for ZoneShape {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id,
            name: zone.name.clone(),
            kind: zone.kind,
            color: zone_color(zone.kind),
            ring: zone.coordinates.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserSprite {
    pub position: LngLat,
    /// Radius of the accuracy circle, when one should be drawn.
    pub accuracy_radius: Option<f64>,
}

impl From<&UserLocation> for UserSprite {
    fn from(location: &UserLocation) -> Self {
        Self {
            position: location.point(),
            accuracy_radius: location
                .accuracy
                .filter(|a| *a < ACCURACY_CIRCLE_MAX)
                .map(|a| a.min(ACCURACY_RADIUS_CAP)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sprite_size_follows_state() {
        let mut marker = Marker::new(1, "Cenote", 21.0, -86.8, MarkerCategory::Attraction);
        assert_eq!(MarkerSprite::new(&marker, false).size, 40);
        marker.is_nearby = true;
        assert_eq!(MarkerSprite::new(&marker, false).size, 48);
        assert_eq!(MarkerSprite::new(&marker, true).size, 56);
    }

    #[test]
    fn badge_only_below_a_kilometer() {
        let mut marker = Marker::new(1, "Cenote", 21.0, -86.8, MarkerCategory::Attraction);
        assert_eq!(MarkerSprite::new(&marker, false).distance_badge, None);

        marker.distance_from_user = Some(420.4);
        assert_eq!(
            MarkerSprite::new(&marker, false).distance_badge.as_deref(),
            Some("420m")
        );

        marker.distance_from_user = Some(1000.0);
        assert_eq!(MarkerSprite::new(&marker, false).distance_badge, None);
    }

    #[test]
    fn accuracy_circle() {
        let location = UserLocation::new(21.0, -86.8);
        assert_eq!(UserSprite::from(&location).accuracy_radius, None);
        assert_eq!(
            UserSprite::from(&location.with_accuracy(30.0)).accuracy_radius,
            Some(30.0)
        );
        assert_eq!(
            UserSprite::from(&location.with_accuracy(80.0)).accuracy_radius,
            Some(50.0)
        );
        assert_eq!(UserSprite::from(&location.with_accuracy(150.0)).accuracy_radius, None);
    }

    #[test]
    fn shade_clamps_channels() {
        assert_eq!(shade("#000000", -20), "#000000");
        assert_eq!(shade("#101010", 16), "#202020");
        assert_eq!(shade("teal", 10), "teal");
    }
}
