//! Pure geometry helpers: great-circle distance, point-in-polygon and a few
//! display conversions.

use crate::location::{LngLat, UserLocation};
use crate::zone::Zone;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Meters per degree used by the planar approximation.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Great-circle distance in meters between two coordinates (haversine).
#[inline]
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Cheap equirectangular distance, good enough to tell GPS jitter from
/// movement over a few meters.
#[inline]
pub fn approx_planar_distance(a: &UserLocation, b: &UserLocation) -> f64 {
    let dy = (a.lat - b.lat) * METERS_PER_DEGREE;
    let dx = (a.lng - b.lng) * METERS_PER_DEGREE;
    (dx * dx + dy * dy).sqrt()
}

/// Ray-casting containment test. The ring is assumed simple; a point lying
/// exactly on an edge may land on either side.
pub fn point_in_polygon(point: LngLat, ring: &[LngLat]) -> bool {
    let mut inside = false;
    if ring.is_empty() {
        return inside;
    }

    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lng, ring[i].lat);
        let (xj, yj) = (ring[j].lng, ring[j].lat);

        let crosses = (yi > point.lat) != (yj > point.lat)
            && point.lng < (xj - xi) * (point.lat - yi) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Arithmetic mean of the ring's vertices; `(0, 0)` for an empty ring.
pub fn centroid(ring: &[LngLat]) -> LngLat {
    if ring.is_empty() {
        return LngLat::new(0.0, 0.0);
    }
    let (lng, lat) = ring
        .iter()
        .fold((0.0, 0.0), |(lng, lat), p| (lng + p.lng, lat + p.lat));
    let n = ring.len() as f64;
    LngLat::new(lng / n, lat / n)
}

/// First zone, in input order, whose ring contains the location. Overlapping
/// zones resolve by list position only.
pub fn current_zone_for<'a>(location: &UserLocation, zones: &'a [Zone]) -> Option<&'a Zone> {
    let point = location.point();
    zones.iter().find(|zone| zone.contains(point))
}

/// Human readable distance.
///
/// ```
/// # use kernel::geometry::format_distance;
/// assert_eq!(format_distance(42.4), "42m");
/// assert_eq!(format_distance(999.4), "999m");
/// assert_eq!(format_distance(1234.0), "1.2km");
/// ```
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round() as i64)
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ZoneKind;
    use proptest::prelude::*;

    const EPS: f64 = 1e-6;

    proptest! {
        #[test]
        fn distance_is_symmetric(
            lat1 in -89.0f64..89.0, lng1 in -179.0f64..179.0,
            lat2 in -89.0f64..89.0, lng2 in -179.0f64..179.0,
        ) {
            let ab = distance_meters(lat1, lng1, lat2, lng2);
            let ba = distance_meters(lat2, lng2, lat1, lng1);
            prop_assert!((ab - ba).abs() < EPS);
            prop_assert!(ab >= 0.0);
        }

        #[test]
        fn distance_to_self_is_zero(lat in -89.0f64..89.0, lng in -179.0f64..179.0) {
            prop_assert!(distance_meters(lat, lng, lat, lng).abs() < EPS);
        }

        #[test]
        fn distinct_points_are_apart(
            lat in -80.0f64..80.0, lng in -170.0f64..170.0,
            dlat in 0.001f64..1.0, dlng in 0.001f64..1.0,
        ) {
            prop_assert!(distance_meters(lat, lng, lat + dlat, lng + dlng) > 0.0);
        }

        #[test]
        fn centroid_of_rectangle_is_inside(
            west in -170.0f64..160.0, south in -80.0f64..70.0,
            width in 0.01f64..5.0, height in 0.01f64..5.0,
        ) {
            let zone = Zone::rectangle(1, "r", ZoneKind::Safe, (west, south), (west + width, south + height));
            prop_assert!(point_in_polygon(centroid(&zone.coordinates[..4]), &zone.coordinates));
        }
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn point_outside_and_empty_ring() {
        let zone = Zone::rectangle(1, "r", ZoneKind::Safe, (0.0, 0.0), (1.0, 1.0));
        assert!(!point_in_polygon(LngLat::new(1.5, 0.5), &zone.coordinates));
        assert!(!point_in_polygon(LngLat::new(0.5, 0.5), &[]));
        assert_eq!(centroid(&[]), LngLat::new(0.0, 0.0));
    }

    #[test]
    fn concave_ring() {
        // U shape opening to the north
        let ring = [
            LngLat::new(0.0, 0.0),
            LngLat::new(3.0, 0.0),
            LngLat::new(3.0, 3.0),
            LngLat::new(2.0, 3.0),
            LngLat::new(2.0, 1.0),
            LngLat::new(1.0, 1.0),
            LngLat::new(1.0, 3.0),
            LngLat::new(0.0, 3.0),
            LngLat::new(0.0, 0.0),
        ];
        assert!(point_in_polygon(LngLat::new(0.5, 2.0), &ring));
        assert!(!point_in_polygon(LngLat::new(1.5, 2.0), &ring));
        assert!(point_in_polygon(LngLat::new(1.5, 0.5), &ring));
    }

    #[test]
    fn current_zone_is_first_match_in_list_order() {
        let outer = Zone::rectangle(1, "outer", ZoneKind::Safe, (0.0, 0.0), (10.0, 10.0));
        let inner = Zone::rectangle(2, "inner", ZoneKind::Restricted, (4.0, 4.0), (6.0, 6.0));
        let location = UserLocation::new(5.0, 5.0);

        let zones = vec![outer.clone(), inner.clone()];
        assert_eq!(current_zone_for(&location, &zones).map(|z| z.id), Some(outer.id));

        // same zones, reversed: the result follows list order, not specificity
        let zones = vec![inner.clone(), outer.clone()];
        assert_eq!(current_zone_for(&location, &zones).map(|z| z.id), Some(inner.id));

        let elsewhere = UserLocation::new(50.0, 50.0);
        assert!(current_zone_for(&elsewhere, &zones).is_none());
    }

    #[test]
    fn planar_distance_matches_degrees() {
        let a = UserLocation::new(21.0, -86.0);
        let b = UserLocation::new(21.0001, -86.0);
        assert!((approx_planar_distance(&a, &b) - 11.1).abs() < 0.01);
    }

    #[test]
    fn format_distance_boundaries() {
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(999.6), "1000m");
        assert_eq!(format_distance(1000.0), "1.0km");
        assert_eq!(format_distance(10_049.0), "10.0km");
    }
}
