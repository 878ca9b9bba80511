#![forbid(unsafe_code)]

//! Annotation and filtering steps applied to a map snapshot, in the order
//! the repository runs them.

use config::MapFilters;
use kernel::{Marker, MarkerId, UserLocation, Zone};
use std::collections::HashSet;

/// Radius used for the `is_nearby` flag of full snapshots, independent of
/// the user's proximity settings.
pub const NEARBY_ANNOTATION_RADIUS: f64 = 500.0;

pub fn annotate_favorites(markers: &mut [Marker], favorites: &HashSet<MarkerId>) {
    for marker in markers {
        marker.is_favorite = favorites.contains(&marker.id);
    }
}

pub fn annotate_distances(markers: &mut [Marker], location: &UserLocation, radius: f64) {
    for marker in markers.iter_mut() {
        *marker = marker.annotated(location, radius);
    }
}

/// Stable ascending sort on `distance_from_user`; markers without a
/// distance go last.
pub fn sort_by_distance(markers: &mut [Marker]) {
    markers.sort_by(|a, b| {
        let a = a.distance_from_user.unwrap_or(f64::INFINITY);
        let b = b.distance_from_user.unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });
}

/// AND-combination of every constraint the filters set.
pub fn filter_markers(markers: Vec<Marker>, filters: &MapFilters, has_location: bool) -> Vec<Marker> {
    let categories = filters.category_constraint();
    let prices = filters.price_constraint();
    let min_rating = filters.rating_constraint();
    let max_distance = filters.distance_constraint();

    markers
        .into_iter()
        .filter(|m| categories.is_none_or(|set| set.contains(&m.category)))
        .filter(|m| prices.is_none_or(|set| m.price_range.is_some_and(|p| set.contains(&p))))
        .filter(|m| min_rating.is_none_or(|min| m.effective_rating() >= min))
        .filter(|m| match max_distance {
            None => true,
            // without a location no distance is known and nothing qualifies
            Some(max) => has_location && m.distance_from_user.is_some_and(|d| d <= max),
        })
        .filter(|m| !filters.nearby_only() || m.is_nearby)
        .filter(|m| !filters.favorites_only() || m.is_favorite)
        .collect()
}

pub fn filter_zones(zones: Vec<Zone>, filters: &MapFilters) -> Vec<Zone> {
    match filters.zone_constraint() {
        None => zones,
        Some(kinds) => zones.into_iter().filter(|z| kinds.contains(&z.kind)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{MarkerCategory, PriceRange, ZoneKind};
    use pretty_assertions::assert_eq;

    fn ids(markers: &[Marker]) -> Vec<u32> {
        markers.iter().map(|m| m.id.0).collect()
    }

    #[test]
    fn min_rating_excludes_unrated() {
        let markers = vec![
            Marker::new(1, "unrated", 0.0, 0.0, MarkerCategory::Hotel),
            Marker::new(2, "three", 0.0, 0.0, MarkerCategory::Hotel).with_rating(3.0),
            Marker::new(3, "four", 0.0, 0.0, MarkerCategory::Hotel).with_rating(4.0),
            Marker::new(4, "five", 0.0, 0.0, MarkerCategory::Hotel).with_rating(5.0),
        ];
        let filters = MapFilters::default().with_min_rating(4.0);
        assert_eq!(ids(&filter_markers(markers, &filters, false)), vec![3, 4]);
    }

    #[test]
    fn price_filter_excludes_unpriced() {
        let markers = vec![
            Marker::new(1, "free", 0.0, 0.0, MarkerCategory::Event),
            Marker::new(2, "cheap", 0.0, 0.0, MarkerCategory::Restaurant)
                .with_price_range(PriceRange::Budget),
            Marker::new(3, "posh", 0.0, 0.0, MarkerCategory::Villa)
                .with_price_range(PriceRange::UltraLuxury),
        ];
        let filters = MapFilters::default().with_price_ranges([PriceRange::Budget]);
        assert_eq!(ids(&filter_markers(markers, &filters, false)), vec![2]);
    }

    #[test]
    fn max_distance_without_location_keeps_nothing() {
        let markers = vec![Marker::new(1, "a", 0.0, 0.0, MarkerCategory::Hotel)];
        let filters = MapFilters::default().with_max_distance(1_000_000.0);
        assert!(filter_markers(markers, &filters, false).is_empty());
    }

    #[test]
    fn constraints_combine_with_and() {
        let user = UserLocation::new(0.0, 0.0);
        let mut markers = vec![
            Marker::new(1, "near hotel", 0.001, 0.0, MarkerCategory::Hotel).with_rating(4.5),
            Marker::new(2, "near bar", 0.001, 0.0, MarkerCategory::Restaurant).with_rating(4.5),
            Marker::new(3, "far hotel", 0.1, 0.0, MarkerCategory::Hotel).with_rating(4.5),
        ];
        annotate_distances(&mut markers, &user, NEARBY_ANNOTATION_RADIUS);
        let filters = MapFilters::default()
            .with_categories([MarkerCategory::Hotel])
            .only_nearby();
        assert_eq!(ids(&filter_markers(markers, &filters, true)), vec![1]);
    }

    #[test]
    fn favorites_filter_uses_annotation() {
        let mut markers = vec![
            Marker::new(1, "a", 0.0, 0.0, MarkerCategory::Hotel),
            Marker::new(2, "b", 0.0, 0.0, MarkerCategory::Hotel),
        ];
        annotate_favorites(&mut markers, &HashSet::from([MarkerId(2)]));
        let filters = MapFilters::default().only_favorites();
        assert_eq!(ids(&filter_markers(markers, &filters, false)), vec![2]);
    }

    #[test]
    fn sort_puts_unknown_distances_last() {
        let mut markers = vec![
            Marker::new(1, "unknown", 0.0, 0.0, MarkerCategory::Hotel),
            Marker::new(2, "far", 0.0, 0.0, MarkerCategory::Hotel),
            Marker::new(3, "near", 0.0, 0.0, MarkerCategory::Hotel),
        ];
        markers[1].distance_from_user = Some(900.0);
        markers[2].distance_from_user = Some(10.0);
        sort_by_distance(&mut markers);
        assert_eq!(ids(&markers), vec![3, 2, 1]);
    }

    #[test]
    fn zone_filter_by_kind() {
        let zones = vec![
            Zone::rectangle(1, "a", ZoneKind::Safe, (0.0, 0.0), (1.0, 1.0)),
            Zone::rectangle(2, "b", ZoneKind::Restricted, (0.0, 0.0), (1.0, 1.0)),
        ];
        let filters = MapFilters::default().with_zone_types([ZoneKind::Restricted]);
        let kept: Vec<_> = filter_zones(zones, &filters).iter().map(|z| z.id.0).collect();
        assert_eq!(kept, vec![2]);
    }
}
