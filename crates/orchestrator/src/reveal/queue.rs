#![forbid(unsafe_code)]

use kernel::{Marker, MarkerId};
use std::collections::HashSet;

/// Widths below this many pixels count as a compact viewport.
pub const COMPACT_MAX_WIDTH: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
    Compact,
    #[default]
    Regular,
}

impl Viewport {
    pub fn from_width(px: u32) -> Self {
        if px < COMPACT_MAX_WIDTH {
            Viewport::Compact
        } else {
            Viewport::Regular
        }
    }

    /// Markers released per reveal step.
    pub fn batch_size(self) -> usize {
        match self {
            Viewport::Compact => 2,
            Viewport::Regular => 3,
        }
    }
}

/// Order in which markers appear on the map, released a batch at a time.
///
/// Every restart bumps the generation so consumers can tell batches of an
/// abandoned sequence apart from the current one.
#[derive(Debug, Clone, Default)]
pub struct RevealQueue {
    order: Vec<MarkerId>,
    cursor: usize,
    visible: HashSet<MarkerId>,
    viewport: Viewport,
    generation: u64,
}

impl RevealQueue {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Start over with `markers`. With a known location they are revealed
    /// nearest first, markers without a distance last; otherwise in the
    /// given order. Returns the new generation.
    pub fn restart(&mut self, markers: &[Marker], location_known: bool) -> u64 {
        let mut ordered: Vec<&Marker> = markers.iter().collect();
        if location_known {
            ordered.sort_by(|a, b| match (a.distance_from_user, b.distance_from_user) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }

        self.order = ordered.into_iter().map(|m| m.id).collect();
        self.cursor = 0;
        self.visible.clear();
        self.generation += 1;
        self.generation
    }

    /// Release the next batch and mark it visible. Empty once finished.
    pub fn next_batch(&mut self) -> Vec<MarkerId> {
        let end = (self.cursor + self.viewport.batch_size()).min(self.order.len());
        let batch = self.order[self.cursor..end].to_vec();
        self.reveal(&batch);
        batch
    }

    /// Mark ids released elsewhere as visible, advancing past them.
    pub fn reveal(&mut self, ids: &[MarkerId]) {
        self.cursor = (self.cursor + ids.len()).min(self.order.len());
        self.visible.extend(ids.iter().copied());
    }

    pub fn visible(&self) -> &HashSet<MarkerId> {
        &self.visible
    }

    pub fn is_visible(&self, id: MarkerId) -> bool {
        self.visible.contains(&id)
    }

    /// Ids not released yet, in reveal order.
    pub fn pending(&self) -> &[MarkerId] {
        &self.order[self.cursor..]
    }

    /// Full reveal order of the current generation.
    pub fn order(&self) -> &[MarkerId] {
        &self.order
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.order.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::MarkerCategory;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn marker(id: u32, distance: Option<f64>) -> Marker {
        let mut marker = Marker::new(id, format!("m{id}"), 21.0, -86.8, MarkerCategory::Attraction);
        marker.distance_from_user = distance;
        marker
    }

    #[test]
    fn viewport_breakpoint() {
        assert_eq!(Viewport::from_width(767), Viewport::Compact);
        assert_eq!(Viewport::from_width(768), Viewport::Regular);
        assert_eq!(Viewport::Compact.batch_size(), 2);
        assert_eq!(Viewport::Regular.batch_size(), 3);
    }

    #[test]
    fn unknown_distances_go_last() {
        let markers = [marker(1, None), marker(2, Some(900.0)), marker(3, Some(50.0))];
        let mut queue = RevealQueue::new(Viewport::Regular);
        queue.restart(&markers, true);
        assert_eq!(queue.order(), [MarkerId(3), MarkerId(2), MarkerId(1)]);
    }

    #[test]
    fn input_order_without_location() {
        let markers = [marker(1, None), marker(2, Some(900.0)), marker(3, Some(50.0))];
        let mut queue = RevealQueue::new(Viewport::Regular);
        queue.restart(&markers, false);
        assert_eq!(queue.order(), [MarkerId(1), MarkerId(2), MarkerId(3)]);
    }

    #[test]
    fn restart_clears_visibility_and_bumps_generation() {
        let markers = [marker(1, None), marker(2, None)];
        let mut queue = RevealQueue::new(Viewport::Compact);
        let first = queue.restart(&markers, false);
        queue.next_batch();
        assert!(queue.is_visible(MarkerId(1)));

        let second = queue.restart(&markers, false);
        assert!(second > first);
        assert!(queue.visible().is_empty());
        assert_eq!(queue.pending().len(), 2);
    }

    #[test]
    fn empty_queue_is_finished() {
        let mut queue = RevealQueue::default();
        queue.restart(&[], true);
        assert!(queue.is_finished());
        assert!(queue.next_batch().is_empty());
    }

    proptest! {
        #[test]
        fn reveals_everything_in_ceil_steps(
            distances in prop::collection::vec(prop::option::of(0.0f64..50_000.0), 0..40),
            compact in any::<bool>(),
        ) {
            let markers: Vec<Marker> = distances
                .iter()
                .enumerate()
                .map(|(i, d)| marker(i as u32, *d))
                .collect();
            let viewport = if compact { Viewport::Compact } else { Viewport::Regular };
            let mut queue = RevealQueue::new(viewport);
            queue.restart(&markers, true);

            let mut steps = 0;
            let mut revealed = Vec::new();
            while !queue.is_finished() {
                revealed.extend(queue.next_batch());
                steps += 1;
            }

            prop_assert_eq!(steps, markers.len().div_ceil(viewport.batch_size()));
            prop_assert_eq!(queue.visible().len(), markers.len());

            let known: Vec<f64> = revealed
                .iter()
                .filter_map(|id| markers[id.0 as usize].distance_from_user)
                .collect();
            prop_assert!(known.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
