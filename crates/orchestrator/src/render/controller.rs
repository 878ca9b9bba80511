#![forbid(unsafe_code)]

use super::style::{MarkerSprite, UserSprite, ZoneShape};
use super::surface::MapSurface;
use crate::clock::Clock;
use kernel::{LngLat, Marker, MarkerId, UserLocation, Zone, ZoneId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

pub const FOLLOW_ZOOM: f64 = 16.0;

/// After the user stops panning, follow mode stays quiet this long.
pub const INTERACTION_QUIET_PERIOD: Duration = Duration::from_secs(2);

/// Smaller moves do not trigger a follow recenter.
pub const FOLLOW_MIN_MOVE_DEGREES: f64 = 0.0001;

/// Snapshot of the state the controller draws from.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    /// Markers the map shows, before reveal.
    pub markers: &'a [Marker],
    /// Ids released by the reveal sequence so far.
    pub visible: &'a HashSet<MarkerId>,
    pub selected: Option<MarkerId>,
    pub zones: &'a [Zone],
    pub selected_zone: Option<ZoneId>,
    pub user_location: Option<&'a UserLocation>,
    pub show_user_location: bool,
    pub follow_user_location: bool,
}

/// User gesture on the map, to be applied by whoever owns the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderIntent {
    SelectMarker(MarkerId),
    SelectZone(ZoneId),
}

/// Keeps a [`MapSurface`] in sync with map state while touching it as
/// little as possible.
pub struct RenderController<S> {
    surface: S,
    clock: Arc<dyn Clock>,
    /// Drawn markers and whether each was drawn selected.
    drawn: HashMap<MarkerId, bool>,
    last_visible: Option<HashSet<MarkerId>>,
    last_selected: Option<MarkerId>,
    zones_drawn: Option<Vec<ZoneId>>,
    highlighted: Option<Option<ZoneId>>,
    user_marker: bool,
    last_follow: Option<LngLat>,
    interacting: bool,
    quiet_until: Option<Instant>,
}

impl<S: MapSurface> RenderController<S> {
    pub fn new(surface: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            surface,
            clock,
            drawn: HashMap::new(),
            last_visible: None,
            last_selected: None,
            zones_drawn: None,
            highlighted: None,
            user_marker: false,
            last_follow: None,
            interacting: false,
            quiet_until: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Bring the whole surface up to date with `input`.
    pub fn render(&mut self, input: &RenderInput<'_>) {
        self.sync_zones(input.zones);
        self.select_zone(input.selected_zone);
        self.reconcile(input);
        self.sync_user_marker(input.user_location, input.show_user_location);
        if input.follow_user_location
            && let Some(location) = input.user_location
        {
            self.follow(location);
        }
    }

    /// Diff visible markers against what is drawn. Returns `false` when
    /// neither the visible set nor the selection changed.
    pub fn reconcile(&mut self, input: &RenderInput<'_>) -> bool {
        if self.last_visible.as_ref() == Some(input.visible) && self.last_selected == input.selected {
            return false;
        }
        self.last_visible = Some(input.visible.clone());
        self.last_selected = input.selected;

        let leaving: Vec<MarkerId> = self
            .drawn
            .keys()
            .filter(|id| !input.visible.contains(id))
            .copied()
            .collect();
        for id in leaving {
            self.drawn.remove(&id);
            self.surface.remove_marker(id);
        }

        for marker in input.markers.iter().filter(|m| input.visible.contains(&m.id)) {
            let selected = input.selected == Some(marker.id);
            match self.drawn.get(&marker.id) {
                Some(drawn_selected) if *drawn_selected == selected => continue,
                Some(_) => self.surface.remove_marker(marker.id),
                None => {}
            }
            self.surface.add_marker(&MarkerSprite::new(marker, selected));
            self.drawn.insert(marker.id, selected);
        }
        trace!(drawn = self.drawn.len(), "markers reconciled");
        true
    }

    /// Draw zones when the zone set differs from the last one drawn.
    pub fn sync_zones(&mut self, zones: &[Zone]) -> bool {
        if zones.is_empty() {
            return false;
        }
        let ids: Vec<ZoneId> = zones.iter().map(|z| z.id).collect();
        if self.zones_drawn.as_ref() == Some(&ids) {
            return false;
        }
        let shapes: Vec<ZoneShape> = zones.iter().map(ZoneShape::from).collect();
        self.surface.draw_zones(&shapes);
        self.zones_drawn = Some(ids);
        // fresh zone layers start without a highlight
        self.highlighted = None;
        true
    }

    /// Highlight `id`, or nothing. Returns `false` when it already was.
    pub fn select_zone(&mut self, id: Option<ZoneId>) -> bool {
        if self.highlighted == Some(id) {
            return false;
        }
        self.surface.highlight_zone(id);
        self.highlighted = Some(id);
        true
    }

    /// Create the user marker once, then move it in place.
    pub fn sync_user_marker(&mut self, location: Option<&UserLocation>, show: bool) {
        match location {
            Some(location) if show => {
                let sprite = UserSprite::from(location);
                if self.user_marker {
                    self.surface.move_user_marker(&sprite);
                } else {
                    self.surface.add_user_marker(&sprite);
                    self.user_marker = true;
                }
            }
            _ => {
                if self.user_marker {
                    self.surface.remove_user_marker();
                    self.user_marker = false;
                }
            }
        }
    }

    /// Recenter on `location` unless the user is panning, has just stopped,
    /// or the location barely moved. Returns whether the view moved.
    pub fn follow(&mut self, location: &UserLocation) -> bool {
        if self.interacting {
            return false;
        }
        if let Some(until) = self.quiet_until
            && self.clock.now() < until
        {
            trace!("follow suppressed after interaction");
            return false;
        }

        let target = location.point();
        if let Some(last) = self.last_follow
            && (last.lat - target.lat).abs() <= FOLLOW_MIN_MOVE_DEGREES
            && (last.lng - target.lng).abs() <= FOLLOW_MIN_MOVE_DEGREES
        {
            return false;
        }

        self.surface.ease_to(target, FOLLOW_ZOOM);
        self.last_follow = Some(target);
        true
    }

    pub fn interaction_started(&mut self) {
        self.interacting = true;
        self.quiet_until = None;
    }

    pub fn interaction_ended(&mut self) {
        self.interacting = false;
        self.quiet_until = Some(self.clock.now() + INTERACTION_QUIET_PERIOD);
    }

    pub fn marker_clicked(&self, id: MarkerId) -> RenderIntent {
        RenderIntent::SelectMarker(id)
    }

    /// Topmost zone under `point`, if any. Overlaps resolve to the first
    /// zone in list order.
    pub fn zone_clicked(&self, point: LngLat, zones: &[Zone]) -> Option<RenderIntent> {
        zones
            .iter()
            .find(|z| z.contains(point))
            .map(|z| RenderIntent::SelectZone(z.id))
    }

    /// Remove everything this controller drew.
    pub fn clear(&mut self) {
        let drawn: Vec<MarkerId> = self.drawn.drain().map(|(id, _)| id).collect();
        for id in drawn {
            self.surface.remove_marker(id);
        }
        if self.user_marker {
            self.surface.remove_user_marker();
            self.user_marker = false;
        }
        self.last_visible = None;
        self.last_selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::render::{RecordingSurface, SurfaceCall};
    use config::{MarkerCategory, ZoneKind};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn controller() -> RenderController<RecordingSurface> {
        RenderController::new(RecordingSurface::new(), Arc::new(SystemClock))
    }

    fn markers() -> Vec<Marker> {
        (1..=3)
            .map(|id| Marker::new(id, format!("m{id}"), 21.0, -86.8, MarkerCategory::Villa))
            .collect()
    }

    fn visible(ids: &[u32]) -> HashSet<MarkerId> {
        ids.iter().map(|id| MarkerId(*id)).collect()
    }

    fn input<'a>(
        markers: &'a [Marker],
        visible: &'a HashSet<MarkerId>,
        selected: Option<MarkerId>,
    ) -> RenderInput<'a> {
        RenderInput {
            markers,
            visible,
            selected,
            zones: &[],
            selected_zone: None,
            user_location: None,
            show_user_location: true,
            follow_user_location: false,
        }
    }

    fn added(calls: &[SurfaceCall]) -> Vec<MarkerId> {
        calls
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::AddMarker(sprite) => Some(sprite.id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn reconcile_adds_entrants_and_removes_leavers() {
        let markers = markers();
        let mut controller = controller();

        let first = visible(&[1, 2]);
        assert!(controller.reconcile(&input(&markers, &first, None)));
        assert_eq!(added(&controller.surface_mut().take_calls()), [MarkerId(1), MarkerId(2)]);

        let second = visible(&[2, 3]);
        controller.reconcile(&input(&markers, &second, None));
        assert_eq!(
            controller.surface_mut().take_calls(),
            vec![
                SurfaceCall::RemoveMarker(MarkerId(1)),
                SurfaceCall::AddMarker(MarkerSprite::new(&markers[2], false)),
            ]
        );
        assert_eq!(
            controller.surface().markers(),
            &BTreeSet::from([MarkerId(2), MarkerId(3)])
        );
    }

    #[test]
    fn unchanged_input_touches_nothing() {
        let markers = markers();
        let mut controller = controller();
        let shown = visible(&[1, 2, 3]);

        controller.reconcile(&input(&markers, &shown, None));
        controller.surface_mut().take_calls();
        assert!(!controller.reconcile(&input(&markers, &shown, None)));
        assert!(controller.surface().calls().is_empty());
    }

    #[test]
    fn selection_change_redraws_only_affected_markers() {
        let markers = markers();
        let mut controller = controller();
        let shown = visible(&[1, 2, 3]);

        controller.reconcile(&input(&markers, &shown, None));
        controller.surface_mut().take_calls();

        controller.reconcile(&input(&markers, &shown, Some(MarkerId(2))));
        let calls = controller.surface_mut().take_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], SurfaceCall::RemoveMarker(MarkerId(2)));
        assert!(matches!(&calls[1], SurfaceCall::AddMarker(s) if s.selected && s.size == 56));
    }

    #[test]
    fn zones_drawn_once_per_zone_set() {
        let zones = vec![Zone::rectangle(1, "a", ZoneKind::Safe, (0.0, 0.0), (1.0, 1.0))];
        let mut controller = controller();
        assert!(!controller.sync_zones(&[]));
        assert!(controller.sync_zones(&zones));
        assert!(!controller.sync_zones(&zones));

        let mut more = zones.clone();
        more.push(Zone::rectangle(2, "b", ZoneKind::Caution, (2.0, 2.0), (3.0, 3.0)));
        assert!(controller.sync_zones(&more));
    }

    #[test]
    fn zone_highlight_follows_selection() {
        let zones = vec![
            Zone::rectangle(1, "a", ZoneKind::Safe, (0.0, 0.0), (1.0, 1.0)),
            Zone::rectangle(2, "b", ZoneKind::Caution, (2.0, 2.0), (3.0, 3.0)),
        ];
        let markers = markers();
        let shown = visible(&[]);
        let mut controller = controller();
        let with_zone = |selected_zone| RenderInput {
            zones: &zones,
            selected_zone,
            ..input(&markers, &shown, None)
        };

        controller.render(&with_zone(Some(ZoneId(2))));
        controller.render(&with_zone(Some(ZoneId(2))));
        controller.render(&with_zone(None));

        let highlights: Vec<Option<ZoneId>> = controller
            .surface()
            .calls()
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::HighlightZone(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(highlights, [Some(ZoneId(2)), None]);
    }

    #[test]
    fn user_marker_created_once_then_moved() {
        let mut controller = controller();
        let here = UserLocation::new(21.0, -86.8).with_accuracy(20.0);
        let there = UserLocation::new(21.001, -86.8);

        controller.sync_user_marker(Some(&here), true);
        controller.sync_user_marker(Some(&there), true);
        controller.sync_user_marker(Some(&there), false);
        controller.sync_user_marker(None, true);

        assert_eq!(
            controller.surface().calls(),
            [
                SurfaceCall::AddUserMarker(UserSprite::from(&here)),
                SurfaceCall::MoveUserMarker(UserSprite::from(&there)),
                SurfaceCall::RemoveUserMarker,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn follow_respects_interaction_and_quiet_period() {
        let mut controller = controller();
        let here = UserLocation::new(21.0, -86.8);
        let there = UserLocation::new(21.01, -86.8);
        let further = UserLocation::new(21.02, -86.8);

        assert!(controller.follow(&here));
        assert!(!controller.follow(&UserLocation::new(21.00005, -86.8)));

        controller.interaction_started();
        assert!(!controller.follow(&there));
        controller.interaction_ended();
        assert!(!controller.follow(&there));

        tokio::time::advance(Duration::from_millis(2100)).await;
        assert!(controller.follow(&further));
        assert_eq!(
            controller.surface().calls().last(),
            Some(&SurfaceCall::EaseTo(further.point(), FOLLOW_ZOOM))
        );
    }

    #[test]
    fn zone_click_reports_first_match() {
        let zones = vec![
            Zone::rectangle(1, "outer", ZoneKind::Safe, (0.0, 0.0), (10.0, 10.0)),
            Zone::rectangle(2, "inner", ZoneKind::Caution, (2.0, 2.0), (3.0, 3.0)),
        ];
        let controller = controller();
        assert_eq!(
            controller.zone_clicked(LngLat::new(2.5, 2.5), &zones),
            Some(RenderIntent::SelectZone(ZoneId(1)))
        );
        assert_eq!(controller.zone_clicked(LngLat::new(20.0, 20.0), &zones), None);
        assert_eq!(controller.marker_clicked(MarkerId(4)), RenderIntent::SelectMarker(MarkerId(4)));
    }

    #[test]
    fn clear_removes_everything() {
        let markers = markers();
        let mut controller = controller();
        let shown = visible(&[1, 2]);
        controller.render(&RenderInput {
            user_location: Some(&UserLocation::new(21.0, -86.8)),
            ..input(&markers, &shown, None)
        });
        assert!(controller.surface().has_user_marker());

        controller.clear();
        assert!(controller.surface().markers().is_empty());
        assert!(!controller.surface().has_user_marker());
    }
}
