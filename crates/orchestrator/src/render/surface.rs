#![forbid(unsafe_code)]

use super::style::{MarkerSprite, UserSprite, ZoneShape};
use kernel::{LngLat, MarkerId, ZoneId};
use std::collections::BTreeSet;

/// Drawing primitives of the map widget.
pub trait MapSurface {
    fn add_marker(&mut self, sprite: &MarkerSprite);
    fn remove_marker(&mut self, id: MarkerId);
    fn draw_zones(&mut self, zones: &[ZoneShape]);
    fn highlight_zone(&mut self, id: Option<ZoneId>);
    fn add_user_marker(&mut self, sprite: &UserSprite);
    fn move_user_marker(&mut self, sprite: &UserSprite);
    fn remove_user_marker(&mut self);
    fn ease_to(&mut self, center: LngLat, zoom: f64);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    AddMarker(MarkerSprite),
    RemoveMarker(MarkerId),
    DrawZones(Vec<ZoneId>),
    HighlightZone(Option<ZoneId>),
    AddUserMarker(UserSprite),
    MoveUserMarker(UserSprite),
    RemoveUserMarker,
    EaseTo(LngLat, f64),
}

/// Surface that draws nothing and remembers every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
    markers: BTreeSet<MarkerId>,
    has_user_marker: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    /// Markers currently on the surface.
    pub fn markers(&self) -> &BTreeSet<MarkerId> {
        &self.markers
    }

    pub fn has_user_marker(&self) -> bool {
        self.has_user_marker
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&mut self, sprite: &MarkerSprite) {
        self.markers.insert(sprite.id);
        self.calls.push(SurfaceCall::AddMarker(sprite.clone()));
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
        self.calls.push(SurfaceCall::RemoveMarker(id));
    }

    fn draw_zones(&mut self, zones: &[ZoneShape]) {
        self.calls
            .push(SurfaceCall::DrawZones(zones.iter().map(|z| z.id).collect()));
    }

    fn highlight_zone(&mut self, id: Option<ZoneId>) {
        self.calls.push(SurfaceCall::HighlightZone(id));
    }

    fn add_user_marker(&mut self, sprite: &UserSprite) {
        self.has_user_marker = true;
        self.calls.push(SurfaceCall::AddUserMarker(*sprite));
    }

    fn move_user_marker(&mut self, sprite: &UserSprite) {
        self.calls.push(SurfaceCall::MoveUserMarker(*sprite));
    }

    fn remove_user_marker(&mut self) {
        self.has_user_marker = false;
        self.calls.push(SurfaceCall::RemoveUserMarker);
    }

    fn ease_to(&mut self, center: LngLat, zoom: f64) {
        self.calls.push(SurfaceCall::EaseTo(center, zoom));
    }
}
