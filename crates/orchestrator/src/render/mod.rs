#![forbid(unsafe_code)]

mod controller;
mod style;
mod surface;

pub use controller::{
    FOLLOW_MIN_MOVE_DEGREES, FOLLOW_ZOOM, INTERACTION_QUIET_PERIOD, RenderController, RenderInput,
    RenderIntent,
};
pub use style::{
    MarkerSprite, UserSprite, ZoneShape, category_icon, marker_color, shade, zone_color,
};
pub use surface::{MapSurface, RecordingSurface, SurfaceCall};
