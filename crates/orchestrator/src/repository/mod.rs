#![forbid(unsafe_code)]

mod annotate;
mod memory;
mod repo;

pub use annotate::{
    NEARBY_ANNOTATION_RADIUS, annotate_distances, annotate_favorites, filter_markers,
    filter_zones, sort_by_distance,
};
pub use memory::InMemoryRepository;
pub use repo::{MapData, MapRepository};
