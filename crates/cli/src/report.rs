use kernel::geometry::format_distance;
use kernel::{MarkerId, UserLocation};
use orchestrator::MapState;
use orchestrator::render::RecordingSurface;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyLine {
    pub id: MarkerId,
    pub name: String,
    pub category: String,
    pub distance: Option<f64>,
    pub favorite: bool,
}

/// Final summary of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub location: Option<UserLocation>,
    pub location_note: Option<String>,
    pub error: Option<String>,
    pub current_zone: Option<String>,
    pub nearby: Vec<NearbyLine>,
    pub favorites: usize,
    pub reveal_order: Vec<MarkerId>,
    pub drawn_markers: usize,
    pub zones: usize,
}

impl Report {
    pub fn new(
        state: &MapState,
        query: &str,
        reveal_order: &[MarkerId],
        surface: &RecordingSurface,
    ) -> Self {
        let session = state.session();
        let nearby = state
            .filtered_nearby(query)
            .into_iter()
            .map(|m| NearbyLine {
                id: m.id,
                name: m.name.clone(),
                category: m.category.to_string(),
                distance: m.distance_from_user,
                favorite: m.is_favorite,
            })
            .collect();

        Self {
            location: session.user_location,
            location_note: session.location_error.clone(),
            error: session.error.clone(),
            current_zone: state.current_zone().map(|z| z.name.clone()),
            nearby,
            favorites: state.favorites_count(),
            reveal_order: reveal_order.to_vec(),
            drawn_markers: surface.markers().len(),
            zones: session.zones.len(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        match &self.location {
            Some(loc) => {
                let _ = write!(out, "location: {:.5}, {:.5}", loc.lat, loc.lng);
                if let Some(accuracy) = loc.accuracy {
                    let _ = write!(out, " (±{})", format_distance(accuracy));
                }
                out.push('\n');
            }
            None => out.push_str("location: unknown\n"),
        }
        if let Some(note) = &self.location_note {
            let _ = writeln!(out, "note: {note}");
        }
        if let Some(error) = &self.error {
            let _ = writeln!(out, "error: {error}");
        }
        let _ = writeln!(
            out,
            "zone: {}",
            self.current_zone.as_deref().unwrap_or("outside any zone")
        );

        let _ = writeln!(out, "nearby ({}):", self.nearby.len());
        for line in &self.nearby {
            let distance = line.distance.map(format_distance).unwrap_or_else(|| "?".into());
            let star = if line.favorite { " *" } else { "" };
            let _ = writeln!(
                out,
                "  #{} {} [{}] {}{}",
                line.id.0, line.name, line.category, distance, star
            );
        }

        let _ = writeln!(out, "favorites: {}", self.favorites);
        let order = self
            .reveal_order
            .iter()
            .map(|id| id.0.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "reveal order: {order}");
        let _ = writeln!(
            out,
            "drawn: {} markers, {} zones",
            self.drawn_markers, self.zones
        );
        out
    }
}

#[allow(clippy::print_stdout)]
pub fn print(report: &Report) {
    print!("{}", report.render());
}
