use crate::cli::Cli;
use crate::report::{self, Report};
use crate::signals::wait_for_signal;
use crate::track::Track;
use async_trait::async_trait;
use config::{Preferences, ProximityUpdate};
use kernel::{Catalog, MarkerId};
use orchestrator::geolocation::{Fix, ScriptedSource, UnsupportedSource};
use orchestrator::render::{RecordingSurface, RenderController, RenderInput};
use orchestrator::reveal::{RevealScheduler, Viewport};
use orchestrator::state::LoadPhase;
use orchestrator::{
    Clock, Geolocator, InMemoryRepository, MapEngine, MapState, NoopPreferences, PositionSource,
    PreferencesRepository, Services, SystemClock, TomlPreferences,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Time left to the engine to apply the last replayed fix before a
/// non-watching run shuts down.
const TRACK_DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Reads a preferences file but never writes it.
struct ReadOnlyPreferences(TomlPreferences);

#[async_trait]
impl PreferencesRepository for ReadOnlyPreferences {
    async fn load(&self) -> Result<Preferences, orchestrator::Error> {
        self.0.load().await
    }

    async fn save(&self, _preferences: &Preferences) -> Result<(), orchestrator::Error> {
        debug!(path = %self.0.path().display(), "not saving preferences without --save");
        Ok(())
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let report = execute(cli).await?;
    report::print(&report);
    Ok(())
}

/// Drive one session from the command line and summarize the result.
pub async fn execute(cli: Cli) -> anyhow::Result<Report> {
    let catalog = match &cli.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    let track = cli.track.as_deref().map(Track::load).transpose()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (source, feed) = position_source(&cli, track.as_ref());
    let services = Services {
        repository: Box::new(InMemoryRepository::new(catalog)),
        geolocator: Geolocator::new(source, clock.clone()),
        preferences: preferences_repository(&cli),
    };

    let mut engine = MapEngine::load(services).await?;
    engine.check_location_support().await;
    if let Some(radius) = cli.radius {
        engine
            .set_proximity_settings(ProximityUpdate {
                nearby_radius: Some(radius),
                ..Default::default()
            })
            .await;
    }
    if cli.nearby_only {
        engine.set_show_nearby_only(true).await;
    }
    engine.request_user_location().await;
    if engine.state().session().load_phase == LoadPhase::Idle {
        engine.load_map_data().await;
    }

    for id in &cli.favorites {
        if let Ok(is_favorite) = engine.toggle_favorite(MarkerId(*id)).await {
            info!(id = *id, is_favorite, "favorite toggled");
        }
    }

    if cli.watch || track.is_some() {
        watch(&mut engine, &cli, track, feed).await?;
    } else {
        engine.save_preferences().await?;
    }

    let (reveal_order, surface) = draw(engine.state(), clock, Viewport::from_width(cli.width)).await;
    Ok(Report::new(
        engine.state(),
        cli.query.as_deref().unwrap_or_default(),
        &reveal_order,
        &surface,
    ))
}

type Feed = flume::Sender<Result<Fix, orchestrator::geolocation::PositionError>>;

/// Pick the simulated platform. A fix from the command line wins over the
/// first track point. Without either the platform has no geolocation.
fn position_source(cli: &Cli, track: Option<&Track>) -> (Arc<dyn PositionSource>, Option<Feed>) {
    let fix = cli
        .fix()
        .map(|(lat, lng)| {
            let fix = Fix::new(lat, lng);
            match cli.accuracy {
                Some(accuracy) => fix.with_accuracy(accuracy),
                None => fix,
            }
        })
        .or_else(|| track.and_then(Track::first).map(|p| p.fix()));

    match fix {
        Some(fix) => {
            let source = ScriptedSource::new().respond(Ok(fix));
            let feed = track.is_some().then(|| source.feed());
            (Arc::new(source), feed)
        }
        None => (Arc::new(UnsupportedSource), None),
    }
}

fn preferences_repository(cli: &Cli) -> Box<dyn PreferencesRepository> {
    match &cli.conffile {
        Some(path) if cli.save => Box::new(TomlPreferences::new(path)),
        Some(path) => Box::new(ReadOnlyPreferences(TomlPreferences::new(path))),
        None => Box::new(NoopPreferences),
    }
}

async fn watch(
    engine: &mut MapEngine,
    cli: &Cli,
    track: Option<Track>,
    feed: Option<Feed>,
) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let (control_tx, control_rx) = flume::bounded(8);

    engine.start_location_tracking();

    if let (Some(track), Some(feed)) = (track, feed) {
        let shutdown = shutdown.clone();
        let keep_running = cli.watch;
        tokio::spawn(async move {
            track.replay(feed).await;
            if !keep_running {
                tokio::time::sleep(TRACK_DRAIN_GRACE).await;
                shutdown.cancel();
            }
        });
    } else if !cli.watch {
        return Ok(());
    }

    let signals = cli.watch.then(|| {
        let shutdown = shutdown.clone();
        let conffile = cli.conffile.clone();
        tokio::spawn(async move { wait_for_signal(&control_tx, conffile.as_deref(), &shutdown).await })
    });

    engine.run_until(shutdown.clone(), control_rx).await?;
    shutdown.cancel();

    if let Some(handle) = signals
        && let Err(err) = handle.await?
    {
        warn!(error = %err, "signal handling failed");
    }
    Ok(())
}

/// Run the reveal sequence to completion against a recording surface.
async fn draw(
    state: &MapState,
    clock: Arc<dyn Clock>,
    viewport: Viewport,
) -> (Vec<MarkerId>, RecordingSurface) {
    let session = state.session();
    let markers = state.displayed_markers();

    let mut scheduler = RevealScheduler::new(clock.clone(), viewport);
    scheduler.start(markers, session.user_location.is_some());
    let mut controller = RenderController::new(RecordingSurface::new(), clock);

    controller.render(&render_input(state, scheduler.queue().visible()));
    while !scheduler.is_finished() {
        let Some(batch) = scheduler.next_batch().await else {
            break;
        };
        if scheduler.apply(batch) {
            controller.render(&render_input(state, scheduler.queue().visible()));
        }
    }

    (scheduler.queue().order().to_vec(), controller.into_surface())
}

fn render_input<'a>(state: &'a MapState, visible: &'a HashSet<MarkerId>) -> RenderInput<'a> {
    let session = state.session();
    let display = &state.preferences().display;
    RenderInput {
        markers: state.displayed_markers(),
        visible,
        selected: session.selected_marker.as_ref().map(|m| m.id),
        zones: &session.zones,
        selected_zone: session.selected_zone.as_ref().map(|z| z.id),
        user_location: session.user_location.as_ref(),
        show_user_location: display.show_user_location,
        follow_user_location: display.follow_user_location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("proximap").chain(args.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn located_run_lists_nearby_markers() {
        let report = execute(cli(&["--lat", "21.1619", "--lng", "-86.8515", "-f", "6"]))
            .await
            .unwrap();

        assert!(report.location.is_some());
        assert_eq!(report.location_note, None);
        assert_eq!(report.favorites, 1);
        assert!(!report.nearby.is_empty());
        assert_eq!(report.drawn_markers, report.reveal_order.len());
        let distances: Vec<f64> = report.nearby.iter().filter_map(|l| l.distance).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn no_fix_falls_back_to_default_location() {
        let report = execute(cli(&[])).await.unwrap();

        let location = report.location.unwrap();
        assert_eq!((location.lat, location.lng), (kernel::DEFAULT_LAT, kernel::DEFAULT_LNG));
        assert!(report.location_note.is_some());
    }

    #[tokio::test]
    async fn preferences_are_written_only_with_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        let conffile = path.to_str().unwrap();

        execute(cli(&["-c", conffile, "--radius", "750"])).await.unwrap();
        assert!(!path.exists());

        execute(cli(&["-c", conffile, "--radius", "750", "--save"]))
            .await
            .unwrap();
        let stored = Preferences::load(&path).unwrap();
        assert_eq!(stored.proximity.nearby_radius, 750.0);
    }

    #[tokio::test]
    async fn track_replay_moves_the_user() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("track.toml");
        std::fs::write(
            &path,
            "[[points]]\nlat = 21.1319\nlng = -86.7485\ndelay_ms = 0\n",
        )
        .unwrap();

        let track = path.to_str().unwrap();
        let report = execute(cli(&["--lat", "21.1619", "--lng", "-86.8515", "-t", track]))
            .await
            .unwrap();

        let location = report.location.unwrap();
        assert_eq!((location.lat, location.lng), (21.1319, -86.7485));
    }
}
