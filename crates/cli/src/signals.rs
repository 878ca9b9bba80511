use crate::error::Error;
use config::Preferences;
use flume::Sender;
use orchestrator::ControlEvent;
use std::path::Path;
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Translate signals into control events until Ctrl-C, which cancels
/// `shutdown`.
///
/// SIGUSR1 asks for a state dump. SIGUSR2 re-reads the preferences file,
/// when there is one, and hands the result to the engine.
pub async fn wait_for_signal(
    control: &Sender<ControlEvent>,
    conffile: Option<&Path>,
    shutdown: &CancellationToken,
) -> Result<(), Error> {
    let mut sigusr1 = signal(SignalKind::user_defined1()).map_err(Error::SignalHandler)?;
    let mut sigusr2 = signal(SignalKind::user_defined2()).map_err(Error::SignalHandler)?;

    loop {
        tokio::select! {
            _ = sigusr1.recv() => {
                control.send_async(ControlEvent::DumpState).await?;
            }
            _ = sigusr2.recv() => {
                if let Some(event) = reload_event(conffile) {
                    control.send_async(event).await?;
                }
            }
            res = tokio::signal::ctrl_c() => {
                res.map_err(Error::SignalHandler)?;
                info!("interrupted");
                shutdown.cancel();
                return Ok(());
            }
            _ = shutdown.cancelled() => return Ok(()),
        }
    }
}

fn reload_event(conffile: Option<&Path>) -> Option<ControlEvent> {
    let Some(path) = conffile else {
        warn!("no preferences file to reload");
        return None;
    };
    match Preferences::load(path) {
        Ok(preferences) => Some(ControlEvent::ReloadPreferences(preferences)),
        Err(err) => {
            warn!(error = %err, path = %path.display(), "keeping current preferences");
            None
        }
    }
}
