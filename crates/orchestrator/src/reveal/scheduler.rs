#![forbid(unsafe_code)]

use super::queue::{RevealQueue, Viewport};
use crate::clock::Clock;
use kernel::{Marker, MarkerId, UserLocation};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Pause between two reveal steps, giving the renderer a turn.
pub const REVEAL_STEP_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealBatch {
    pub generation: u64,
    pub ids: Vec<MarkerId>,
}

/// What a reveal sequence was built from. A new sequence is only needed
/// when this changes.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealInputs {
    marker_ids: Vec<MarkerId>,
    nearby_only: bool,
    location: Option<(f64, f64)>,
}

impl RevealInputs {
    pub fn new(markers: &[Marker], nearby_only: bool, location: Option<&UserLocation>) -> Self {
        Self {
            marker_ids: markers.iter().map(|m| m.id).collect(),
            nearby_only,
            location: location.map(|l| (l.lat, l.lng)),
        }
    }
}

/// Runs reveal sequences on a background task.
///
/// Batches arrive over a channel tagged with the generation they belong to.
/// Starting a new sequence cancels the running task, and [`apply`] drops
/// whatever the old task already queued.
///
/// [`apply`]: RevealScheduler::apply
pub struct RevealScheduler {
    clock: Arc<dyn Clock>,
    delay: Duration,
    queue: RevealQueue,
    cancel: Option<CancellationToken>,
    last_inputs: Option<RevealInputs>,
    batches_tx: flume::Sender<RevealBatch>,
    batches_rx: flume::Receiver<RevealBatch>,
}

impl RevealScheduler {
    pub fn new(clock: Arc<dyn Clock>, viewport: Viewport) -> Self {
        let (batches_tx, batches_rx) = flume::unbounded();
        Self {
            clock,
            delay: REVEAL_STEP_DELAY,
            queue: RevealQueue::new(viewport),
            cancel: None,
            last_inputs: None,
            batches_tx,
            batches_rx,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Takes effect on the next start.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.queue.set_viewport(viewport);
    }

    /// Abandon the running sequence, if any, and start revealing `markers`.
    /// Returns the generation of the new sequence.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, markers: &[Marker], location_known: bool) -> u64 {
        self.cancel();
        let generation = self.queue.restart(markers, location_known);
        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());

        debug!(generation, markers = markers.len(), "reveal started");
        tokio::spawn(Self::run(
            self.queue.clone(),
            self.batches_tx.clone(),
            cancel,
            Arc::clone(&self.clock),
            self.delay,
        ));
        generation
    }

    /// Start a new sequence only when the inputs differ from the previous
    /// start. Returns whether one was started.
    pub fn restart_if_changed(
        &mut self,
        markers: &[Marker],
        nearby_only: bool,
        location: Option<&UserLocation>,
    ) -> bool {
        let inputs = RevealInputs::new(markers, nearby_only, location);
        if self.last_inputs.as_ref() == Some(&inputs) {
            trace!("reveal inputs unchanged");
            return false;
        }
        self.last_inputs = Some(inputs);
        self.start(markers, location.is_some());
        true
    }

    /// Stop the running sequence. Batches already sent stay in the channel
    /// but will be rejected by [`RevealScheduler::apply`] after a restart.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }

    pub async fn next_batch(&self) -> Option<RevealBatch> {
        self.batches_rx.recv_async().await.ok()
    }

    pub fn try_next_batch(&self) -> Option<RevealBatch> {
        self.batches_rx.try_recv().ok()
    }

    /// Make a batch visible. Batches of an abandoned generation are ignored.
    pub fn apply(&mut self, batch: RevealBatch) -> bool {
        if batch.generation != self.queue.generation() {
            trace!(
                stale = batch.generation,
                current = self.queue.generation(),
                "dropping reveal batch"
            );
            return false;
        }
        self.queue.reveal(&batch.ids);
        true
    }

    pub fn queue(&self) -> &RevealQueue {
        &self.queue
    }

    pub fn is_visible(&self, id: MarkerId) -> bool {
        self.queue.is_visible(id)
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_finished()
    }

    async fn run(
        mut queue: RevealQueue,
        batches: flume::Sender<RevealBatch>,
        cancel: CancellationToken,
        clock: Arc<dyn Clock>,
        delay: Duration,
    ) {
        let generation = queue.generation();
        while !queue.is_finished() {
            if cancel.is_cancelled() {
                return;
            }
            let ids = queue.next_batch();
            if batches.send(RevealBatch { generation, ids }).is_err() {
                return;
            }
            if queue.is_finished() {
                break;
            }
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = clock.sleep(delay) => {}
            }
        }
        trace!(generation, "reveal finished");
    }
}

impl Drop for RevealScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
