//! Job status poller
//!
//! Starts from a job id, fetches its status immediately and then once per
//! interval until the job reaches a terminal status or a fetch fails.
//!
//! Each started poll is a single tokio task owned by a [`PollHandle`].
//! Dropping the handle aborts the task, so a discarded view can never keep
//! fetching against a stale job. The latest state is published through a
//! `watch` channel as a [`PollView`].
//!
//! Phases: `Idle -> Polling -> {Completed | Failed | Unreachable}`. Nothing
//! leaves a terminal phase.

use std::sync::Arc;

use insightflow_core::domain::job::{JobSnapshot, JobState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::source::StatusSource;

/// Message shown when the status endpoint cannot be reached
pub const UNREACHABLE_MESSAGE: &str = "Failed to fetch status. Is the backend running?";

/// Poller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Time between the starts of two consecutive fetches
    pub interval: Duration,

    /// Consecutive failed fetches tolerated before giving up
    ///
    /// `0` makes the first failure fatal.
    pub max_retries: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_retries: 0,
        }
    }
}

/// Where the poll loop is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PollPhase {
    #[default]
    Idle,
    Polling,
    /// Backend reported `completed`
    Completed,
    /// Backend reported `error`
    Failed,
    /// Fetching failed; carries the message for the view
    Unreachable(String),
}

impl PollPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollPhase::Completed | PollPhase::Failed | PollPhase::Unreachable(_)
        )
    }
}

/// Everything a view needs to render a job's progress
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollView {
    pub phase: PollPhase,
    /// Latest snapshot received, kept across a later fetch failure
    pub snapshot: Option<JobSnapshot>,
    /// Fetch attempts made so far, failed ones included
    pub fetches: u32,
}

/// Spawns poll loops against a [`StatusSource`]
pub struct StatusPoller<S: ?Sized> {
    source: Arc<S>,
    config: PollerConfig,
}

impl<S: StatusSource + 'static> StatusPoller<S> {
    pub fn new(source: S, config: PollerConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
        }
    }
}

impl<S: StatusSource + ?Sized + 'static> StatusPoller<S> {
    /// Start polling `job_id`
    ///
    /// The first fetch happens right away. Must be called from within a
    /// tokio runtime.
    pub fn start(&self, job_id: impl Into<String>) -> PollHandle {
        let job_id = job_id.into();
        let (tx, rx) = watch::channel(PollView::default());

        info!(
            "Starting status poller for job {} (interval: {:?})",
            job_id, self.config.interval
        );

        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            job_id.clone(),
            self.config,
            tx,
        ));

        PollHandle {
            job_id,
            view: rx,
            task,
        }
    }
}

async fn poll_loop<S: StatusSource + ?Sized>(
    source: Arc<S>,
    job_id: String,
    config: PollerConfig,
    tx: watch::Sender<PollView>,
) {
    tx.send_modify(|view| view.phase = PollPhase::Polling);

    // Ticks are awaited in sequence, so a slow fetch delays the next one
    // instead of overlapping it.
    let mut ticker = time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut failures = 0u32;

    loop {
        ticker.tick().await;

        debug!("Fetching status for job {}", job_id);

        match source.fetch_snapshot(&job_id).await {
            Ok(snapshot) => {
                failures = 0;

                let phase = match &snapshot.state {
                    JobState::Completed(_) => PollPhase::Completed,
                    JobState::Error(_) => PollPhase::Failed,
                    JobState::Queued | JobState::Processing => PollPhase::Polling,
                };
                let terminal = phase.is_terminal();

                tx.send_modify(|view| {
                    view.fetches += 1;
                    view.phase = phase;
                    view.snapshot = Some(snapshot);
                });

                if terminal {
                    info!("Job {} reached a terminal status, polling stopped", job_id);
                    return;
                }
            }
            Err(e) => {
                failures += 1;

                if failures <= config.max_retries {
                    warn!(
                        "Status fetch for job {} failed (attempt {}/{}): {}",
                        job_id,
                        failures,
                        config.max_retries + 1,
                        e
                    );
                    tx.send_modify(|view| view.fetches += 1);
                    continue;
                }

                error!("Status fetch for job {} failed, polling stopped: {}", job_id, e);
                tx.send_modify(|view| {
                    view.fetches += 1;
                    view.phase = PollPhase::Unreachable(UNREACHABLE_MESSAGE.to_string());
                });
                return;
            }
        }
    }
}

/// Owner of one running poll loop
///
/// The loop is aborted when the handle is stopped or dropped.
#[derive(Debug)]
pub struct PollHandle {
    job_id: String,
    view: watch::Receiver<PollView>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// The most recently published view
    pub fn view(&self) -> PollView {
        self.view.borrow().clone()
    }

    /// Wait for the next published view
    ///
    /// Returns `None` once the loop has ended and every update was seen.
    pub async fn changed(&mut self) -> Option<PollView> {
        self.view.changed().await.ok()?;
        Some(self.view.borrow_and_update().clone())
    }

    /// Wait until the loop reaches a terminal phase and return that view
    pub async fn wait(mut self) -> PollView {
        loop {
            {
                let view = self.view.borrow_and_update();
                if view.phase.is_terminal() {
                    return view.clone();
                }
            }

            if self.view.changed().await.is_err() {
                return self.view.borrow().clone();
            }
        }
    }

    /// Whether the loop has ended, by itself or by being stopped
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the loop; no fetch starts after this returns
    pub fn stop(self) {
        debug!("Stopping status poller for job {}", self.job_id);
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Holds at most one live poller, as a view does
///
/// Mounting a new job cancels the previous poller before the new one
/// starts, so two loops never run side by side.
#[derive(Debug, Default)]
pub struct PollSlot {
    active: Option<PollHandle>,
}

impl PollSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount<S: StatusSource + ?Sized + 'static>(
        &mut self,
        poller: &StatusPoller<S>,
        job_id: impl Into<String>,
    ) -> &mut PollHandle {
        self.unmount();
        self.active.insert(poller.start(job_id))
    }

    pub fn unmount(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.stop();
        }
    }

    pub fn active(&self) -> Option<&PollHandle> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut PollHandle> {
        self.active.as_mut()
    }
}
