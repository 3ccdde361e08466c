//! Tokio driver for the polling state machine.
//!
//! Each subscription is one spawned task that owns a [`Scheduler`], the
//! refresh timer and the in-flight fetches. The task waits on consumer
//! commands, fetch completions and timer ticks, feeds them to the
//! scheduler one at a time, and carries out the resulting actions. All
//! state changes happen on that task, so nothing needs a lock.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::arrivelah::ArrivalSource;

use super::config::{InvalidRefreshPeriod, PollerConfig};
use super::scheduler::{Action, Event, FetchResult, Generation, Scheduler, TimerId};
use super::sink::ResultSink;

/// Consumer requests to a running subscription.
#[derive(Debug)]
enum Command {
    SetStop(String),
    Cancel,
}

/// Entry point for live arrival subscriptions.
///
/// Holds the arrival source and polling configuration; each call to
/// [`subscribe`](Self::subscribe) starts an independent subscription.
pub struct ArrivalPoller<S> {
    source: Arc<S>,
    config: PollerConfig,
}

impl<S: ArrivalSource> ArrivalPoller<S> {
    /// Create a poller over `source`.
    pub fn new(source: S, config: PollerConfig) -> Result<Self, InvalidRefreshPeriod> {
        Self::with_shared_source(Arc::new(source), config)
    }

    /// Create a poller over a source shared with other code.
    pub fn with_shared_source(
        source: Arc<S>,
        config: PollerConfig,
    ) -> Result<Self, InvalidRefreshPeriod> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Polling configuration in use.
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Start observing `stop` and publish to `sink`.
    ///
    /// An empty `stop` starts the subscription idle. Must be called from
    /// within a tokio runtime.
    pub fn subscribe<K: ResultSink>(&self, stop: &str, sink: K) -> Subscription {
        let (commands, rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(self.config.refresh_period());
        let task = tokio::spawn(drive(
            Arc::clone(&self.source),
            scheduler,
            stop.to_string(),
            rx,
            sink,
        ));

        Subscription {
            commands,
            task: Some(task),
        }
    }
}

/// Handle to a running subscription.
///
/// Dropping the handle cancels the subscription.
#[derive(Debug)]
pub struct Subscription {
    commands: mpsc::UnboundedSender<Command>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Switch to a different stop. An empty (or all-whitespace) identifier
    /// makes the subscription idle.
    pub fn update_stop_id(&self, stop: impl Into<String>) {
        if self.commands.send(Command::SetStop(stop.into())).is_err() {
            trace!("stop update after subscription ended");
        }
    }

    /// Stop observing. Idempotent.
    pub fn cancel(&self) {
        let _ = self.commands.send(Command::Cancel);
    }

    /// Whether the subscription task has finished.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Cancel and wait for the subscription task to finish.
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "subscription task failed");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// An armed refresh timer.
struct RefreshTimer {
    id: TimerId,
    interval: Interval,
}

impl RefreshTimer {
    fn arm(id: TimerId, period: std::time::Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { id, interval }
    }
}

/// Wait for the next tick of the armed timer, or forever if none is armed.
async fn next_tick(timer: &mut Option<RefreshTimer>) -> TimerId {
    match timer {
        Some(timer) => {
            timer.interval.tick().await;
            timer.id
        }
        None => std::future::pending().await,
    }
}

async fn drive<S: ArrivalSource, K: ResultSink>(
    source: Arc<S>,
    mut scheduler: Scheduler,
    initial_stop: String,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut sink: K,
) {
    let mut in_flight: JoinSet<(Generation, FetchResult)> = JoinSet::new();
    let mut timer: Option<RefreshTimer> = None;

    let actions = scheduler.handle(Event::IdentifierChanged(initial_stop));
    execute(actions, &source, &mut in_flight, &mut timer, &mut sink);

    while !scheduler.is_stopped() {
        let event = tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(Command::SetStop(stop)) => Event::IdentifierChanged(stop),
                Some(Command::Cancel) | None => Event::Stop,
            },

            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => match joined {
                Ok((generation, result)) => Event::FetchCompleted {
                    generation,
                    result,
                    received_at: Local::now(),
                },
                Err(e) => {
                    if e.is_panic() {
                        warn!(error = %e, "arrival fetch task panicked");
                    }
                    continue;
                }
            },

            timer_id = next_tick(&mut timer) => Event::TimerTick(timer_id),
        };

        let actions = scheduler.handle(event);
        execute(actions, &source, &mut in_flight, &mut timer, &mut sink);
    }

    in_flight.abort_all();
    debug!("subscription task finished");
}

fn execute<S: ArrivalSource, K: ResultSink>(
    actions: Vec<Action>,
    source: &Arc<S>,
    in_flight: &mut JoinSet<(Generation, FetchResult)>,
    timer: &mut Option<RefreshTimer>,
    sink: &mut K,
) {
    for action in actions {
        match action {
            Action::ArmTimer { timer: id, period } => {
                *timer = Some(RefreshTimer::arm(id, period));
            }
            Action::CancelTimer { timer: id } => {
                if timer.as_ref().is_some_and(|t| t.id == id) {
                    *timer = None;
                }
            }
            Action::Fetch { stop, generation } => {
                let source = Arc::clone(source);
                in_flight.spawn(async move {
                    let result = source.fetch(&stop).await;
                    (generation, result)
                });
            }
            Action::AbortInFlight => in_flight.abort_all(),
            Action::Publish(publication) => publication.deliver_to(sink),
        }
    }
}
