//! Polling state machine.
//!
//! Pure transition logic for one subscription: events go in, actions come
//! out. The driver owns the timer and the in-flight fetches and executes
//! the actions; nothing here touches the clock or the network.
//!
//! Every fetch is stamped with a fresh [`Generation`]. A result is only
//! accepted if its generation is the latest one issued for the current
//! stop, so a slow response for an old stop, or for an earlier tick,
//! can never overwrite a newer one.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::arrivelah::{FetchError, RawServiceRecord};
use crate::board::process_services;
use crate::domain::StopId;

use super::sink::{BoardUpdate, Failure, Publication};

/// Tag for one fetch attempt. Strictly increasing over the life of a
/// scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one armed refresh timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Outcome of one fetch.
pub type FetchResult = Result<Vec<RawServiceRecord>, FetchError>;

/// State of an active subscription to one stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionState {
    /// Stop being polled. Never empty.
    pub stop: StopId,

    /// Latest generation issued for this stop.
    pub latest: Generation,

    /// Refresh timer armed for this stop.
    pub timer: TimerId,

    /// No result has been accepted for this stop yet.
    pub awaiting_first: bool,
}

/// Where the scheduler is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    /// No stop selected; nothing is polled.
    Idle,
    /// Polling a stop.
    Subscribed(SubscriptionState),
}

/// Inputs to the state machine.
#[derive(Debug)]
pub enum Event {
    /// The consumer entered a new stop identifier (untrimmed).
    IdentifierChanged(String),
    /// A refresh timer fired.
    TimerTick(TimerId),
    /// A fetch finished.
    FetchCompleted {
        generation: Generation,
        result: FetchResult,
        received_at: DateTime<Local>,
    },
    /// The consumer stopped observing.
    Stop,
}

/// Work for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start a periodic timer; its first tick is one period away.
    ArmTimer { timer: TimerId, period: Duration },
    /// Stop a timer. No further ticks may be delivered for it.
    CancelTimer { timer: TimerId },
    /// Fetch arrivals for `stop`, reporting back with `generation`.
    Fetch { stop: StopId, generation: Generation },
    /// Best-effort cancellation of fetches that can no longer be accepted.
    AbortInFlight,
    /// Push a value to the consumer.
    Publish(Publication),
}

/// The polling state machine.
#[derive(Debug)]
pub struct Scheduler {
    state: SchedulerState,
    period: Duration,
    next_generation: u64,
    next_timer: u64,
    loading: bool,
    empty_published: bool,
    stopped: bool,
}

impl Scheduler {
    /// Create an idle scheduler that refreshes every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            period,
            next_generation: 0,
            next_timer: 0,
            loading: false,
            empty_published: false,
            stopped: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Whether the consumer has stopped observing. A stopped scheduler
    /// ignores every further event.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Apply one event and return the actions it causes, in order.
    pub fn handle(&mut self, event: Event) -> Vec<Action> {
        if self.stopped {
            return Vec::new();
        }

        match event {
            Event::IdentifierChanged(raw) => self.on_identifier_change(StopId::new(&raw)),
            Event::TimerTick(timer) => self.on_timer_tick(timer),
            Event::FetchCompleted {
                generation,
                result,
                received_at,
            } => self.on_fetch_result(generation, result, received_at),
            Event::Stop => self.on_stop(),
        }
    }

    fn on_identifier_change(&mut self, stop: StopId) -> Vec<Action> {
        let mut actions = Vec::new();

        if stop.is_empty() {
            self.teardown(&mut actions);
            self.set_loading(false, &mut actions);
            if !self.empty_published {
                actions.push(Action::Publish(Publication::Empty));
                self.empty_published = true;
            }
            return actions;
        }

        if let SchedulerState::Subscribed(current) = &self.state {
            if current.stop == stop {
                return actions;
            }
        }

        self.teardown(&mut actions);

        let generation = self.issue_generation();
        let timer = TimerId(self.next_timer);
        self.next_timer += 1;

        info!(stop = %stop, generation = %generation, "subscribing to stop");
        actions.push(Action::Fetch {
            stop: stop.clone(),
            generation,
        });
        actions.push(Action::ArmTimer {
            timer,
            period: self.period,
        });
        self.set_loading(true, &mut actions);

        self.state = SchedulerState::Subscribed(SubscriptionState {
            stop,
            latest: generation,
            timer,
            awaiting_first: true,
        });
        self.empty_published = false;

        actions
    }

    fn on_timer_tick(&mut self, timer: TimerId) -> Vec<Action> {
        let is_current =
            matches!(&self.state, SchedulerState::Subscribed(current) if current.timer == timer);
        if !is_current {
            debug!(?timer, "ignoring tick from cancelled timer");
            return Vec::new();
        }

        let generation = self.issue_generation();
        let SchedulerState::Subscribed(current) = &mut self.state else {
            return Vec::new();
        };
        current.latest = generation;

        debug!(stop = %current.stop, generation = %generation, "refreshing stop");
        vec![Action::Fetch {
            stop: current.stop.clone(),
            generation,
        }]
    }

    fn on_fetch_result(
        &mut self,
        generation: Generation,
        result: FetchResult,
        received_at: DateTime<Local>,
    ) -> Vec<Action> {
        let SchedulerState::Subscribed(current) = &mut self.state else {
            debug!(generation = %generation, "discarding result, no active stop");
            return Vec::new();
        };

        if generation != current.latest {
            debug!(
                generation = %generation,
                latest = %current.latest,
                "discarding stale result"
            );
            return Vec::new();
        }

        let stop = current.stop.clone();
        let was_first = std::mem::replace(&mut current.awaiting_first, false);

        let publication = match result {
            Ok(records) => {
                let processed = process_services(&records);
                debug!(
                    stop = %stop,
                    rows = processed.rows.len(),
                    dropped = processed.malformed.len(),
                    "publishing arrivals"
                );
                Publication::Rows(BoardUpdate {
                    stop,
                    rows: processed.rows,
                    malformed: processed.malformed,
                    updated_at: received_at,
                })
            }
            Err(error) => {
                if error.is_transport() {
                    warn!(stop = %stop, error = %error, "arrival fetch failed");
                } else {
                    info!(stop = %stop, error = %error, "no arrivals for stop");
                }
                Publication::Failure(Failure {
                    stop,
                    kind: error.kind(),
                    message: error.to_string(),
                    updated_at: received_at,
                })
            }
        };

        let mut actions = vec![Action::Publish(publication)];
        if was_first {
            self.set_loading(false, &mut actions);
        }
        actions
    }

    fn on_stop(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.teardown(&mut actions);
        self.stopped = true;
        debug!("subscription stopped");
        actions
    }

    /// Drop the current subscription, if any, and return to idle.
    fn teardown(&mut self, actions: &mut Vec<Action>) {
        if let SchedulerState::Subscribed(old) =
            std::mem::replace(&mut self.state, SchedulerState::Idle)
        {
            debug!(stop = %old.stop, "leaving stop");
            actions.push(Action::CancelTimer { timer: old.timer });
            actions.push(Action::AbortInFlight);
        }
    }

    fn issue_generation(&mut self) -> Generation {
        self.next_generation += 1;
        Generation(self.next_generation)
    }

    fn set_loading(&mut self, loading: bool, actions: &mut Vec<Action>) {
        if self.loading != loading {
            self.loading = loading;
            actions.push(Action::Publish(Publication::Loading(loading)));
        }
    }
}
