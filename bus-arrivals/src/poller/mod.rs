//! Live arrival polling.
//!
//! Turns a frequently changing stop identifier into a continuously
//! refreshed stream of arrival rows. A subscription fetches as soon as its
//! stop changes, refreshes on a fixed period, and only ever publishes the
//! result of the most recent fetch for the current stop.

mod config;
mod driver;
mod scheduler;
mod sink;


pub use config::{DEFAULT_REFRESH_PERIOD_MS, InvalidRefreshPeriod, PollerConfig};
pub use driver::{ArrivalPoller, Subscription};
pub use scheduler::{
    Action, Event, FetchResult, Generation, Scheduler, SchedulerState, SubscriptionState, TimerId,
};
pub use sink::{BoardUpdate, ChannelSink, Failure, Publication, ResultSink};
