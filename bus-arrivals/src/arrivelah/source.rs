//! Abstraction over where arrival data comes from.

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::domain::StopId;

use super::client::ArrivalClient;
use super::error::FetchError;
use super::types::RawServiceRecord;

/// Something that can fetch the current arrivals for a stop.
///
/// The poller spawns each fetch as its own task, so the returned future
/// must be `Send`. This abstraction lets the poller run against the real
/// API, the mock client, or test doubles.
pub trait ArrivalSource: Send + Sync + 'static {
    /// Fetch and classify arrivals for one stop. Never called with an
    /// empty stop identifier.
    fn fetch<'a>(
        &'a self,
        stop: &'a StopId,
    ) -> BoxFuture<'a, Result<Vec<RawServiceRecord>, FetchError>>;
}

impl ArrivalSource for ArrivalClient {
    fn fetch<'a>(
        &'a self,
        stop: &'a StopId,
    ) -> BoxFuture<'a, Result<Vec<RawServiceRecord>, FetchError>> {
        self.get_arrivals(stop).boxed()
    }
}
