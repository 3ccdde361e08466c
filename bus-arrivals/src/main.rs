use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bus_arrivals::arrivelah::{ArrivalClient, ArrivalClientConfig, ArrivalSource, MockArrivalClient};
use bus_arrivals::poller::{ArrivalPoller, DEFAULT_REFRESH_PERIOD_MS, PollerConfig};
use bus_arrivals::terminal::TerminalSink;

/// Default request timeout (seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const REFRESH_VAR: &str = "BUS_ARRIVALS_REFRESH_MS";
const TIMEOUT_VAR: &str = "BUS_ARRIVALS_TIMEOUT_SECS";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bus_arrivals=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let initial_stop = std::env::args().nth(1).unwrap_or_default();

    let poller_config = refresh_config(std::env::var(REFRESH_VAR).ok());

    match std::env::var("BUS_ARRIVALS_MOCK_DIR") {
        Ok(dir) => {
            let mock = MockArrivalClient::from_dir(&dir).expect("Failed to load mock stop data");
            info!(dir = %dir, "serving arrivals from mock data");
            run(mock, poller_config, initial_stop).await;
        }
        Err(_) => {
            let mut client_config = ArrivalClientConfig::new()
                .with_timeout(timeout_secs(std::env::var(TIMEOUT_VAR).ok()));
            if let Ok(url) = std::env::var("BUS_ARRIVALS_ENDPOINT") {
                client_config = client_config.with_base_url(url);
            }
            info!(endpoint = %client_config.base_url, "using live arrival API");
            let client = ArrivalClient::new(client_config).expect("Failed to create arrival client");
            run(client, poller_config, initial_stop).await;
        }
    }
}

/// Parse a numeric setting, warning on garbage.
fn numeric_setting(name: &str, raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring non-numeric setting");
            None
        }
    }
}

/// Polling configuration from the refresh setting, or the default if the
/// setting is missing or unusable.
fn refresh_config(raw: Option<String>) -> PollerConfig {
    let config =
        PollerConfig::new(numeric_setting(REFRESH_VAR, raw).unwrap_or(DEFAULT_REFRESH_PERIOD_MS));
    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!(variable = REFRESH_VAR, error = %e, "using default refresh period");
            PollerConfig::default()
        }
    }
}

/// Request timeout from the timeout setting. Zero would fail every request.
fn timeout_secs(raw: Option<String>) -> u64 {
    match numeric_setting(TIMEOUT_VAR, raw) {
        Some(0) => {
            warn!(variable = TIMEOUT_VAR, "timeout must be positive, using default");
            DEFAULT_TIMEOUT_SECS
        }
        Some(secs) => secs,
        None => DEFAULT_TIMEOUT_SECS,
    }
}

/// Subscribe to the initial stop and follow stop ids typed on stdin.
async fn run<S: ArrivalSource>(source: S, config: PollerConfig, initial_stop: String) {
    let period = Duration::from_millis(config.refresh_period_ms);
    let poller = ArrivalPoller::new(source, config).expect("Refresh period already validated");
    let subscription = poller.subscribe(&initial_stop, TerminalSink::stdout());

    println!("Bus Arrival App (refreshing every {}s)", period.as_secs_f32());
    println!("Type a bus stop ID and press enter; an empty line clears it.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => subscription.update_stop_id(line),
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    subscription.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(raw: &str) -> Option<String> {
        Some(raw.to_string())
    }

    #[test]
    fn refresh_period_setting() {
        assert_eq!(refresh_config(None), PollerConfig::default());
        assert_eq!(refresh_config(some(" 250 ")).refresh_period_ms, 250);
        assert_eq!(refresh_config(some("abc")), PollerConfig::default());
    }

    #[test]
    fn zero_refresh_period_falls_back_to_default() {
        let config = refresh_config(some("0"));
        assert_eq!(config.refresh_period_ms, DEFAULT_REFRESH_PERIOD_MS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn timeout_setting() {
        assert_eq!(timeout_secs(None), DEFAULT_TIMEOUT_SECS);
        assert_eq!(timeout_secs(some("5")), 5);
        assert_eq!(timeout_secs(some("-1")), DEFAULT_TIMEOUT_SECS);
        assert_eq!(timeout_secs(some("0")), DEFAULT_TIMEOUT_SECS);
    }
}
