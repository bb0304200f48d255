// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Configuration types for live Helm system nodes.

use std::collections::HashMap;

use helm_common::{
    cache::CacheConfig, enums::Environment, logging::LoggerConfig,
    msgbus::database::MessageBusConfig,
};
use helm_model::identifiers::TraderId;
use serde::{Deserialize, Serialize};

/// Configuration for a live venue connection (data + execution clients).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveVenueConfig {
    /// The venue API key.
    pub api_key: Option<String>,
    /// The venue API secret.
    pub api_secret: Option<String>,
    /// The venue API passphrase (where required).
    pub passphrase: Option<String>,
    /// The base URL for HTTP requests (`None` uses the venue default).
    pub base_url_http: Option<String>,
    /// The base URL for websocket streams (`None` uses the venue default).
    pub base_url_ws: Option<String>,
    /// If the venue sandbox (testnet/demo) environment is used.
    pub is_testnet: bool,
    /// The timeout (seconds) for HTTP requests.
    pub http_timeout_secs: u64,
    /// The maximum number of retries for venue calls.
    pub max_retries: u32,
    /// The initial retry delay (milliseconds).
    pub retry_delay_initial_ms: u64,
    /// The maximum retry delay (milliseconds).
    pub retry_delay_max_ms: u64,
    /// The request receive window (milliseconds) for venues that enforce one.
    pub recv_window_ms: u64,
    /// The per-second request cap for the venue.
    pub max_requests_per_second: u32,
    /// The per-minute rolling request cap for the venue.
    pub max_requests_per_minute: u32,
    /// The interval (minutes) between instrument definition refreshes.
    pub update_instruments_interval_mins: Option<u64>,
    /// The size of the cancel broadcaster client pool.
    pub canceller_pool_size: usize,
}

impl Default for LiveVenueConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            passphrase: None,
            base_url_http: None,
            base_url_ws: None,
            is_testnet: false,
            http_timeout_secs: 60,
            max_retries: 3,
            retry_delay_initial_ms: 1_000,
            retry_delay_max_ms: 10_000,
            recv_window_ms: 5_000,
            max_requests_per_second: 10,
            max_requests_per_minute: 600,
            update_instruments_interval_mins: Some(60),
            canceller_pool_size: 1,
        }
    }
}

impl LiveVenueConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.http_timeout_secs == 0 {
            anyhow::bail!("`http_timeout_secs` must be positive");
        }
        if self.retry_delay_initial_ms == 0 {
            anyhow::bail!("`retry_delay_initial_ms` must be positive");
        }
        if self.retry_delay_max_ms < self.retry_delay_initial_ms {
            anyhow::bail!("`retry_delay_max_ms` must be >= `retry_delay_initial_ms`");
        }
        if self.max_requests_per_second == 0 {
            anyhow::bail!("`max_requests_per_second` must be positive");
        }
        if self.max_requests_per_minute == 0 {
            anyhow::bail!("`max_requests_per_minute` must be positive");
        }
        if self.canceller_pool_size == 0 {
            anyhow::bail!("`canceller_pool_size` must be positive");
        }
        Ok(())
    }
}

/// Configuration for live execution engines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveExecEngineConfig {
    /// If reconciliation is active at start-up.
    pub reconciliation: bool,
    /// The maximum lookback minutes to reconcile state for.
    pub reconciliation_lookback_mins: Option<u64>,
    /// The instrument IDs to reconcile (empty means all).
    pub reconciliation_instrument_ids: Vec<String>,
    /// If unclaimed order events with an `EXTERNAL` strategy ID are dropped.
    pub filter_unclaimed_external_orders: bool,
    /// If position status reports are filtered from reconciliation.
    pub filter_position_reports: bool,
    /// If missing orders are generated from venue reports during reconciliation.
    pub generate_missing_orders: bool,
    /// The interval (milliseconds) between in-flight order sweeps.
    pub inflight_check_interval_ms: u64,
    /// The threshold (milliseconds) beyond which an in-flight order's status
    /// is queried with the venue.
    pub inflight_check_threshold_ms: u64,
    /// The number of retry attempts for verifying in-flight order status.
    pub inflight_check_retries: u32,
    /// The interval (seconds) between checks for open orders at the venue.
    pub open_check_interval_secs: Option<u64>,
    /// If open-order checks request only venue-open orders.
    pub open_check_open_only: bool,
    /// The interval (minutes) between purging closed orders from memory.
    pub purge_closed_orders_interval_mins: Option<u64>,
    /// The time buffer (minutes) before closed orders can be purged.
    pub purge_closed_orders_buffer_mins: u64,
    /// The interval (minutes) between purging closed positions from memory.
    pub purge_closed_positions_interval_mins: Option<u64>,
    /// The time buffer (minutes) before closed positions can be purged.
    pub purge_closed_positions_buffer_mins: u64,
    /// The interval (minutes) between purging account state events.
    pub purge_account_events_interval_mins: Option<u64>,
    /// The lookback window (minutes) of account events to retain on purge.
    pub purge_account_events_lookback_mins: u64,
    /// If the node shuts down gracefully on an unhandled engine error.
    pub graceful_shutdown_on_exception: bool,
}

impl Default for LiveExecEngineConfig {
    fn default() -> Self {
        Self {
            reconciliation: true,
            reconciliation_lookback_mins: Some(60),
            reconciliation_instrument_ids: Vec::new(),
            filter_unclaimed_external_orders: false,
            filter_position_reports: false,
            generate_missing_orders: true,
            inflight_check_interval_ms: 2_000,
            inflight_check_threshold_ms: 5_000,
            inflight_check_retries: 5,
            open_check_interval_secs: None,
            open_check_open_only: true,
            purge_closed_orders_interval_mins: None,
            purge_closed_orders_buffer_mins: 60,
            purge_closed_positions_interval_mins: None,
            purge_closed_positions_buffer_mins: 60,
            purge_account_events_interval_mins: None,
            purge_account_events_lookback_mins: 60,
            graceful_shutdown_on_exception: true,
        }
    }
}

/// Configuration for live Helm system nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveNodeConfig {
    /// The trading environment.
    pub environment: Environment,
    /// The trader ID for the node.
    pub trader_id: TraderId,
    /// The logging configuration.
    pub logging: LoggerConfig,
    /// The timeout (seconds) for all clients to connect and initialize.
    pub timeout_connection: u64,
    /// The timeout (seconds) for execution state to reconcile.
    pub timeout_reconciliation: u64,
    /// The timeout (seconds) for all engine clients to disconnect.
    pub timeout_disconnection: u64,
    /// The timeout (seconds) to await residual events after stop.
    pub timeout_post_stop: u64,
    /// The timeout (seconds) to await pending task cancellation on shutdown.
    pub timeout_shutdown: u64,
    /// The cache configuration.
    pub cache: Option<CacheConfig>,
    /// The message bus configuration.
    pub msgbus: Option<MessageBusConfig>,
    /// The live execution engine configuration.
    pub exec_engine: LiveExecEngineConfig,
    /// The venue configurations keyed by venue name.
    pub venues: HashMap<String, LiveVenueConfig>,
}

impl Default for LiveNodeConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Live,
            trader_id: TraderId::from("TRADER-001"),
            logging: LoggerConfig::default(),
            timeout_connection: 60,
            timeout_reconciliation: 30,
            timeout_disconnection: 10,
            timeout_post_stop: 10,
            timeout_shutdown: 5,
            cache: None,
            msgbus: None,
            exec_engine: LiveExecEngineConfig::default(),
            venues: HashMap::new(),
        }
    }
}

impl LiveNodeConfig {
    /// Validates the configuration, including every venue section.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_connection == 0 {
            anyhow::bail!("`timeout_connection` must be positive");
        }
        if self.timeout_shutdown == 0 {
            anyhow::bail!("`timeout_shutdown` must be positive");
        }
        for (venue, config) in &self.venues {
            config
                .validate()
                .map_err(|e| anyhow::anyhow!("venue '{venue}': {e}"))?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_node_config_defaults() {
        let config = LiveNodeConfig::default();
        assert_eq!(config.environment, Environment::Live);
        assert_eq!(config.trader_id, TraderId::from("TRADER-001"));
        assert!(config.exec_engine.reconciliation);
        assert_eq!(config.exec_engine.inflight_check_interval_ms, 2_000);
        assert_eq!(config.exec_engine.inflight_check_threshold_ms, 5_000);
        assert_eq!(config.exec_engine.inflight_check_retries, 5);
        assert!(config.exec_engine.open_check_open_only);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    fn test_venue_config_validation() {
        let mut config = LiveVenueConfig::default();
        assert!(config.validate().is_ok());

        config.canceller_pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[rstest]
    fn test_node_config_validates_venues() {
        let mut config = LiveNodeConfig::default();
        config.venues.insert(
            "BADVENUE".to_string(),
            LiveVenueConfig {
                max_requests_per_second: 0,
                ..Default::default()
            },
        );
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("BADVENUE"));
    }

    #[rstest]
    fn test_config_serde_round_trip() {
        let config = LiveNodeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: LiveNodeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }
}
