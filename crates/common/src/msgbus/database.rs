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

//! An optional external mirror of message bus traffic for post-hoc
//! inspection. Never on the delivery path.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Represents a bus message for external mirroring.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BusMessage {
    /// The topic the message was published on.
    pub topic: String,
    /// The serialized payload for the message.
    pub payload: Bytes,
}

/// Configuration for a database connection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// The database type.
    pub database_type: String,
    /// The database host address.
    pub host: Option<String>,
    /// The database port.
    pub port: Option<u16>,
    /// The account username for the database connection.
    pub username: Option<String>,
    /// The account password for the database connection.
    pub password: Option<String>,
    /// If SSL is used for the database connection.
    pub ssl: bool,
    /// The timeout (seconds) to wait for a new connection.
    pub connection_timeout_secs: u16,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_type: "redis".to_string(),
            host: None,
            port: None,
            username: None,
            password: None,
            ssl: false,
            connection_timeout_secs: 20,
        }
    }
}

/// Configuration for `MessageBus` instances.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageBusConfig {
    /// The configuration for the external mirror database.
    pub database: Option<DatabaseConfig>,
    /// The topic patterns which are mirrored externally.
    pub types_filter: Option<Vec<String>>,
    /// The buffer interval (milliseconds) between mirror writes.
    pub buffer_interval_ms: Option<u32>,
    /// If a 'trader-' prefix is used for stream keys.
    pub use_trader_prefix: bool,
    /// If the trader's instance ID is used for stream keys.
    pub use_instance_id: bool,
}
