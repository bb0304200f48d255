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

//! Logging for the Helm trading engine, built on the `log` crate facade.

pub mod logger;

pub use logger::{Logger, LoggerConfig, init_logging};

/// Message header for received messages.
pub const RECV: &str = "<--";

/// Message header for sent messages.
pub const SENT: &str = "-->";

/// Message header for commands.
pub const CMD: &str = "[CMD]";

/// Message header for events.
pub const EVT: &str = "[EVT]";

/// Message header for requests.
pub const REQ: &str = "[REQ]";

/// Message header for responses.
pub const RES: &str = "[RES]";
