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

//! Core foundational primitives for the Helm trading engine.
//!
//! Provides the types and functions every other crate in the workspace builds
//! on: nanosecond timestamps, UUIDs, a monotonic real-time clock, and
//! correctness (design-by-contract) checks.

pub mod correctness;
pub mod datetime;
pub mod nanos;
pub mod time;
pub mod uuid;

// Re-exports
pub use crate::{nanos::UnixNanos, time::AtomicTime, uuid::UUID4};

/// The user agent sent with outbound HTTP requests.
pub const HELM_USER_AGENT: &str = concat!("Helm/", env!("CARGO_PKG_VERSION"));
