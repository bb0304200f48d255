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

//! Network communication machinery for the Helm trading engine.
//!
//! Every venue REST call goes through this layer: an HTTP client fronted by a
//! keyed rate limiter, with bounded-retry semantics and jittered exponential
//! backoff. A cancel broadcaster fans idempotent cancel requests across a
//! client pool.

pub mod backoff;
pub mod broadcast;
pub mod http;
pub mod ratelimiter;
pub mod retry;
