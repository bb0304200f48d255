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

//! The data client contract for the Helm trading engine.
//!
//! Venue data adapters implement [`client::DataClient`]; subscriptions are
//! idempotent and reference counted, demultiplexed into data events published
//! on canonical message bus topics.

pub mod client;
pub mod subscriptions;

pub use client::DataClient;
pub use subscriptions::{SubscriptionBook, SubscriptionKind};
