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

//! The execution engine and client contract for the Helm trading engine.
//!
//! The execution engine orchestrates interactions between registered
//! execution clients and the rest of the platform: validating trading
//! commands against instrument, account, and client capability sets, tracking
//! in-flight orders, applying venue events to the domain model through the
//! cache, and managing the position lifecycle.

pub mod client;
pub mod engine;
