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

//! Live engine orchestration and reconciliation for the Helm trading engine.
//!
//! Provides the live execution engine which coordinates between the core
//! execution engine and venue clients, the reconciliation manager converging
//! local state to venue-of-record state, the live configuration surface, and
//! the node process wrapper.

pub mod config;
pub mod execution;
pub mod node;
pub mod reconciliation;
pub mod runner;
