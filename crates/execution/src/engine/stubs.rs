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

//! Stub components to facilitate testing.

use std::{cell::RefCell, rc::Rc};

use helm_common::messages::execution::{
    BatchCancelOrders, CancelAllOrders, CancelOrder, ModifyOrder, QueryAccount, QueryOrder,
    SubmitOrder,
};
use helm_core::UnixNanos;
use helm_model::{
    accounts::AccountAny,
    enums::OmsType,
    identifiers::{AccountId, ClientId, Venue},
    types::{AccountBalance, MarginBalance},
};

use crate::client::{ExecutionClient, ExecutionClientCapabilities};

/// The kinds of commands a stub client records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCommand {
    Submit(Box<SubmitOrder>),
    Modify(Box<ModifyOrder>),
    Cancel(Box<CancelOrder>),
    CancelAll(Box<CancelAllOrders>),
    BatchCancel(Box<BatchCancelOrders>),
    QueryOrder(Box<QueryOrder>),
    QueryAccount(Box<QueryAccount>),
}

/// A stub execution client recording every command it receives.
pub struct StubExecutionClient {
    pub client_id: ClientId,
    pub venue: Venue,
    pub account_id: AccountId,
    pub oms_type: OmsType,
    pub capabilities: ExecutionClientCapabilities,
    pub recorded: Rc<RefCell<Vec<RecordedCommand>>>,
}

impl StubExecutionClient {
    /// Creates a new [`StubExecutionClient`] for the `SIM` venue.
    #[must_use]
    pub fn new(capabilities: ExecutionClientCapabilities) -> Self {
        Self {
            client_id: ClientId::from("SIM"),
            venue: Venue::from("SIM"),
            account_id: AccountId::from("SIM-001"),
            oms_type: OmsType::Netting,
            capabilities,
            recorded: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Returns the commands recorded so far.
    #[must_use]
    pub fn recorded_commands(&self) -> Vec<RecordedCommand> {
        self.recorded.borrow().clone()
    }
}

impl ExecutionClient for StubExecutionClient {
    fn is_connected(&self) -> bool {
        true
    }

    fn client_id(&self) -> ClientId {
        self.client_id
    }

    fn account_id(&self) -> AccountId {
        self.account_id
    }

    fn venue(&self) -> Venue {
        self.venue
    }

    fn oms_type(&self) -> OmsType {
        self.oms_type
    }

    fn get_account(&self) -> Option<AccountAny> {
        None
    }

    fn capabilities(&self) -> &ExecutionClientCapabilities {
        &self.capabilities
    }

    fn generate_account_state(
        &self,
        _balances: Vec<AccountBalance>,
        _margins: Vec<MarginBalance>,
        _reported: bool,
        _ts_event: UnixNanos,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn start(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn submit_order(&self, cmd: &SubmitOrder) -> anyhow::Result<()> {
        self.recorded
            .borrow_mut()
            .push(RecordedCommand::Submit(Box::new(cmd.clone())));
        Ok(())
    }

    fn modify_order(&self, cmd: &ModifyOrder) -> anyhow::Result<()> {
        self.recorded
            .borrow_mut()
            .push(RecordedCommand::Modify(Box::new(*cmd)));
        Ok(())
    }

    fn cancel_order(&self, cmd: &CancelOrder) -> anyhow::Result<()> {
        self.recorded
            .borrow_mut()
            .push(RecordedCommand::Cancel(Box::new(*cmd)));
        Ok(())
    }

    fn cancel_all_orders(&self, cmd: &CancelAllOrders) -> anyhow::Result<()> {
        self.recorded
            .borrow_mut()
            .push(RecordedCommand::CancelAll(Box::new(*cmd)));
        Ok(())
    }

    fn batch_cancel_orders(&self, cmd: &BatchCancelOrders) -> anyhow::Result<()> {
        self.recorded
            .borrow_mut()
            .push(RecordedCommand::BatchCancel(Box::new(cmd.clone())));
        Ok(())
    }

    fn query_order(&self, cmd: &QueryOrder) -> anyhow::Result<()> {
        self.recorded
            .borrow_mut()
            .push(RecordedCommand::QueryOrder(Box::new(*cmd)));
        Ok(())
    }

    fn query_account(&self, cmd: &QueryAccount) -> anyhow::Result<()> {
        self.recorded
            .borrow_mut()
            .push(RecordedCommand::QueryAccount(Box::new(*cmd)));
        Ok(())
    }
}
