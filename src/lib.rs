// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Personal-finance ledger engine. Keeps account balances mathematically
//! consistent with the recorded transaction log and derives budget,
//! savings-goal, and net-worth analytics from it. Consumed as a library;
//! there is no CLI or network surface.

pub mod accounts;
pub mod budget;
pub mod categories;
pub mod db;
pub mod error;
pub mod export;
pub mod goal;
pub mod ledger;
pub mod models;
pub mod snapshot;
pub mod utils;

pub use error::{LedgerError, Result};
