// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! taskwatch scan engine: registry walk, overdue scan, and polling loop

mod alert;
mod error;
mod poll;
mod scan;
mod walker;

pub use alert::AlertTemplate;
pub use error::ScanError;
pub use poll::{PollLoop, PollState};
pub use scan::{AlertStatus, ScanCycle, ScanResult};
pub use walker::RegistryWalker;
