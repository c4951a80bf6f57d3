// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod participants;
pub mod password;
pub mod session;

pub use accounts::{AccountService, NewAccount};
pub use participants::{Identity, Participants};
pub use session::SessionRegistry;
