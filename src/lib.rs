// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! ShopWithUs: a research-study storefront
//!
//! This crate provides the backend for the ShopWithUs study. It walks a
//! participant through login, cookie-consent capture and the LLM data-usage
//! consent flow, and persists each participant's responses either in a flat
//! JSON file or in a document store.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::Participants;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub participants: Participants,
}
