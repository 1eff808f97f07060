//! Core domain types and logic.

pub mod agent;
pub mod allocation;
pub mod blessing;
pub mod config;
pub mod config_validation;
pub mod cycle;
pub mod error;
pub mod harvest;
pub mod learning;
pub mod ledger;
pub mod market;
pub mod pulse;
pub mod risk;
pub mod settlement;
pub mod treasury;
