//! Concrete adapter implementations for ports.

pub mod csv_history_adapter;
pub mod file_config_adapter;
pub mod json_state_adapter;
pub mod paper_market;
pub mod pulse_file_adapter;
pub mod system_clock;
