//! Persistence port for treasury and learnings state.

use crate::domain::error::TreasuryError;
use crate::domain::learning::LearningsState;
use crate::domain::ledger::TreasuryState;

/// Loads and stores the two state documents. `Ok(None)` means nothing has
/// been persisted yet and the caller should start from defaults.
pub trait StatePort {
    fn load_treasury(&self) -> Result<Option<TreasuryState>, TreasuryError>;

    fn save_treasury(&self, state: &TreasuryState) -> Result<(), TreasuryError>;

    fn load_learnings(&self) -> Result<Option<LearningsState>, TreasuryError>;

    fn save_learnings(&self, state: &LearningsState) -> Result<(), TreasuryError>;

    /// Remove both documents so the next load starts from defaults.
    fn reset(&self) -> Result<(), TreasuryError>;
}
