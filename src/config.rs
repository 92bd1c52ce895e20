/// Settings for the ledger service.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// How many times an invocation is re-run after a write conflict before
    /// the conflict is surfaced to the caller.
    pub max_commit_retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: 3,
        }
    }
}
