//! CLI Exit Code Registry
//!
//! Single source of truth for `ordermart` exit codes. Scheduled jobs branch on
//! these, so treat them as part of the shell contract.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Run completed, fact table loaded                    |
//! | 1    | General error (unspecified)                         |
//! | 2    | Usage error (bad args, unwritable export path)      |
//! | 3    | Config missing, unparseable or invalid              |
//! | 4    | No rows extracted from any source                   |
//! | 5    | Warehouse load failed (connect or fact write)       |
//! | 6    | Aborted on a source query failure (strict sources)  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Map it in [`outcome_exit_code`] or at the call site

use crate::pipeline::Outcome;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - the fact table was written.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or an output path that cannot be written.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Pipeline (3-9)
// =============================================================================

/// Config file missing, unparseable, or failing validation.
pub const EXIT_CONFIG_INVALID: u8 = 3;

/// Both sources yielded no rows; nothing was transformed or loaded.
pub const EXIT_NO_DATA: u8 = 4;

/// Warehouse unreachable or fact table write failed.
pub const EXIT_LOAD_FAILED: u8 = 5;

/// A source query failed while `pipeline.strict_sources` is set.
pub const EXIT_ABORTED: u8 = 6;

/// Map a pipeline outcome to its exit code.
pub fn outcome_exit_code(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Success => EXIT_SUCCESS,
        Outcome::NoData => EXIT_NO_DATA,
        Outcome::Failed => EXIT_LOAD_FAILED,
        Outcome::Aborted => EXIT_ABORTED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_codes_are_distinct() {
        let codes = [Outcome::Success, Outcome::NoData, Outcome::Failed, Outcome::Aborted]
            .map(outcome_exit_code);
        assert_eq!(codes, [0, 4, 5, 6]);
    }
}
