//! CLI Exit Code Registry
//!
//! Single source of truth for `conciliar` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Every record on both sides was paired           |
//! | 1    | At least one unmatched record                   |
//! | 2    | Usage error (bad arguments)                     |
//! | 60   | Config could not be parsed or failed validation |
//! | 61   | Runtime / IO failure                            |
//! | 62   | One or both record lists were empty             |
//! | 63   | Probable pairs present and `--strict` was given |

use conciliar_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Fully reconciled.
pub const EXIT_SUCCESS: u8 = 0;

/// Unmatched records remain. Like `diff(1)`, exit 1 means "sides differ."
pub const EXIT_UNMATCHED: u8 = 1;

/// Usage error (bad arguments, no subcommand). clap uses the same code.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Reconciliation (60-69)
// =============================================================================

/// Config parse or validation error.
pub const EXIT_INVALID_CONFIG: u8 = 60;

/// Reading sources, writing outputs, or an internal processing failure.
pub const EXIT_RUNTIME: u8 = 61;

/// Statement, accounting, or both loaded zero records.
pub const EXIT_EMPTY_INPUT: u8 = 62;

/// Probable pairs need review (`--strict`).
pub const EXIT_PROBABLE: u8 = 63;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::EmptyInput { .. } => EXIT_EMPTY_INPUT,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::UnexpectedProcessing(_) => EXIT_RUNTIME,
    }
}
