// docgate-config/src/lib.rs
// ============================================================================
// Module: Docgate Configuration Library
// Description: Configuration loading and validation for Docgate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and range
//! limits. It resolves the backing-store credentials (`api_key`, `base_id`,
//! table reference), the gateway bind address and bearer secret, the known
//! projects list, and the state-log destination. Missing or invalid
//! configuration fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions and debug output.
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only output and panic-based assertions are permitted."
    )]
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::DocGateConfig;
pub use config::ServerConfig;
pub use config::StateLogConfig;
pub use config::StoreConfig;
