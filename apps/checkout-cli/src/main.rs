//! # Tally Checkout Entry Point
//!
//! See `lib.rs` for the actual setup.

use std::process::ExitCode;

fn main() -> ExitCode {
    tally_checkout::run()
}
