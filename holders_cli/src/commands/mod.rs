//! CLI subcommand implementations, one per quote page.

pub mod holders;
pub mod insiders;
pub mod roster;
