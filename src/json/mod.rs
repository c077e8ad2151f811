//! Purpose: JSON parsing boundary shared by the CLI and library callsites.
//! Exports: `parse` module with decode helpers and failure categorisation.
//! Role: Single seam for parser details so callsites avoid ad hoc decode logic.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub mod parse;
