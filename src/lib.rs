//! Purpose: Shared library crate used by the `vieta` CLI and tests.
//! Exports: `core` (radix decoding, document extraction, Vieta product, errors), `json`.
//! Role: Keeps the pipeline testable without spawning the binary.
//! Invariants: All integer values in the pipeline are arbitrary precision.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod core;
pub mod json;
