//! Series utilities shared by the engine and the orchestrator.
//!
//! - `infer`: cadence inference from timestamps
//! - `stats`: robust reductions (median, mode) used by reconciling and combining
//! - `reconcile`: overlap-based scale factors across the stagger plan
//! - `combine`: per-group concatenation, outer join, reduction and normalization
/// Cadence inference helpers.
pub mod infer;
/// Reduction helpers.
pub mod stats;
/// Scale factor solving and propagation.
pub mod reconcile;
/// Concatenating and reducing reconciled windows.
pub mod combine;
