#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Scalar aliases and the impedance domain abstraction.
pub mod math;
/// Error types shared across modules.
pub mod errors;
/// Series/parallel algebra, expressions, trees and the evaluator.
pub mod network;
/// Standard-value catalogs (E-series) and component impedances.
pub mod catalog;
/// Network synthesis from catalog values.
pub mod synthesis;

/// Common exports for downstream crates.
pub mod prelude;

pub use network::evaluate;
pub use synthesis::synthesize;
