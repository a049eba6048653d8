/*!
 * Core Module
 * Shared identifiers, level arithmetic, and error types
 */

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;
