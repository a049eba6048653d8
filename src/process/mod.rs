/*!
 * Process Module
 * Simulated processes and their execution traces
 */

pub mod record;
pub mod trace;

pub use record::ProcessRecord;
pub use trace::{Symbol, Trace};
