//! Read-only program analyses consumed by optimisation passes.
//!
//! Nothing in this module mutates the tree. Passes run every analysis they
//! need to completion before they start rewriting, so no classification is
//! ever made on a partially rewritten function.
//!
//! ```text
//! FunctionIndex (needs only the top-level block)
//!  └─> UsageAnalyzer (needs FunctionIndex + ReferenceCounter)
//!
//! verify_preconditions (needs FunctionIndex, independent)
//! ```

pub mod contract;
pub mod function_index;
pub mod references;
pub mod usage;

pub use contract::{verify_call_arity, verify_preconditions, verify_unique_hoisted_functions};
pub use function_index::FunctionIndex;
pub use references::ReferenceCounter;
pub use usage::{FunctionUsage, Usage, UsageAnalyzer, UsageMap};
