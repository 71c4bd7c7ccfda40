//! Run-scoped resources.
//!
//! State in this module lives for exactly one probe invocation: the objects
//! created by the write stage and the temporary working directory holding
//! the local payload and downloaded copy.

mod objects;
mod workdir;

pub use objects::{RunObjectRef, RunObjectStore};
pub use workdir::Workdir;
