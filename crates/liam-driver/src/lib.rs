//! liam compiler driver
//!
//! Loads an entry file and its imports into a bundle, then runs the
//! declare, type check and borrow check passes, halting after the first
//! pass that reports anything.

pub mod resolver;
pub mod loader;
pub mod pipeline;
pub mod backend;

pub use resolver::ModuleResolver;
pub use loader::{LoadError, Loader};
pub use pipeline::{CompileOptions, Compilation, Pipeline, STAGES};
pub use backend::{Backend, BackendError, SignatureDump};
