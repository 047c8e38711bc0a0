//! Program model: parameter declarations, kernel-body IR, and the
//! immutable [`ProgramSpec`] produced by template instantiation.

pub mod ir;
pub mod param;
pub mod spec;

pub use ir::{HelperFn, KernelIr, Stmt};
pub use param::{ParamDecl, ParamType, ParamValue};
pub use spec::ProgramSpec;
