//! # shadr
//!
//! **Shader program synthesis, compilation caching, and execution
//! binding for texture-backed array accelerators.**
//!
//! Given a logical array operation and its operand shapes, shadr
//! synthesizes fragment-kernel source over a chosen data-packing
//! scheme, compiles and caches the program keyed by a structural
//! signature, and computes the uniform/surface bindings for dispatch.
//! The actual device API lives behind the [`context::DeviceContext`]
//! trait; this crate never owns device memory and never talks to a
//! driver.
//!
//! ## Architecture
//!
//! ```text
//! OpDescriptor ──synthesize──> ProgramSpec (kernel body IR + metadata)
//!      ProgramSpec ──assemble──> complete source per CapabilityProfile
//!           source ──ProgramCache::get_or_compile──> CompiledProgram
//!   CompiledProgram ──bind_and_dispatch──> uniform writes + dispatch
//! ```
//!
//! ## Packing
//!
//! Operands are addressed either unpacked (one scalar per texel) or
//! packed (a 2x2 logical block per 4-channel texel). Packing is a
//! property of a binding, not of the logical array: the same array may
//! be bound packed in one dispatch and unpacked in the next.
//!
//! ## Errors
//!
//! All failures are fatal to the call that raised them and propagate
//! immediately: unsupported ranks at synthesis time, operand mismatches
//! and unknown parameters at bind time, compile failures with the full
//! offending source attached. Data-dependent out-of-range indices are
//! not errors; gather and scatter define saturating semantics instead.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod binder;
pub mod binding;
pub mod cache;
pub mod codegen;
pub mod context;
pub mod engine;
pub mod error;
pub mod index;
pub mod profile;
pub mod program;
pub mod shape;
pub mod templates;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::binder::{bind_and_dispatch, OperandData, RuntimeOperand};
    pub use crate::binding::{OperandBinding, Packing, SurfaceShape};
    pub use crate::cache::{CompiledProgram, ProgramCache};
    pub use crate::context::DeviceContext;
    pub use crate::engine::Engine;
    pub use crate::error::{Error, Result};
    pub use crate::profile::{CapabilityProfile, Dialect};
    pub use crate::program::{ParamDecl, ParamType, ParamValue, ProgramSpec};
    pub use crate::templates::{synthesize, ArgDirection, MirrorMode, OpDescriptor};
}
