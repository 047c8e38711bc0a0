//! Device context seam
//!
//! The actual device API — program compilation, texture allocation,
//! draw submission — lives behind this trait, implemented by the host's
//! graphics-context wrapper. This crate only decides *what* to bind and
//! *where*; it never owns device memory, and the handles it stores are
//! reachable only through the context that created them.

use crate::error::Result;
use crate::program::ParamValue;

/// Host-implemented device interface.
///
/// Uses static dispatch via associated types: an implementation names
/// its own compiled-program, surface, and uniform-location handles.
pub trait DeviceContext {
    /// Opaque compiled-program handle
    type Program;
    /// Addressable-surface (texture-like buffer) handle
    type Surface;
    /// Runtime binding location of one named parameter
    type Location: Clone;

    /// Compile assembled source into a program.
    ///
    /// A failure here is an internal-logic bug in the generator; the
    /// caller wraps it with the offending source and never retries.
    fn compile(&self, source: &str) -> Result<Self::Program>;

    /// Look up the binding location of a named parameter.
    ///
    /// Returns `None` when the parameter was optimized out of the
    /// compiled program.
    fn param_location(&self, program: &Self::Program, name: &str) -> Option<Self::Location>;

    /// Bind a surface to a sampler location on the given unit.
    fn bind_surface(
        &self,
        location: &Self::Location,
        surface: &Self::Surface,
        unit: usize,
    ) -> Result<()>;

    /// Write one parameter value to its location.
    fn write_param(&self, location: &Self::Location, value: &ParamValue) -> Result<()>;

    /// Trigger the dispatch writing into `output`.
    ///
    /// Fire-and-forget from this layer's perspective; completion is the
    /// host's concern.
    fn dispatch(&self, program: &Self::Program, output: &Self::Surface) -> Result<()>;
}
