//! Engine facade
//!
//! Owns the compilation cache and the capability profile with an
//! explicit, injected lifetime: the host constructs an [`Engine`] at
//! startup and drops it at shutdown. One call chains template
//! synthesis, cached compilation, and execution binding.

use std::sync::Arc;

use crate::binder::{bind_and_dispatch, OperandData, RuntimeOperand};
use crate::binding::{OperandBinding, Packing};
use crate::cache::{CompiledProgram, ProgramCache};
use crate::context::DeviceContext;
use crate::error::Result;
use crate::profile::CapabilityProfile;
use crate::program::ParamValue;
use crate::templates::{synthesize, OpDescriptor};

/// Program synthesis and dispatch engine for one capability profile.
pub struct Engine<C: DeviceContext> {
    cache: ProgramCache<C>,
    profile: CapabilityProfile,
}

impl<C: DeviceContext> Engine<C> {
    /// Engine for a host-supplied capability profile.
    pub fn new(profile: CapabilityProfile) -> Self {
        Self {
            cache: ProgramCache::new(),
            profile,
        }
    }

    /// The profile this engine specializes programs for.
    pub fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    /// The underlying compilation cache.
    pub fn cache(&self) -> &ProgramCache<C> {
        &self.cache
    }

    /// Synthesize and compile (or fetch) the program for an operation
    /// against concrete operand bindings.
    pub fn prepare(
        &self,
        ctx: &C,
        op: &OpDescriptor,
        inputs: &[OperandBinding],
        out: &OperandBinding,
    ) -> Result<Arc<CompiledProgram<C>>> {
        let spec = synthesize(op)?;
        self.cache
            .get_or_compile(ctx, &spec, inputs, out, &self.profile)
    }

    /// Synthesize, compile-or-fetch, bind, and dispatch in one call.
    pub fn run(
        &self,
        ctx: &C,
        op: &OpDescriptor,
        inputs: &[RuntimeOperand<'_, C>],
        output: &RuntimeOperand<'_, C>,
        params: &[(&str, ParamValue)],
    ) -> Result<()> {
        let bindings: Vec<OperandBinding> = inputs.iter().map(to_binding).collect();
        let out_binding = to_binding(output);
        let compiled = self.prepare(ctx, op, &bindings, &out_binding)?;
        bind_and_dispatch(ctx, &compiled, inputs, output, params)
    }
}

/// Compile-time view of a runtime operand.
fn to_binding<C: DeviceContext>(operand: &RuntimeOperand<'_, C>) -> OperandBinding {
    match &operand.data {
        OperandData::Inline(_) => OperandBinding {
            shape: operand.shape.to_vec(),
            packing: Packing::Unpacked,
            surface: None,
            flat_offset: 0,
            inline: true,
        },
        OperandData::Surface {
            surface_shape,
            flat_offset,
            ..
        } => OperandBinding {
            shape: operand.shape.to_vec(),
            packing: operand.packing,
            surface: Some(*surface_shape),
            flat_offset: *flat_offset,
            inline: false,
        },
    }
}
