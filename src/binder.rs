//! Execution binder
//!
//! Binds concrete runtime operands to a compiled program and triggers
//! dispatch. Validation only applies to programs compiled with baked
//! shapes; runtime-parameterized programs tolerate shape variation by
//! construction and skip it.

use crate::binding::{Packing, SurfaceShape};
use crate::cache::CompiledProgram;
use crate::context::DeviceContext;
use crate::error::{Error, Result};
use crate::program::ParamValue;

/// Where one runtime operand's data lives.
pub enum OperandData<'a, C: DeviceContext> {
    /// Addressable surface plus its physical shape and view offset
    Surface {
        /// Surface handle owned by the host
        surface: &'a C::Surface,
        /// Physical addressable-unit shape
        surface_shape: SurfaceShape,
        /// Flat element offset into the allocation
        flat_offset: usize,
    },
    /// Small constant, uploaded as inline uniform values
    Inline(&'a [f32]),
}

/// One concrete operand at dispatch time.
pub struct RuntimeOperand<'a, C: DeviceContext> {
    /// Logical shape
    pub shape: &'a [usize],
    /// Storage convention
    pub packing: Packing,
    /// Backing data
    pub data: OperandData<'a, C>,
}

impl<'a, C: DeviceContext> RuntimeOperand<'a, C> {
    /// Surface-backed operand with no view offset.
    pub fn surface(
        shape: &'a [usize],
        packing: Packing,
        surface: &'a C::Surface,
        surface_shape: SurfaceShape,
    ) -> Self {
        Self {
            shape,
            packing,
            data: OperandData::Surface {
                surface,
                surface_shape,
                flat_offset: 0,
            },
        }
    }

    /// Inline-constant operand.
    pub fn inline(shape: &'a [usize], values: &'a [f32]) -> Self {
        Self {
            shape,
            packing: Packing::Unpacked,
            data: OperandData::Inline(values),
        }
    }
}

/// Bind all operands and parameters of a compiled program, then trigger
/// its dispatch. No return value beyond success or a fatal error.
pub fn bind_and_dispatch<C: DeviceContext>(
    ctx: &C,
    compiled: &CompiledProgram<C>,
    inputs: &[RuntimeOperand<'_, C>],
    output: &RuntimeOperand<'_, C>,
    params: &[(&str, ParamValue)],
) -> Result<()> {
    validate(compiled, inputs, output)?;

    let out_surface = match &output.data {
        OperandData::Surface { surface, .. } => *surface,
        OperandData::Inline(_) => {
            return Err(Error::InvalidArgument {
                arg: "output",
                reason: "output must be surface-backed".to_string(),
            })
        }
    };

    // operand plumbing first, in declaration order
    let mut unit = 0usize;
    for (name, operand) in compiled.spec.operand_names.iter().zip(inputs) {
        match &operand.data {
            OperandData::Inline(values) => {
                if let Some(location) = compiled.locations.get(*name) {
                    let value = if values.len() == 1 {
                        ParamValue::Float(values[0])
                    } else {
                        ParamValue::FloatArray(values.to_vec())
                    };
                    ctx.write_param(location, &value)?;
                }
            }
            OperandData::Surface {
                surface,
                surface_shape,
                flat_offset,
            } => {
                if let Some(location) = compiled.locations.get(*name) {
                    ctx.bind_surface(location, surface, unit)?;
                }
                // unit advances even when the sampler was optimized out,
                // keeping later operands on their declared units
                unit += 1;
                if let Some(location) = compiled.locations.get(&format!("{name}_offset")) {
                    ctx.write_param(location, &ParamValue::Int(*flat_offset as i32))?;
                }
                write_shape_uniforms(ctx, compiled, name, operand.shape, *surface_shape)?;
            }
        }
    }

    // output shape uniforms, when parameterized
    if let OperandData::Surface { surface_shape, .. } = &output.data {
        write_shape_uniforms(ctx, compiled, "out", output.shape, *surface_shape)?;
    }

    // custom per-template parameters are written last
    for decl in &compiled.spec.custom_params {
        let value = params
            .iter()
            .find(|(name, _)| *name == decl.name)
            .map(|(_, value)| value)
            .ok_or_else(|| Error::MissingParam {
                name: decl.name.to_string(),
            })?;
        if !value.matches(&decl.ty) {
            return Err(Error::ParamTypeMismatch {
                name: decl.name.to_string(),
                expected: decl.ty.type_name(),
                got: value.type_name(),
            });
        }
        if let Some(location) = compiled.locations.get(decl.name) {
            ctx.write_param(location, value)?;
        }
    }

    ctx.dispatch(&compiled.program, out_surface)
}

/// Shape and surface-shape uniform writes for one parameterized
/// operand, choosing the vector width from the rank.
fn write_shape_uniforms<C: DeviceContext>(
    ctx: &C,
    compiled: &CompiledProgram<C>,
    name: &str,
    shape: &[usize],
    surface_shape: SurfaceShape,
) -> Result<()> {
    if let Some(location) = compiled.locations.get(&format!("{name}_shape")) {
        let dims: Vec<i32> = shape.iter().map(|&d| d as i32).collect();
        let value = match dims.len() {
            1 => ParamValue::Int(dims[0]),
            2 => ParamValue::IVec2([dims[0], dims[1]]),
            3 => ParamValue::IVec3([dims[0], dims[1], dims[2]]),
            4 => ParamValue::IVec4([dims[0], dims[1], dims[2], dims[3]]),
            n => {
                return Err(Error::RankNotSupported {
                    rank: n,
                    limit: 4,
                    context: "shape uniform write",
                })
            }
        };
        ctx.write_param(location, &value)?;
    }
    if let Some(location) = compiled.locations.get(&format!("{name}_tex_shape")) {
        ctx.write_param(
            location,
            &ParamValue::IVec2([surface_shape.rows as i32, surface_shape.cols as i32]),
        )?;
    }
    Ok(())
}

fn validate<C: DeviceContext>(
    compiled: &CompiledProgram<C>,
    inputs: &[RuntimeOperand<'_, C>],
    output: &RuntimeOperand<'_, C>,
) -> Result<()> {
    if inputs.len() != compiled.inputs.len() {
        return Err(Error::OperandCountMismatch {
            expected: compiled.inputs.len(),
            got: inputs.len(),
        });
    }
    // parameterized programs tolerate shape variation by construction
    if compiled.profile.runtime_shapes {
        return Ok(());
    }
    for ((name, binding), operand) in compiled
        .spec
        .operand_names
        .iter()
        .zip(&compiled.inputs)
        .zip(inputs)
    {
        if operand.shape != binding.shape.as_slice() {
            return Err(Error::ShapeMismatch {
                operand: name,
                expected: binding.shape.clone(),
                got: operand.shape.to_vec(),
            });
        }
        match (&operand.data, binding.inline) {
            // inline on both sides: no physical shape to compare
            (OperandData::Inline(_), true) => {}
            (OperandData::Surface { surface_shape, .. }, false) => {
                if let Some(expected) = binding.surface {
                    if *surface_shape != expected {
                        return Err(Error::SurfaceShapeMismatch {
                            operand: name,
                            expected: (expected.rows, expected.cols),
                            got: (surface_shape.rows, surface_shape.cols),
                        });
                    }
                }
            }
            _ => {
                return Err(Error::InvalidArgument {
                    arg: name,
                    reason: "inline flag differs between compile and dispatch".to_string(),
                });
            }
        }
    }
    if output.shape != compiled.output.shape.as_slice() {
        return Err(Error::ShapeMismatch {
            operand: "output",
            expected: compiled.output.shape.clone(),
            got: output.shape.to_vec(),
        });
    }
    Ok(())
}
