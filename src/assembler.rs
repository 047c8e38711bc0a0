//! Shader assembler
//!
//! Wraps a template's kernel body in a complete, compilable program:
//! dialect preamble, numeric shims, index helpers, operand declarations,
//! output-coordinate decode, operand accessors, then the body. Output is
//! deterministic given identical inputs; there is no randomness and no
//! environment read beyond the capability profile, which is what
//! underwrites cache-key-based reuse.

use crate::binding::OperandBinding;
use crate::codegen::accessor::{at_out_coords_accessor, operand_accessor, operand_decls};
use crate::codegen::decode::output_decode;
use crate::codegen::{
    coords_struct_decl, math_helpers, numeric_shims, packed_helpers, preamble, set_output_fn,
};
use crate::error::{Error, Result};
use crate::profile::CapabilityProfile;
use crate::program::ProgramSpec;
use crate::shape::{check_packed_rank, check_rank};

/// Assemble complete program source for a spec against concrete operand
/// bindings and a capability profile.
pub fn assemble(
    spec: &ProgramSpec,
    inputs: &[OperandBinding],
    out: &OperandBinding,
    profile: &CapabilityProfile,
) -> Result<String> {
    validate(spec, inputs, out)?;

    let mut src = String::new();

    // (1) capability-profile preamble
    src.push_str(&preamble(profile));
    src.push('\n');

    // (2) NaN / infinity shims
    src.push_str(&numeric_shims(profile));
    src.push('\n');

    // (3) index-arithmetic helper snippets
    src.push_str(&math_helpers(profile));
    src.push('\n');
    if spec.packed_inputs || spec.packed_output {
        src.push_str(&packed_helpers());
        src.push('\n');
    }
    if let Some(decl) = coords_struct_decl(out.rank()) {
        src.push_str(&decl);
        src.push('\n');
    }

    // (4) per-operand and parameter declarations
    for (name, binding) in spec.operand_names.iter().zip(inputs) {
        src.push_str(&operand_decls(name, binding, profile));
    }
    if !out.is_packed() && profile.use_shape_uniforms(out.rank()) {
        src.push_str(&format!(
            "uniform {} out_shape;\n",
            shape_uniform_type(out.rank())
        ));
        src.push_str("uniform ivec2 out_tex_shape;\n");
    }
    for decl in &spec.custom_params {
        src.push_str(&decl.ty.decl(decl.name));
        src.push('\n');
    }
    src.push('\n');

    // (5) output-coordinate decode, specialized to rank and packing
    src.push_str(&set_output_fn(profile, spec.packed_output));
    src.push('\n');
    src.push_str(&output_decode(out, profile)?);
    src.push('\n');

    // (6) per-operand accessors
    for (name, binding) in spec.operand_names.iter().zip(inputs) {
        src.push_str(&operand_accessor(name, binding, profile)?);
        src.push('\n');
        if let Some(convenience) = at_out_coords_accessor(name, binding, out) {
            src.push_str(&convenience);
            src.push('\n');
        }
    }

    // (7) the template's kernel body, containing the entry point
    src.push_str(&spec.body_text());

    Ok(src)
}

fn shape_uniform_type(rank: usize) -> &'static str {
    match rank {
        0 | 1 => "int",
        2 => "ivec2",
        3 => "ivec3",
        _ => "ivec4",
    }
}

fn validate(spec: &ProgramSpec, inputs: &[OperandBinding], out: &OperandBinding) -> Result<()> {
    if inputs.len() != spec.operand_names.len() {
        return Err(Error::OperandCountMismatch {
            expected: spec.operand_names.len(),
            got: inputs.len(),
        });
    }
    if out.shape != spec.output_shape {
        return Err(Error::ShapeMismatch {
            operand: "output",
            expected: spec.output_shape.clone(),
            got: out.shape.clone(),
        });
    }
    check_rank(&out.shape, "program assembly")?;
    if out.is_packed() {
        check_packed_rank(&out.shape, "packed output assembly")?;
    }
    if out.is_packed() != spec.packed_output {
        return Err(Error::InvalidArgument {
            arg: "output",
            reason: "output packing does not match the template's declared packing".to_string(),
        });
    }
    for (name, binding) in spec.operand_names.iter().zip(inputs) {
        check_rank(&binding.shape, "program assembly")?;
        if binding.is_packed() {
            check_packed_rank(&binding.shape, "packed operand assembly")?;
            if binding.inline {
                return Err(Error::InvalidArgument {
                    arg: name,
                    reason: "inline constants cannot be packed".to_string(),
                });
            }
            if binding.flat_offset != 0 {
                return Err(Error::InvalidArgument {
                    arg: name,
                    reason: "packed bindings do not support flat offsets".to_string(),
                });
            }
        }
        if spec.packed_inputs != binding.is_packed() && !binding.inline {
            return Err(Error::InvalidArgument {
                arg: name,
                reason: "operand packing does not match the template's declared packing"
                    .to_string(),
            });
        }
    }
    Ok(())
}
