//! Per-operand declarations and accessor functions
//!
//! Each sampled operand gets a `get_<name>(...)` accessor mapping logical
//! coordinates to a value, plus a broadcast-aware
//! `get_<name>_at_out_coords()` convenience form when the operand's rank
//! does not exceed the output's. Inline-constant operands read from a
//! uniform array instead of sampling a surface.

use crate::binding::OperandBinding;
use crate::codegen::decode::shape_component;
use crate::codegen::{coord_component, coords_decl};
use crate::error::Result;
use crate::profile::CapabilityProfile;
use crate::shape::{broadcast_dims, num_elements, strides};

/// Uniform declarations for one operand.
pub fn operand_decls(
    name: &str,
    binding: &OperandBinding,
    profile: &CapabilityProfile,
) -> String {
    let mut out = String::new();
    if binding.inline {
        let count = num_elements(&binding.shape);
        if count <= 1 {
            out.push_str(&format!("uniform float {name};\n"));
        } else {
            out.push_str(&format!("uniform float {name}[{count}];\n"));
        }
        return out;
    }
    out.push_str(&format!("uniform sampler2D {name};\n"));
    if binding.flat_offset != 0 {
        out.push_str(&format!("uniform int {name}_offset;\n"));
    }
    if !binding.is_packed() && profile.use_shape_uniforms(binding.rank()) {
        out.push_str(&format!(
            "uniform {} {name}_shape;\n",
            shape_uniform_type(binding.rank())
        ));
        out.push_str(&format!("uniform ivec2 {name}_tex_shape;\n"));
    }
    out
}

/// The `get_<name>(...)` accessor for one operand.
pub fn operand_accessor(
    name: &str,
    binding: &OperandBinding,
    profile: &CapabilityProfile,
) -> Result<String> {
    if binding.inline {
        return Ok(inline_accessor(name, binding));
    }
    if binding.is_packed() {
        return packed_accessor(name, binding);
    }
    dense_accessor(name, binding, profile)
}

/// Broadcast-aware read at the current output coordinate.
///
/// Only emitted for unpacked operands against an unpacked output, when
/// the operand's rank does not exceed the output's. Leading output
/// coordinates beyond the operand's rank are dropped, and coordinates of
/// broadcast dimensions are explicitly zeroed before the lower-rank
/// accessor is called.
pub fn at_out_coords_accessor(
    name: &str,
    binding: &OperandBinding,
    out: &OperandBinding,
) -> Option<String> {
    if binding.is_packed() || out.is_packed() || binding.rank() > out.rank() {
        return None;
    }
    let r = binding.rank();
    let out_rank = out.rank();
    if r == 0 {
        return Some(format!(
            "float get_{name}_at_out_coords() {{\n\
             \x20 return get_{name}();\n\
             }}\n"
        ));
    }
    let offset = out_rank - r;
    let bcast = broadcast_dims(&binding.shape, &out.shape);
    let args: Vec<String> = (0..r)
        .map(|i| {
            if bcast.contains(&i) {
                "0".to_string()
            } else {
                coord_component("coords", out_rank, offset + i)
            }
        })
        .collect();
    Some(format!(
        "float get_{name}_at_out_coords() {{\n\
         \x20 {}\n\
         \x20 return get_{name}({});\n\
         }}\n",
        coords_decl(out_rank),
        args.join(", ")
    ))
}

// ============================================================================
// Accessor bodies
// ============================================================================

fn args_list(rank: usize) -> String {
    (0..rank)
        .map(|i| format!("int d{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn shape_uniform_type(rank: usize) -> &'static str {
    match rank {
        0 | 1 => "int",
        2 => "ivec2",
        3 => "ivec3",
        _ => "ivec4",
    }
}

/// Flat-index expression from baked strides. Size-1 dimensions
/// contribute nothing and skip their multiply.
fn baked_flat_expr(shape: &[usize]) -> String {
    let st = strides(shape);
    let terms: Vec<String> = shape
        .iter()
        .enumerate()
        .filter(|&(_, &extent)| extent != 1)
        .map(|(i, _)| {
            if st[i] == 1 {
                format!("d{i}")
            } else {
                format!("{} * d{i}", st[i])
            }
        })
        .collect();
    if terms.is_empty() {
        "0".to_string()
    } else {
        terms.join(" + ")
    }
}

fn inline_accessor(name: &str, binding: &OperandBinding) -> String {
    let args = args_list(binding.rank());
    let count = num_elements(&binding.shape);
    if count <= 1 {
        format!(
            "float get_{name}({args}) {{\n\
             \x20 return {name};\n\
             }}\n"
        )
    } else {
        format!(
            "float get_{name}({args}) {{\n\
             \x20 int flat = {};\n\
             \x20 return {name}[flat];\n\
             }}\n",
            baked_flat_expr(&binding.shape)
        )
    }
}

fn dense_accessor(
    name: &str,
    binding: &OperandBinding,
    profile: &CapabilityProfile,
) -> Result<String> {
    let rank = binding.rank();
    let args = args_list(rank);
    let parameterized = profile.use_shape_uniforms(rank);

    let mut lines: Vec<String> = Vec::new();
    if parameterized {
        // Horner flatten over uniform extents
        if rank == 0 {
            lines.push("  int flat = 0;".to_string());
        } else {
            lines.push("  int flat = d0;".to_string());
            for i in 1..rank {
                lines.push(format!(
                    "  flat = flat * {} + d{i};",
                    shape_component(&format!("{name}_shape"), rank, i)
                ));
            }
        }
    } else {
        lines.push(format!("  int flat = {};", baked_flat_expr(&binding.shape)));
    }
    if binding.flat_offset != 0 {
        lines.push(format!("  flat += {name}_offset;"));
    }

    if parameterized {
        lines.push(format!(
            "  vec2 uv = uv_from_flat({name}_tex_shape.x, {name}_tex_shape.y, flat);"
        ));
    } else {
        let surface = binding.require_surface("operand")?;
        // size-1 surface dimensions take the single-row/column shortcut
        if surface.rows == 1 {
            lines.push(format!(
                "  vec2 uv = vec2((float(flat) + 0.5) / {}.0, 0.5);",
                surface.cols
            ));
        } else if surface.cols == 1 {
            lines.push(format!(
                "  vec2 uv = vec2(0.5, (float(flat) + 0.5) / {}.0);",
                surface.rows
            ));
        } else {
            lines.push(format!(
                "  vec2 uv = uv_from_flat({}, {}, flat);",
                surface.rows, surface.cols
            ));
        }
    }
    lines.push(format!("  return sample_surface({name}, uv);"));

    Ok(format!(
        "float get_{name}({args}) {{\n{}\n}}\n",
        lines.join("\n")
    ))
}

/// Packed accessor: returns the whole 4-lane texel containing the given
/// coordinates; callers select a lane with `get_channel`.
fn packed_accessor(name: &str, binding: &OperandBinding) -> Result<String> {
    let rank = binding.rank();
    let args = args_list(rank);
    let surface = binding.require_surface("packed operand")?;
    let shape = &binding.shape;

    let texel_expr = match rank {
        0 => "0".to_string(),
        1 => "d0 / 2".to_string(),
        _ => {
            let block_rows = shape[rank - 2].div_ceil(2).max(1);
            let block_cols = shape[rank - 1].div_ceil(2).max(1);
            let outer = &shape[..rank - 2];
            let outer_expr = if outer.is_empty() {
                String::new()
            } else {
                let st = strides(outer);
                let terms: Vec<String> = outer
                    .iter()
                    .enumerate()
                    .filter(|&(_, &extent)| extent != 1)
                    .map(|(i, _)| {
                        if st[i] == 1 {
                            format!("d{i}")
                        } else {
                            format!("{} * d{i}", st[i])
                        }
                    })
                    .collect();
                if terms.is_empty() {
                    String::new()
                } else {
                    format!("({}) * {} + ", terms.join(" + "), block_rows)
                }
            };
            format!(
                "({outer_expr}d{row} / 2) * {block_cols} + d{col} / 2",
                row = rank - 2,
                col = rank - 1
            )
        }
    };

    Ok(format!(
        "vec4 get_{name}({args}) {{\n\
         \x20 int texel = {texel_expr};\n\
         \x20 vec2 uv = uv_from_flat({rows}, {cols}, texel);\n\
         \x20 return sample_texel({name}, uv);\n\
         }}\n",
        rows = surface.rows,
        cols = surface.cols,
    ))
}
