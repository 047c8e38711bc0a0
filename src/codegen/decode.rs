//! Output-coordinate decode generation
//!
//! Emits `out_flat_index()` and `get_output_coords()` specialized to the
//! output's rank, packing, and whether the shape is baked as literals or
//! supplied through runtime uniforms. The two regimes produce textually
//! different but semantically identical decode expressions.

use crate::binding::OperandBinding;
use crate::codegen::coords_type;
use crate::error::Result;
use crate::profile::CapabilityProfile;
use crate::shape::strides;

/// Emit the full output decode: flat-index helper plus
/// `get_output_coords()`.
pub fn output_decode(out: &OperandBinding, profile: &CapabilityProfile) -> Result<String> {
    let rank = out.rank();
    let parameterized = !out.is_packed() && profile.use_shape_uniforms(rank);

    let mut src = String::new();
    if parameterized {
        src.push_str(
            "int out_flat_index() {\n\
             \x20 ivec2 tex_rc = ivec2(result_uv.yx * vec2(out_tex_shape));\n\
             \x20 return tex_rc.x * out_tex_shape.y + tex_rc.y;\n\
             }\n\n",
        );
    } else {
        let surface = out.require_surface("output")?;
        // size-1 surface dimensions take the single-row/column shortcut
        if surface.rows == 1 {
            src.push_str(&format!(
                "int out_flat_index() {{\n\
                 \x20 return int(result_uv.x * {}.0);\n\
                 }}\n\n",
                surface.cols
            ));
        } else if surface.cols == 1 {
            src.push_str(&format!(
                "int out_flat_index() {{\n\
                 \x20 return int(result_uv.y * {}.0);\n\
                 }}\n\n",
                surface.rows
            ));
        } else {
            src.push_str(&format!(
                "int out_flat_index() {{\n\
                 \x20 ivec2 tex_rc = ivec2(result_uv.yx * vec2({rows}.0, {cols}.0));\n\
                 \x20 return tex_rc.x * {cols} + tex_rc.y;\n\
                 }}\n\n",
                rows = surface.rows,
                cols = surface.cols,
            ));
        }
    }

    if out.is_packed() {
        src.push_str(&packed_coords_fn(&out.shape));
    } else if parameterized {
        src.push_str(&uniform_coords_fn(rank));
    } else {
        src.push_str(&baked_coords_fn(&out.shape));
    }
    Ok(src)
}

/// Baked-literal decode: successive division by precomputed strides.
fn baked_coords_fn(shape: &[usize]) -> String {
    let rank = shape.len();
    let ty = coords_type(rank);
    match rank {
        0 => format!("{ty} get_output_coords() {{\n  return 0;\n}}\n"),
        // rank-1 bypasses multi-dimension decomposition entirely
        1 => format!("{ty} get_output_coords() {{\n  return out_flat_index();\n}}\n"),
        _ => {
            let st = strides(shape);
            let mut lines = vec!["  int rem = out_flat_index();".to_string()];
            for i in 0..rank {
                if shape[i] == 1 {
                    lines.push(format!("  int d{i} = 0;"));
                } else if i + 1 == rank {
                    lines.push(format!("  int d{i} = rem;"));
                } else {
                    lines.push(format!("  int d{i} = rem / {};", st[i]));
                    lines.push(format!("  rem -= d{i} * {};", st[i]));
                }
            }
            lines.push(format!("  return {};", coords_ctor(rank, &dim_vars(rank))));
            format!("{ty} get_output_coords() {{\n{}\n}}\n", lines.join("\n"))
        }
    }
}

/// Runtime-uniform decode: mod/divide from the innermost dimension out,
/// reading extents from `out_shape`.
fn uniform_coords_fn(rank: usize) -> String {
    let ty = coords_type(rank);
    match rank {
        0 => format!("{ty} get_output_coords() {{\n  return 0;\n}}\n"),
        1 => format!("{ty} get_output_coords() {{\n  return out_flat_index();\n}}\n"),
        _ => {
            let mut lines = vec!["  int rem = out_flat_index();".to_string()];
            for i in (1..rank).rev() {
                let extent = shape_component("out_shape", rank, i);
                lines.push(format!("  int d{i} = imod(rem, {extent});"));
                lines.push(format!("  rem /= {extent};"));
            }
            lines.push("  int d0 = rem;".to_string());
            lines.push(format!("  return {};", coords_ctor(rank, &dim_vars(rank))));
            format!("{ty} get_output_coords() {{\n{}\n}}\n", lines.join("\n"))
        }
    }
}

/// Packed decode: the flat index addresses 2x2 texel blocks; the
/// returned coordinates are those of the block's top-left lane.
fn packed_coords_fn(shape: &[usize]) -> String {
    let rank = shape.len();
    let ty = coords_type(rank);
    match rank {
        0 => format!("{ty} get_output_coords() {{\n  return 0;\n}}\n"),
        1 => format!("{ty} get_output_coords() {{\n  return out_flat_index() * 2;\n}}\n"),
        _ => {
            let block_rows = shape[rank - 2].div_ceil(2).max(1);
            let block_cols = shape[rank - 1].div_ceil(2).max(1);
            let mut lines = vec![
                "  int texel = out_flat_index();".to_string(),
                format!("  int bc = imod(texel, {block_cols});"),
            ];
            let mut vars: Vec<String> = Vec::new();
            if rank == 2 {
                lines.push(format!("  int br = texel / {block_cols};"));
            } else {
                lines.push(format!("  texel /= {block_cols};"));
                lines.push(format!("  int br = imod(texel, {block_rows});"));
                lines.push(format!("  int rem = texel / {block_rows};"));
                let outer = &shape[..rank - 2];
                let st = strides(outer);
                for i in 0..outer.len() {
                    if outer[i] == 1 {
                        lines.push(format!("  int d{i} = 0;"));
                    } else if i + 1 == outer.len() {
                        lines.push(format!("  int d{i} = rem;"));
                    } else {
                        lines.push(format!("  int d{i} = rem / {};", st[i]));
                        lines.push(format!("  rem -= d{i} * {};", st[i]));
                    }
                    vars.push(format!("d{i}"));
                }
            }
            vars.push("br * 2".to_string());
            vars.push("bc * 2".to_string());
            lines.push(format!("  return {};", coords_ctor(rank, &vars)));
            format!("{ty} get_output_coords() {{\n{}\n}}\n", lines.join("\n"))
        }
    }
}

/// Component expression of a shape uniform (`int` for rank 1, `ivecN`
/// components otherwise).
pub fn shape_component(uniform: &str, rank: usize, i: usize) -> String {
    if rank <= 1 {
        uniform.to_string()
    } else {
        format!("{uniform}.{}", ["x", "y", "z", "w"][i])
    }
}

fn dim_vars(rank: usize) -> Vec<String> {
    (0..rank).map(|i| format!("d{i}")).collect()
}

fn coords_ctor(rank: usize, vars: &[String]) -> String {
    match rank {
        2..=4 => format!("ivec{rank}({})", vars.join(", ")),
        5 | 6 => {
            // struct construction uses the declared field order
            format!("coords{rank}_t({})", vars.join(", "))
        }
        _ => vars[0].clone(),
    }
}
