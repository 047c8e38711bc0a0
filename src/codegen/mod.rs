//! GLSL snippet emitters
//!
//! Everything textual that is not a template's kernel body lives here:
//! dialect preambles, NaN/infinity shims, the small index-arithmetic
//! helper functions, coordinate-type plumbing for ranks 0-6, and the
//! per-operand accessor/decode generators in the submodules.
//!
//! All emitters are pure functions of their inputs; given identical
//! inputs they produce identical text, which is what makes cache-key
//! reuse sound.

pub mod accessor;
pub mod decode;

use crate::profile::{CapabilityProfile, Dialect};

/// Dialect-specific program header: version pragma, precision
/// declarations, interpolated UV input, and the fragment output
/// variable.
pub fn preamble(profile: &CapabilityProfile) -> String {
    match profile.dialect {
        Dialect::Es300 => "#version 300 es\n\
             precision highp float;\n\
             precision highp int;\n\
             precision highp sampler2D;\n\
             in vec2 result_uv;\n\
             out vec4 frag_color;\n"
            .to_string(),
        Dialect::Es100 => "precision highp float;\n\
             precision highp int;\n\
             varying vec2 result_uv;\n"
            .to_string(),
    }
}

/// NaN and infinity handling appropriate to the profile.
///
/// The legacy dialect has no native `isnan`; the modern one gets the
/// same shim when the profile reports a miscompiling driver.
pub fn numeric_shims(profile: &CapabilityProfile) -> String {
    let mut out = String::new();
    if profile.emit_nan_shim() {
        out.push_str(
            "bool isnan_custom(float val) {\n\
             \x20 return (val > 0.0 || val < 1.0) ? false : val != 0.0;\n\
             }\n\
             #define isnan(val) isnan_custom(val)\n",
        );
    }
    match profile.dialect {
        Dialect::Es300 => {
            out.push_str("const float INFINITY = uintBitsToFloat(0x7f800000u);\n");
        }
        Dialect::Es100 => {
            // largest finite value stands in on the legacy profile
            out.push_str("const float INFINITY = 3.402823466e38;\n");
        }
    }
    out
}

/// Integer div/mod and flat-index-to-UV helpers shared by every decode
/// and accessor function.
pub fn math_helpers(profile: &CapabilityProfile) -> String {
    let sample = profile.dialect.sample_fn();
    format!(
        "const vec2 HALF_TEXEL = vec2(0.5, 0.5);\n\
         \n\
         int imod(int x, int y) {{\n\
         \x20 return x - y * (x / y);\n\
         }}\n\
         \n\
         vec2 uv_from_flat(int tex_rows, int tex_cols, int flat) {{\n\
         \x20 int row = flat / tex_cols;\n\
         \x20 int col = flat - row * tex_cols;\n\
         \x20 return (vec2(col, row) + HALF_TEXEL) / vec2(tex_cols, tex_rows);\n\
         }}\n\
         \n\
         float sample_surface(sampler2D surface, vec2 uv) {{\n\
         \x20 return {sample}(surface, uv).r;\n\
         }}\n\
         \n\
         vec4 sample_texel(sampler2D surface, vec2 uv) {{\n\
         \x20 return {sample}(surface, uv);\n\
         }}\n"
    )
}

/// Channel-selection helper for packed operands: picks one of the four
/// lanes of a texel from the parity of the two innermost coordinates.
pub fn packed_helpers() -> String {
    "float get_channel(vec4 texel, int row, int col) {\n\
     \x20 int parity = imod(row, 2) * 2 + imod(col, 2);\n\
     \x20 if (parity == 0) { return texel.r; }\n\
     \x20 if (parity == 1) { return texel.g; }\n\
     \x20 if (parity == 2) { return texel.b; }\n\
     \x20 return texel.a;\n\
     }\n"
        .to_string()
}

/// The `set_output` entry the kernel body writes through.
pub fn set_output_fn(profile: &CapabilityProfile, packed_output: bool) -> String {
    let out_var = profile.dialect.output_var();
    if packed_output {
        format!(
            "void set_output(vec4 value) {{\n\
             \x20 {out_var} = value;\n\
             }}\n"
        )
    } else {
        format!(
            "void set_output(float value) {{\n\
             \x20 {out_var} = vec4(value, 0.0, 0.0, 0.0);\n\
             }}\n"
        )
    }
}

// ============================================================================
// Coordinate-type plumbing
// ============================================================================

/// GLSL type holding an output coordinate tuple of the given rank.
///
/// Ranks 5 and 6 use emitted structs; the shading language has no
/// 5/6-component integer vectors.
pub fn coords_type(rank: usize) -> &'static str {
    match rank {
        0 | 1 => "int",
        2 => "ivec2",
        3 => "ivec3",
        4 => "ivec4",
        5 => "coords5_t",
        6 => "coords6_t",
        _ => unreachable!("rank checked before codegen"),
    }
}

/// Expression reading component `i` of a coordinate value of `rank`.
pub fn coord_component(var: &str, rank: usize, i: usize) -> String {
    match rank {
        0 | 1 => var.to_string(),
        2..=4 => {
            let field = ["x", "y", "z", "w"][i];
            format!("{var}.{field}")
        }
        _ => format!("{var}.d{i}"),
    }
}

/// Struct declaration backing [`coords_type`] for ranks 5 and 6.
pub fn coords_struct_decl(rank: usize) -> Option<String> {
    if !(5..=6).contains(&rank) {
        return None;
    }
    let fields: Vec<String> = (0..rank).map(|i| format!("  int d{i};")).collect();
    Some(format!(
        "struct coords{rank}_t {{\n{}\n}};\n",
        fields.join("\n")
    ))
}

/// Statement declaring `coords` from `get_output_coords()`, for use at
/// the top of template bodies.
pub fn coords_decl(rank: usize) -> String {
    format!("{} coords = get_output_coords();", coords_type(rank))
}

/// GLSL float literal (always carries a decimal point or exponent).
pub fn float_literal(value: f32) -> String {
    let text = format!("{value:?}");
    if text.contains('.') || text.contains('e') || text.contains("inf") || text.contains("NaN") {
        text
    } else {
        format!("{text}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_types() {
        assert_eq!(coords_type(1), "int");
        assert_eq!(coords_type(4), "ivec4");
        assert_eq!(coords_type(6), "coords6_t");
    }

    #[test]
    fn test_coord_component() {
        assert_eq!(coord_component("coords", 1, 0), "coords");
        assert_eq!(coord_component("coords", 3, 2), "coords.z");
        assert_eq!(coord_component("c", 5, 4), "c.d4");
    }

    #[test]
    fn test_coords_struct_only_high_ranks() {
        assert!(coords_struct_decl(4).is_none());
        let decl = coords_struct_decl(5).unwrap();
        assert!(decl.contains("struct coords5_t"));
        assert!(decl.contains("int d4;"));
        assert!(!decl.contains("int d5;"));
    }

    #[test]
    fn test_dialect_preambles_differ() {
        let legacy = preamble(&CapabilityProfile::baked(Dialect::Es100));
        let modern = preamble(&CapabilityProfile::baked(Dialect::Es300));
        assert!(legacy.contains("varying"));
        assert!(!legacy.contains("#version"));
        assert!(modern.contains("#version 300 es"));
        assert!(modern.contains("out vec4 frag_color;"));
    }

    #[test]
    fn test_float_literal_forms() {
        assert_eq!(float_literal(1.0), "1.0");
        assert_eq!(float_literal(0.5), "0.5");
    }
}
