//! Im2col template
//!
//! Lowers convolution to matrix multiply by extracting one filter-sized
//! patch per output row. Stride, dilation, and padding arrive as ivec2
//! parameters so a compiled program covers a family of convolutions
//! over the same image geometry; out-of-image taps contribute zero.

use crate::error::{Error, Result};
use crate::program::{KernelIr, ParamDecl, ParamType, ProgramSpec, Stmt};

/// Instantiate the im2col template.
///
/// The image is `(height, width, channels)`; the output is 2-D with one
/// row per output pixel and one column per filter tap
/// (`filter_h * filter_w * channels`).
pub fn program(
    image_shape: [usize; 3],
    filter_hw: (usize, usize),
    out_hw: (usize, usize),
) -> Result<ProgramSpec> {
    let [height, width, channels] = image_shape;
    let (filter_h, filter_w) = filter_hw;
    let (out_h, out_w) = out_hw;
    if filter_h == 0 || filter_w == 0 || out_h == 0 || out_w == 0 {
        return Err(Error::InvalidArgument {
            arg: "filter_hw",
            reason: "filter and output extents must be non-zero".to_string(),
        });
    }

    let output_shape = vec![out_h * out_w, filter_h * filter_w * channels];

    let body = KernelIr::with_main(vec![
        Stmt::line("ivec2 coords = get_output_coords();"),
        Stmt::line(format!("int out_x = imod(coords.x, {out_w});")),
        Stmt::line(format!("int out_y = coords.x / {out_w};")),
        Stmt::line(format!("int ch = imod(coords.y, {channels});")),
        Stmt::line(format!(
            "int tap_x = imod(coords.y / {channels}, {filter_w});"
        )),
        Stmt::line(format!("int tap_y = coords.y / {};", channels * filter_w)),
        Stmt::line("int x = out_x * stride.x + tap_x * dilation.x - pad.x;"),
        Stmt::line("int y = out_y * stride.y + tap_y * dilation.y - pad.y;"),
        Stmt::line("float value = 0.0;"),
        Stmt::If {
            cond: format!("x >= 0 && x < {width} && y >= 0 && y < {height}"),
            then_body: vec![Stmt::line("value = get_image(y, x, ch);")],
            else_body: vec![],
        },
        Stmt::line("set_output(value);"),
    ]);

    Ok(ProgramSpec {
        key: "im2col",
        operand_names: vec!["image"],
        output_shape,
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![
            ParamDecl::new("stride", ParamType::IVec2),
            ParamDecl::new("dilation", ParamType::IVec2),
            ParamDecl::new("pad", ParamType::IVec2),
        ],
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_geometry() {
        let spec = program([5, 5, 2], (3, 3), (3, 3)).unwrap();
        assert_eq!(spec.output_shape, vec![9, 18]);
        let text = spec.body_text();
        assert!(text.contains("int ch = imod(coords.y, 2);"));
        assert!(text.contains("int tap_y = coords.y / 6;"));
        assert!(text.contains("if (x >= 0 && x < 5 && y >= 0 && y < 5)"));
    }

    #[test]
    fn test_conv_params_are_ivec2() {
        let spec = program([5, 5, 1], (2, 2), (4, 4)).unwrap();
        let names: Vec<_> = spec.custom_params.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["stride", "dilation", "pad"]);
        assert!(spec
            .custom_params
            .iter()
            .all(|p| p.ty == ParamType::IVec2));
    }

    #[test]
    fn test_zero_filter_rejected() {
        assert!(program([5, 5, 1], (0, 2), (4, 4)).is_err());
    }
}
