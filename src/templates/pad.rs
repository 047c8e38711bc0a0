//! Constant-pad template
//!
//! Output coordinates inside the source window read through to the
//! source; everything else takes the `pad_value` parameter, so one
//! compiled program serves every fill constant.

use crate::codegen::{coord_component, coords_decl};
use crate::error::{Error, Result};
use crate::program::{KernelIr, ParamDecl, ParamType, ProgramSpec, Stmt};
use crate::shape::check_rank;

/// Instantiate the pad template. Pad extents are baked; the fill value
/// is a runtime parameter.
pub fn program(source_shape: &[usize], before: &[usize], after: &[usize]) -> Result<ProgramSpec> {
    check_rank(source_shape, "pad")?;
    let rank = source_shape.len();
    if before.len() != rank || after.len() != rank || rank == 0 {
        return Err(Error::InvalidArgument {
            arg: "before",
            reason: format!(
                "pad extents must match a non-zero rank {rank}, got {}/{}",
                before.len(),
                after.len()
            ),
        });
    }

    let output_shape: Vec<usize> = source_shape
        .iter()
        .zip(before.iter().zip(after))
        .map(|(&dim, (&lo, &hi))| dim + lo + hi)
        .collect();

    let mut main = vec![Stmt::line(coords_decl(rank))];
    let mut bounds = Vec::new();
    for i in 0..rank {
        let coord = coord_component("coords", rank, i);
        if before[i] == 0 {
            main.push(Stmt::line(format!("int s{i} = {coord};")));
        } else {
            main.push(Stmt::line(format!("int s{i} = {coord} - {};", before[i])));
        }
        bounds.push(format!("s{i} >= 0 && s{i} < {}", source_shape[i]));
    }
    let args: Vec<String> = (0..rank).map(|i| format!("s{i}")).collect();
    main.push(Stmt::line("float value = pad_value;"));
    main.push(Stmt::If {
        cond: bounds.join(" && "),
        then_body: vec![Stmt::line(format!(
            "value = get_source({});",
            args.join(", ")
        ))],
        else_body: vec![],
    });
    main.push(Stmt::line("set_output(value);"));

    Ok(ProgramSpec {
        key: "pad",
        operand_names: vec!["source"],
        output_shape,
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![ParamDecl::new("pad_value", ParamType::Float)],
        body: KernelIr::with_main(main),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_shape_grows_by_pads() {
        let spec = program(&[4, 3], &[1, 0], &[2, 1]).unwrap();
        assert_eq!(spec.output_shape, vec![7, 4]);
    }

    #[test]
    fn test_window_guard_and_fill() {
        let spec = program(&[4, 3], &[1, 0], &[2, 1]).unwrap();
        let text = spec.body_text();
        assert!(text.contains("int s0 = coords.x - 1;"));
        // zero before-pad skips the subtraction
        assert!(text.contains("int s1 = coords.y;"));
        assert!(text.contains("if (s0 >= 0 && s0 < 4 && s1 >= 0 && s1 < 3)"));
        assert!(text.contains("float value = pad_value;"));
    }

    #[test]
    fn test_extent_length_mismatch() {
        assert!(program(&[4, 3], &[1], &[0, 0]).is_err());
    }
}
