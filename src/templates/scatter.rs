//! Scatter-add template
//!
//! For each output coordinate, linearly scans all updates, recomputes
//! each update's flattened target row from its index tuple and a stride
//! vector, and accumulates the update's value when the target matches.
//! Duplicate targets sum; positions no update touches keep the
//! `default_value` parameter.
//!
//! This is an O(output_size x update_count) scan by construction.
//! Whether that trade-off (correctness and collision-order independence
//! over throughput) should be revisited is an open question; do not
//! replace the scan with an algorithm that changes collision semantics.

use crate::error::{Error, Result};
use crate::program::{KernelIr, ParamDecl, ParamType, ProgramSpec, Stmt};

/// Instantiate the scatter-add template.
///
/// Operands: `updates` of shape `[update_count, slice_size]` and
/// `indices` of shape `[update_count, index_depth]`. The output is 2-D
/// `[target rows, slice_size]`.
pub fn program(
    update_count: usize,
    index_depth: usize,
    strides: &[usize],
    output_shape: [usize; 2],
) -> Result<ProgramSpec> {
    if strides.len() != index_depth {
        return Err(Error::InvalidArgument {
            arg: "strides",
            reason: format!(
                "expected one stride per index component ({index_depth}), got {}",
                strides.len()
            ),
        });
    }
    if update_count == 0 {
        return Err(Error::InvalidArgument {
            arg: "update_count",
            reason: "scatter with zero updates has nothing to scan".to_string(),
        });
    }

    let mut loop_body = vec![Stmt::line("int target = 0;")];
    for (k, stride) in strides.iter().enumerate() {
        if *stride == 1 {
            loop_body.push(Stmt::line(format!(
                "target += int(get_indices(i, {k}));"
            )));
        } else {
            loop_body.push(Stmt::line(format!(
                "target += int(get_indices(i, {k})) * {stride};"
            )));
        }
    }
    loop_body.push(Stmt::If {
        cond: "target == coords.x".to_string(),
        then_body: vec![Stmt::line("sum += get_updates(i, coords.y);")],
        else_body: vec![],
    });

    let body = KernelIr::with_main(vec![
        Stmt::line("ivec2 coords = get_output_coords();"),
        Stmt::line("float sum = default_value;"),
        Stmt::For {
            init: "int i = 0".to_string(),
            cond: format!("i < {update_count}"),
            step: "i++".to_string(),
            body: loop_body,
        },
        Stmt::line("set_output(sum);"),
    ]);

    Ok(ProgramSpec {
        key: "scatter_add",
        operand_names: vec!["updates", "indices"],
        output_shape: output_shape.to_vec(),
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![ParamDecl::new("default_value", ParamType::Float)],
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_accumulates_on_collision() {
        let spec = program(3, 1, &[1], [4, 2]).unwrap();
        let text = spec.body_text();
        // base is the default value, matches add on top of it
        assert!(text.contains("float sum = default_value;"));
        assert!(text.contains("sum += get_updates(i, coords.y);"));
        assert!(text.contains("for (int i = 0; i < 3; i++)"));
    }

    #[test]
    fn test_strides_flatten_index_tuple() {
        let spec = program(2, 2, &[5, 1], [10, 3]).unwrap();
        let text = spec.body_text();
        assert!(text.contains("target += int(get_indices(i, 0)) * 5;"));
        assert!(text.contains("target += int(get_indices(i, 1));"));
    }

    #[test]
    fn test_stride_count_must_match_depth() {
        assert!(program(2, 2, &[1], [10, 3]).is_err());
    }

    #[test]
    fn test_default_value_declared() {
        let spec = program(1, 1, &[1], [2, 2]).unwrap();
        assert_eq!(
            spec.custom_params,
            vec![ParamDecl::new("default_value", ParamType::Float)]
        );
    }
}
