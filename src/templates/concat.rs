//! Concat template
//!
//! Two-operand concatenation along the second axis of a 2-D view.
//! Higher-rank concatenation is expressed by the dispatch layer as a
//! reshape around this kernel, which keeps the column test a single
//! baked comparison.

use crate::error::{Error, Result};
use crate::program::{KernelIr, ProgramSpec, Stmt};

/// Instantiate the concat template.
pub fn program(a_shape: [usize; 2], b_shape: [usize; 2]) -> Result<ProgramSpec> {
    if a_shape[0] != b_shape[0] {
        return Err(Error::InvalidArgument {
            arg: "b_shape",
            reason: format!(
                "concat rows must match: {} vs {}",
                a_shape[0], b_shape[0]
            ),
        });
    }

    let split = a_shape[1];
    let output_shape = vec![a_shape[0], a_shape[1] + b_shape[1]];

    let body = KernelIr::with_main(vec![
        Stmt::line("ivec2 coords = get_output_coords();"),
        Stmt::line("float value;"),
        Stmt::If {
            cond: format!("coords.y < {split}"),
            then_body: vec![Stmt::line("value = get_a(coords.x, coords.y);")],
            else_body: vec![Stmt::line(format!(
                "value = get_b(coords.x, coords.y - {split});"
            ))],
        },
        Stmt::line("set_output(value);"),
    ]);

    Ok(ProgramSpec {
        key: "concat",
        operand_names: vec!["a", "b"],
        output_shape,
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![],
        body,
    })
}
