//! Gather template
//!
//! Reads an index array and, for each output coordinate, substitutes
//! the gathered index at the chosen axis. An index outside
//! `[0, source_shape[axis])` never errors at dispatch time: it silently
//! contributes a zero. This saturate-to-zero policy is part of the
//! template's contract, distinguishing data-dependent edge cases from
//! malformed programs.

use crate::codegen::{coord_component, coords_decl};
use crate::error::{Error, Result};
use crate::program::{KernelIr, ProgramSpec, Stmt};
use crate::shape::check_rank;

/// Instantiate the gather template.
///
/// The output shape is the source shape with the extent at `axis`
/// replaced by `index_count`.
pub fn program(source_shape: &[usize], axis: usize, index_count: usize) -> Result<ProgramSpec> {
    check_rank(source_shape, "gather")?;
    let rank = source_shape.len();
    if axis >= rank {
        return Err(Error::InvalidArgument {
            arg: "axis",
            reason: format!("axis {axis} out of range for rank {rank}"),
        });
    }

    let mut output_shape = source_shape.to_vec();
    output_shape[axis] = index_count;
    let extent = source_shape[axis];

    let source_args: Vec<String> = (0..rank)
        .map(|i| {
            if i == axis {
                "index".to_string()
            } else {
                coord_component("coords", rank, i)
            }
        })
        .collect();

    let body = KernelIr::with_main(vec![
        Stmt::line(coords_decl(rank)),
        Stmt::line(format!(
            "int index = int(get_indices({}));",
            coord_component("coords", rank, axis)
        )),
        Stmt::line("float value = 0.0;"),
        Stmt::If {
            cond: format!("index >= 0 && index < {extent}"),
            then_body: vec![Stmt::line(format!(
                "value = get_source({});",
                source_args.join(", ")
            ))],
            else_body: vec![],
        },
        Stmt::line("set_output(value);"),
    ]);

    Ok(ProgramSpec {
        key: "gather",
        operand_names: vec!["source", "indices"],
        output_shape,
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![],
        body,
    })
}
