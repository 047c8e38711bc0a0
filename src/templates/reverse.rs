//! Reverse template
//!
//! Flips the coordinate along each named axis: `c -> extent - 1 - c`.

use crate::codegen::{coord_component, coords_decl};
use crate::error::{Error, Result};
use crate::program::{KernelIr, ProgramSpec, Stmt};
use crate::shape::check_rank;

/// Instantiate the reverse template.
pub fn program(shape: &[usize], axes: &[usize]) -> Result<ProgramSpec> {
    check_rank(shape, "reverse")?;
    let rank = shape.len();
    if rank == 0 {
        return Err(Error::InvalidArgument {
            arg: "shape",
            reason: "reverse of a scalar is meaningless".to_string(),
        });
    }
    for &axis in axes {
        if axis >= rank {
            return Err(Error::InvalidArgument {
                arg: "axes",
                reason: format!("axis {axis} out of range for rank {rank}"),
            });
        }
    }

    let args: Vec<String> = (0..rank)
        .map(|i| {
            let coord = coord_component("coords", rank, i);
            if axes.contains(&i) {
                format!("{} - {coord}", shape[i] - 1)
            } else {
                coord
            }
        })
        .collect();

    let body = KernelIr::with_main(vec![
        Stmt::line(coords_decl(rank)),
        Stmt::line(format!("set_output(get_source({}));", args.join(", "))),
    ]);

    Ok(ProgramSpec {
        key: "reverse",
        operand_names: vec!["source"],
        output_shape: shape.to_vec(),
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![],
        body,
    })
}
