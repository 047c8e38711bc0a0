//! Transpose template
//!
//! Pure coordinate permutation: output dimension `i` reads source
//! dimension `perm[i]`.

use crate::codegen::{coord_component, coords_decl};
use crate::error::{Error, Result};
use crate::program::{KernelIr, ProgramSpec, Stmt};
use crate::shape::check_rank;

/// Instantiate the transpose template.
pub fn program(source_shape: &[usize], perm: &[usize]) -> Result<ProgramSpec> {
    check_rank(source_shape, "transpose")?;
    let rank = source_shape.len();
    if perm.len() != rank || rank == 0 {
        return Err(Error::InvalidArgument {
            arg: "perm",
            reason: format!("permutation length {} does not match rank {rank}", perm.len()),
        });
    }
    let mut seen = vec![false; rank];
    for &p in perm {
        if p >= rank || seen[p] {
            return Err(Error::InvalidArgument {
                arg: "perm",
                reason: format!("{perm:?} is not a permutation of 0..{rank}"),
            });
        }
        seen[p] = true;
    }

    let output_shape: Vec<usize> = perm.iter().map(|&p| source_shape[p]).collect();

    // source dimension j is supplied by the output coordinate at the
    // position where perm names j
    let args: Vec<String> = (0..rank)
        .map(|j| {
            let i = perm.iter().position(|&p| p == j).unwrap_or_default();
            coord_component("coords", rank, i)
        })
        .collect();

    let body = KernelIr::with_main(vec![
        Stmt::line(coords_decl(rank)),
        Stmt::line(format!("set_output(get_source({}));", args.join(", "))),
    ]);

    Ok(ProgramSpec {
        key: "transpose",
        operand_names: vec!["source"],
        output_shape,
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![],
        body,
    })
}
