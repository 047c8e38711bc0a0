//! Slice template
//!
//! For each output coordinate, adds a runtime-supplied per-dimension
//! start offset to compute the source coordinate. The offsets are a
//! declared integer-array parameter rather than baked literals, so one
//! compiled program serves every slice offset sharing the same shape.

use crate::codegen::{coord_component, coords_decl};
use crate::error::{Error, Result};
use crate::program::{KernelIr, ParamDecl, ParamType, ProgramSpec, Stmt};
use crate::shape::check_rank;

/// Instantiate the slice template.
pub fn program(source_shape: &[usize], dest_shape: &[usize]) -> Result<ProgramSpec> {
    check_rank(source_shape, "slice")?;
    check_rank(dest_shape, "slice")?;
    if source_shape.len() != dest_shape.len() || dest_shape.is_empty() {
        return Err(Error::InvalidArgument {
            arg: "dest_shape",
            reason: format!(
                "slice requires equal non-zero ranks, got {source_shape:?} -> {dest_shape:?}"
            ),
        });
    }
    let rank = dest_shape.len();

    let args: Vec<String> = (0..rank)
        .map(|i| format!("{} + start[{i}]", coord_component("coords", rank, i)))
        .collect();
    let body = KernelIr::with_main(vec![
        Stmt::line(coords_decl(rank)),
        Stmt::line(format!("set_output(get_source({}));", args.join(", "))),
    ]);

    Ok(ProgramSpec {
        key: "slice",
        operand_names: vec!["source"],
        output_shape: dest_shape.to_vec(),
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![ParamDecl::new("start", ParamType::IntArray(rank))],
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_runtime_parameter() {
        let spec = program(&[4, 3], &[2, 3]).unwrap();
        assert_eq!(
            spec.custom_params,
            vec![ParamDecl::new("start", ParamType::IntArray(2))]
        );
        let text = spec.body_text();
        // offsets come from the uniform, never from literals
        assert!(text.contains("get_source(coords.x + start[0], coords.y + start[1])"));
    }

    #[test]
    fn test_rank_boundary() {
        assert!(program(&[2; 6], &[1; 6]).is_ok());
        assert!(matches!(
            program(&[2; 7], &[1; 7]),
            Err(Error::RankNotSupported { rank: 7, .. })
        ));
    }

    #[test]
    fn test_rank_mismatch_rejected() {
        assert!(program(&[4, 3], &[2]).is_err());
    }
}
