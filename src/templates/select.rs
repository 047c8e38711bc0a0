//! Select template
//!
//! Elementwise conditional: positions where the condition operand reads
//! >= 1 take the first branch, all others the second. The condition may
//! be lower-rank than the output; it is read through its broadcast-aware
//! accessor.

use crate::error::{Error, Result};
use crate::program::{KernelIr, ProgramSpec, Stmt};
use crate::shape::check_rank;

/// Instantiate the select template.
pub fn program(cond_shape: &[usize], shape: &[usize]) -> Result<ProgramSpec> {
    check_rank(cond_shape, "select")?;
    check_rank(shape, "select")?;
    if cond_shape.len() > shape.len() {
        return Err(Error::InvalidArgument {
            arg: "cond_shape",
            reason: format!(
                "condition rank {} exceeds output rank {}",
                cond_shape.len(),
                shape.len()
            ),
        });
    }

    let body = KernelIr::with_main(vec![
        Stmt::line("float flag = get_cond_at_out_coords();"),
        Stmt::line("float value;"),
        Stmt::If {
            cond: "flag >= 1.0".to_string(),
            then_body: vec![Stmt::line("value = get_a_at_out_coords();")],
            else_body: vec![Stmt::line("value = get_b_at_out_coords();")],
        },
        Stmt::line("set_output(value);"),
    ]);

    Ok(ProgramSpec {
        key: "select",
        operand_names: vec!["cond", "a", "b"],
        output_shape: shape.to_vec(),
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![],
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_through_broadcast_accessors() {
        let spec = program(&[4], &[4, 3]).unwrap();
        let text = spec.body_text();
        assert!(text.contains("get_cond_at_out_coords()"));
        assert!(text.contains("get_a_at_out_coords()"));
        assert!(text.contains("get_b_at_out_coords()"));
    }

    #[test]
    fn test_condition_rank_bound() {
        assert!(program(&[4, 3, 2], &[4, 3]).is_err());
    }
}
