//! Fill template
//!
//! Writes one runtime-supplied constant to every output position; the
//! value is a parameter so one compiled program per shape class serves
//! all constants.

use crate::error::Result;
use crate::program::{KernelIr, ParamDecl, ParamType, ProgramSpec, Stmt};
use crate::shape::check_rank;

/// Instantiate the fill template.
pub fn program(shape: &[usize]) -> Result<ProgramSpec> {
    check_rank(shape, "fill")?;
    Ok(ProgramSpec {
        key: "fill",
        operand_names: vec![],
        output_shape: shape.to_vec(),
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![ParamDecl::new("value", ParamType::Float)],
        body: KernelIr::with_main(vec![Stmt::line("set_output(value);")]),
    })
}
