//! Windowed argmin/argmax template
//!
//! Reduces the trailing dimension in fixed windows, emitting the
//! absolute index of the best element in each window. NaN candidates
//! never win, so a window with any finite element reports a real index.

use crate::error::{Error, Result};
use crate::program::{KernelIr, ProgramSpec, Stmt};

/// Reduction direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgDirection {
    /// Index of the smallest element
    Min,
    /// Index of the largest element
    Max,
}

/// Instantiate the windowed arg-reduction template.
///
/// Input is `(batch, length)`; output is `(batch, ceil(length/window))`.
pub fn program(shape: [usize; 2], window: usize, direction: ArgDirection) -> Result<ProgramSpec> {
    let [batch, length] = shape;
    if window == 0 || window > length {
        return Err(Error::InvalidArgument {
            arg: "window",
            reason: format!("window {window} invalid for length {length}"),
        });
    }

    let output_shape = vec![batch, length.div_ceil(window)];
    let cmp = match direction {
        ArgDirection::Min => "<",
        ArgDirection::Max => ">",
    };

    let body = KernelIr::with_main(vec![
        Stmt::line("ivec2 coords = get_output_coords();"),
        Stmt::line(format!("int base = coords.y * {window};")),
        Stmt::line("int best = base;"),
        Stmt::line("float best_value = get_source(coords.x, base);"),
        Stmt::For {
            init: "int i = 1".to_string(),
            cond: format!("i < {window}"),
            step: "i++".to_string(),
            body: vec![
                Stmt::line("int idx = base + i;"),
                Stmt::If {
                    cond: format!("idx < {length}"),
                    then_body: vec![
                        Stmt::line("float candidate = get_source(coords.x, idx);"),
                        Stmt::If {
                            cond: format!(
                                "!isnan(candidate) && (isnan(best_value) || candidate {cmp} best_value)"
                            ),
                            then_body: vec![
                                Stmt::line("best_value = candidate;"),
                                Stmt::line("best = idx;"),
                            ],
                            else_body: vec![],
                        },
                    ],
                    else_body: vec![],
                },
            ],
        },
        Stmt::line("set_output(float(best));"),
    ]);

    Ok(ProgramSpec {
        key: "arg_reduce",
        operand_names: vec!["source"],
        output_shape,
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![],
        body,
    })
}
