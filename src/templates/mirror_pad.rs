//! Mirror-pad template
//!
//! Out-of-window coordinates fold back into the source instead of
//! taking a constant. Reflect mode mirrors about the edge element;
//! symmetric mode duplicates it.

use crate::codegen::{coord_component, coords_decl};
use crate::error::{Error, Result};
use crate::program::{KernelIr, ProgramSpec, Stmt};
use crate::shape::check_rank;

/// Edge handling for mirrored padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorMode {
    /// Mirror about the edge element; the edge itself is not repeated
    Reflect,
    /// Mirror including the edge element
    Symmetric,
}

impl MirrorMode {
    fn offset(&self) -> usize {
        match self {
            MirrorMode::Reflect => 1,
            MirrorMode::Symmetric => 0,
        }
    }
}

/// Instantiate the mirror-pad template.
pub fn program(
    source_shape: &[usize],
    before: &[usize],
    after: &[usize],
    mode: MirrorMode,
) -> Result<ProgramSpec> {
    check_rank(source_shape, "mirror_pad")?;
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
    let offset = mode.offset();
    for i in 0..rank {
        let limit = source_shape[i].saturating_sub(offset);
        if before[i] > limit || after[i] > limit {
            return Err(Error::InvalidArgument {
                arg: "before",
                reason: format!(
                    "mirror pad of {}/{} exceeds dimension {i} extent {} in {mode:?} mode",
                    before[i], after[i], source_shape[i]
                ),
            });
        }
    }

    let output_shape: Vec<usize> = source_shape
        .iter()
        .zip(before.iter().zip(after))
        .map(|(&dim, (&lo, &hi))| dim + lo + hi)
        .collect();

    let mut main = vec![Stmt::line(coords_decl(rank))];
    for i in 0..rank {
        let coord = coord_component("coords", rank, i);
        let dim = source_shape[i];
        if before[i] == 0 {
            main.push(Stmt::line(format!("int s{i} = {coord};")));
        } else {
            main.push(Stmt::line(format!("int s{i} = {coord} - {};", before[i])));
        }
        main.push(Stmt::If {
            cond: format!("s{i} < 0"),
            then_body: vec![Stmt::line(fold_low(i, offset))],
            else_body: vec![],
        });
        main.push(Stmt::If {
            cond: format!("s{i} >= {dim}"),
            then_body: vec![Stmt::line(fold_high(i, dim, offset))],
            else_body: vec![],
        });
    }
    let args: Vec<String> = (0..rank).map(|i| format!("s{i}")).collect();
    main.push(Stmt::line(format!(
        "set_output(get_source({}));",
        args.join(", ")
    )));

    Ok(ProgramSpec {
        key: "mirror_pad",
        operand_names: vec!["source"],
        output_shape,
        packed_inputs: false,
        packed_output: false,
        custom_params: vec![],
        body: KernelIr::with_main(main),
    })
}

fn fold_low(i: usize, offset: usize) -> String {
    match offset {
        0 => format!("s{i} = -s{i} - 1;"),
        _ => format!("s{i} = -s{i};"),
    }
}

fn fold_high(i: usize, dim: usize, offset: usize) -> String {
    // symmetric lands on 2*dim - s - 1, reflect one element further in
    format!("s{i} = {} - s{i};", 2 * dim - 1 - offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_folds() {
        let spec = program(&[5], &[2], &[2], MirrorMode::Reflect).unwrap();
        assert_eq!(spec.output_shape, vec![9]);
        let text = spec.body_text();
        assert!(text.contains("s0 = -s0;"));
        assert!(text.contains("s0 = 8 - s0;"));
    }

    #[test]
    fn test_symmetric_folds() {
        let spec = program(&[5], &[2], &[2], MirrorMode::Symmetric).unwrap();
        let text = spec.body_text();
        assert!(text.contains("s0 = -s0 - 1;"));
        assert!(text.contains("s0 = 9 - s0;"));
    }

    #[test]
    fn test_host_side_fold_semantics() {
        // mirror the generated arithmetic on the host to pin semantics
        let fold = |mut s: i64, dim: i64, offset: i64| -> i64 {
            if s < 0 {
                s = if offset == 0 { -s - 1 } else { -s };
            }
            if s >= dim {
                s = 2 * dim - 1 - offset - s;
            }
            s
        };
        // reflect over extent 5: -1 -> 1, -2 -> 2, 5 -> 3, 6 -> 2
        assert_eq!(fold(-1, 5, 1), 1);
        assert_eq!(fold(-2, 5, 1), 2);
        assert_eq!(fold(5, 5, 1), 3);
        assert_eq!(fold(6, 5, 1), 2);
        // symmetric over extent 5: -1 -> 0, 5 -> 4
        assert_eq!(fold(-1, 5, 0), 0);
        assert_eq!(fold(5, 5, 0), 4);
    }

    #[test]
    fn test_pad_wider_than_source_rejected() {
        assert!(program(&[3], &[3], &[0], MirrorMode::Reflect).is_err());
        assert!(program(&[3], &[3], &[0], MirrorMode::Symmetric).is_ok());
    }
}
