//! Pack / unpack conversion templates
//!
//! Convert a binding between unpacked (one scalar per texel) and packed
//! (2x2 logical block per texel) storage. Each packed lane is guarded
//! by an explicit bounds check against the next row/column; edge texels
//! of odd extents carry zero in their out-of-range lanes. The guards
//! are a correctness requirement, not just a performance nicety:
//! unguarded reads diverge on real hardware.

use crate::codegen::{coord_component, coords_decl};
use crate::error::{Error, Result};
use crate::program::{KernelIr, ProgramSpec, Stmt};
use crate::shape::check_packed_rank;

/// Instantiate the pack template (unpacked source, packed output).
pub fn pack_program(shape: &[usize]) -> Result<ProgramSpec> {
    check_packed_rank(shape, "pack")?;
    let rank = shape.len();
    if rank == 0 {
        return Err(Error::InvalidArgument {
            arg: "shape",
            reason: "packing a scalar has no effect".to_string(),
        });
    }

    let main = if rank == 1 {
        let extent = shape[0];
        vec![
            Stmt::line(coords_decl(rank)),
            Stmt::line("float l0 = get_source(coords);"),
            Stmt::line("float l1 = 0.0;"),
            Stmt::If {
                cond: format!("coords + 1 < {extent}"),
                then_body: vec![Stmt::line("l1 = get_source(coords + 1);")],
                else_body: vec![],
            },
            Stmt::line("set_output(vec4(l0, l1, 0.0, 0.0));"),
        ]
    } else {
        let rows = shape[rank - 2];
        let cols = shape[rank - 1];
        let lead: Vec<String> = (0..rank - 2)
            .map(|i| coord_component("coords", rank, i))
            .collect();
        let call = |row: &str, col: &str| -> String {
            let mut args = lead.clone();
            args.push(row.to_string());
            args.push(col.to_string());
            format!("get_source({})", args.join(", "))
        };
        vec![
            Stmt::line(coords_decl(rank)),
            Stmt::line(format!(
                "int row = {};",
                coord_component("coords", rank, rank - 2)
            )),
            Stmt::line(format!(
                "int col = {};",
                coord_component("coords", rank, rank - 1)
            )),
            Stmt::line(format!("float l00 = {};", call("row", "col"))),
            Stmt::line("float l01 = 0.0;"),
            Stmt::line("float l10 = 0.0;"),
            Stmt::line("float l11 = 0.0;"),
            Stmt::If {
                cond: format!("col + 1 < {cols}"),
                then_body: vec![Stmt::line(format!("l01 = {};", call("row", "col + 1")))],
                else_body: vec![],
            },
            Stmt::If {
                cond: format!("row + 1 < {rows}"),
                then_body: vec![Stmt::line(format!("l10 = {};", call("row + 1", "col")))],
                else_body: vec![],
            },
            Stmt::If {
                cond: format!("row + 1 < {rows} && col + 1 < {cols}"),
                then_body: vec![Stmt::line(format!(
                    "l11 = {};",
                    call("row + 1", "col + 1")
                ))],
                else_body: vec![],
            },
            Stmt::line("set_output(vec4(l00, l01, l10, l11));"),
        ]
    };

    Ok(ProgramSpec {
        key: "pack",
        operand_names: vec!["source"],
        output_shape: shape.to_vec(),
        packed_inputs: false,
        packed_output: true,
        custom_params: vec![],
        body: KernelIr::with_main(main),
    })
}

/// Instantiate the unpack template (packed source, unpacked output).
pub fn unpack_program(shape: &[usize]) -> Result<ProgramSpec> {
    check_packed_rank(shape, "unpack")?;
    let rank = shape.len();
    if rank == 0 {
        return Err(Error::InvalidArgument {
            arg: "shape",
            reason: "unpacking a scalar has no effect".to_string(),
        });
    }

    let args: Vec<String> = (0..rank)
        .map(|i| coord_component("coords", rank, i))
        .collect();
    let (row_expr, col_expr) = if rank == 1 {
        ("0".to_string(), coord_component("coords", rank, 0))
    } else {
        (
            coord_component("coords", rank, rank - 2),
            coord_component("coords", rank, rank - 1),
        )
    };

    let body = KernelIr::with_main(vec![
        Stmt::line(coords_decl(rank)),
        Stmt::line(format!("vec4 texel = get_source({});", args.join(", "))),
        Stmt::line(format!(
            "set_output(get_channel(texel, {row_expr}, {col_expr}));"
        )),
    ]);

    Ok(ProgramSpec {
        key: "unpack",
        operand_names: vec!["source"],
        output_shape: shape.to_vec(),
        packed_inputs: true,
        packed_output: false,
        custom_params: vec![],
        body,
    })
}
