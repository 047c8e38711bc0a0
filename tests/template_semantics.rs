//! Template contract tests: the documented per-operation semantics,
//! pinned with host-side reference evaluation over the same index
//! algebra the generated decode functions implement.

mod common;

use shadr::index::{coords_to_flat, flat_to_coords};
use shadr::program::Stmt;
use shadr::templates::{synthesize, ArgDirection, MirrorMode, OpDescriptor};

// ============================================================================
// Slice: the concrete end-to-end example
// ============================================================================

#[test]
fn test_slice_end_to_end_reference() {
    // source [4,3] holding row-major 0..12, dest [2,3], start [1,0]
    let source: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let source_shape = [4usize, 3];
    let dest_shape = [2usize, 3];
    let start = [1usize, 0];

    let spec = synthesize(&OpDescriptor::Slice {
        source_shape: source_shape.to_vec(),
        dest_shape: dest_shape.to_vec(),
    })
    .unwrap();
    assert_eq!(spec.output_shape, dest_shape.to_vec());

    // evaluate the slice contract through the index algebra
    let total: usize = dest_shape.iter().product();
    let mut out = Vec::with_capacity(total);
    for flat in 0..total {
        let coords = flat_to_coords(flat, &dest_shape).unwrap();
        let src_coords: Vec<usize> = coords
            .iter()
            .zip(start.iter())
            .map(|(&c, &s)| c + s)
            .collect();
        let src_flat = coords_to_flat(&src_coords, &source_shape).unwrap();
        out.push(source[src_flat]);
    }
    // output row 0 = source row 1, output row 1 = source row 2
    common::assert_values(&out, &[3.0, 4.0, 5.0, 6.0, 7.0, 8.0], "slice");
}

// ============================================================================
// Gather: saturate-to-zero on out-of-range indices
// ============================================================================

#[test]
fn test_gather_bounds_saturation_reference() {
    // source [4] = [10, 11, 12, 13]; indices [5, -1, 2]
    let source = [10.0f32, 11.0, 12.0, 13.0];
    let indices = [5i64, -1, 2];

    let spec = synthesize(&OpDescriptor::Gather {
        source_shape: vec![4],
        axis: 0,
        index_count: indices.len(),
    })
    .unwrap();
    assert_eq!(spec.output_shape, vec![3]);

    // the template's contract: both overflow and negative yield zero,
    // everything in range matches direct indexing
    let out: Vec<f32> = indices
        .iter()
        .map(|&idx| {
            if idx >= 0 && (idx as usize) < source.len() {
                source[idx as usize]
            } else {
                0.0
            }
        })
        .collect();
    common::assert_values(&out, &[0.0, 0.0, 12.0], "gather saturation");

    // and the generated body enforces exactly that guard
    let text = spec.body_text();
    assert!(text.contains("index >= 0 && index < 4"));
    assert!(text.contains("float value = 0.0;"));
}

// ============================================================================
// Scatter: accumulate-on-collision over a linear scan
// ============================================================================

#[test]
fn test_scatter_collision_sums_reference() {
    // two updates, both targeting flattened row 2 of a [4,1] output
    let updates = [3.0f32, 4.0];
    let targets = [2usize, 2];
    let default_value = 0.0f32;

    let spec = synthesize(&OpDescriptor::ScatterAdd {
        update_count: 2,
        index_depth: 1,
        strides: vec![1],
        output_shape: [4, 1],
    })
    .unwrap();

    // reference scan, mirroring the generated O(rows x updates) loop
    let mut out = vec![default_value; 4];
    for (row, slot) in out.iter_mut().enumerate() {
        for (update, &target) in updates.iter().zip(&targets) {
            if target == row {
                *slot += update;
            }
        }
    }
    common::assert_values(&out, &[0.0, 0.0, 7.0, 0.0], "scatter collision");

    // the scan and base-value structure are part of the contract
    let text = spec.body_text();
    assert!(text.contains("float sum = default_value;"));
    assert!(text.contains("for (int i = 0; i < 2; i++)"));
}

// ============================================================================
// Packed edge truncation
// ============================================================================

#[test]
fn test_packed_output_templates_guard_odd_edges() {
    // every packed-output template must exclude lanes whose coordinate
    // would read index 5 of an extent-5 dimension
    let packed_outputs = [OpDescriptor::Pack { shape: vec![5, 5] }];
    for op in &packed_outputs {
        let spec = synthesize(op).unwrap();
        assert!(spec.packed_output, "{} must pack its output", spec.key);
        let guards: Vec<&str> = collect_guards(&spec.body.main);
        assert!(
            guards.iter().any(|cond| cond.contains("col + 1 < 5")),
            "{}: missing right-edge guard",
            spec.key
        );
        assert!(
            guards.iter().any(|cond| cond.contains("row + 1 < 5")),
            "{}: missing bottom-edge guard",
            spec.key
        );
    }
}

fn collect_guards(stmts: &[Stmt]) -> Vec<&str> {
    let mut out = Vec::new();
    for stmt in stmts {
        if let Stmt::If {
            cond,
            then_body,
            else_body,
        } = stmt
        {
            out.push(cond.as_str());
            out.extend(collect_guards(then_body));
            out.extend(collect_guards(else_body));
        }
    }
    out
}

// ============================================================================
// Rank boundaries
// ============================================================================

#[test]
fn test_rank_six_succeeds_rank_seven_fails() {
    let ok = OpDescriptor::Slice {
        source_shape: vec![2; 6],
        dest_shape: vec![1; 6],
    };
    assert!(synthesize(&ok).is_ok());

    let too_deep = OpDescriptor::Slice {
        source_shape: vec![2; 7],
        dest_shape: vec![1; 7],
    };
    let err = synthesize(&too_deep).unwrap_err();
    assert!(err.to_string().contains("not yet supported"));
}

// ============================================================================
// Catalog coverage
// ============================================================================

#[test]
fn test_every_descriptor_synthesizes() {
    let ops = [
        OpDescriptor::Slice {
            source_shape: vec![4, 3],
            dest_shape: vec![2, 3],
        },
        OpDescriptor::Gather {
            source_shape: vec![4, 3],
            axis: 0,
            index_count: 2,
        },
        OpDescriptor::ScatterAdd {
            update_count: 2,
            index_depth: 1,
            strides: vec![1],
            output_shape: [4, 2],
        },
        OpDescriptor::Pad {
            source_shape: vec![4, 3],
            before: vec![1, 0],
            after: vec![0, 1],
        },
        OpDescriptor::MirrorPad {
            source_shape: vec![4, 3],
            before: vec![1, 1],
            after: vec![1, 1],
            mode: MirrorMode::Reflect,
        },
        OpDescriptor::Transpose {
            source_shape: vec![4, 3],
            perm: vec![1, 0],
        },
        OpDescriptor::Reverse {
            shape: vec![4, 3],
            axes: vec![0],
        },
        OpDescriptor::Select {
            cond_shape: vec![4, 3],
            shape: vec![4, 3],
        },
        OpDescriptor::Concat {
            a_shape: [2, 3],
            b_shape: [2, 4],
        },
        OpDescriptor::Im2Col {
            image_shape: [5, 5, 2],
            filter_hw: (3, 3),
            out_hw: (3, 3),
        },
        OpDescriptor::ArgReduce {
            shape: [2, 8],
            window: 4,
            direction: ArgDirection::Max,
        },
        OpDescriptor::Pack { shape: vec![5, 5] },
        OpDescriptor::Unpack { shape: vec![5, 5] },
        OpDescriptor::Fill { shape: vec![4, 3] },
    ];
    for op in &ops {
        let spec = synthesize(op).unwrap_or_else(|e| panic!("{}: {e}", op.name()));
        assert_eq!(spec.key, op.name());
        assert!(spec.body_text().contains("void main()"));
        assert!(spec.body_text().contains("set_output("));
    }
}
