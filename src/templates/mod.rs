//! Program template catalog
//!
//! Each template is a pure, stateless function from operand shapes and
//! operation parameters to a [`ProgramSpec`]. The surrounding kernel
//! dispatch layer names an operation through [`OpDescriptor`] and calls
//! [`synthesize`]; the descriptor variant is the template identity used
//! in cache keys.

pub mod arg_reduce;
pub mod concat;
pub mod fill;
pub mod gather;
pub mod im2col;
pub mod mirror_pad;
pub mod packing;
pub mod pad;
pub mod reverse;
pub mod scatter;
pub mod select;
pub mod slice;
pub mod transpose;

pub use arg_reduce::ArgDirection;
pub use mirror_pad::MirrorMode;

use crate::error::Result;
use crate::program::ProgramSpec;

/// A named operation plus everything needed to instantiate its template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpDescriptor {
    /// Windowed slice with a runtime-settable per-dimension start offset
    Slice {
        /// Source logical shape
        source_shape: Vec<usize>,
        /// Output logical shape
        dest_shape: Vec<usize>,
    },
    /// Index lookup along one axis, saturating out-of-range to zero
    Gather {
        /// Source logical shape
        source_shape: Vec<usize>,
        /// Axis being indexed
        axis: usize,
        /// Number of gathered indices (output extent at `axis`)
        index_count: usize,
    },
    /// Scan-based scatter with accumulate-on-collision semantics
    ScatterAdd {
        /// Number of updates scanned per output position
        update_count: usize,
        /// Length of each update's index tuple
        index_depth: usize,
        /// Stride of each index-tuple component in the flattened target
        strides: Vec<usize>,
        /// 2-D output shape: (target rows, slice size)
        output_shape: [usize; 2],
    },
    /// Constant-fill padding; the fill value is a runtime parameter
    Pad {
        /// Source logical shape
        source_shape: Vec<usize>,
        /// Leading pad per dimension
        before: Vec<usize>,
        /// Trailing pad per dimension
        after: Vec<usize>,
    },
    /// Mirrored padding in reflect or symmetric mode
    MirrorPad {
        /// Source logical shape
        source_shape: Vec<usize>,
        /// Leading pad per dimension
        before: Vec<usize>,
        /// Trailing pad per dimension
        after: Vec<usize>,
        /// Edge handling mode
        mode: MirrorMode,
    },
    /// Dimension permutation
    Transpose {
        /// Source logical shape
        source_shape: Vec<usize>,
        /// `output dim i` reads `source dim perm[i]`
        perm: Vec<usize>,
    },
    /// Reversal along a set of axes
    Reverse {
        /// Logical shape (input and output)
        shape: Vec<usize>,
        /// Axes to reverse
        axes: Vec<usize>,
    },
    /// Elementwise conditional between two operands
    Select {
        /// Condition logical shape
        cond_shape: Vec<usize>,
        /// Output logical shape (shared by both branches)
        shape: Vec<usize>,
    },
    /// Two-operand concatenation along the second axis of a 2-D view
    Concat {
        /// Left operand shape
        a_shape: [usize; 2],
        /// Right operand shape
        b_shape: [usize; 2],
    },
    /// Patch extraction for convolution lowering
    Im2Col {
        /// Image shape: (height, width, channels)
        image_shape: [usize; 3],
        /// Filter extents: (height, width)
        filter_hw: (usize, usize),
        /// Output spatial extents: (height, width)
        out_hw: (usize, usize),
    },
    /// Windowed argmin/argmax along the trailing dimension
    ArgReduce {
        /// Input shape: (batch, length)
        shape: [usize; 2],
        /// Window extent
        window: usize,
        /// Min or max
        direction: ArgDirection,
    },
    /// Unpacked-to-packed storage conversion
    Pack {
        /// Logical shape (rank 1-4)
        shape: Vec<usize>,
    },
    /// Packed-to-unpacked storage conversion
    Unpack {
        /// Logical shape (rank 1-4)
        shape: Vec<usize>,
    },
    /// Constant fill; the value is a runtime parameter
    Fill {
        /// Output logical shape
        shape: Vec<usize>,
    },
}

impl OpDescriptor {
    /// Template identity, part of every cache key.
    pub fn name(&self) -> &'static str {
        match self {
            OpDescriptor::Slice { .. } => "slice",
            OpDescriptor::Gather { .. } => "gather",
            OpDescriptor::ScatterAdd { .. } => "scatter_add",
            OpDescriptor::Pad { .. } => "pad",
            OpDescriptor::MirrorPad { .. } => "mirror_pad",
            OpDescriptor::Transpose { .. } => "transpose",
            OpDescriptor::Reverse { .. } => "reverse",
            OpDescriptor::Select { .. } => "select",
            OpDescriptor::Concat { .. } => "concat",
            OpDescriptor::Im2Col { .. } => "im2col",
            OpDescriptor::ArgReduce { .. } => "arg_reduce",
            OpDescriptor::Pack { .. } => "pack",
            OpDescriptor::Unpack { .. } => "unpack",
            OpDescriptor::Fill { .. } => "fill",
        }
    }
}

/// Instantiate the template for an operation descriptor.
pub fn synthesize(op: &OpDescriptor) -> Result<ProgramSpec> {
    match op {
        OpDescriptor::Slice {
            source_shape,
            dest_shape,
        } => slice::program(source_shape, dest_shape),
        OpDescriptor::Gather {
            source_shape,
            axis,
            index_count,
        } => gather::program(source_shape, *axis, *index_count),
        OpDescriptor::ScatterAdd {
            update_count,
            index_depth,
            strides,
            output_shape,
        } => scatter::program(*update_count, *index_depth, strides, *output_shape),
        OpDescriptor::Pad {
            source_shape,
            before,
            after,
        } => pad::program(source_shape, before, after),
        OpDescriptor::MirrorPad {
            source_shape,
            before,
            after,
            mode,
        } => mirror_pad::program(source_shape, before, after, *mode),
        OpDescriptor::Transpose { source_shape, perm } => transpose::program(source_shape, perm),
        OpDescriptor::Reverse { shape, axes } => reverse::program(shape, axes),
        OpDescriptor::Select { cond_shape, shape } => select::program(cond_shape, shape),
        OpDescriptor::Concat { a_shape, b_shape } => concat::program(*a_shape, *b_shape),
        OpDescriptor::Im2Col {
            image_shape,
            filter_hw,
            out_hw,
        } => im2col::program(*image_shape, *filter_hw, *out_hw),
        OpDescriptor::ArgReduce {
            shape,
            window,
            direction,
        } => arg_reduce::program(*shape, *window, *direction),
        OpDescriptor::Pack { shape } => packing::pack_program(shape),
        OpDescriptor::Unpack { shape } => packing::unpack_program(shape),
        OpDescriptor::Fill { shape } => fill::program(shape),
    }
}
