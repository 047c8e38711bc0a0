//! Operand bindings and surface shapes
//!
//! A logical N-D array is linearized onto a 2-D addressable surface (the
//! texture-like storage grid). Packing is a property of a *binding* — the
//! same logical array may be bound packed in one dispatch and unpacked in
//! another — never of the array itself.

use crate::error::{Error, Result};
use crate::shape::{check_packed_rank, check_rank, num_elements};

/// Storage convention for one operand binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Packing {
    /// One scalar element per addressable texel
    Unpacked,
    /// A 2x2 block of the two innermost logical dimensions per 4-channel
    /// texel, with edge padding when an extent is odd
    Packed,
}

/// Physical shape of the 2-D addressable surface backing an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceShape {
    /// Number of texel rows
    pub rows: usize,
    /// Number of texel columns
    pub cols: usize,
}

impl SurfaceShape {
    /// Construct a surface shape.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total addressable units.
    pub fn unit_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// Canonical dense (unpacked) surface for a logical shape: all leading
/// dimensions collapse onto rows, the innermost dimension becomes columns.
pub fn dense_surface(shape: &[usize]) -> Result<SurfaceShape> {
    check_rank(shape, "dense surface")?;
    match shape.len() {
        0 => Ok(SurfaceShape::new(1, 1)),
        1 => Ok(SurfaceShape::new(1, shape[0].max(1))),
        r => Ok(SurfaceShape::new(
            num_elements(&shape[..r - 1]).max(1),
            shape[r - 1].max(1),
        )),
    }
}

/// Canonical packed surface: the two innermost dimensions are ceil-halved
/// (each texel covers a 2x2 logical block), outer dimensions multiply onto
/// rows. Packed addressing is only defined up to rank 4.
pub fn packed_surface(shape: &[usize]) -> Result<SurfaceShape> {
    check_packed_rank(shape, "packed surface")?;
    match shape.len() {
        0 => Ok(SurfaceShape::new(1, 1)),
        1 => Ok(SurfaceShape::new(1, shape[0].div_ceil(2).max(1))),
        r => {
            let batch = num_elements(&shape[..r - 2]).max(1);
            Ok(SurfaceShape::new(
                batch * shape[r - 2].div_ceil(2).max(1),
                shape[r - 1].div_ceil(2).max(1),
            ))
        }
    }
}

/// One operand at a given moment: logical shape plus how it is stored.
///
/// `surface` is `None` only for runtime-parameterized programs, where the
/// physical shape arrives through a uniform at dispatch time instead of
/// being baked into source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandBinding {
    /// Logical dimension extents, rank 0-6
    pub shape: Vec<usize>,
    /// Storage convention for this binding
    pub packing: Packing,
    /// Physical addressable-unit shape, when baked as literals
    pub surface: Option<SurfaceShape>,
    /// Flat element offset for views into a larger allocation
    pub flat_offset: usize,
    /// Data is inlined as literal uniform values, not addressed through a
    /// surface
    pub inline: bool,
}

impl OperandBinding {
    /// Unpacked operand on its canonical dense surface.
    pub fn dense(shape: &[usize]) -> Result<Self> {
        let surface = dense_surface(shape)?;
        Ok(Self {
            shape: shape.to_vec(),
            packing: Packing::Unpacked,
            surface: Some(surface),
            flat_offset: 0,
            inline: false,
        })
    }

    /// Packed operand on its canonical 2x2-tiled surface.
    pub fn packed(shape: &[usize]) -> Result<Self> {
        let surface = packed_surface(shape)?;
        Ok(Self {
            shape: shape.to_vec(),
            packing: Packing::Packed,
            surface: Some(surface),
            flat_offset: 0,
            inline: false,
        })
    }

    /// Small-constant operand, uploaded as an inline uniform array.
    pub fn inline(shape: &[usize]) -> Result<Self> {
        check_rank(shape, "inline operand")?;
        Ok(Self {
            shape: shape.to_vec(),
            packing: Packing::Unpacked,
            surface: None,
            flat_offset: 0,
            inline: true,
        })
    }

    /// Unpacked operand whose surface shape is deferred to a runtime
    /// uniform (for shape-parameterized programs).
    pub fn parameterized(shape: &[usize]) -> Result<Self> {
        check_rank(shape, "parameterized operand")?;
        Ok(Self {
            shape: shape.to_vec(),
            packing: Packing::Unpacked,
            surface: None,
            flat_offset: 0,
            inline: false,
        })
    }

    /// Attach a flat element offset (view into a larger allocation).
    pub fn with_offset(mut self, flat_offset: usize) -> Self {
        self.flat_offset = flat_offset;
        self
    }

    /// Logical rank.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Whether this binding is stored packed.
    pub fn is_packed(&self) -> bool {
        self.packing == Packing::Packed
    }

    /// The baked surface shape, or an error for bindings that defer it.
    pub fn require_surface(&self, operand: &'static str) -> Result<SurfaceShape> {
        self.surface.ok_or_else(|| Error::InvalidArgument {
            arg: operand,
            reason: "binding has no baked surface shape".to_string(),
        })
    }
}
