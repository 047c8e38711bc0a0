//! Logical shape helpers
//!
//! A logical shape is an ordered list of dimension extents, rank 0-6.
//! Rank above [`MAX_RANK`] is rejected at synthesis time; there is no
//! runtime fallback.

use crate::error::{Error, Result};

/// Maximum supported logical rank for unpacked addressing
pub const MAX_RANK: usize = 6;

/// Maximum supported logical rank for packed (2x2 tiled) addressing
pub const MAX_PACKED_RANK: usize = 4;

/// Validate a shape's rank against [`MAX_RANK`].
pub fn check_rank(shape: &[usize], context: &'static str) -> Result<()> {
    if shape.len() > MAX_RANK {
        return Err(Error::RankNotSupported {
            rank: shape.len(),
            limit: MAX_RANK,
            context,
        });
    }
    Ok(())
}

/// Validate a shape's rank against [`MAX_PACKED_RANK`].
///
/// Packed decode functions are only defined up to rank 4.
pub fn check_packed_rank(shape: &[usize], context: &'static str) -> Result<()> {
    if shape.len() > MAX_PACKED_RANK {
        return Err(Error::RankNotSupported {
            rank: shape.len(),
            limit: MAX_PACKED_RANK,
            context,
        });
    }
    Ok(())
}

/// Total element count of a logical shape (1 for rank 0).
pub fn num_elements(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Row-major strides: `strides[i]` = product of `shape[i+1..]`.
pub fn strides(shape: &[usize]) -> Vec<usize> {
    let mut out = vec![1usize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        out[i] = out[i + 1] * shape[i + 1];
    }
    out
}

/// Dimensions of `operand` (right-aligned against `out`) that broadcast.
///
/// Returns positions in the operand's own index space where the operand
/// extent is 1 while the output extent is larger. These coordinates must
/// be zeroed before reading the operand at an output coordinate.
pub fn broadcast_dims(operand: &[usize], out: &[usize]) -> Vec<usize> {
    let offset = out.len().saturating_sub(operand.len());
    operand
        .iter()
        .enumerate()
        .filter(|&(i, &ext)| ext == 1 && out.get(offset + i).is_some_and(|&o| o > 1))
        .map(|(i, _)| i)
        .collect()
}
