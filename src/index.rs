//! Index algebra
//!
//! Pure conversions between linear offsets into a 2-D addressable surface
//! and N-D logical coordinates, for both packing schemes. These are the
//! host-side twins of the decode expressions the code generator emits;
//! the execution binder and the test suites rely on them agreeing with
//! the generated source.

use smallvec::SmallVec;

use crate::binding::SurfaceShape;
use crate::error::Result;
use crate::shape::{check_packed_rank, check_rank, strides, MAX_RANK};

/// Coordinate tuple for ranks 0-6.
pub type Coords = SmallVec<[usize; MAX_RANK]>;

/// Unravel a flat row-major index into logical coordinates.
///
/// A rank-1 shape bypasses the div/mod decomposition entirely.
pub fn flat_to_coords(flat: usize, shape: &[usize]) -> Result<Coords> {
    check_rank(shape, "flat index decode")?;
    let mut coords = Coords::new();
    if shape.len() == 1 {
        coords.push(flat);
        return Ok(coords);
    }
    let mut remaining = flat;
    for &stride in strides(shape).iter() {
        coords.push(remaining / stride);
        remaining %= stride;
    }
    Ok(coords)
}

/// Flatten logical coordinates back into a row-major index.
///
/// Size-1 dimensions contribute nothing and skip the multiply.
pub fn coords_to_flat(coords: &[usize], shape: &[usize]) -> Result<usize> {
    check_rank(shape, "coordinate flatten")?;
    let st = strides(shape);
    Ok(coords
        .iter()
        .zip(st.iter())
        .zip(shape.iter())
        .filter(|&(_, &ext)| ext != 1)
        .map(|((&c, &s), _)| c * s)
        .sum())
}

/// Split a linear unit index into a surface (row, col) location.
pub fn surface_location(flat: usize, surface: SurfaceShape) -> (usize, usize) {
    (flat / surface.cols, flat % surface.cols)
}

/// Surface location of a logical coordinate under unpacked addressing.
pub fn coords_to_surface(
    coords: &[usize],
    shape: &[usize],
    surface: SurfaceShape,
) -> Result<(usize, usize)> {
    let flat = coords_to_flat(coords, shape)?;
    Ok(surface_location(flat, surface))
}

// ============================================================================
// Packed addressing
// ============================================================================

/// Which of the four packed channels a logical coordinate occupies.
///
/// Lane order matches the texel channel order: (even row, even col) = 0,
/// (even, odd) = 1, (odd, even) = 2, (odd, odd) = 3, from the parity of
/// the two innermost coordinates. Rank 0/1 shapes only use lanes 0 and 1.
pub fn packed_lane(coords: &[usize]) -> usize {
    match coords.len() {
        0 => 0,
        1 => coords[0] % 2,
        r => (coords[r - 2] % 2) * 2 + coords[r - 1] % 2,
    }
}

/// Linear texel index of the 2x2 block containing a logical coordinate.
///
/// The two innermost dimensions are ceil-halved; outer dimensions keep
/// their row-major order above the halved block grid.
pub fn packed_unit_index(coords: &[usize], shape: &[usize]) -> Result<usize> {
    check_packed_rank(shape, "packed unit index")?;
    match shape.len() {
        0 => Ok(0),
        1 => Ok(coords[0] / 2),
        r => {
            let block_rows = shape[r - 2].div_ceil(2);
            let block_cols = shape[r - 1].div_ceil(2);
            let outer = coords_to_flat(&coords[..r - 2], &shape[..r - 2])?;
            let br = coords[r - 2] / 2;
            let bc = coords[r - 1] / 2;
            Ok((outer * block_rows + br) * block_cols + bc)
        }
    }
}

/// Reconstruct logical coordinates from a (texel index, lane) pair.
///
/// Inverse of [`packed_unit_index`] + [`packed_lane`]; lanes that fall
/// beyond an odd extent have no preimage and yield out-of-bounds
/// coordinates the caller must reject.
pub fn packed_unit_to_coords(unit: usize, lane: usize, shape: &[usize]) -> Result<Coords> {
    check_packed_rank(shape, "packed unit decode")?;
    let mut coords = Coords::new();
    match shape.len() {
        0 => Ok(coords),
        1 => {
            coords.push(unit * 2 + lane % 2);
            Ok(coords)
        }
        r => {
            let block_rows = shape[r - 2].div_ceil(2);
            let block_cols = shape[r - 1].div_ceil(2);
            let bc = unit % block_cols;
            let rest = unit / block_cols;
            let br = rest % block_rows;
            let outer = rest / block_rows;
            if r > 2 {
                coords.extend(flat_to_coords(outer, &shape[..r - 2])?);
            }
            coords.push(br * 2 + lane / 2);
            coords.push(bc * 2 + lane % 2);
            Ok(coords)
        }
    }
}
