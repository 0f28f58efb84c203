//! Layout planning for the matrix-shaped strategies.
//!
//! Before a group of dimensions is handed to a matrix kernel, it is put into
//! a canonical traversal order: ascending absolute stride of the primary
//! operand, ties broken by the secondary operand(s), then by original index.
//! The dimension holding an operand's unit stride can additionally be rotated
//! to the front of the remainder so that the innermost packed walk stays
//! contiguous even when the stride-sorted order would bury it.

use std::cmp::Ordering;

/// Product of a length sequence (1 for the empty sequence).
pub(crate) fn prod(len: &[usize]) -> usize {
    len.iter().product()
}

/// A stride sequence of `n` zeros, for operands that do not participate in a
/// group being iterated.
pub(crate) fn zero_strides(n: usize) -> Vec<isize> {
    vec![0; n]
}

/// Traversal order over `keys[0].len()` dimensions: ascending absolute stride
/// of `keys[0]`, ties broken by the following keys, then by index.
pub(crate) fn sort_by_stride(keys: &[&[isize]]) -> Vec<usize> {
    let n = keys[0].len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        for key in keys {
            match key[i].abs().cmp(&key[j].abs()) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        i.cmp(&j)
    });
    order
}

/// Position within `order` of the dimension along which `stride` is unit, or
/// `order.len()` when there is none.
pub(crate) fn unit_dim(stride: &[isize], order: &[usize]) -> usize {
    order
        .iter()
        .position(|&d| stride[d].abs() == 1)
        .unwrap_or(order.len())
}

/// Whether a group whose unit-stride dimension sits at `unit` (per
/// [`unit_dim`]) needs a two-level packed walk: the unit dimension exists but
/// is not already the innermost one.
pub(crate) fn needs_3d_pack(unit: usize, ndim: usize) -> bool {
    unit > 0 && unit < ndim
}

/// Rotate the dimension at position `unit` to position 1, preserving the
/// relative order of the dimensions it passes over.
pub(crate) fn rotate_unit_to_front(order: &mut [usize], unit: usize) {
    if unit > 0 && unit < order.len() {
        order[1..=unit].rotate_right(1);
    }
}

/// Apply a traversal order to a parallel sequence.
pub(crate) fn permuted<X: Copy>(values: &[X], order: &[usize]) -> Vec<X> {
    order.iter().map(|&i| values[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_ascending_abs() {
        let primary = [6isize, 1, -2];
        let secondary = [1isize, 2, 3];
        let order = sort_by_stride(&[&primary, &secondary]);
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_sort_tiebreak_secondary() {
        let primary = [2isize, 2, 1];
        let secondary = [8isize, 4, 1];
        let order = sort_by_stride(&[&primary, &secondary]);
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_sort_stable_on_full_tie() {
        let primary = [3isize, 3];
        let secondary = [5isize, 5];
        assert_eq!(sort_by_stride(&[&primary, &secondary]), vec![0, 1]);
    }

    #[test]
    fn test_unit_dim() {
        let stride = [4isize, 1, 12];
        let order = vec![1, 0, 2];
        assert_eq!(unit_dim(&stride, &order), 0);
        let order = vec![0, 2, 1];
        assert_eq!(unit_dim(&stride, &order), 2);
        let stride = [4isize, 8, 12];
        assert_eq!(unit_dim(&stride, &[0, 1, 2]), 3);
    }

    #[test]
    fn test_needs_3d_pack() {
        assert!(!needs_3d_pack(0, 3));
        assert!(needs_3d_pack(1, 3));
        assert!(needs_3d_pack(2, 3));
        assert!(!needs_3d_pack(3, 3));
    }

    #[test]
    fn test_rotate_unit_to_front() {
        let mut order = vec![0, 1, 2, 3];
        rotate_unit_to_front(&mut order, 2);
        assert_eq!(order, vec![0, 2, 1, 3]);
        let mut order = vec![5, 6, 7];
        rotate_unit_to_front(&mut order, 0);
        assert_eq!(order, vec![5, 6, 7]);
    }

    #[test]
    fn test_permuted() {
        assert_eq!(permuted(&[10, 20, 30], &[2, 0, 1]), vec![30, 10, 20]);
    }
}
