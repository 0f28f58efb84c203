//! Stride computation utilities for column-major dense layouts.

/// Compute column-major strides for the given shape.
///
/// The first dimension is the fastest-varying one (stride 1).
///
/// # Examples
///
/// ```
/// use einmult::strides::col_major_strides;
///
/// assert_eq!(col_major_strides(&[2, 3, 4]), vec![1, 2, 6]);
/// assert_eq!(col_major_strides(&[]), Vec::<isize>::new());
/// ```
pub fn col_major_strides(shape: &[usize]) -> Vec<isize> {
    let mut strides = vec![0isize; shape.len()];
    let mut acc = 1isize;
    for (s, &len) in strides.iter_mut().zip(shape) {
        *s = acc;
        acc *= len as isize;
    }
    strides
}

/// Convert a multi-dimensional index to a linear offset.
pub fn cartesian_to_linear(index: &[usize], strides: &[isize]) -> isize {
    index
        .iter()
        .zip(strides)
        .map(|(&i, &s)| i as isize * s)
        .sum()
}

/// Convert a flat index to a multi-dimensional index, fastest dimension first.
pub fn linear_to_cartesian(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0usize; shape.len()];
    for (i, &len) in index.iter_mut().zip(shape) {
        if len == 0 {
            return vec![0; shape.len()];
        }
        *i = flat % len;
        flat /= len;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_major_strides() {
        assert_eq!(col_major_strides(&[4]), vec![1]);
        assert_eq!(col_major_strides(&[2, 3]), vec![1, 2]);
        assert_eq!(col_major_strides(&[2, 3, 4]), vec![1, 2, 6]);
    }

    #[test]
    fn test_cartesian_to_linear() {
        let strides = col_major_strides(&[2, 3, 4]);
        assert_eq!(cartesian_to_linear(&[0, 0, 0], &strides), 0);
        assert_eq!(cartesian_to_linear(&[1, 2, 3], &strides), 1 + 4 + 18);
    }

    #[test]
    fn test_linear_to_cartesian_roundtrip() {
        let shape = [2, 3, 4];
        let strides = col_major_strides(&shape);
        for flat in 0..24 {
            let idx = linear_to_cartesian(flat, &shape);
            assert_eq!(cartesian_to_linear(&idx, &strides), flat as isize);
        }
    }
}
