//! Dimension classification for labeled contraction.
//!
//! Given the three operands' index strings, every dimension label is sorted
//! into one of four groups by which operands carry it:
//!
//! - `AB`: contracted (summed over),
//! - `AC`: free dimensions of A appearing in the output,
//! - `BC`: free dimensions of B appearing in the output,
//! - `ABC`: batch dimensions shared by all three.
//!
//! The classifier validates arity, repeated labels, cross-operand length
//! agreement, and labels appearing in only one operand, then normalizes each
//! group: dimensions are ordered by ascending stride, unit-length dimensions
//! are dropped, and adjacent dimensions that are stride-contiguous in every
//! participating operand are merged into one.

use crate::error::MultError;

/// The four dimension groups of a contraction, each as parallel
/// `(length, per-operand stride)` sequences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimGroups {
    pub len_ab: Vec<usize>,
    pub stride_a_ab: Vec<isize>,
    pub stride_b_ab: Vec<isize>,

    pub len_ac: Vec<usize>,
    pub stride_a_ac: Vec<isize>,
    pub stride_c_ac: Vec<isize>,

    pub len_bc: Vec<usize>,
    pub stride_b_bc: Vec<isize>,
    pub stride_c_bc: Vec<isize>,

    pub len_abc: Vec<usize>,
    pub stride_a_abc: Vec<isize>,
    pub stride_b_abc: Vec<isize>,
    pub stride_c_abc: Vec<isize>,
}

impl DimGroups {
    /// Flattened extent of the contracted group.
    pub fn n_ab(&self) -> usize {
        self.len_ab.iter().product()
    }

    /// Flattened extent of A's free group.
    pub fn n_ac(&self) -> usize {
        self.len_ac.iter().product()
    }

    /// Flattened extent of B's free group.
    pub fn n_bc(&self) -> usize {
        self.len_bc.iter().product()
    }

    /// Flattened extent of the batch group.
    pub fn n_abc(&self) -> usize {
        self.len_abc.iter().product()
    }
}

fn operand_entries(
    operand: char,
    dims: &[usize],
    strides: &[isize],
    idx: &str,
) -> Result<Vec<(char, usize, isize)>, MultError> {
    let labels: Vec<char> = idx.chars().collect();
    if labels.len() != dims.len() {
        return Err(MultError::WrongNumberOfIndices {
            operand,
            ndim: dims.len(),
            nlabels: labels.len(),
        });
    }
    for (i, &label) in labels.iter().enumerate() {
        if labels[..i].contains(&label) {
            return Err(MultError::DuplicateIndex { label, operand });
        }
    }
    Ok(labels
        .into_iter()
        .zip(dims.iter().copied())
        .zip(strides.iter().copied())
        .map(|((l, d), s)| (l, d, s))
        .collect())
}

fn coalesce<const N: usize>(len: &mut Vec<usize>, strides: [&mut Vec<isize>; N]) {
    let ndim = len.len();
    if ndim == 0 {
        return;
    }
    let mut order: Vec<usize> = (0..ndim).collect();
    order.sort_by(|&i, &j| {
        for s in strides.iter() {
            match s[i].abs().cmp(&s[j].abs()) {
                std::cmp::Ordering::Equal => continue,
                other => return other,
            }
        }
        i.cmp(&j)
    });

    let mut out_len: Vec<usize> = Vec::with_capacity(ndim);
    let mut out_strides: [Vec<isize>; N] = std::array::from_fn(|_| Vec::with_capacity(ndim));
    for &d in &order {
        let l = len[d];
        if l == 1 {
            continue;
        }
        if let Some(&prev) = out_len.last() {
            let contiguous = l != 0
                && prev != 0
                && (0..N).all(|k| {
                    let base = *out_strides[k].last().expect("parallel with out_len");
                    strides[k][d] == base * prev as isize
                });
            if contiguous {
                *out_len.last_mut().expect("nonempty") *= l;
                continue;
            }
        }
        out_len.push(l);
        for k in 0..N {
            out_strides[k].push(strides[k][d]);
        }
    }

    *len = out_len;
    for (dst, src) in strides.into_iter().zip(out_strides) {
        *dst = src;
    }
}

/// Classify the dimensions of a labeled three-operand contraction.
///
/// `idx_*` assigns one character label per dimension of the corresponding
/// operand. Errors are detected before any arithmetic: arity mismatches,
/// labels repeated within one operand, conflicting lengths for a shared
/// label, and labels present in only one operand.
#[allow(clippy::too_many_arguments)]
pub fn classify(
    dims_a: &[usize],
    strides_a: &[isize],
    idx_a: &str,
    dims_b: &[usize],
    strides_b: &[isize],
    idx_b: &str,
    dims_c: &[usize],
    strides_c: &[isize],
    idx_c: &str,
) -> Result<DimGroups, MultError> {
    let ea = operand_entries('A', dims_a, strides_a, idx_a)?;
    let eb = operand_entries('B', dims_b, strides_b, idx_b)?;
    let ec = operand_entries('C', dims_c, strides_c, idx_c)?;

    let find = |entries: &[(char, usize, isize)], label: char| {
        entries.iter().find(|e| e.0 == label).copied()
    };

    let mut g = DimGroups::default();
    let mut seen: Vec<char> = Vec::new();
    for &(label, _, _) in ea.iter().chain(&eb).chain(&ec) {
        if seen.contains(&label) {
            continue;
        }
        seen.push(label);

        let in_a = find(&ea, label);
        let in_b = find(&eb, label);
        let in_c = find(&ec, label);

        let mut len: Option<usize> = None;
        for entry in [in_a, in_b, in_c].into_iter().flatten() {
            match len {
                None => len = Some(entry.1),
                Some(l) if l != entry.1 => {
                    return Err(MultError::IndexMismatch {
                        label,
                        len1: l,
                        len2: entry.1,
                    });
                }
                Some(_) => {}
            }
        }
        let len = len.expect("label came from an operand");

        match (in_a, in_b, in_c) {
            (Some(a), Some(b), Some(c)) => {
                g.len_abc.push(len);
                g.stride_a_abc.push(a.2);
                g.stride_b_abc.push(b.2);
                g.stride_c_abc.push(c.2);
            }
            (Some(a), Some(b), None) => {
                g.len_ab.push(len);
                g.stride_a_ab.push(a.2);
                g.stride_b_ab.push(b.2);
            }
            (Some(a), None, Some(c)) => {
                g.len_ac.push(len);
                g.stride_a_ac.push(a.2);
                g.stride_c_ac.push(c.2);
            }
            (None, Some(b), Some(c)) => {
                g.len_bc.push(len);
                g.stride_b_bc.push(b.2);
                g.stride_c_bc.push(c.2);
            }
            _ => return Err(MultError::UnmatchedIndex { label }),
        }
    }

    coalesce(&mut g.len_ab, [&mut g.stride_a_ab, &mut g.stride_b_ab]);
    coalesce(&mut g.len_ac, [&mut g.stride_a_ac, &mut g.stride_c_ac]);
    coalesce(&mut g.len_bc, [&mut g.stride_b_bc, &mut g.stride_c_bc]);
    coalesce(
        &mut g.len_abc,
        [
            &mut g.stride_a_abc,
            &mut g.stride_b_abc,
            &mut g.stride_c_abc,
        ],
    );

    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_groups() {
        // C[m,n] = A[m,k] B[k,n], all contiguous column-major
        let g = classify(
            &[4, 6],
            &[1, 4],
            "mk",
            &[6, 5],
            &[1, 6],
            "kn",
            &[4, 5],
            &[1, 4],
            "mn",
        )
        .unwrap();
        assert_eq!(g.n_ab(), 6);
        assert_eq!(g.n_ac(), 4);
        assert_eq!(g.n_bc(), 5);
        assert_eq!(g.n_abc(), 1);
        assert_eq!(g.len_ab, vec![6]);
        assert_eq!(g.stride_a_ab, vec![4]);
        assert_eq!(g.stride_b_ab, vec![1]);
    }

    #[test]
    fn test_batch_label() {
        // C[i,b] = A[i,b] * B[b]
        let g = classify(
            &[3, 7],
            &[1, 3],
            "ib",
            &[7],
            &[1],
            "b",
            &[3, 7],
            &[1, 3],
            "ib",
        )
        .unwrap();
        assert_eq!(g.n_abc(), 7);
        assert_eq!(g.n_ac(), 3);
        assert_eq!(g.n_ab(), 1);
        assert_eq!(g.n_bc(), 1);
    }

    #[test]
    fn test_coalesce_contiguous_dims() {
        // Two AC dims that are contiguous in both A and C merge into one.
        let g = classify(
            &[2, 3, 5],
            &[1, 2, 6],
            "mnk",
            &[5],
            &[1],
            "k",
            &[2, 3],
            &[1, 2],
            "mn",
        )
        .unwrap();
        assert_eq!(g.len_ac, vec![6]);
        assert_eq!(g.stride_a_ac, vec![1]);
        assert_eq!(g.stride_c_ac, vec![1]);
    }

    #[test]
    fn test_no_coalesce_across_gap() {
        // A is a strided slice along n, so m and n cannot merge.
        let g = classify(
            &[2, 3],
            &[1, 4],
            "mn",
            &[3],
            &[1],
            "x",
            &[2, 3, 3],
            &[1, 2, 6],
            "mnx",
        )
        .unwrap();
        assert_eq!(g.len_ac, vec![2, 3]);
    }

    #[test]
    fn test_unit_dims_dropped() {
        let g = classify(
            &[4, 1],
            &[1, 4],
            "mk",
            &[1, 5],
            &[1, 1],
            "kn",
            &[4, 5],
            &[1, 4],
            "mn",
        )
        .unwrap();
        assert!(g.len_ab.is_empty());
        assert_eq!(g.n_ab(), 1);
    }

    #[test]
    fn test_zero_length_dims_kept() {
        let g = classify(
            &[4, 0],
            &[1, 4],
            "mk",
            &[0, 5],
            &[1, 1],
            "kn",
            &[4, 5],
            &[1, 4],
            "mn",
        )
        .unwrap();
        assert_eq!(g.n_ab(), 0);
    }

    #[test]
    fn test_wrong_arity() {
        let err = classify(&[4, 6], &[1, 4], "m", &[6], &[1], "k", &[4], &[1], "m").unwrap_err();
        assert!(matches!(
            err,
            MultError::WrongNumberOfIndices { operand: 'A', .. }
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let err = classify(
            &[4, 6],
            &[1, 4],
            "mk",
            &[7, 5],
            &[1, 7],
            "kn",
            &[4, 5],
            &[1, 4],
            "mn",
        )
        .unwrap_err();
        assert_eq!(
            err,
            MultError::IndexMismatch {
                label: 'k',
                len1: 6,
                len2: 7
            }
        );
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let err = classify(
            &[4, 4],
            &[1, 4],
            "mm",
            &[4],
            &[1],
            "k",
            &[4, 4],
            &[1, 4],
            "mk",
        )
        .unwrap_err();
        assert_eq!(
            err,
            MultError::DuplicateIndex {
                label: 'm',
                operand: 'A'
            }
        );
    }

    #[test]
    fn test_unmatched_label_rejected() {
        let err = classify(
            &[4, 6],
            &[1, 4],
            "mq",
            &[6, 5],
            &[1, 6],
            "kn",
            &[4, 5],
            &[1, 4],
            "mn",
        )
        .unwrap_err();
        assert!(matches!(err, MultError::UnmatchedIndex { .. }));
    }
}
