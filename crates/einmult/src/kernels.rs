//! Elementwise strided kernels.
//!
//! These are the narrow collaborators under the contraction strategies:
//! set, scale, accumulate, and reduce over arbitrary-rank strided regions.
//! The comm-taking variants are collective over the gang and partition the
//! flattened extent deterministically; the `_run` variants operate on a
//! single 1-D run and are called from already-partitioned loops.
//!
//! Pointer contract: every `ConstPtr`/`MutPtr` passed in was obtained from a
//! bounds-checked view (or a scratch buffer sized for the region), and mutable
//! regions are never shared between threads of the same collective call.

use crate::comm::Communicator;
use crate::iter::StrideIter;
use crate::scalar::{Scalar, maybe_conj};
use crate::view::{ConstPtr, MutPtr};

/// C := value over the whole region. Collective.
pub(crate) fn set<T: Scalar>(
    comm: &Communicator,
    len: &[usize],
    value: T,
    c: MutPtr<T>,
    stride_c: &[isize],
) {
    let total: usize = len.iter().product();
    let range = comm.distribute_over_threads(total);
    if range.is_empty() {
        return;
    }
    let mut off = [0isize];
    let mut it = StrideIter::new(len, [stride_c]);
    it.position(range.start, &mut off);
    for _ in range {
        it.next(&mut off);
        unsafe {
            *c.at(off[0]) = value;
        }
    }
}

/// C := beta * op(C) over the whole region. Collective.
///
/// A zero `beta` overwrites without reading, so stale NaN or Inf contents do
/// not leak into the result.
pub(crate) fn scale<T: Scalar>(
    comm: &Communicator,
    len: &[usize],
    beta: T,
    conj_c: bool,
    c: MutPtr<T>,
    stride_c: &[isize],
) {
    if beta.is_zero() {
        set(comm, len, T::zero(), c, stride_c);
        return;
    }
    let total: usize = len.iter().product();
    let range = comm.distribute_over_threads(total);
    if range.is_empty() {
        return;
    }
    let mut off = [0isize];
    let mut it = StrideIter::new(len, [stride_c]);
    it.position(range.start, &mut off);
    for _ in range {
        it.next(&mut off);
        unsafe {
            let p = c.at(off[0]);
            *p = beta * maybe_conj(conj_c, *p);
        }
    }
}

/// C := alpha * op(A) + beta * op(C) over the whole region. Collective.
pub(crate) fn add<T: Scalar>(
    comm: &Communicator,
    len: &[usize],
    alpha: T,
    conj_a: bool,
    a: ConstPtr<T>,
    stride_a: &[isize],
    beta: T,
    conj_c: bool,
    c: MutPtr<T>,
    stride_c: &[isize],
) {
    let total: usize = len.iter().product();
    let range = comm.distribute_over_threads(total);
    if range.is_empty() {
        return;
    }
    let mut off = [0isize; 2];
    let mut it = StrideIter::new(len, [stride_a, stride_c]);
    it.position(range.start, &mut off);
    if beta.is_zero() {
        for _ in range {
            it.next(&mut off);
            unsafe {
                *c.at(off[1]) = alpha * maybe_conj(conj_a, *a.at(off[0]));
            }
        }
    } else {
        for _ in range {
            it.next(&mut off);
            unsafe {
                let p = c.at(off[1]);
                *p = alpha * maybe_conj(conj_a, *a.at(off[0])) + beta * maybe_conj(conj_c, *p);
            }
        }
    }
}

/// Reduce sum(op(A) * op(B)) over the whole region. Collective; every thread
/// receives the total.
pub(crate) fn dot<T: Scalar>(
    comm: &Communicator,
    len: &[usize],
    conj_a: bool,
    a: ConstPtr<T>,
    stride_a: &[isize],
    conj_b: bool,
    b: ConstPtr<T>,
    stride_b: &[isize],
) -> T {
    let total: usize = len.iter().product();
    let range = comm.distribute_over_threads(total);
    let mut partial = T::zero();
    if !range.is_empty() {
        let mut off = [0isize; 2];
        let mut it = StrideIter::new(len, [stride_a, stride_b]);
        it.position(range.start, &mut off);
        for _ in range {
            it.next(&mut off);
            unsafe {
                partial = partial
                    + maybe_conj(conj_a, *a.at(off[0])) * maybe_conj(conj_b, *b.at(off[1]));
            }
        }
    }
    comm.allreduce_sum(partial)
}

/// Single-threaded sum(op(A) * op(B)) over the whole region.
pub(crate) fn dot_seq<T: Scalar>(
    len: &[usize],
    conj_a: bool,
    a: ConstPtr<T>,
    stride_a: &[isize],
    conj_b: bool,
    b: ConstPtr<T>,
    stride_b: &[isize],
) -> T {
    let mut sum = T::zero();
    let mut off = [0isize; 2];
    let mut it = StrideIter::new(len, [stride_a, stride_b]);
    while it.next(&mut off) {
        unsafe {
            sum = sum + maybe_conj(conj_a, *a.at(off[0])) * maybe_conj(conj_b, *b.at(off[1]));
        }
    }
    sum
}

/// *c := alpha * value + beta * op(*c) for a single element.
#[inline]
pub(crate) fn add_scalar<T: Scalar>(alpha: T, value: T, beta: T, conj_c: bool, c: MutPtr<T>) {
    unsafe {
        let p = c.at(0);
        if beta.is_zero() {
            *p = alpha * value;
        } else {
            *p = alpha * value + beta * maybe_conj(conj_c, *p);
        }
    }
}

/// 1-D fused run: c[i] := alpha * op(a[i]) * op(b[i]) + beta * op(c[i]).
#[allow(clippy::too_many_arguments)]
pub(crate) fn fma_run<T: Scalar>(
    n: usize,
    alpha: T,
    conj_a: bool,
    a: ConstPtr<T>,
    inc_a: isize,
    conj_b: bool,
    b: ConstPtr<T>,
    inc_b: isize,
    beta: T,
    conj_c: bool,
    c: MutPtr<T>,
    inc_c: isize,
) {
    if beta.is_zero() {
        for i in 0..n as isize {
            unsafe {
                *c.at(i * inc_c) = alpha
                    * maybe_conj(conj_a, *a.at(i * inc_a))
                    * maybe_conj(conj_b, *b.at(i * inc_b));
            }
        }
    } else {
        for i in 0..n as isize {
            unsafe {
                let p = c.at(i * inc_c);
                *p = alpha
                    * maybe_conj(conj_a, *a.at(i * inc_a))
                    * maybe_conj(conj_b, *b.at(i * inc_b))
                    + beta * maybe_conj(conj_c, *p);
            }
        }
    }
}

/// 1-D run: y[i] := alpha * op(x[i]) + beta * op(y[i]).
#[allow(clippy::too_many_arguments)]
pub(crate) fn axpby_run<T: Scalar>(
    n: usize,
    alpha: T,
    conj_x: bool,
    x: ConstPtr<T>,
    inc_x: isize,
    beta: T,
    conj_y: bool,
    y: MutPtr<T>,
    inc_y: isize,
) {
    if beta.is_zero() {
        for i in 0..n as isize {
            unsafe {
                *y.at(i * inc_y) = alpha * maybe_conj(conj_x, *x.at(i * inc_x));
            }
        }
    } else if beta.is_one() && !conj_y {
        for i in 0..n as isize {
            unsafe {
                let p = y.at(i * inc_y);
                *p = alpha * maybe_conj(conj_x, *x.at(i * inc_x)) + *p;
            }
        }
    } else {
        for i in 0..n as isize {
            unsafe {
                let p = y.at(i * inc_y);
                *p = alpha * maybe_conj(conj_x, *x.at(i * inc_x))
                    + beta * maybe_conj(conj_y, *p);
            }
        }
    }
}

/// 1-D run: sum(op(a[i]) * op(b[i])).
pub(crate) fn dot_run<T: Scalar>(
    n: usize,
    conj_a: bool,
    a: ConstPtr<T>,
    inc_a: isize,
    conj_b: bool,
    b: ConstPtr<T>,
    inc_b: isize,
) -> T {
    let mut sum = T::zero();
    for i in 0..n as isize {
        unsafe {
            sum = sum + maybe_conj(conj_a, *a.at(i * inc_a)) * maybe_conj(conj_b, *b.at(i * inc_b));
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm;
    use crate::scalar::c64;

    fn const_ptr<T>(data: &[T]) -> ConstPtr<T> {
        ConstPtr(data.as_ptr())
    }

    fn mut_ptr<T>(data: &mut [T]) -> MutPtr<T> {
        MutPtr(data.as_mut_ptr())
    }

    #[test]
    fn test_set_strided() {
        let mut data = vec![1.0f64; 8];
        comm::run(2, |comm| {
            set(comm, &[4], 7.0, MutPtr(data.as_ptr() as *mut f64), &[2]);
        });
        assert_eq!(data, vec![7.0, 1.0, 7.0, 1.0, 7.0, 1.0, 7.0, 1.0]);
    }

    #[test]
    fn test_scale_beta_zero_overwrites_nan() {
        let mut data = vec![f64::NAN; 4];
        let comm_data = MutPtr(data.as_mut_ptr());
        comm::run(1, |comm| {
            scale(comm, &[4], 0.0, false, comm_data, &[1]);
        });
        assert_eq!(data, vec![0.0; 4]);
    }

    #[test]
    fn test_scale_conj() {
        let mut data = vec![c64::new(1.0, 2.0), c64::new(3.0, -4.0)];
        let p = MutPtr(data.as_mut_ptr());
        comm::run(1, |comm| {
            scale(comm, &[2], c64::new(2.0, 0.0), true, p, &[1]);
        });
        assert_eq!(data[0], c64::new(2.0, -4.0));
        assert_eq!(data[1], c64::new(6.0, 8.0));
    }

    #[test]
    fn test_add_accumulate() {
        let a = vec![1.0f64, 2.0, 3.0];
        let mut c = vec![10.0f64, 20.0, 30.0];
        let (pa, pc) = (const_ptr(&a), MutPtr(c.as_mut_ptr()));
        comm::run(2, |comm| {
            add(comm, &[3], 2.0, false, pa, &[1], 0.5, false, pc, &[1]);
        });
        assert_eq!(c, vec![7.0, 14.0, 21.0]);
    }

    #[test]
    fn test_add_beta_zero_ignores_nan() {
        let a = vec![1.0f64, 2.0];
        let mut c = vec![f64::NAN, f64::NAN];
        let (pa, pc) = (const_ptr(&a), MutPtr(c.as_mut_ptr()));
        comm::run(1, |comm| {
            add(comm, &[2], 3.0, false, pa, &[1], 0.0, false, pc, &[1]);
        });
        assert_eq!(c, vec![3.0, 6.0]);
    }

    #[test]
    fn test_dot_parallel_matches_seq() {
        let a: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..20).map(|i| (i * i) as f64).collect();
        let expected = dot_seq(&[20], false, const_ptr(&a), &[1], false, const_ptr(&b), &[1]);
        let (pa, pb) = (const_ptr(&a), const_ptr(&b));
        comm::run(3, |comm| {
            let got = dot(comm, &[20], false, pa, &[1], false, pb, &[1]);
            assert_eq!(got, expected);
        });
    }

    #[test]
    fn test_dot_conj() {
        let a = vec![c64::new(0.0, 1.0)];
        let b = vec![c64::new(0.0, 1.0)];
        let s = dot_seq(&[1], true, const_ptr(&a), &[1], false, const_ptr(&b), &[1]);
        // conj(i) * i = 1
        assert_eq!(s, c64::new(1.0, 0.0));
    }

    #[test]
    fn test_fma_run() {
        let a = vec![1.0f64, 2.0];
        let b = vec![3.0f64, 4.0];
        let mut c = vec![100.0f64, 200.0];
        fma_run(
            2,
            2.0,
            false,
            const_ptr(&a),
            1,
            false,
            const_ptr(&b),
            1,
            1.0,
            false,
            mut_ptr(&mut c),
            1,
        );
        assert_eq!(c, vec![106.0, 216.0]);
    }

    #[test]
    fn test_axpby_negative_stride() {
        let x = vec![1.0f64, 2.0, 3.0];
        let mut y = vec![0.0f64; 3];
        // read x backwards
        axpby_run(
            3,
            1.0,
            false,
            ConstPtr(x[2..].as_ptr()),
            -1,
            0.0,
            false,
            mut_ptr(&mut y),
            1,
        );
        assert_eq!(y, vec![3.0, 2.0, 1.0]);
    }
}
