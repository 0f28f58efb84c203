//! Matrix-vector strategy: AB shared with exactly one free group.
//!
//! One operand carries both the contracted group and the free group (the
//! matrix); the other carries only the contracted group (the vector). The
//! dispatcher maps AB+AC here directly and AB+BC with the operand roles
//! swapped. Outer dimensions beyond the innermost of each group, together
//! with the batch group, are distributed over gangs; each gemv call is
//! collective over its gang and beta folds to one after the first
//! contracted block.

use crate::comm::{Communicator, partition_2x2};
use crate::config::Config;
use crate::iter::StrideIter;
use crate::kernels;
use crate::mult::layout::{permuted, prod, sort_by_stride, zero_strides};
use crate::scalar::{Scalar, maybe_conj};
use crate::view::{ConstPtr, MutPtr};

/// One gemv: c := alpha * op(X) op(y) + beta * op(c), X of shape m x n.
///
/// Collective over `comm`. Rows are split over the threads; the traversal is
/// by columns (axpy) when X's rows are the faster stride, by rows (dot)
/// otherwise.
#[allow(clippy::too_many_arguments)]
fn gemv_kernel<T: Scalar>(
    comm: &Communicator,
    m: usize,
    n: usize,
    alpha: T,
    conj_x: bool,
    x: ConstPtr<T>,
    rs_x: isize,
    cs_x: isize,
    conj_y: bool,
    y: ConstPtr<T>,
    inc_y: isize,
    beta: T,
    conj_c: bool,
    c: MutPtr<T>,
    inc_c: isize,
) {
    let rows = comm.distribute_over_threads(m);
    if rows.is_empty() {
        return;
    }
    let c0 = MutPtr(c.at(rows.start as isize * inc_c));
    let x0 = ConstPtr(x.at(rows.start as isize * rs_x));
    let mr = rows.len();

    if rs_x.abs() <= cs_x.abs() {
        // column traversal: scale this thread's rows of c once, then axpy
        // each column of X
        if beta.is_zero() {
            for i in 0..mr as isize {
                unsafe {
                    *c0.at(i * inc_c) = T::zero();
                }
            }
        } else if conj_c || !beta.is_one() {
            for i in 0..mr as isize {
                unsafe {
                    let p = c0.at(i * inc_c);
                    *p = beta * maybe_conj(conj_c, *p);
                }
            }
        }
        for j in 0..n as isize {
            let yj = unsafe { alpha * maybe_conj(conj_y, *y.at(j * inc_y)) };
            kernels::axpby_run(
                mr,
                yj,
                conj_x,
                ConstPtr(x0.at(j * cs_x)),
                rs_x,
                T::one(),
                false,
                c0,
                inc_c,
            );
        }
    } else {
        for i in 0..mr as isize {
            let sum = kernels::dot_run(n, conj_x, ConstPtr(x0.at(i * rs_x)), cs_x, conj_y, y, inc_y);
            kernels::add_scalar(alpha, sum, beta, conj_c, MutPtr(c0.at(i * inc_c)));
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn mult_gemv<T: Scalar>(
    cfg: &Config,
    comm: &Communicator,
    len_ab: &[usize],
    len_xc: &[usize],
    len_abc: &[usize],
    alpha: T,
    conj_x: bool,
    x: ConstPtr<T>,
    stride_x_ab: &[isize],
    stride_x_xc: &[isize],
    stride_x_abc: &[isize],
    conj_y: bool,
    y: ConstPtr<T>,
    stride_y_ab: &[isize],
    stride_y_abc: &[isize],
    beta: T,
    conj_c: bool,
    c: MutPtr<T>,
    stride_c_xc: &[isize],
    stride_c_abc: &[isize],
) {
    let reorder_xc = sort_by_stride(&[stride_x_xc, stride_c_xc]);
    let reorder_ab = sort_by_stride(&[stride_x_ab, stride_y_ab]);
    let reorder_abc = sort_by_stride(&[stride_c_abc, stride_x_abc, stride_y_abc]);

    let len_xc_p = permuted(len_xc, &reorder_xc);
    let sx_xc = permuted(stride_x_xc, &reorder_xc);
    let sc_xc = permuted(stride_c_xc, &reorder_xc);
    let len_ab_p = permuted(len_ab, &reorder_ab);
    let sx_ab = permuted(stride_x_ab, &reorder_ab);
    let sy_ab = permuted(stride_y_ab, &reorder_ab);
    let len_abc_p = permuted(len_abc, &reorder_abc);
    let sx_abc = permuted(stride_x_abc, &reorder_abc);
    let sy_abc = permuted(stride_y_abc, &reorder_abc);
    let sc_abc = permuted(stride_c_abc, &reorder_abc);

    let m0 = len_xc_p[0];
    let rs_x = sx_xc[0];
    let inc_c = sc_xc[0];
    let n0 = len_ab_p[0];
    let cs_x = sx_ab[0];
    let inc_y = sy_ab[0];

    let (m, n, l) = (prod(&len_xc_p), prod(&len_ab_p), prod(&len_abc_p));
    if comm.master() {
        cfg.add_flops(2 * (m * n * l) as u64);
    }

    // gangs own (batch x outer-free) slices; inside a gang the gemv rows split
    let outer_m = prod(&len_xc_p[1..]);
    let (nt_l, _nt_m) = partition_2x2(comm.num_threads(), l * outer_m, m0);
    let subcomm = comm.gang(nt_l);
    let range_lm = subcomm.distribute_over_gangs(l * outer_m);
    if range_lm.is_empty() {
        return;
    }

    // batch dims first, then the outer free dims
    let mut len_lm: Vec<usize> = len_abc_p.clone();
    len_lm.extend_from_slice(&len_xc_p[1..]);
    let mut s_x_lm: Vec<isize> = sx_abc.clone();
    s_x_lm.extend_from_slice(&sx_xc[1..]);
    let mut s_y_lm: Vec<isize> = sy_abc.clone();
    s_y_lm.extend(zero_strides(len_xc_p.len() - 1));
    let mut s_c_lm: Vec<isize> = sc_abc.clone();
    s_c_lm.extend_from_slice(&sc_xc[1..]);

    let mut it_lm = StrideIter::new(&len_lm, [&s_x_lm, &s_y_lm, &s_c_lm]);
    let mut it_ab = StrideIter::new(&len_ab_p[1..], [&sx_ab[1..], &sy_ab[1..]]);

    let mut off_lm = [0isize; 3];
    it_lm.position(range_lm.start, &mut off_lm);
    for _ in range_lm {
        it_lm.next(&mut off_lm);
        let mut beta1 = beta;
        let mut conj_c1 = conj_c;
        let mut off_ab = [0isize; 2];
        while it_ab.next(&mut off_ab) {
            gemv_kernel(
                &subcomm,
                m0,
                n0,
                alpha,
                conj_x,
                ConstPtr(x.at(off_lm[0] + off_ab[0])),
                rs_x,
                cs_x,
                conj_y,
                ConstPtr(y.at(off_lm[1] + off_ab[1])),
                inc_y,
                beta1,
                conj_c1,
                MutPtr(c.at(off_lm[2])),
                inc_c,
            );
            subcomm.barrier();
            beta1 = T::one();
            conj_c1 = false;
        }
    }
}
