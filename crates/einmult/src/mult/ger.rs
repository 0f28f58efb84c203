//! Outer-product strategy: AC+BC with no contracted group.
//!
//! C gets the rank-one update alpha * op(a) op(b)^T, batched over ABC and
//! over the outer dimensions of each free group. Threads of a gang take a
//! 2-D partition of the (m, n) tile; conjugation of C's prior contents
//! happens together with the beta scaling, before accumulation.

use crate::comm::{Communicator, partition_2x2};
use crate::config::Config;
use crate::iter::StrideIter;
use crate::kernels;
use crate::mult::layout::{permuted, prod, sort_by_stride, zero_strides};
use crate::scalar::{Scalar, maybe_conj};
use crate::view::{ConstPtr, MutPtr};

/// One ger: C := alpha * op(a) op(b)^T + beta * op(C), C of shape m x n.
///
/// Collective over `comm`; each thread owns a rectangular tile of C.
#[allow(clippy::too_many_arguments)]
fn ger_kernel<T: Scalar>(
    comm: &Communicator,
    m: usize,
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
    rs_c: isize,
    cs_c: isize,
) {
    let (rows, cols) = comm.distribute_over_threads_2d(m, n);
    if rows.is_empty() || cols.is_empty() {
        return;
    }
    let a0 = ConstPtr(a.at(rows.start as isize * inc_a));
    let b0 = ConstPtr(b.at(cols.start as isize * inc_b));
    let c0 = MutPtr(c.at(rows.start as isize * rs_c + cols.start as isize * cs_c));

    if rs_c.abs() <= cs_c.abs() {
        for j in 0..cols.len() as isize {
            let bj = unsafe { alpha * maybe_conj(conj_b, *b0.at(j * inc_b)) };
            kernels::axpby_run(
                rows.len(),
                bj,
                conj_a,
                a0,
                inc_a,
                beta,
                conj_c,
                MutPtr(c0.at(j * cs_c)),
                rs_c,
            );
        }
    } else {
        for i in 0..rows.len() as isize {
            let ai = unsafe { alpha * maybe_conj(conj_a, *a0.at(i * inc_a)) };
            kernels::axpby_run(
                cols.len(),
                ai,
                conj_b,
                b0,
                inc_b,
                beta,
                conj_c,
                MutPtr(c0.at(i * rs_c)),
                cs_c,
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn mult_ger<T: Scalar>(
    cfg: &Config,
    comm: &Communicator,
    len_ac: &[usize],
    len_bc: &[usize],
    len_abc: &[usize],
    alpha: T,
    conj_a: bool,
    a: ConstPtr<T>,
    stride_a_ac: &[isize],
    stride_a_abc: &[isize],
    conj_b: bool,
    b: ConstPtr<T>,
    stride_b_bc: &[isize],
    stride_b_abc: &[isize],
    beta: T,
    conj_c: bool,
    c: MutPtr<T>,
    stride_c_ac: &[isize],
    stride_c_bc: &[isize],
    stride_c_abc: &[isize],
) {
    let reorder_ac = sort_by_stride(&[stride_c_ac, stride_a_ac]);
    let reorder_bc = sort_by_stride(&[stride_c_bc, stride_b_bc]);
    let reorder_abc = sort_by_stride(&[stride_c_abc, stride_a_abc, stride_b_abc]);

    let len_ac_p = permuted(len_ac, &reorder_ac);
    let sa_ac = permuted(stride_a_ac, &reorder_ac);
    let sc_ac = permuted(stride_c_ac, &reorder_ac);
    let len_bc_p = permuted(len_bc, &reorder_bc);
    let sb_bc = permuted(stride_b_bc, &reorder_bc);
    let sc_bc = permuted(stride_c_bc, &reorder_bc);
    let len_abc_p = permuted(len_abc, &reorder_abc);
    let sa_abc = permuted(stride_a_abc, &reorder_abc);
    let sb_abc = permuted(stride_b_abc, &reorder_abc);
    let sc_abc = permuted(stride_c_abc, &reorder_abc);

    let m0 = len_ac_p[0];
    let inc_a = sa_ac[0];
    let rs_c = sc_ac[0];
    let n0 = len_bc_p[0];
    let inc_b = sb_bc[0];
    let cs_c = sc_bc[0];

    let (m, n, l) = (prod(&len_ac_p), prod(&len_bc_p), prod(&len_abc_p));
    if comm.master() {
        cfg.add_flops(2 * (m * n * l) as u64);
    }

    let outer = prod(&len_ac_p[1..]) * prod(&len_bc_p[1..]);
    let (nt_l, _nt_mn) = partition_2x2(comm.num_threads(), l * outer, m0 * n0);
    let subcomm = comm.gang(nt_l);
    let range = subcomm.distribute_over_gangs(l * outer);
    if range.is_empty() {
        return;
    }

    let mut len_out: Vec<usize> = len_abc_p.clone();
    len_out.extend_from_slice(&len_ac_p[1..]);
    len_out.extend_from_slice(&len_bc_p[1..]);
    let mut s_a: Vec<isize> = sa_abc.clone();
    s_a.extend_from_slice(&sa_ac[1..]);
    s_a.extend(zero_strides(len_bc_p.len() - 1));
    let mut s_b: Vec<isize> = sb_abc.clone();
    s_b.extend(zero_strides(len_ac_p.len() - 1));
    s_b.extend_from_slice(&sb_bc[1..]);
    let mut s_c: Vec<isize> = sc_abc.clone();
    s_c.extend_from_slice(&sc_ac[1..]);
    s_c.extend_from_slice(&sc_bc[1..]);

    let mut it = StrideIter::new(&len_out, [&s_a, &s_b, &s_c]);
    let mut off = [0isize; 3];
    it.position(range.start, &mut off);
    for _ in range {
        it.next(&mut off);
        ger_kernel(
            &subcomm,
            m0,
            n0,
            alpha,
            conj_a,
            ConstPtr(a.at(off[0])),
            inc_a,
            conj_b,
            ConstPtr(b.at(off[1])),
            inc_b,
            beta,
            conj_c,
            MutPtr(c.at(off[2])),
            rs_c,
            cs_c,
        );
    }
}
