//! Vectorized-batch strategy: every dimension is shared by all three
//! operands (pure Hadamard product over the batch space).
//!
//! The innermost batch dimension becomes a fused multiply-accumulate run;
//! the remaining batch dimensions and the run itself are split over the
//! threads as a 2-D partition.

use crate::comm::Communicator;
use crate::index::DimGroups;
use crate::iter::StrideIter;
use crate::kernels;
use crate::mult::layout::{permuted, prod, sort_by_stride};
use crate::scalar::Scalar;
use crate::view::{ConstPtr, MutPtr};

#[allow(clippy::too_many_arguments)]
pub(crate) fn mult_vec<T: Scalar>(
    comm: &Communicator,
    g: &DimGroups,
    alpha: T,
    conj_a: bool,
    a: ConstPtr<T>,
    conj_b: bool,
    b: ConstPtr<T>,
    beta: T,
    conj_c: bool,
    c: MutPtr<T>,
) {
    let reorder = sort_by_stride(&[&g.stride_c_abc, &g.stride_a_abc, &g.stride_b_abc]);
    let len = permuted(&g.len_abc, &reorder);
    let sa = permuted(&g.stride_a_abc, &reorder);
    let sb = permuted(&g.stride_b_abc, &reorder);
    let sc = permuted(&g.stride_c_abc, &reorder);

    let n0 = len[0];
    let n1 = prod(&len[1..]);
    let (inner, outer) = comm.distribute_over_threads_2d(n0, n1);
    if inner.is_empty() || outer.is_empty() {
        return;
    }

    let base = [
        inner.start as isize * sa[0],
        inner.start as isize * sb[0],
        inner.start as isize * sc[0],
    ];
    let mut off = base;
    let mut it = StrideIter::new(&len[1..], [&sa[1..], &sb[1..], &sc[1..]]);
    it.position(outer.start, &mut off);
    for _ in outer {
        it.next(&mut off);
        kernels::fma_run(
            inner.len(),
            alpha,
            conj_a,
            ConstPtr(a.at(off[0])),
            sa[0],
            conj_b,
            ConstPtr(b.at(off[1])),
            sb[0],
            beta,
            conj_c,
            MutPtr(c.at(off[2])),
            sc[0],
        );
    }
}
