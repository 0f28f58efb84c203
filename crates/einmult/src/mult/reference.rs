//! Reference strategy: plain nested-loop evaluation.
//!
//! Every output element is produced by one scalar dot over the contracted
//! group followed by a single fused update, with no layout planning and no
//! matrix kernels. This is the correctness yardstick the other strategies
//! are tested against, and the fallback selected by
//! [`Backend::Reference`](crate::config::Backend).

use crate::comm::Communicator;
use crate::index::DimGroups;
use crate::iter::StrideIter;
use crate::kernels;
use crate::mult::layout::{prod, zero_strides};
use crate::scalar::Scalar;
use crate::view::{ConstPtr, MutPtr};

#[allow(clippy::too_many_arguments)]
pub(crate) fn mult_ref<T: Scalar>(
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
    let total = prod(&g.len_abc) * prod(&g.len_ac) * prod(&g.len_bc);
    let range = comm.distribute_over_threads(total);
    if range.is_empty() {
        return;
    }

    // one flattened output space: batch dims, then A-free, then B-free
    let mut len: Vec<usize> = Vec::new();
    len.extend_from_slice(&g.len_abc);
    len.extend_from_slice(&g.len_ac);
    len.extend_from_slice(&g.len_bc);

    let mut stride_a: Vec<isize> = Vec::new();
    stride_a.extend_from_slice(&g.stride_a_abc);
    stride_a.extend_from_slice(&g.stride_a_ac);
    stride_a.extend(zero_strides(g.len_bc.len()));

    let mut stride_b: Vec<isize> = Vec::new();
    stride_b.extend_from_slice(&g.stride_b_abc);
    stride_b.extend(zero_strides(g.len_ac.len()));
    stride_b.extend_from_slice(&g.stride_b_bc);

    let mut stride_c: Vec<isize> = Vec::new();
    stride_c.extend_from_slice(&g.stride_c_abc);
    stride_c.extend_from_slice(&g.stride_c_ac);
    stride_c.extend_from_slice(&g.stride_c_bc);

    let mut off = [0isize; 3];
    let mut it = StrideIter::new(&len, [&stride_a, &stride_b, &stride_c]);
    it.position(range.start, &mut off);
    for _ in range {
        it.next(&mut off);
        let sum = kernels::dot_seq(
            &g.len_ab,
            conj_a,
            ConstPtr(a.at(off[0])),
            &g.stride_a_ab,
            conj_b,
            ConstPtr(b.at(off[1])),
            &g.stride_b_ab,
        );
        kernels::add_scalar(alpha, sum, beta, conj_c, MutPtr(c.at(off[2])));
    }
}
