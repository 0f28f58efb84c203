//! BLAS-bridge strategy: materialize, multiply, scatter.
//!
//! For callers that want one classic GEMM per batch element instead of the
//! native strided kernels: the master allocates three column-major scratch
//! panels sized for the flattened groups, every thread cooperates in copying
//! A and B into them (applying operand conjugation during the copy), the
//! master runs `c = alpha * a * b^T` on the contiguous panels, and the gang
//! scatters the panel back into C with the caller's beta. Barriers separate
//! the three phases of each batch element.

use std::cell::UnsafeCell;

use faer::Par;

use crate::comm::Communicator;
use crate::config::Config;
use crate::index::DimGroups;
use crate::iter::StrideIter;
use crate::kernels;
use crate::mult::layout::prod;
use crate::mult::matmul::blocked_gemm;
use crate::scalar::Scalar;
use crate::strides::col_major_strides;
use crate::view::{ConstPtr, MutPtr};

struct Scratch<T> {
    a: UnsafeCell<Vec<T>>,
    b: UnsafeCell<Vec<T>>,
    c: UnsafeCell<Vec<T>>,
}

// Threads write disjoint elements during materialize/scatter and the phases
// are separated by barriers.
unsafe impl<T: Send> Send for Scratch<T> {}
unsafe impl<T: Send> Sync for Scratch<T> {}

impl<T: Scalar> Scratch<T> {
    fn new(na: usize, nb: usize, nc: usize) -> Self {
        Self {
            a: UnsafeCell::new(vec![T::zero(); na.max(1)]),
            b: UnsafeCell::new(vec![T::zero(); nb.max(1)]),
            c: UnsafeCell::new(vec![T::zero(); nc.max(1)]),
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn mult_bridge<T: Scalar>(
    _cfg: &Config,
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
    let m = prod(&g.len_ac);
    let n = prod(&g.len_bc);
    let k = prod(&g.len_ab);

    // packed panels: a_s is m x k, b_s is n x k, c_s is m x n, all col-major
    // over the concatenated group dims
    let mut dims_pa: Vec<usize> = g.len_ac.clone();
    dims_pa.extend_from_slice(&g.len_ab);
    let strides_pa = col_major_strides(&dims_pa);
    let mut dims_pb: Vec<usize> = g.len_bc.clone();
    dims_pb.extend_from_slice(&g.len_ab);
    let strides_pb = col_major_strides(&dims_pb);
    let mut dims_pc: Vec<usize> = g.len_ac.clone();
    dims_pc.extend_from_slice(&g.len_bc);
    let strides_pc = col_major_strides(&dims_pc);

    let mut sa: Vec<isize> = g.stride_a_ac.clone();
    sa.extend_from_slice(&g.stride_a_ab);
    let mut sb: Vec<isize> = g.stride_b_bc.clone();
    sb.extend_from_slice(&g.stride_b_ab);
    let mut sc: Vec<isize> = g.stride_c_ac.clone();
    sc.extend_from_slice(&g.stride_c_bc);

    let scratch = comm.broadcast(|| Scratch::<T>::new(m * k, n * k, m * n));
    let pa = MutPtr(unsafe { (*scratch.a.get()).as_mut_ptr() });
    let pb = MutPtr(unsafe { (*scratch.b.get()).as_mut_ptr() });
    let pc = MutPtr(unsafe { (*scratch.c.get()).as_mut_ptr() });

    let mut it_abc = StrideIter::new(
        &g.len_abc,
        [&g.stride_a_abc, &g.stride_b_abc, &g.stride_c_abc],
    );
    let mut off = [0isize; 3];
    while it_abc.next(&mut off) {
        kernels::add(
            comm,
            &dims_pa,
            T::one(),
            conj_a,
            ConstPtr(a.at(off[0])),
            &sa,
            T::zero(),
            false,
            pa,
            &strides_pa,
        );
        kernels::add(
            comm,
            &dims_pb,
            T::one(),
            conj_b,
            ConstPtr(b.at(off[1])),
            &sb,
            T::zero(),
            false,
            pb,
            &strides_pb,
        );
        comm.barrier();
        if comm.master() {
            let par = if comm.num_threads() > 1 {
                Par::rayon(comm.num_threads())
            } else {
                Par::Seq
            };
            // b_s is n x k col-major, read transposed
            unsafe {
                blocked_gemm(
                    par,
                    m,
                    n,
                    k,
                    alpha,
                    false,
                    pa.as_const().0,
                    1,
                    m as isize,
                    false,
                    pb.as_const().0,
                    n as isize,
                    1,
                    T::zero(),
                    false,
                    pc.0,
                    1,
                    m as isize,
                );
            }
        }
        comm.barrier();
        kernels::add(
            comm,
            &dims_pc,
            T::one(),
            false,
            pc.as_const(),
            &strides_pc,
            beta,
            conj_c,
            MutPtr(c.at(off[2])),
            &sc,
        );
        comm.barrier();
    }
}
