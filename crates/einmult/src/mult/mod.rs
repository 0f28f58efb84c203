//! Contraction dispatch.
//!
//! The classified dimension groups select one of seven handlers by which
//! groups are non-trivial: scalar update, batched Hadamard, full reduction
//! (dot), one-sided scale-add, outer product (ger), matrix-vector (gemv,
//! with the operand roles swapped for the AB+BC pairing), and full GEMM.
//! Degenerate extents short-circuit before any strategy runs, and the
//! forced reference / bridge modes bypass the shape dispatch entirely.

pub(crate) mod batched;
pub(crate) mod bridge;
pub(crate) mod gemv;
pub(crate) mod ger;
pub(crate) mod layout;
pub(crate) mod matmul;
pub(crate) mod reference;

use log::trace;

use crate::comm::Communicator;
use crate::config::{Backend, Config};
use crate::index::DimGroups;
use crate::kernels;
use crate::scalar::Scalar;
use crate::view::{ConstPtr, MutPtr};

/// Everything one contraction call needs, in a form that can cross into the
/// worker threads.
pub(crate) struct MultRequest<T: Scalar> {
    pub groups: DimGroups,
    pub alpha: T,
    pub conj_a: bool,
    pub a: ConstPtr<T>,
    pub conj_b: bool,
    pub b: ConstPtr<T>,
    pub beta: T,
    pub conj_c: bool,
    pub c: MutPtr<T>,
}

// The request is shared read-only between the worker threads; the regions
// behind the pointers are partitioned by the collective kernels.
unsafe impl<T: Scalar> Send for MultRequest<T> {}
unsafe impl<T: Scalar> Sync for MultRequest<T> {}

pub(crate) fn mult<T: Scalar>(cfg: &Config, comm: &Communicator, req: &MultRequest<T>) {
    let g = &req.groups;
    let (n_ab, n_ac, n_bc, n_abc) = (g.n_ab(), g.n_ac(), g.n_bc(), g.n_abc());

    // zero extent anywhere in the output: nothing is written
    if n_ac == 0 || n_bc == 0 || n_abc == 0 {
        trace!("mult: empty output, nothing to do");
        return;
    }

    // zero contraction extent: C only sees beta
    if n_ab == 0 {
        trace!("mult: empty contraction, scaling C by beta");
        let mut len: Vec<usize> = g.len_abc.clone();
        len.extend_from_slice(&g.len_ac);
        len.extend_from_slice(&g.len_bc);
        let mut stride_c: Vec<isize> = g.stride_c_abc.clone();
        stride_c.extend_from_slice(&g.stride_c_ac);
        stride_c.extend_from_slice(&g.stride_c_bc);
        if req.beta.is_zero() {
            kernels::set(comm, &len, T::zero(), req.c, &stride_c);
        } else if !req.beta.is_one() || (req.conj_c && T::IS_COMPLEX) {
            kernels::scale(comm, &len, req.beta, req.conj_c, req.c, &stride_c);
        }
        comm.barrier();
        return;
    }

    match cfg.backend() {
        Backend::Reference => {
            trace!("mult: forced reference strategy");
            reference::mult_ref(
                comm, g, req.alpha, req.conj_a, req.a, req.conj_b, req.b, req.beta, req.conj_c,
                req.c,
            );
            comm.barrier();
            return;
        }
        Backend::BlasBridge => {
            trace!("mult: forced bridge strategy");
            bridge::mult_bridge(
                cfg, comm, g, req.alpha, req.conj_a, req.a, req.conj_b, req.b, req.beta,
                req.conj_c, req.c,
            );
            comm.barrier();
            return;
        }
        Backend::Blocked => {}
    }

    let has_ab = n_ab > 1;
    let has_ac = n_ac > 1;
    let has_bc = n_bc > 1;
    let has_abc = n_abc > 1;
    trace!(
        "mult: dispatch ab={} ac={} bc={} abc={}",
        has_ab, has_ac, has_bc, has_abc
    );

    match (has_ab, has_ac, has_bc) {
        (false, false, false) => {
            if has_abc {
                batched::mult_vec(
                    comm, g, req.alpha, req.conj_a, req.a, req.conj_b, req.b, req.beta,
                    req.conj_c, req.c,
                );
            } else if comm.master() {
                kernels::fma_run(
                    1, req.alpha, req.conj_a, req.a, 0, req.conj_b, req.b, 0, req.beta,
                    req.conj_c, req.c, 0,
                );
            }
        }
        (true, false, false) => {
            // full reduction per batch element
            let mut it = crate::iter::StrideIter::new(
                &g.len_abc,
                [&g.stride_a_abc, &g.stride_b_abc, &g.stride_c_abc],
            );
            let mut off = [0isize; 3];
            while it.next(&mut off) {
                let sum = kernels::dot(
                    comm,
                    &g.len_ab,
                    req.conj_a,
                    ConstPtr(req.a.at(off[0])),
                    &g.stride_a_ab,
                    req.conj_b,
                    ConstPtr(req.b.at(off[1])),
                    &g.stride_b_ab,
                );
                if comm.master() {
                    kernels::add_scalar(
                        req.alpha,
                        sum,
                        req.beta,
                        req.conj_c,
                        MutPtr(req.c.at(off[2])),
                    );
                }
            }
        }
        (false, true, false) => {
            // scale A's free vector by the (batched) scalar of B
            let mut it = crate::iter::StrideIter::new(
                &g.len_abc,
                [&g.stride_a_abc, &g.stride_b_abc, &g.stride_c_abc],
            );
            let mut off = [0isize; 3];
            while it.next(&mut off) {
                let bv = unsafe { crate::scalar::maybe_conj(req.conj_b, *req.b.at(off[1])) };
                kernels::add(
                    comm,
                    &g.len_ac,
                    req.alpha * bv,
                    req.conj_a,
                    ConstPtr(req.a.at(off[0])),
                    &g.stride_a_ac,
                    req.beta,
                    req.conj_c,
                    MutPtr(req.c.at(off[2])),
                    &g.stride_c_ac,
                );
            }
        }
        (false, false, true) => {
            let mut it = crate::iter::StrideIter::new(
                &g.len_abc,
                [&g.stride_a_abc, &g.stride_b_abc, &g.stride_c_abc],
            );
            let mut off = [0isize; 3];
            while it.next(&mut off) {
                let av = unsafe { crate::scalar::maybe_conj(req.conj_a, *req.a.at(off[0])) };
                kernels::add(
                    comm,
                    &g.len_bc,
                    req.alpha * av,
                    req.conj_b,
                    ConstPtr(req.b.at(off[1])),
                    &g.stride_b_bc,
                    req.beta,
                    req.conj_c,
                    MutPtr(req.c.at(off[2])),
                    &g.stride_c_bc,
                );
            }
        }
        (false, true, true) => {
            ger::mult_ger(
                cfg,
                comm,
                &g.len_ac,
                &g.len_bc,
                &g.len_abc,
                req.alpha,
                req.conj_a,
                req.a,
                &g.stride_a_ac,
                &g.stride_a_abc,
                req.conj_b,
                req.b,
                &g.stride_b_bc,
                &g.stride_b_abc,
                req.beta,
                req.conj_c,
                req.c,
                &g.stride_c_ac,
                &g.stride_c_bc,
                &g.stride_c_abc,
            );
        }
        (true, true, false) => {
            // A is the matrix, B the vector
            gemv::mult_gemv(
                cfg,
                comm,
                &g.len_ab,
                &g.len_ac,
                &g.len_abc,
                req.alpha,
                req.conj_a,
                req.a,
                &g.stride_a_ab,
                &g.stride_a_ac,
                &g.stride_a_abc,
                req.conj_b,
                req.b,
                &g.stride_b_ab,
                &g.stride_b_abc,
                req.beta,
                req.conj_c,
                req.c,
                &g.stride_c_ac,
                &g.stride_c_abc,
            );
        }
        (true, false, true) => {
            // B is the matrix, A the vector
            gemv::mult_gemv(
                cfg,
                comm,
                &g.len_ab,
                &g.len_bc,
                &g.len_abc,
                req.alpha,
                req.conj_b,
                req.b,
                &g.stride_b_ab,
                &g.stride_b_bc,
                &g.stride_b_abc,
                req.conj_a,
                req.a,
                &g.stride_a_ab,
                &g.stride_a_abc,
                req.beta,
                req.conj_c,
                req.c,
                &g.stride_c_bc,
                &g.stride_c_abc,
            );
        }
        (true, true, true) => {
            matmul::mult_gemm(
                cfg, comm, g, req.alpha, req.conj_a, req.a, req.conj_b, req.b, req.beta,
                req.conj_c, req.c,
            );
        }
    }
    comm.barrier();
}
