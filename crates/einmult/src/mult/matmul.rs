//! GEMM strategy: the full AB+AC+BC case on faer's blocked kernel.
//!
//! The innermost dimension of each group becomes one matrix axis of a
//! strided GEMM; remaining dimensions of the free groups are traversed as
//! sub-GEMM blocks distributed over the gang, remaining contracted
//! dimensions accumulate into the same C block with beta folded to one
//! after the first pass. Batch dimensions are split across gangs.

use faer::linalg::matmul::matmul_with_conj;
use faer::{Accum, Conj, MatMut, MatRef, Par};

use crate::comm::{Communicator, partition_2x2};
use crate::config::Config;
use crate::index::DimGroups;
use crate::iter::StrideIter;
use crate::mult::layout::{
    needs_3d_pack, permuted, prod, rotate_unit_to_front, sort_by_stride, unit_dim, zero_strides,
};
use crate::scalar::{Scalar, maybe_conj};
use crate::view::{ConstPtr, MutPtr};

fn conj_flag(conj: bool) -> Conj {
    if conj { Conj::Yes } else { Conj::No }
}

/// One strided GEMM: C := alpha * op(A) op(B) + beta * op(C).
///
/// faer's kernel accumulates with unit beta (`Accum::Add`) or overwrites
/// (`Accum::Replace`); any other beta, and any conjugation of C's existing
/// contents, is applied to the C block up front.
///
/// # Safety
///
/// The three pointer/stride triples must address valid, non-overlapping
/// (C vs. A and B) regions for the given dimensions.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn blocked_gemm<T: Scalar>(
    par: Par,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    conj_a: bool,
    a: *const T,
    rs_a: isize,
    cs_a: isize,
    conj_b: bool,
    b: *const T,
    rs_b: isize,
    cs_b: isize,
    beta: T,
    conj_c: bool,
    c: *mut T,
    rs_c: isize,
    cs_c: isize,
) {
    let accum = if beta.is_zero() {
        Accum::Replace
    } else {
        if (conj_c && T::IS_COMPLEX) || !beta.is_one() {
            for j in 0..n as isize {
                for i in 0..m as isize {
                    let p = c.wrapping_offset(i * rs_c + j * cs_c);
                    *p = beta * maybe_conj(conj_c, *p);
                }
            }
        }
        Accum::Add
    };
    let lhs = MatRef::from_raw_parts(a, m, k, rs_a, cs_a);
    let rhs = MatRef::from_raw_parts(b, k, n, rs_b, cs_b);
    let dst = MatMut::from_raw_parts_mut(c, m, n, rs_c, cs_c);
    matmul_with_conj(
        dst,
        accum,
        lhs,
        conj_flag(conj_a),
        rhs,
        conj_flag(conj_b),
        alpha,
        par,
    );
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn mult_gemm<T: Scalar>(
    cfg: &Config,
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
    let mut reorder_ac = sort_by_stride(&[&g.stride_c_ac, &g.stride_a_ac]);
    let mut reorder_bc = sort_by_stride(&[&g.stride_c_bc, &g.stride_b_bc]);
    let mut reorder_ab = sort_by_stride(&[&g.stride_a_ab, &g.stride_b_ab]);
    let reorder_abc = sort_by_stride(&[&g.stride_c_abc, &g.stride_a_abc, &g.stride_b_abc]);

    // when an operand's unit-stride dimension is buried by the C-major sort,
    // pull it next to the front so the inner walk stays packable
    let unit_a_ac = unit_dim(&g.stride_a_ac, &reorder_ac);
    if needs_3d_pack(unit_a_ac, reorder_ac.len()) {
        rotate_unit_to_front(&mut reorder_ac, unit_a_ac);
    }
    let unit_b_bc = unit_dim(&g.stride_b_bc, &reorder_bc);
    if needs_3d_pack(unit_b_bc, reorder_bc.len()) {
        rotate_unit_to_front(&mut reorder_bc, unit_b_bc);
    }
    let unit_a_ab = unit_dim(&g.stride_a_ab, &reorder_ab);
    let unit_b_ab = unit_dim(&g.stride_b_ab, &reorder_ab);
    if needs_3d_pack(unit_a_ab, reorder_ab.len()) {
        rotate_unit_to_front(&mut reorder_ab, unit_a_ab);
    } else if needs_3d_pack(unit_b_ab, reorder_ab.len()) {
        rotate_unit_to_front(&mut reorder_ab, unit_b_ab);
    }

    let len_ac = permuted(&g.len_ac, &reorder_ac);
    let sa_ac = permuted(&g.stride_a_ac, &reorder_ac);
    let sc_ac = permuted(&g.stride_c_ac, &reorder_ac);
    let len_bc = permuted(&g.len_bc, &reorder_bc);
    let sb_bc = permuted(&g.stride_b_bc, &reorder_bc);
    let sc_bc = permuted(&g.stride_c_bc, &reorder_bc);
    let len_ab = permuted(&g.len_ab, &reorder_ab);
    let sa_ab = permuted(&g.stride_a_ab, &reorder_ab);
    let sb_ab = permuted(&g.stride_b_ab, &reorder_ab);
    let len_abc = permuted(&g.len_abc, &reorder_abc);
    let sa_abc = permuted(&g.stride_a_abc, &reorder_abc);
    let sb_abc = permuted(&g.stride_b_abc, &reorder_abc);
    let sc_abc = permuted(&g.stride_c_abc, &reorder_abc);

    let (m, n, k, l) = (prod(&len_ac), prod(&len_bc), prod(&len_ab), prod(&len_abc));
    if comm.master() {
        cfg.add_flops(2 * (m * n * k * l) as u64);
    }

    let m0 = len_ac[0];
    let rs_a = sa_ac[0];
    let rs_c = sc_ac[0];
    let n0 = len_bc[0];
    let cs_b = sb_bc[0];
    let cs_c = sc_bc[0];
    let k0 = len_ab[0];
    let cs_a = sa_ab[0];
    let rs_b = sb_ab[0];

    let (nt_l, _nt_mn) = partition_2x2(comm.num_threads(), l, m * n);
    let subcomm = comm.gang(nt_l);
    let range_l = subcomm.distribute_over_gangs(l);
    if range_l.is_empty() {
        return;
    }

    let outer_mn = prod(&len_ac[1..]) * prod(&len_bc[1..]);
    let range_mn = subcomm.distribute_over_threads(outer_mn);
    // a gang with nothing to split inside one GEMM hands the parallelism to
    // faer instead
    let par = if outer_mn == 1 && subcomm.num_threads() > 1 {
        Par::rayon(subcomm.num_threads())
    } else {
        Par::Seq
    };

    let mut len_mn: Vec<usize> = len_ac[1..].to_vec();
    len_mn.extend_from_slice(&len_bc[1..]);
    let mut s_a_mn: Vec<isize> = sa_ac[1..].to_vec();
    s_a_mn.extend(zero_strides(len_bc.len() - 1));
    let mut s_b_mn: Vec<isize> = zero_strides(len_ac.len() - 1);
    s_b_mn.extend_from_slice(&sb_bc[1..]);
    let mut s_c_mn: Vec<isize> = sc_ac[1..].to_vec();
    s_c_mn.extend_from_slice(&sc_bc[1..]);

    let mut it_abc = StrideIter::new(&len_abc, [&sa_abc, &sb_abc, &sc_abc]);
    let mut it_mn = StrideIter::new(&len_mn, [&s_a_mn, &s_b_mn, &s_c_mn]);
    let mut it_ab = StrideIter::new(&len_ab[1..], [&sa_ab[1..], &sb_ab[1..]]);

    let mut off_abc = [0isize; 3];
    it_abc.position(range_l.start, &mut off_abc);
    for _ in range_l {
        it_abc.next(&mut off_abc);
        if range_mn.is_empty() {
            continue;
        }
        let mut off_mn = [0isize; 3];
        it_mn.position(range_mn.start, &mut off_mn);
        for _ in range_mn.clone() {
            it_mn.next(&mut off_mn);
            let mut beta1 = beta;
            let mut conj_c1 = conj_c;
            let mut off_ab = [0isize; 2];
            while it_ab.next(&mut off_ab) {
                unsafe {
                    blocked_gemm(
                        par,
                        m0,
                        n0,
                        k0,
                        alpha,
                        conj_a,
                        a.at(off_abc[0] + off_mn[0] + off_ab[0]),
                        rs_a,
                        cs_a,
                        conj_b,
                        b.at(off_abc[1] + off_mn[1] + off_ab[1]),
                        rs_b,
                        cs_b,
                        beta1,
                        conj_c1,
                        c.at(off_abc[2] + off_mn[2]),
                        rs_c,
                        cs_c,
                    );
                }
                beta1 = T::one();
                conj_c1 = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::c64;
    use approx::assert_relative_eq;

    #[test]
    fn test_blocked_gemm_basic() {
        // 2x2 * 2x2 col-major
        let a = vec![1.0f64, 3.0, 2.0, 4.0]; // [[1,2],[3,4]]
        let b = vec![5.0f64, 7.0, 6.0, 8.0]; // [[5,6],[7,8]]
        let mut c = vec![0.0f64; 4];
        unsafe {
            blocked_gemm(
                Par::Seq,
                2,
                2,
                2,
                1.0,
                false,
                a.as_ptr(),
                1,
                2,
                false,
                b.as_ptr(),
                1,
                2,
                0.0,
                false,
                c.as_mut_ptr(),
                1,
                2,
            );
        }
        // [[1,2],[3,4]] * [[5,6],[7,8]] = [[19,22],[43,50]]
        assert_relative_eq!(c[0], 19.0);
        assert_relative_eq!(c[1], 43.0);
        assert_relative_eq!(c[2], 22.0);
        assert_relative_eq!(c[3], 50.0);
    }

    #[test]
    fn test_blocked_gemm_beta_scaling() {
        let a = vec![1.0f64];
        let b = vec![1.0f64];
        let mut c = vec![10.0f64];
        unsafe {
            blocked_gemm(
                Par::Seq,
                1,
                1,
                1,
                2.0,
                false,
                a.as_ptr(),
                1,
                1,
                false,
                b.as_ptr(),
                1,
                1,
                0.5,
                false,
                c.as_mut_ptr(),
                1,
                1,
            );
        }
        assert_relative_eq!(c[0], 2.0 + 5.0);
    }

    #[test]
    fn test_blocked_gemm_conj_c() {
        let a = vec![c64::new(1.0, 0.0)];
        let b = vec![c64::new(1.0, 0.0)];
        let mut c = vec![c64::new(2.0, 3.0)];
        unsafe {
            blocked_gemm(
                Par::Seq,
                1,
                1,
                1,
                c64::new(1.0, 0.0),
                false,
                a.as_ptr(),
                1,
                1,
                false,
                b.as_ptr(),
                1,
                1,
                c64::new(1.0, 0.0),
                true,
                c.as_mut_ptr(),
                1,
                1,
            );
        }
        // 1 + conj(2+3i)
        assert_relative_eq!(c[0].re, 3.0);
        assert_relative_eq!(c[0].im, -3.0);
    }

    #[test]
    fn test_blocked_gemm_transposed_strides() {
        // A stored row-major (rs=2, cs=1)
        let a = vec![1.0f64, 2.0, 3.0, 4.0]; // [[1,2],[3,4]] row-major
        let b = vec![1.0f64, 0.0, 0.0, 1.0]; // identity col-major
        let mut c = vec![0.0f64; 4];
        unsafe {
            blocked_gemm(
                Par::Seq,
                2,
                2,
                2,
                1.0,
                false,
                a.as_ptr(),
                2,
                1,
                false,
                b.as_ptr(),
                1,
                2,
                0.0,
                false,
                c.as_mut_ptr(),
                1,
                2,
            );
        }
        assert_relative_eq!(c[0], 1.0);
        assert_relative_eq!(c[1], 3.0);
        assert_relative_eq!(c[2], 2.0);
        assert_relative_eq!(c[3], 4.0);
    }
}
