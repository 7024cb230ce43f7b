//! Conjectured soundness error of a FRI instance, in bits.
//!
//! Each of `num_queries` independent random queries rejects a proof that is
//! `rho`-far from the code with probability roughly `1 - rho` (`rho = 1 /
//! blowup_factor`), so the overall soundness error is about `rho ^
//! num_queries`; `grinding_factor` bits of proof-of-work multiply that error
//! down further. In bits, that is `-log2(rho) * num_queries +
//! grinding_factor`.
//!
//! `f64::log2` is used directly; there is no reason to hand-roll a
//! natural-log Taylor series to get there.
pub fn security_level(blowup_factor: usize, num_queries: usize, grinding_factor: u32) -> f64 {
    debug_assert!(blowup_factor > 1, "blowup_factor must exceed 1");
    let rho = 1.0 / blowup_factor as f64;
    let per_query_bits = -rho.log2();
    per_query_bits * num_queries as f64 + grinding_factor as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn more_queries_strictly_increases_security() {
        let low = security_level(8, 20, 0);
        let high = security_level(8, 40, 0);
        assert!(high > low);
    }

    #[test]
    fn larger_blowup_strictly_increases_security_per_query() {
        let low = security_level(2, 20, 0);
        let high = security_level(16, 20, 0);
        assert!(high > low);
    }

    #[test]
    fn grinding_adds_linearly() {
        let base = security_level(8, 20, 0);
        let grinded = security_level(8, 20, 16);
        assert!((grinded - base - 16.0).abs() < 1e-9);
    }
}
