//! `STARKParameters`: the public configuration both prover and verifier
//! must agree on out of band. Validated once at construction so a
//! malformed configuration is rejected before a single byte of a proof is
//! produced, rather than surfacing as a confusing failure mid-pipeline.

use crate::error::{StarkError, StarkResult};
use crate::hash::HashTag;

#[derive(Clone, Debug)]
pub struct STARKParameters {
    /// Ratio of the low-degree-extension domain to the trace domain.
    /// Must be a power of two, at least 2.
    pub blowup_factor: usize,
    /// Number of FRI query rounds.
    pub fri_number_of_queries: usize,
    /// Coset offset for the LDE domain; must be a field generator-class
    /// element (nonzero, and not itself a root of unity of the trace or
    /// LDE subgroup, checked by the caller building the domain).
    pub coset_offset: u64,
    /// Proof-of-work grinding bits added to FRI's query soundness.
    pub grinding_factor: u32,
    /// FRI domain length below which the engine stops folding and sends
    /// the remaining polynomial directly.
    pub fri_stopping_degree: usize,
    /// Hash backend driving the Fiat-Shamir transcript and every Merkle
    /// commitment in this proof.
    pub hash_tag: HashTag,
    /// Worker count for sharded FRI folding; `0` defers to rayon's default
    /// global-pool granularity.
    pub num_workers: usize,
    /// Target soundness, in bits. Must be at least 80; `fri_number_of_queries`
    /// and `grinding_factor` at the configured `blowup_factor` must actually
    /// reach it, per `fri::security_level`.
    pub security_level: u32,
    /// Zero-knowledge masking rows folded into each trace column before
    /// commitment. Must be at least 1.
    pub num_trace_randomizers: usize,
}

impl STARKParameters {
    pub fn validate(&self) -> StarkResult<()> {
        if self.blowup_factor < 2 || !self.blowup_factor.is_power_of_two() {
            return Err(StarkError::InvalidParameters(format!(
                "blowup_factor must be a power of two >= 2, got {}",
                self.blowup_factor
            )));
        }
        if self.fri_number_of_queries == 0 {
            return Err(StarkError::InvalidParameters(
                "fri_number_of_queries must be positive".to_string(),
            ));
        }
        if self.fri_stopping_degree == 0 || !self.fri_stopping_degree.is_power_of_two() {
            return Err(StarkError::InvalidParameters(format!(
                "fri_stopping_degree must be a power of two >= 1, got {}",
                self.fri_stopping_degree
            )));
        }
        if self.coset_offset == 0 {
            return Err(StarkError::InvalidParameters(
                "coset_offset must be nonzero".to_string(),
            ));
        }
        if self.security_level < 80 {
            return Err(StarkError::InvalidParameters(format!(
                "security_level must target at least 80 bits, got {}",
                self.security_level
            )));
        }
        if self.num_trace_randomizers == 0 {
            return Err(StarkError::InvalidParameters(
                "num_trace_randomizers must be at least 1".to_string(),
            ));
        }
        let achieved = crate::fri::security_level(
            self.blowup_factor,
            self.fri_number_of_queries,
            self.grinding_factor,
        );
        if achieved < self.security_level as f64 {
            return Err(StarkError::InvalidParameters(format!(
                "fri_number_of_queries={} at blowup_factor={} (grinding_factor={}) only reaches {:.1} bits, below the configured security_level of {}",
                self.fri_number_of_queries, self.blowup_factor, self.grinding_factor, achieved, self.security_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rstest::rstest;

    use super::*;

    fn valid() -> STARKParameters {
        STARKParameters {
            blowup_factor: 8,
            fri_number_of_queries: 30,
            coset_offset: 3,
            grinding_factor: 0,
            fri_stopping_degree: 4,
            hash_tag: HashTag::Poseidon,
            num_workers: 4,
            security_level: 80,
            num_trace_randomizers: 2,
        }
    }

    #[test]
    fn well_formed_parameters_pass() {
        assert!(valid().validate().is_ok());
    }

    #[rstest]
    #[case::non_power_of_two_blowup(3, 30, 3, 4)]
    #[case::blowup_of_one(1, 30, 3, 4)]
    #[case::zero_queries(8, 0, 3, 4)]
    #[case::zero_coset_offset(8, 30, 0, 4)]
    #[case::non_power_of_two_stopping_degree(8, 30, 3, 3)]
    #[case::zero_stopping_degree(8, 30, 3, 0)]
    fn malformed_parameters_are_rejected(
        #[case] blowup_factor: usize,
        #[case] fri_number_of_queries: usize,
        #[case] coset_offset: u64,
        #[case] fri_stopping_degree: usize,
    ) {
        let params = STARKParameters {
            blowup_factor,
            fri_number_of_queries,
            coset_offset,
            fri_stopping_degree,
            ..valid()
        };
        assert_matches!(params.validate(), Err(StarkError::InvalidParameters(_)));
    }

    #[test]
    fn security_level_below_eighty_is_rejected() {
        let params = STARKParameters {
            security_level: 79,
            ..valid()
        };
        assert_matches!(params.validate(), Err(StarkError::InvalidParameters(_)));
    }

    #[test]
    fn zero_trace_randomizers_is_rejected() {
        let params = STARKParameters {
            num_trace_randomizers: 0,
            ..valid()
        };
        assert_matches!(params.validate(), Err(StarkError::InvalidParameters(_)));
    }

    #[test]
    fn underprovisioned_fri_queries_fail_the_security_target() {
        let params = STARKParameters {
            fri_number_of_queries: 1,
            security_level: 80,
            ..valid()
        };
        assert_matches!(params.validate(), Err(StarkError::InvalidParameters(_)));
    }
}
