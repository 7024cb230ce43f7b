//! Proof-of-work grinding: before sampling FRI query indices, the prover
//! must find a nonce whose hash (chained onto everything sent so far) has
//! at least `grinding_factor` leading zero bits. This costs the prover
//! `2^grinding_factor` work on average and costs the verifier one hash
//! check, raising the bits of security the query phase alone would need to
//! provide.

use crate::channel::Channel;
use crate::error::{StarkError, StarkResult};
use crate::hash::HashTag;

/// Searches nonces `0, 1, 2, ...` until `hash(transcript || nonce)` has at
/// least `grinding_factor` leading zero bits, sends the winning nonce
/// through `channel`, and returns it. A `grinding_factor` of zero always
/// succeeds immediately with nonce `0`.
pub fn grind(channel: &mut Channel, tag: HashTag, grinding_factor: u32) -> StarkResult<u64> {
    if grinding_factor == 0 {
        channel.send_usize(0);
        return Ok(0);
    }
    let transcript_so_far = channel.transcript().to_vec();
    for nonce in 0..u64::MAX {
        if leading_zero_bits(&transcript_so_far, nonce, tag) >= grinding_factor {
            channel.send_usize(nonce as usize);
            return Ok(nonce);
        }
    }
    Err(StarkError::RandomnessFailure(
        "grinding: exhausted the nonce space without meeting the target".to_string(),
    ))
}

/// Recomputes the same check the prover ran, given the nonce it claims
/// satisfied it.
pub fn verify_grind(
    transcript_so_far: &[u8],
    nonce: u64,
    tag: HashTag,
    grinding_factor: u32,
) -> StarkResult<()> {
    if leading_zero_bits(transcript_so_far, nonce, tag) < grinding_factor {
        return Err(StarkError::FriReject(
            "proof-of-work nonce does not meet the grinding target".to_string(),
        ));
    }
    Ok(())
}

fn leading_zero_bits(transcript_so_far: &[u8], nonce: u64, tag: HashTag) -> u32 {
    let mut hasher = crate::hash::build(tag);
    hasher.absorb(transcript_so_far);
    hasher.absorb(&nonce.to_be_bytes());
    let digest = hasher.squeeze(32);
    let mut zeros = 0u32;
    for byte in digest {
        if byte == 0 {
            zeros += 8;
        } else {
            zeros += byte.leading_zeros();
            break;
        }
    }
    zeros
}
