//! Typed, length-prefixed wire encoding: every item in a serialized proof
//! is `<item-type:u8><payload-len:u32-le><payload-bytes>`. This lets a
//! reader skip items it doesn't understand (an older verifier against a
//! newer prover, or vice versa) rather than desyncing on the first
//! unexpected byte.

use crate::error::{StarkError, StarkResult};
use crate::hash::Digest;
use crate::merkle::{AuthPath, AuthStep};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ProofItemType {
    MerkleRoot = 1,
    FieldElement = 2,
    FieldElementVector = 3,
    AuthPath = 4,
    Log2Height = 5,
}

impl ProofItemType {
    fn from_u8(tag: u8) -> StarkResult<Self> {
        match tag {
            1 => Ok(Self::MerkleRoot),
            2 => Ok(Self::FieldElement),
            3 => Ok(Self::FieldElementVector),
            4 => Ok(Self::AuthPath),
            5 => Ok(Self::Log2Height),
            other => Err(StarkError::ProofMalformed(format!(
                "unrecognized proof item type tag {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub enum ProofItem {
    MerkleRoot(Digest),
    FieldElement(u64),
    FieldElementVector(Vec<u64>),
    AuthPath(AuthPath),
    Log2Height(u32),
}

impl ProofItem {
    fn item_type(&self) -> ProofItemType {
        match self {
            ProofItem::MerkleRoot(_) => ProofItemType::MerkleRoot,
            ProofItem::FieldElement(_) => ProofItemType::FieldElement,
            ProofItem::FieldElementVector(_) => ProofItemType::FieldElementVector,
            ProofItem::AuthPath(_) => ProofItemType::AuthPath,
            ProofItem::Log2Height(_) => ProofItemType::Log2Height,
        }
    }

    fn payload(&self) -> Vec<u8> {
        match self {
            ProofItem::MerkleRoot(digest) => digest.to_vec(),
            ProofItem::FieldElement(value) => value.to_le_bytes().to_vec(),
            ProofItem::FieldElementVector(values) => {
                let mut out = Vec::with_capacity(values.len() * 8);
                for v in values {
                    out.extend_from_slice(&v.to_le_bytes());
                }
                out
            }
            ProofItem::AuthPath(path) => {
                let mut out = Vec::new();
                for step in &path.steps {
                    out.extend_from_slice(&step.sibling);
                    out.push(step.sibling_is_left as u8);
                }
                out
            }
            ProofItem::Log2Height(height) => height.to_be_bytes().to_vec(),
        }
    }
}

/// An ordered sequence of proof items — the fully flattened wire form of a
/// [`super::StarkProof`].
#[derive(Clone, Debug, Default)]
pub struct Proof {
    items: Vec<ProofItem>,
}

impl Proof {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ProofItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[ProofItem] {
        &self.items
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for item in &self.items {
            let payload = item.payload();
            out.push(item.item_type() as u8);
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(&payload);
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> StarkResult<Self> {
        let mut items = Vec::new();
        let mut cursor = 0usize;
        while cursor < bytes.len() {
            if cursor + 5 > bytes.len() {
                return Err(StarkError::ProofMalformed(
                    "truncated proof item header".to_string(),
                ));
            }
            let item_type = ProofItemType::from_u8(bytes[cursor])?;
            let len = u32::from_le_bytes(bytes[cursor + 1..cursor + 5].try_into().unwrap()) as usize;
            cursor += 5;
            if cursor + len > bytes.len() {
                return Err(StarkError::ProofMalformed(
                    "proof item payload runs past the end of the buffer".to_string(),
                ));
            }
            let payload = &bytes[cursor..cursor + len];
            items.push(decode_payload(item_type, payload)?);
            cursor += len;
        }
        Ok(Self { items })
    }
}

fn decode_payload(item_type: ProofItemType, payload: &[u8]) -> StarkResult<ProofItem> {
    match item_type {
        ProofItemType::MerkleRoot => {
            let digest: Digest = payload
                .try_into()
                .map_err(|_| StarkError::ProofMalformed("MerkleRoot item is not 32 bytes".to_string()))?;
            Ok(ProofItem::MerkleRoot(digest))
        }
        ProofItemType::FieldElement => {
            let bytes: [u8; 8] = payload.try_into().map_err(|_| {
                StarkError::ProofMalformed("FieldElement item is not 8 bytes".to_string())
            })?;
            Ok(ProofItem::FieldElement(u64::from_le_bytes(bytes)))
        }
        ProofItemType::FieldElementVector => {
            if payload.len() % 8 != 0 {
                return Err(StarkError::ProofMalformed(
                    "FieldElementVector item length is not a multiple of 8".to_string(),
                ));
            }
            let values = payload
                .chunks_exact(8)
                .map(|chunk| u64::from_le_bytes(chunk.try_into().unwrap()))
                .collect();
            Ok(ProofItem::FieldElementVector(values))
        }
        ProofItemType::AuthPath => {
            if payload.len() % 33 != 0 {
                return Err(StarkError::ProofMalformed(
                    "AuthPath item length is not a multiple of 33".to_string(),
                ));
            }
            let steps = payload
                .chunks_exact(33)
                .map(|chunk| {
                    let sibling: Digest = chunk[..32].try_into().unwrap();
                    AuthStep {
                        sibling,
                        sibling_is_left: chunk[32] != 0,
                    }
                })
                .collect();
            Ok(ProofItem::AuthPath(AuthPath { steps }))
        }
        ProofItemType::Log2Height => {
            let bytes: [u8; 4] = payload.try_into().map_err(|_| {
                StarkError::ProofMalformed("Log2Height item is not 4 bytes".to_string())
            })?;
            Ok(ProofItem::Log2Height(u32::from_be_bytes(bytes)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_bytes() {
        let mut proof = Proof::new();
        proof.push(ProofItem::MerkleRoot([7u8; 32]));
        proof.push(ProofItem::FieldElement(12345));
        proof.push(ProofItem::FieldElementVector(vec![1, 2, 3]));
        proof.push(ProofItem::Log2Height(10));
        proof.push(ProofItem::AuthPath(AuthPath {
            steps: vec![AuthStep {
                sibling: [1u8; 32],
                sibling_is_left: true,
            }],
        }));

        let bytes = proof.to_bytes();
        let decoded = Proof::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.items().len(), proof.items().len());
    }

    #[test]
    fn truncated_bytes_are_rejected() {
        let mut proof = Proof::new();
        proof.push(ProofItem::FieldElement(1));
        let mut bytes = proof.to_bytes();
        bytes.pop();
        assert!(Proof::from_bytes(&bytes).is_err());
    }
}
