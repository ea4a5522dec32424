//! Block identifier generation.
//!
//! Block ids are the base64 encoding of the 1-based sequence number rendered as
//! a 7-digit, zero-padded decimal. All ids of a blob therefore have the same
//! length, and the decimal form sorts the same way as the sequence numbers.
//! The base64 form does not preserve that order byte-wise, so commit order is
//! always taken from the manifest, never from sorting ids.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{StorageError, StorageResult};

/// Highest sequence number representable in 7 decimal digits.
pub const MAX_BLOCK_SEQUENCE: u32 = 9_999_999;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockId(String);

impl BlockId {
    /// Derive the block id for a 1-based sequence number.
    pub fn from_sequence(sequence: u32) -> StorageResult<Self> {
        if sequence == 0 || sequence > MAX_BLOCK_SEQUENCE {
            return Err(StorageError::InvalidBlockSequence(format!(
                "sequence {} outside 1..={}",
                sequence, MAX_BLOCK_SEQUENCE
            )));
        }

        Ok(BlockId(STANDARD.encode(format!("{:07}", sequence))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 7-digit decimal form before encoding.
    pub fn decimal(&self) -> Option<String> {
        let decoded = STANDARD.decode(&self.0).ok()?;
        let digits = String::from_utf8(decoded).ok()?;
        if digits.len() != 7 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(digits)
    }

    /// Sequence number this id was derived from, if it is one of ours.
    pub fn sequence(&self) -> Option<u32> {
        self.decimal()?.parse().ok()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_block_id() {
        let id = BlockId::from_sequence(1).unwrap();
        // base64("0000001")
        assert_eq!(id.as_str(), "MDAwMDAwMQ==");
        assert_eq!(id.sequence(), Some(1));
    }

    #[test]
    fn test_ids_have_fixed_width() {
        let short = BlockId::from_sequence(7).unwrap();
        let long = BlockId::from_sequence(MAX_BLOCK_SEQUENCE).unwrap();
        assert_eq!(short.as_str().len(), long.as_str().len());
    }

    #[test]
    fn test_decimal_order_matches_numeric_order() {
        let sequences = [1u32, 2, 9, 10, 11, 99, 100, 1_000, 65_535, 1_000_000, 9_999_999];
        let decimals: Vec<String> = sequences
            .iter()
            .map(|&s| BlockId::from_sequence(s).unwrap().decimal().unwrap())
            .collect();

        for window in decimals.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn test_encoded_ids_do_not_sort_numerically() {
        let thirty_nine = BlockId::from_sequence(39).unwrap();
        let forty = BlockId::from_sequence(40).unwrap();
        assert_eq!(thirty_nine.as_str(), "MDAwMDAzOQ==");
        assert_eq!(forty.as_str(), "MDAwMDA0MA==");
        assert!(thirty_nine.as_str() > forty.as_str());
        assert!(thirty_nine.decimal() < forty.decimal());
    }

    #[test]
    fn test_sequence_round_trip() {
        for sequence in [1u32, 4, 40, 123_456, MAX_BLOCK_SEQUENCE] {
            let id = BlockId::from_sequence(sequence).unwrap();
            assert_eq!(id.sequence(), Some(sequence));
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: std::collections::HashSet<BlockId> = (1..=2_000)
            .map(|s| BlockId::from_sequence(s).unwrap())
            .collect();
        assert_eq!(ids.len(), 2_000);
    }

    #[test]
    fn test_out_of_range_sequences_rejected() {
        assert!(BlockId::from_sequence(0).is_err());
        assert!(BlockId::from_sequence(MAX_BLOCK_SEQUENCE + 1).is_err());
    }
}
