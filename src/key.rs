use std::str::FromStr;

use uuid::Uuid;

use crate::error::NeatIdError;

/// A record key in one of the shapes a codec can encode.
///
/// UUID keys travel on the wire as four 32-bit unsigned words, so a
/// compound key of exactly four words that all fit in 32 bits decodes as a
/// `Uuid`. Keys of that shape are indistinguishable after a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A single non-negative integer key.
    Int(u64),
    /// An ordered compound key, e.g. a composite primary key.
    Compound(Vec<u64>),
    /// A UUID key, rendered lowercase hyphenated.
    Uuid(Uuid),
}

impl Key {
    /// Flattens the key into the integer sequence handed to the
    /// permutation codec.
    pub fn to_numbers(&self) -> Vec<u64> {
        match self {
            Self::Int(n) => vec![*n],
            Self::Compound(ns) => ns.clone(),
            Self::Uuid(u) => uuid_words(u).to_vec(),
        }
    }

    /// Rebuilds a key from a decoded integer sequence.
    ///
    /// Four words that all fit in 32 bits reassemble as a UUID, a single
    /// element is a scalar key, anything else stays compound.
    pub(crate) fn from_numbers(numbers: Vec<u64>) -> Self {
        if numbers.len() == 4 && numbers.iter().all(|n| u32::try_from(*n).is_ok()) {
            return Self::Uuid(words_to_uuid(&numbers));
        }
        if numbers.len() == 1 {
            return Self::Int(numbers[0]);
        }
        Self::Compound(numbers)
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&[u64]> {
        match self {
            Self::Compound(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            _ => None,
        }
    }
}

impl From<u64> for Key {
    fn from(n: u64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for Key {
    fn from(n: u32) -> Self {
        Self::Int(u64::from(n))
    }
}

impl From<Vec<u64>> for Key {
    fn from(ns: Vec<u64>) -> Self {
        Self::Compound(ns)
    }
}

impl From<&[u64]> for Key {
    fn from(ns: &[u64]) -> Self {
        Self::Compound(ns.to_vec())
    }
}

impl From<Uuid> for Key {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

/// Parses a canonical hyphenated UUID string (8-4-4-4-12 hex groups,
/// case-insensitive). Other key shapes are built with `From`, never parsed
/// from strings.
impl FromStr for Key {
    type Err = NeatIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_canonical_uuid(s) {
            return Err(NeatIdError::InvalidIdentifier { id: s.to_string() });
        }
        let uuid = Uuid::parse_str(s).map_err(|_| NeatIdError::InvalidIdentifier {
            id: s.to_string(),
        })?;
        Ok(Self::Uuid(uuid))
    }
}

/// Splits a UUID into four 32-bit words, big-endian. Equivalent to taking
/// the 32 hex digits of the dash-stripped form in groups of 8.
fn uuid_words(uuid: &Uuid) -> [u64; 4] {
    let bytes = uuid.as_bytes();
    let mut words = [0u64; 4];
    for (i, chunk) in bytes.chunks_exact(4).enumerate() {
        let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        words[i] = u64::from(word);
    }
    words
}

/// Inverse of `uuid_words`. Callers must have checked that every word fits
/// in 32 bits.
fn words_to_uuid(words: &[u64]) -> Uuid {
    let mut bytes = [0u8; 16];
    for (i, word) in words.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let be = (*word as u32).to_be_bytes();
        bytes[i * 4..i * 4 + 4].copy_from_slice(&be);
    }
    Uuid::from_bytes(bytes)
}

/// Strict canonical-form check: `Uuid::parse_str` also accepts simple,
/// braced, and URN forms, which are not valid key strings here.
fn is_canonical_uuid(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    s.bytes().enumerate().all(|(i, b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "123e4567-e89b-12d3-a456-426614174000";

    // ========== Conversions into Key ==========

    #[test]
    fn test_from_u64() {
        assert_eq!(Key::from(42u64), Key::Int(42));
    }

    #[test]
    fn test_from_u32() {
        assert_eq!(Key::from(7u32), Key::Int(7));
    }

    #[test]
    fn test_from_vec() {
        assert_eq!(Key::from(vec![1, 2, 3]), Key::Compound(vec![1, 2, 3]));
    }

    #[test]
    fn test_from_slice() {
        let slice: &[u64] = &[4, 5];
        assert_eq!(Key::from(slice), Key::Compound(vec![4, 5]));
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::parse_str(SAMPLE).unwrap();
        assert_eq!(Key::from(uuid), Key::Uuid(uuid));
    }

    // ========== UUID string parsing ==========

    #[test]
    fn test_parse_canonical_uuid() {
        let key: Key = SAMPLE.parse().unwrap();
        assert_eq!(key.as_uuid().map(Uuid::to_string), Some(SAMPLE.to_string()));
    }

    #[test]
    fn test_parse_uuid_case_insensitive() {
        let upper = SAMPLE.to_uppercase();
        let key: Key = upper.parse().unwrap();
        // Normalized to lowercase on the way out
        assert_eq!(key.as_uuid().map(Uuid::to_string), Some(SAMPLE.to_string()));
    }

    #[test]
    fn test_parse_rejects_simple_form() {
        let simple = SAMPLE.replace('-', "");
        assert!(simple.parse::<Key>().is_err());
    }

    #[test]
    fn test_parse_rejects_braced_form() {
        let braced = format!("{{{SAMPLE}}}");
        assert!(braced.parse::<Key>().is_err());
    }

    #[test]
    fn test_parse_rejects_misplaced_hyphens() {
        assert!("123e45-67e89b-12d3-a456-426614174000".parse::<Key>().is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!("123e4567-e89b-12d3-a456-42661417400g".parse::<Key>().is_err());
    }

    #[test]
    fn test_parse_rejects_plain_integer_string() {
        let err = "42".parse::<Key>().unwrap_err();
        assert_eq!(
            err,
            NeatIdError::InvalidIdentifier {
                id: "42".to_string()
            }
        );
    }

    // ========== Wire shape ==========

    #[test]
    fn test_int_to_numbers() {
        assert_eq!(Key::Int(9).to_numbers(), vec![9]);
    }

    #[test]
    fn test_compound_to_numbers() {
        assert_eq!(Key::Compound(vec![1, 1]).to_numbers(), vec![1, 1]);
    }

    #[test]
    fn test_uuid_to_numbers_known_words() {
        let key: Key = SAMPLE.parse().unwrap();
        assert_eq!(
            key.to_numbers(),
            vec![0x123e_4567, 0xe89b_12d3, 0xa456_4266, 0x1417_4000]
        );
    }

    #[test]
    fn test_uuid_words_roundtrip() {
        let key: Key = SAMPLE.parse().unwrap();
        assert_eq!(Key::from_numbers(key.to_numbers()), key);
    }

    #[test]
    fn test_nil_uuid_words() {
        let key = Key::Uuid(Uuid::nil());
        assert_eq!(key.to_numbers(), vec![0, 0, 0, 0]);
        assert_eq!(Key::from_numbers(vec![0, 0, 0, 0]), key);
    }

    // ========== Denormalization rules ==========

    #[test]
    fn test_from_numbers_single_is_int() {
        assert_eq!(Key::from_numbers(vec![42]), Key::Int(42));
    }

    #[test]
    fn test_from_numbers_two_is_compound() {
        assert_eq!(Key::from_numbers(vec![1, 2]), Key::Compound(vec![1, 2]));
    }

    #[test]
    fn test_from_numbers_five_is_compound() {
        assert_eq!(
            Key::from_numbers(vec![1, 2, 3, 4, 5]),
            Key::Compound(vec![1, 2, 3, 4, 5])
        );
    }

    #[test]
    fn test_from_numbers_four_small_words_is_uuid() {
        let key = Key::from_numbers(vec![1, 2, 3, 4]);
        assert!(key.as_uuid().is_some());
        assert_eq!(
            key.as_uuid().map(Uuid::to_string),
            Some("00000001-0000-0002-0000-000300000004".to_string())
        );
    }

    #[test]
    fn test_from_numbers_four_with_large_word_is_compound() {
        let large = u64::from(u32::MAX) + 1;
        assert_eq!(
            Key::from_numbers(vec![1, 2, 3, large]),
            Key::Compound(vec![1, 2, 3, large])
        );
    }

    #[test]
    fn test_from_numbers_four_max_u32_is_uuid() {
        let max = u64::from(u32::MAX);
        let key = Key::from_numbers(vec![max, max, max, max]);
        assert_eq!(
            key.as_uuid().map(Uuid::to_string),
            Some("ffffffff-ffff-ffff-ffff-ffffffffffff".to_string())
        );
    }

    // ========== Accessors ==========

    #[test]
    fn test_as_int() {
        assert_eq!(Key::Int(3).as_int(), Some(3));
        assert_eq!(Key::Compound(vec![3]).as_int(), None);
    }

    #[test]
    fn test_as_compound() {
        assert_eq!(Key::Compound(vec![1, 2]).as_compound(), Some(&[1u64, 2][..]));
        assert_eq!(Key::Int(1).as_compound(), None);
    }

    #[test]
    fn test_as_uuid() {
        let uuid = Uuid::parse_str(SAMPLE).unwrap();
        assert_eq!(Key::Uuid(uuid).as_uuid(), Some(&uuid));
        assert_eq!(Key::Int(1).as_uuid(), None);
    }
}
