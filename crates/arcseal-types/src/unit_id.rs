use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Identifier of a hashing unit: a single letter `A`–`Z`.
///
/// Stored as the 0-based position in the alphabet, which is also the unit's
/// position in the pool. Ordering follows the alphabet.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u8);

impl UnitId {
    /// Largest number of distinct unit ids.
    pub const MAX_UNITS: usize = 26;

    /// Unit id for a 0-based pool position.
    pub fn from_index(index: usize) -> Result<Self, TypeError> {
        if index >= Self::MAX_UNITS {
            return Err(TypeError::InvalidUnitId(format!("index {index}")));
        }
        Ok(Self(index as u8))
    }

    /// Unit id for an upper-case letter.
    pub fn from_letter(letter: char) -> Result<Self, TypeError> {
        if letter.is_ascii_uppercase() {
            Ok(Self(letter as u8 - b'A'))
        } else {
            Err(TypeError::InvalidUnitId(letter.to_string()))
        }
    }

    /// 0-based pool position.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// The letter for this id.
    pub fn letter(&self) -> char {
        (b'A' + self.0) as char
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.letter())
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for UnitId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_letter(c),
            _ => Err(TypeError::InvalidUnitId(s.to_string())),
        }
    }
}

impl Serialize for UnitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UnitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_letter_agree() {
        let a = UnitId::from_index(0).unwrap();
        let z = UnitId::from_index(25).unwrap();
        assert_eq!(a.letter(), 'A');
        assert_eq!(z.letter(), 'Z');
        assert_eq!(UnitId::from_letter('Q').unwrap().index(), 16);
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(UnitId::from_index(26).is_err());
        assert!(UnitId::from_letter('a').is_err());
        assert!("AB".parse::<UnitId>().is_err());
        assert!("".parse::<UnitId>().is_err());
    }

    #[test]
    fn ordering_follows_alphabet() {
        let mut ids: Vec<UnitId> = "ZCA".chars().map(|c| UnitId::from_letter(c).unwrap()).collect();
        ids.sort();
        let letters: String = ids.iter().map(UnitId::letter).collect();
        assert_eq!(letters, "ACZ");
    }

    #[test]
    fn serializes_as_letter() {
        let id = UnitId::from_letter('M').unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"M\"");
        let parsed: UnitId = serde_json::from_str("\"M\"").unwrap();
        assert_eq!(parsed, id);
    }
}
