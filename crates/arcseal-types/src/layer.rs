use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Layer label of a hashing unit.
///
/// The declaration order is the total order used when folding layer roots
/// into the aggregate root; `Ord` is derived from it and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Infrastructure,
    Application,
    Intelligence,
    Orchestration,
    Quantum,
}

impl Layer {
    /// All layers in fold order.
    pub const ALL: [Layer; 5] = [
        Layer::Infrastructure,
        Layer::Application,
        Layer::Intelligence,
        Layer::Orchestration,
        Layer::Quantum,
    ];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infrastructure => "infrastructure",
            Self::Application => "application",
            Self::Intelligence => "intelligence",
            Self::Orchestration => "orchestration",
            Self::Quantum => "quantum",
        }
    }

    /// Position in the fold order (0-based).
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layer::ALL
            .into_iter()
            .find(|layer| layer.as_str() == s)
            .ok_or_else(|| TypeError::UnknownLayer(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_order_matches_declaration() {
        let mut shuffled = vec![
            Layer::Quantum,
            Layer::Application,
            Layer::Orchestration,
            Layer::Infrastructure,
            Layer::Intelligence,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Layer::ALL.to_vec());
    }

    #[test]
    fn ordinals_are_dense() {
        let ordinals: Vec<u8> = Layer::ALL.iter().map(Layer::ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn parse_wire_names() {
        assert_eq!("quantum".parse::<Layer>().unwrap(), Layer::Quantum);
        assert_eq!(
            "Quantum".parse::<Layer>(),
            Err(TypeError::UnknownLayer("Quantum".into()))
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Layer::Orchestration).unwrap();
        assert_eq!(json, "\"orchestration\"");
    }
}
