use arcseal_types::Layer;

/// Static definition of one unit in the default matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSpec {
    pub name: &'static str,
    pub layer: Layer,
    /// Weight in thousandths, so the matrix stays exact.
    pub weight_milli: u32,
}

const fn entry(name: &'static str, layer: Layer, weight_milli: u32) -> UnitSpec {
    UnitSpec {
        name,
        layer,
        weight_milli,
    }
}

/// The A–Z unit matrix, indexed by pool position.
pub const UNIT_MATRIX: [UnitSpec; 26] = [
    entry("Analyzer", Layer::Intelligence, 1000),
    entry("Builder", Layer::Infrastructure, 950),
    entry("Coordinator", Layer::Orchestration, 1100),
    entry("Detector", Layer::Intelligence, 900),
    entry("Executor", Layer::Infrastructure, 1000),
    entry("Formatter", Layer::Application, 850),
    entry("Generator", Layer::Application, 900),
    entry("Handler", Layer::Infrastructure, 950),
    entry("Indexer", Layer::Intelligence, 880),
    entry("Joiner", Layer::Orchestration, 920),
    entry("Keeper", Layer::Infrastructure, 870),
    entry("Loader", Layer::Infrastructure, 900),
    entry("Monitor", Layer::Intelligence, 1050),
    entry("Normalizer", Layer::Application, 820),
    entry("Optimizer", Layer::Intelligence, 1150),
    entry("Parser", Layer::Application, 950),
    entry("Quantizer", Layer::Quantum, 1618),
    entry("Router", Layer::Orchestration, 1080),
    entry("Scheduler", Layer::Orchestration, 1020),
    entry("Transformer", Layer::Application, 980),
    entry("Unifier", Layer::Orchestration, 960),
    entry("Validator", Layer::Intelligence, 1120),
    entry("Watcher", Layer::Infrastructure, 910),
    entry("Xecutor", Layer::Quantum, 1250),
    entry("Yielder", Layer::Application, 840),
    entry("Zenith", Layer::Quantum, 1618),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn every_layer_is_represented() {
        let layers: BTreeSet<Layer> = UNIT_MATRIX.iter().map(|u| u.layer).collect();
        assert_eq!(layers.len(), Layer::ALL.len());
    }

    #[test]
    fn names_start_with_their_letter() {
        for (i, unit) in UNIT_MATRIX.iter().enumerate() {
            let letter = (b'A' + i as u8) as char;
            assert!(unit.name.starts_with(letter), "{} at {letter}", unit.name);
        }
    }

    #[test]
    fn weights_are_positive() {
        assert!(UNIT_MATRIX.iter().all(|u| u.weight_milli > 0));
    }
}
