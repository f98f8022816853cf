//! Entity classification from model strings.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Broad class of a moving entity, derived from its model string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Airplane,
    Ship,
    Train,
    Truck,
    /// Model string matched none of the known patterns.
    Other,
}

impl EntityKind {
    /// All kinds, in display order.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Airplane,
        EntityKind::Ship,
        EntityKind::Train,
        EntityKind::Truck,
        EntityKind::Other,
    ];

    /// Classify a model string (e.g. `C17`, `LMSR`, `Truck_EU`).
    pub fn from_model(model: &str) -> Self {
        let patterns = model_patterns();
        patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(model))
            .map(|(_, kind)| *kind)
            .unwrap_or(EntityKind::Other)
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Airplane => "Airplane",
            EntityKind::Ship => "Ship",
            EntityKind::Train => "Train",
            EntityKind::Truck => "Truck",
            EntityKind::Other => "Other",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn model_patterns() -> &'static [(Regex, EntityKind)] {
    static PATTERNS: OnceLock<Vec<(Regex, EntityKind)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (Regex::new(r"^(plane|C17|B777)$").unwrap(), EntityKind::Airplane),
            (Regex::new(r"^(ship|LMSR)$").unwrap(), EntityKind::Ship),
            (Regex::new(r"^(truck|[Tt]ruck_(US|EU))$").unwrap(), EntityKind::Truck),
            (Regex::new(r"^(train|[Tt]rain_(US|EU))$").unwrap(), EntityKind::Train),
        ]
    })
}
