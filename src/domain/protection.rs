//! Protective equipment usage and the weighted protection score.

use serde::{Deserialize, Serialize};

/// Sum of all equipment weights (mask 5, gloves 5, boots 4, hat 3, coat 4).
pub const MAX_PROTECTION_SCORE: f64 = 21.0;

/// How often a piece of equipment is worn, as answered in the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProtectionUsage {
    Always,
    Often,
    Sometimes,
    #[default]
    Never,
}

impl ProtectionUsage {
    /// Parse a survey answer (French or English). Unknown or empty → `Never`.
    #[must_use]
    pub fn parse(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "toujours" | "always" | "oui" | "yes" => Self::Always,
            "souvent" | "often" => Self::Often,
            "parfois" | "sometimes" | "quelquefois" => Self::Sometimes,
            _ => Self::Never,
        }
    }

    /// Share of the equipment weight credited for this usage level.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Always => 1.0,
            Self::Often => 0.6,
            Self::Sometimes => 0.2,
            Self::Never => 0.0,
        }
    }
}

/// The five equipment categories tracked by the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Equipment {
    Mask,
    Gloves,
    Boots,
    Hat,
    Coat,
}

impl Equipment {
    pub const ALL: [Equipment; 5] = [
        Equipment::Mask,
        Equipment::Gloves,
        Equipment::Boots,
        Equipment::Hat,
        Equipment::Coat,
    ];

    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            Self::Mask | Self::Gloves => 5.0,
            Self::Boots | Self::Coat => 4.0,
            Self::Hat => 3.0,
        }
    }

    /// Recognise an equipment name from a form value or free text fragment.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = crate::domain::fold_accents(name.trim());
        if name.contains("masque") || name.contains("mask") {
            Some(Self::Mask)
        } else if name.contains("gant") || name.contains("glove") {
            Some(Self::Gloves)
        } else if name.contains("botte") || name.contains("boot") {
            Some(Self::Boots)
        } else if name.contains("casquette") || name.contains("mdhalla") || name.contains("hat") {
            Some(Self::Hat)
        } else if name.contains("manteau") || name.contains("coat") || name.contains("clothing") {
            Some(Self::Coat)
        } else {
            None
        }
    }
}

/// Usage level for each equipment category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionSet {
    pub mask: ProtectionUsage,
    pub gloves: ProtectionUsage,
    pub boots: ProtectionUsage,
    pub hat: ProtectionUsage,
    pub coat: ProtectionUsage,
}

impl ProtectionSet {
    /// Build from a list of equipment a worker declares wearing.
    /// Every listed item counts as worn "always"; unlisted items as "never".
    #[must_use]
    pub fn from_equipment<S: AsRef<str>>(items: &[S]) -> Self {
        let mut set = Self::default();
        for item in items {
            if let Some(equipment) = Equipment::from_name(item.as_ref()) {
                set.set(equipment, ProtectionUsage::Always);
            }
        }
        set
    }

    #[must_use]
    pub fn usage(&self, equipment: Equipment) -> ProtectionUsage {
        match equipment {
            Equipment::Mask => self.mask,
            Equipment::Gloves => self.gloves,
            Equipment::Boots => self.boots,
            Equipment::Hat => self.hat,
            Equipment::Coat => self.coat,
        }
    }

    pub fn set(&mut self, equipment: Equipment, usage: ProtectionUsage) {
        match equipment {
            Equipment::Mask => self.mask = usage,
            Equipment::Gloves => self.gloves = usage,
            Equipment::Boots => self.boots = usage,
            Equipment::Hat => self.hat = usage,
            Equipment::Coat => self.coat = usage,
        }
    }

    /// Weighted protection score in `[0, MAX_PROTECTION_SCORE]`.
    #[must_use]
    pub fn score(&self) -> f64 {
        Equipment::ALL
            .iter()
            .map(|&e| e.weight() * self.usage(e).factor())
            .sum()
    }

    /// Protection score as a percentage of the maximum.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.score() / MAX_PROTECTION_SCORE * 100.0
    }

    /// Number of categories worn at least sometimes.
    #[must_use]
    pub fn items_in_use(&self) -> usize {
        Equipment::ALL
            .iter()
            .filter(|&&e| self.usage(e) != ProtectionUsage::Never)
            .count()
    }

    /// Every category worn always.
    #[must_use]
    pub fn full() -> Self {
        Self {
            mask: ProtectionUsage::Always,
            gloves: ProtectionUsage::Always,
            boots: ProtectionUsage::Always,
            hat: ProtectionUsage::Always,
            coat: ProtectionUsage::Always,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_parsing() {
        assert_eq!(ProtectionUsage::parse("Toujours"), ProtectionUsage::Always);
        assert_eq!(ProtectionUsage::parse(" souvent "), ProtectionUsage::Often);
        assert_eq!(ProtectionUsage::parse("parfois"), ProtectionUsage::Sometimes);
        assert_eq!(ProtectionUsage::parse("jamais"), ProtectionUsage::Never);
        assert_eq!(ProtectionUsage::parse(""), ProtectionUsage::Never);
    }

    #[test]
    fn test_full_protection_is_hundred_percent() {
        let full = ProtectionSet::full();
        assert!((full.score() - MAX_PROTECTION_SCORE).abs() < 1e-9);
        assert!((full.percent() - 100.0).abs() < 1e-9);
        assert_eq!(full.items_in_use(), 5);
    }

    #[test]
    fn test_partial_usage_weights() {
        let set = ProtectionSet {
            mask: ProtectionUsage::Often,      // 5 * 0.6 = 3
            gloves: ProtectionUsage::Sometimes, // 5 * 0.2 = 1
            ..Default::default()
        };
        assert!((set.score() - 4.0).abs() < 1e-9);
        assert_eq!(set.items_in_use(), 2);
    }

    #[test]
    fn test_from_equipment_names() {
        let set = ProtectionSet::from_equipment(&["masque", "Gants", "unknown"]);
        assert_eq!(set.mask, ProtectionUsage::Always);
        assert_eq!(set.gloves, ProtectionUsage::Always);
        assert_eq!(set.boots, ProtectionUsage::Never);
        assert!((set.score() - 10.0).abs() < 1e-9);
    }
}
