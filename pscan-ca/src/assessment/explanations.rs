//! Tiered ordering of causes and recommendations
//!
//! Output order is throat priority, dehydration priority, rule findings,
//! fallback. Insertion order is preserved within a tier.

/// Ordering tier, lowest sorts first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Throat,
    Dehydration,
    Rule,
    Fallback,
}

/// Explanation lines tagged with their tier
#[derive(Debug, Clone, Default)]
pub struct TieredExplanations {
    entries: Vec<(Tier, &'static str)>,
}

impl TieredExplanations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tier: Tier, text: &'static str) {
        self.entries.push((tier, text));
    }

    pub fn extend(&mut self, tier: Tier, texts: impl IntoIterator<Item = &'static str>) {
        self.entries.extend(texts.into_iter().map(|text| (tier, text)));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any line was pushed at `tier`
    pub fn has_tier(&self, tier: Tier) -> bool {
        self.entries.iter().any(|(t, _)| *t == tier)
    }

    /// Lines in tier order (stable within a tier)
    pub fn into_ordered(mut self) -> Vec<String> {
        self.entries.sort_by_key(|(tier, _)| *tier);
        self.entries.into_iter().map(|(_, text)| text.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_merge_in_fixed_order() {
        let mut lines = TieredExplanations::new();
        lines.push(Tier::Rule, "rule 1");
        lines.push(Tier::Dehydration, "dehydration");
        lines.push(Tier::Fallback, "fallback");
        lines.push(Tier::Rule, "rule 2");
        lines.push(Tier::Throat, "throat");

        assert_eq!(
            lines.into_ordered(),
            vec!["throat", "dehydration", "rule 1", "rule 2", "fallback"]
        );
    }

    #[test]
    fn test_has_tier() {
        let mut lines = TieredExplanations::new();
        assert!(lines.is_empty());
        lines.extend(Tier::Rule, ["a", "b"]);
        assert!(lines.has_tier(Tier::Rule));
        assert!(!lines.has_tier(Tier::Throat));
    }
}
