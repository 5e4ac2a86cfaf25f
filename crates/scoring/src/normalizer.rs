use std::collections::HashMap;

use crate::schema::RubricFactor;

pub struct FactorNormalizer {
    /// Maps short factor key -> canonical display name
    aliases: HashMap<&'static str, &'static str>,
}

impl FactorNormalizer {
    pub fn new() -> Self {
        let aliases = RubricFactor::ALL
            .into_iter()
            .map(|factor| (factor.short_key(), factor.display_name()))
            .collect();

        Self { aliases }
    }

    /// Canonical display name for a factor key. Unknown keys pass through unchanged
    /// so factors the model invents are not dropped.
    pub fn canonicalize(&self, key: &str) -> String {
        match self.aliases.get(key) {
            Some(display) => (*display).to_string(),
            None => key.to_string(),
        }
    }

    pub fn get_aliases(&self) -> &HashMap<&'static str, &'static str> {
        &self.aliases
    }
}

impl Default for FactorNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_keys_map_to_display_names() {
        let normalizer = FactorNormalizer::new();

        assert_eq!(normalizer.canonicalize("MarketSize"), "Market Size & Product-Market Fit");
        assert_eq!(normalizer.canonicalize("GTMStrategy"), "GTM Strategy");
        assert_eq!(normalizer.canonicalize("TechnologyIP"), "Technology/IP");
        assert_eq!(normalizer.canonicalize("DealTerms"), "Deal Terms");
        assert_eq!(normalizer.canonicalize("Leadership"), "Leadership");
        assert_eq!(normalizer.canonicalize("Macro-Level Risk"), "Macro-Level Risk");
    }

    #[test]
    fn test_unknown_and_display_keys_pass_through() {
        let normalizer = FactorNormalizer::new();

        assert_eq!(normalizer.canonicalize("ESG Alignment"), "ESG Alignment");
        assert_eq!(
            normalizer.canonicalize("Market Size & Product-Market Fit"),
            "Market Size & Product-Market Fit"
        );
    }

    #[test]
    fn test_every_factor_is_covered() {
        let normalizer = FactorNormalizer::new();
        assert_eq!(normalizer.get_aliases().len(), RubricFactor::ALL.len());
    }
}
