use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InspectOptions {
    /// Attribute values in examples are cut to this many chars.
    pub attribute_value_limit: usize,
    /// Matched nodes recorded per selector; the count itself is never capped.
    pub max_sampled_matches: usize,
    /// Rules beyond this per sheet are counted but not recorded.
    pub max_rules_per_sheet: usize,
    /// Nested `@media`/`@layer` blocks past this depth count as skipped rules.
    pub max_rule_depth: usize,
    pub hot_selector_floor: usize,
    pub hot_selector_ratio: f64,
    pub path_segments: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            attribute_value_limit: 120,
            max_sampled_matches: 5,
            max_rules_per_sheet: 2_000,
            max_rule_depth: crate::css::DEFAULT_MAX_RULE_DEPTH,
            hot_selector_floor: 10,
            hot_selector_ratio: 0.4,
            path_segments: crate::path::DEFAULT_PATH_SEGMENTS,
        }
    }
}

impl InspectOptions {
    /// Live-match count a selector needs to be reported as hot.
    pub fn hot_threshold(&self, max_observed: usize) -> usize {
        let scaled = (self.hot_selector_ratio * max_observed as f64).ceil() as usize;
        self.hot_selector_floor.max(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_threshold_has_a_floor() {
        let options = InspectOptions::default();
        assert_eq!(options.hot_threshold(0), 10);
        assert_eq!(options.hot_threshold(20), 10);
        assert_eq!(options.hot_threshold(100), 40);
        assert_eq!(options.hot_threshold(101), 41);
    }
}
