use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExcavateOptions {
    /// Values deeper than this (root is depth 0) become `depth-limit` sentinels.
    pub max_depth: usize,
    pub max_array_sample: usize,
    /// String examples and function source excerpts are cut to this many chars.
    pub max_string_example: usize,
    pub inspect_function_bodies: bool,
    /// Runs the style-rule layer when a document is supplied.
    pub inspect_styles: bool,
}

impl Default for ExcavateOptions {
    fn default() -> Self {
        Self {
            max_depth: 6,
            max_array_sample: 10,
            max_string_example: 120,
            inspect_function_bodies: false,
            inspect_styles: false,
        }
    }
}
