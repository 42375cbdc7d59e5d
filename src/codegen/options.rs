//! Builder Options
//!
//! The option names a generated builder accepts through `setOptions`, and how
//! each one maps onto the mock generator's own option names.

use serde::{Deserialize, Serialize};

/// One builder option and its mock-generator counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionMapping {
    /// Key on the generated `BuilderOptions` type
    pub builder_key: &'static str,
    /// Key passed to `generateMock`
    pub generator_key: &'static str,
    /// TypeScript type of the option
    pub ts_type: &'static str,
}

/// Every recognized option, in declaration order
pub const OPTION_MAPPINGS: [OptionMapping; 5] = [
    OptionMapping {
        builder_key: "useDefault",
        generator_key: "useDefaultValue",
        ts_type: "boolean",
    },
    OptionMapping {
        builder_key: "useExamples",
        generator_key: "useExamplesValue",
        ts_type: "boolean",
    },
    OptionMapping {
        builder_key: "alwaysIncludeOptionals",
        generator_key: "alwaysFakeOptionals",
        ts_type: "boolean",
    },
    OptionMapping {
        builder_key: "optionalsProbability",
        generator_key: "optionalsProbability",
        ts_type: "number | false",
    },
    OptionMapping {
        builder_key: "omitNulls",
        generator_key: "omitNulls",
        ts_type: "boolean",
    },
];

/// `optionalsProbability`: a ratio in `[0, 1]`, or `false` to disable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionalsProbability {
    Ratio(f64),
    Flag(bool),
}

impl OptionalsProbability {
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Ratio(r) => (0.0..=1.0).contains(r),
            Self::Flag(enabled) => !enabled,
        }
    }
}

/// Initial options baked into every generated builder.
///
/// Unset fields are left out of the generated literal, so the mock
/// generator's own defaults apply. Keys are camelCase as in the generated
/// code; snake_case spellings are accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderOptions {
    #[serde(default, alias = "use_default", skip_serializing_if = "Option::is_none")]
    pub use_default: Option<bool>,
    #[serde(default, alias = "use_examples", skip_serializing_if = "Option::is_none")]
    pub use_examples: Option<bool>,
    #[serde(default, alias = "always_include_optionals", skip_serializing_if = "Option::is_none")]
    pub always_include_optionals: Option<bool>,
    #[serde(default, alias = "optionals_probability", skip_serializing_if = "Option::is_none")]
    pub optionals_probability: Option<OptionalsProbability>,
    #[serde(default, alias = "omit_nulls", skip_serializing_if = "Option::is_none")]
    pub omit_nulls: Option<bool>,
}

impl BuilderOptions {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Reject values the generated `BuilderOptions` type cannot hold
    pub fn validate(&self) -> Result<(), String> {
        match self.optionals_probability {
            Some(p) if !p.is_valid() => Err(format!(
                "optionalsProbability must be a number in [0, 1] or false, got {:?}",
                p
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_keys() {
        let builder: Vec<&str> = OPTION_MAPPINGS.iter().map(|m| m.builder_key).collect();
        assert_eq!(
            builder,
            vec!["useDefault", "useExamples", "alwaysIncludeOptionals", "optionalsProbability", "omitNulls"]
        );
        assert_eq!(OPTION_MAPPINGS[2].generator_key, "alwaysFakeOptionals");
    }

    #[test]
    fn test_options_serialize_only_set_fields() {
        let options = BuilderOptions {
            use_examples: Some(true),
            optionals_probability: Some(OptionalsProbability::Flag(false)),
            ..BuilderOptions::default()
        };
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({ "useExamples": true, "optionalsProbability": false })
        );
        assert!(BuilderOptions::default().is_empty());
    }

    #[test]
    fn test_probability_validation() {
        let ok = BuilderOptions {
            optionals_probability: Some(OptionalsProbability::Ratio(0.5)),
            ..BuilderOptions::default()
        };
        assert!(ok.validate().is_ok());

        for bad in [OptionalsProbability::Ratio(1.5), OptionalsProbability::Flag(true)] {
            let options = BuilderOptions {
                optionals_probability: Some(bad),
                ..BuilderOptions::default()
            };
            assert!(options.validate().is_err());
        }
    }
}
