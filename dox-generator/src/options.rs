use pest::Parser as _;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "resources/parameter.pest"] // Path relative to src/
struct ParameterParser;

pub const DEFAULT_SUFFIX: &str = ".dox";
pub const DEFAULT_PLACEHOLDER: &str = "<b><i>undocumented</i></b>";

/// Settings passed through `--dox_opt=key=value,...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Appended to the .proto file name to name the generated file.
    pub suffix: String,
    /// Rendered in place of a missing comment.
    pub placeholder: String,
    /// Document only the files protoc asked for, not their dependencies.
    pub requested_only: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            requested_only: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("malformed parameter: {0}")]
    Syntax(Box<pest::error::Error<Rule>>),

    #[error("unknown option '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for option '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: &'static str,
    },
}

impl From<pest::error::Error<Rule>> for OptionsError {
    fn from(e: pest::error::Error<Rule>) -> Self {
        Self::Syntax(Box::new(e))
    }
}

impl Options {
    /// Parses the plugin parameter string. An empty string yields the defaults.
    pub fn from_parameter(parameter: &str) -> Result<Self, OptionsError> {
        let mut options = Options::default();
        let pairs = ParameterParser::parse(Rule::parameter, parameter)?;

        for option in pairs.flatten().filter(|p| p.as_rule() == Rule::option) {
            let mut inner = option.into_inner();
            let key = inner.next().map(|p| p.as_str()).unwrap_or_default();
            let value = inner.next().map(|p| p.as_str().trim()).unwrap_or_default();
            options.set(key, value)?;
        }

        Ok(options)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), OptionsError> {
        let invalid = |reason| OptionsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };
        match key {
            "suffix" => {
                if value.is_empty() {
                    return Err(invalid("the suffix must not be empty"));
                }
                self.suffix = value.to_string();
            }
            "placeholder" => {
                if value.is_empty() {
                    return Err(invalid("the placeholder must not be empty"));
                }
                self.placeholder = value.to_string();
            }
            "requested_only" => {
                self.requested_only = match value {
                    "true" => true,
                    "false" => false,
                    _ => return Err(invalid("expected 'true' or 'false'")),
                };
            }
            other => return Err(OptionsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}
