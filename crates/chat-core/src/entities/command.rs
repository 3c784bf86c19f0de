//! Command entity - an app-scoped slash command schema

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::value_objects::Snowflake;

/// Description stored when a bot declares a command without one
pub const DEFAULT_COMMAND_DESCRIPTION: &str = "No description provided";

pub const MAX_COMMAND_NAME_LEN: usize = 32;
pub const MAX_COMMAND_DESCRIPTION_LEN: usize = 100;
pub const MAX_COMMAND_OPTIONS: usize = 25;

/// Argument type of a command option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommandOptionType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    User,
    Channel,
}

/// Predefined value a user may pick for an option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandChoice {
    pub name: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CommandOption {
    #[validate(custom(function = "validate_command_name"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Option description must be at most 100 characters"))]
    pub description: String,

    #[serde(rename = "type", default)]
    pub kind: CommandOptionType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<CommandChoice>,
}

/// Stored command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: Snowflake,
    pub app_id: Snowflake,
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOption>,
}

impl Command {
    pub fn new(
        id: Snowflake,
        app_id: Snowflake,
        name: String,
        description: String,
        options: Vec<CommandOption>,
    ) -> Self {
        Self {
            id,
            app_id,
            name,
            description,
            options,
        }
    }

    /// Canonical string form of the stored options
    pub fn options_json(&self) -> String {
        canonical_options(&self.options)
    }

    /// True when the declared schema differs from the stored one.
    ///
    /// Descriptions are compared verbatim and options by their canonical
    /// string form.
    pub fn differs_from(&self, description: &str, options: &[CommandOption]) -> bool {
        self.description != description || self.options_json() != canonical_options(options)
    }
}

/// Serialize options to their canonical string.
///
/// Struct fields serialize in declaration order and JSON objects inside
/// choice values are key-sorted, so equal schemas yield equal strings.
pub fn canonical_options(options: &[CommandOption]) -> String {
    serde_json::to_string(options).unwrap_or_else(|_| String::from("[]"))
}

/// Command and option names: 1-32 chars of lowercase letters, digits, `-` or `_`
pub fn validate_command_name(name: &str) -> Result<(), ValidationError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if name.is_empty() || name.chars().count() > MAX_COMMAND_NAME_LEN || !valid_chars {
        let mut err = ValidationError::new("command_name");
        err.message = Some("Name must be 1-32 characters of a-z, 0-9, '-' or '_'".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn option(name: &str) -> CommandOption {
        CommandOption {
            name: name.to_string(),
            description: "target".to_string(),
            kind: CommandOptionType::User,
            required: true,
            choices: vec![],
        }
    }

    fn command(description: &str, options: Vec<CommandOption>) -> Command {
        Command::new(
            Snowflake::new(1),
            Snowflake::new(2),
            "ban".into(),
            description.into(),
            options,
        )
    }

    #[test]
    fn test_command_name_rules() {
        assert!(validate_command_name("ping").is_ok());
        assert!(validate_command_name("set-role_2").is_ok());
        assert!(validate_command_name("").is_err());
        assert!(validate_command_name("Ping").is_err());
        assert!(validate_command_name("has space").is_err());
        assert!(validate_command_name(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_identical_schema_does_not_differ() {
        let cmd = command("Ban a user", vec![option("user")]);
        assert!(!cmd.differs_from("Ban a user", &[option("user")]));
    }

    #[test]
    fn test_description_change_differs() {
        let cmd = command("Ban a user", vec![]);
        assert!(cmd.differs_from("Ban someone", &[]));
    }

    #[test]
    fn test_option_change_differs() {
        let cmd = command("Ban a user", vec![option("user")]);
        assert!(cmd.differs_from("Ban a user", &[option("member")]));
        assert!(cmd.differs_from("Ban a user", &[]));
    }

    #[test]
    fn test_canonical_form_is_key_order_independent() {
        let a: Vec<CommandOption> = serde_json::from_value(json!([
            {"name": "n", "type": "integer", "choices": [{"name": "x", "value": {"a": 1, "b": 2}}]}
        ]))
        .unwrap();
        let b: Vec<CommandOption> = serde_json::from_value(json!([
            {"choices": [{"value": {"b": 2, "a": 1}, "name": "x"}], "type": "integer", "name": "n"}
        ]))
        .unwrap();
        assert_eq!(canonical_options(&a), canonical_options(&b));
    }

    #[test]
    fn test_option_defaults() {
        let opt: CommandOption = serde_json::from_value(json!({"name": "query"})).unwrap();
        assert_eq!(opt.kind, CommandOptionType::String);
        assert!(!opt.required);
        assert!(opt.description.is_empty());
    }

    #[test]
    fn test_option_validation() {
        assert!(option("user").validate().is_ok());
        assert!(option("Bad Name").validate().is_err());
    }
}
