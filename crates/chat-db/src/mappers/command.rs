//! Command entity <-> model mapper

use chat_core::{Command, CommandOption, DomainError, Snowflake};

use crate::models::CommandModel;

/// Stored options are the canonical string; a row that no longer parses is
/// reported rather than silently emptied.
impl TryFrom<CommandModel> for Command {
    type Error = DomainError;

    fn try_from(model: CommandModel) -> Result<Self, Self::Error> {
        let options: Vec<CommandOption> = serde_json::from_str(&model.options).map_err(|e| {
            DomainError::DatabaseError(format!("corrupt options for command {}: {e}", model.name))
        })?;

        Ok(Command::new(
            Snowflake::new(model.id),
            Snowflake::new(model.app_id),
            model.name,
            model.description,
            options,
        ))
    }
}

/// Command values for insert and update
pub struct CommandInsert<'a> {
    pub id: i64,
    pub app_id: i64,
    pub name: &'a str,
    pub description: &'a str,
    pub options: String,
}

impl<'a> CommandInsert<'a> {
    pub fn new(command: &'a Command) -> Self {
        Self {
            id: command.id.into_inner(),
            app_id: command.app_id.into_inner(),
            name: &command.name,
            description: &command.description,
            options: command.options_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_options_are_a_database_error() {
        let model = CommandModel {
            id: 1,
            app_id: 2,
            name: "ping".to_string(),
            description: "Ping".to_string(),
            options: "{not json".to_string(),
        };

        let err = Command::try_from(model).unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }

    #[test]
    fn test_insert_carries_canonical_options() {
        let command = Command::new(
            Snowflake::new(1),
            Snowflake::new(2),
            "ping".to_string(),
            "Ping".to_string(),
            Vec::new(),
        );

        let insert = CommandInsert::new(&command);
        assert_eq!(insert.options, "[]");
        assert_eq!(insert.name, "ping");
    }
}
