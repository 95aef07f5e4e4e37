use std::collections::HashMap;

use super::{
    CliError, Command,
    commands::config::{self, ConfigContext},
    types::CommandMetadata,
};

/// Registry for CLI commands organized by category.
///
/// Commands are grouped by category so new groups can be added without a
/// central match statement.
///
/// # Example Structure
///
/// ```text
/// registry
/// └── config
///     ├── dump
///     ├── import
///     ├── merge
///     ├── nuke
///     ├── set
///     ├── show
///     └── unset
/// ```
pub struct CommandRegistry {
    /// Nested HashMap structure: category name -> (command name -> command implementation)
    categories: HashMap<String, HashMap<String, Box<dyn Command>>>,
    context: ConfigContext,
}

impl CommandRegistry {
    /// Creates a new empty command registry.
    ///
    /// Commands must be added with `register_command` or
    /// `register_all_commands`.
    pub fn new(context: ConfigContext) -> Self {
        Self {
            categories: HashMap::new(),
            context,
        }
    }

    /// Registers a command in the specified category.
    ///
    /// The command's metadata name is its key within the category; an
    /// existing command with the same name is replaced.
    pub fn register_command(&mut self, category: &str, command: Box<dyn Command>) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(command.metadata().name, command);
    }

    /// Executes a command by category and name with the provided arguments.
    ///
    /// # Errors
    ///
    /// Returns `CliError::CommandNotFound` if the category or the command
    /// within it doesn't exist, and `CliError::InvalidArguments` if the
    /// argument count doesn't match the command's metadata. Other errors
    /// come from the command itself.
    pub async fn execute(
        &self,
        category: &str,
        command_name: &str,
        args: &[String],
    ) -> Result<String, CliError> {
        let found_category = self.categories.get(category).ok_or_else(|| {
            CliError::CommandNotFound(format!("Failed to find category '{category}'"))
        })?;

        let found_command = found_category.get(command_name).ok_or_else(|| {
            CliError::CommandNotFound(format!("Failed to find command '{command_name}'"))
        })?;

        Self::validate_args(&found_command.metadata(), args)?;

        found_command.execute(args).await
    }

    /// Lists all registered commands organized by category.
    ///
    /// Categories and commands are sorted alphabetically for consistent display.
    pub fn list_commands(&self) -> Vec<(String, Vec<String>)> {
        let mut categories: Vec<(String, Vec<String>)> = self
            .categories
            .iter()
            .map(|(category, commands)| {
                let mut command_list: Vec<String> = commands.keys().cloned().collect();
                command_list.sort();

                (category.clone(), command_list)
            })
            .collect();

        categories.sort();

        categories
    }

    /// Metadata of a registered command, if any.
    pub fn metadata(&self, category: &str, command_name: &str) -> Option<CommandMetadata> {
        self.categories
            .get(category)?
            .get(command_name)
            .map(|command| command.metadata())
    }

    pub(super) fn validate_args(
        metadata: &CommandMetadata,
        args: &[String],
    ) -> Result<(), CliError> {
        let required_count = metadata.args.iter().filter(|arg| arg.required).count();
        let total_count = metadata.args.len();
        let variadic = metadata.args.last().is_some_and(|arg| arg.variadic);

        if args.len() < required_count {
            let missing: Vec<&str> = metadata
                .args
                .iter()
                .skip(args.len())
                .filter(|arg| arg.required)
                .map(|arg| arg.name.as_str())
                .collect();
            return Err(CliError::InvalidArguments(format!(
                "'{}' needs {}",
                metadata.name,
                missing.join(", "),
            )));
        }

        if !variadic && args.len() > total_count {
            return Err(CliError::InvalidArguments(format!(
                "Expected at most {} arguments, got {}",
                total_count,
                args.len(),
            )));
        }

        Ok(())
    }

    /// Registers all available CLI commands in their respective categories.
    pub fn register_all_commands(&mut self) {
        config::register_commands(self, self.context.clone());
    }
}
