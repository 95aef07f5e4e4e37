use super::{
    CliError, CommandRegistry,
    commands::config::ConfigContext,
    formatting::{
        format_category, format_command, format_description, format_header, format_subheader,
        format_usage,
    },
};

/// High-level service for managing and executing CLI commands.
///
/// Provides a unified interface for command registration, discovery, and execution.
pub struct CliService {
    registry: CommandRegistry,
}

impl CliService {
    /// Creates a new CLI service with all available commands registered.
    ///
    /// The context is shared by every command that talks to the
    /// configuration engine.
    pub fn new(context: ConfigContext) -> Self {
        let mut registry = CommandRegistry::new(context);
        registry.register_all_commands();

        CliService { registry }
    }

    /// Executes a command by category and name with the provided arguments.
    ///
    /// # Errors
    /// Returns `CliError::CommandNotFound` if the command doesn't exist in the category.
    /// Otherwise returns whatever the command itself fails with.
    pub async fn execute_command(
        &self,
        category: &str,
        command_name: &str,
        args: &[String],
    ) -> Result<String, CliError> {
        self.registry.execute(category, command_name, args).await
    }

    /// Lists all available commands organized by category.
    pub fn list_all(&self) -> Vec<(String, Vec<String>)> {
        self.registry.list_commands()
    }

    /// Help text covering every registered command.
    ///
    /// Commands are shown in their `category:name` invocation form; the
    /// `show` command is invoked as the bare category.
    pub fn help(&self) -> String {
        let mut lines = vec![
            format_header("renv - hierarchical configuration in etcd"),
            String::new(),
            format_subheader("Usage:"),
            "  renv <command> [args...] [options]".to_string(),
        ];

        for (category, commands) in self.list_all() {
            lines.push(String::new());
            lines.push(format_category(&category));

            for name in commands {
                let Some(metadata) = self.registry.metadata(&category, &name) else {
                    continue;
                };

                let shown = invocation(&category, &name);
                let usage: Vec<String> = metadata
                    .args
                    .iter()
                    .map(|arg| {
                        let mut placeholder = arg.value_type.placeholder().to_string();
                        if arg.variadic {
                            placeholder.push_str("...");
                        }
                        if arg.required {
                            placeholder
                        } else {
                            format!("[{placeholder}]")
                        }
                    })
                    .collect();

                lines.push(format!(
                    "  {} {}",
                    format_command(&shown),
                    format_usage(&usage.join(" "))
                ));
                lines.push(format!("      {}", format_description(&metadata.description)));

                for example in metadata.examples {
                    lines.push(format!("      {}", format_usage(&example)));
                }
            }
        }

        lines.join("\n")
    }
}

/// Splits `config:set` into `("config", "set")`; a bare category runs `show`.
pub fn route(invocation: &str) -> (&str, &str) {
    match invocation.split_once(':') {
        Some((category, name)) => (category, name),
        None => (invocation, "show"),
    }
}

fn invocation(category: &str, name: &str) -> String {
    if name == "show" {
        category.to_string()
    } else {
        format!("{category}:{name}")
    }
}
