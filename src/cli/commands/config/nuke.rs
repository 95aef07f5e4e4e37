use async_trait::async_trait;

use crate::cli::{
    Command, CommandResult,
    formatting::{Colors, format_action},
    types::CommandMetadata,
};

use super::{CATEGORY_NAME, ConfigContext};

/// Deletes every value in the selected namespace.
pub struct NukeCommand {
    context: ConfigContext,
}

impl NukeCommand {
    /// Creates a new NukeCommand over the shared context.
    pub fn new(context: ConfigContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Command for NukeCommand {
    async fn execute(&self, _args: &[String]) -> CommandResult {
        self.context.service.delete_environment().await?;

        Ok(format_action(
            "destroyed",
            &[format!(
                "{}{}{}",
                Colors::RED,
                self.context.service.namespace(),
                Colors::RESET
            )],
        ))
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "nuke".to_string(),
            description: "Delete configuration for the current application and environment"
                .to_string(),
            category: CATEGORY_NAME.to_string(),
            args: Vec::new(),
            examples: vec!["renv config:nuke -e staging".to_string()],
        }
    }
}
