use async_trait::async_trait;

use crate::cli::{
    Command, CommandResult,
    formatting::{Colors, format_action},
    types::{ArgType, CommandArg, CommandMetadata},
};

use super::{CATEGORY_NAME, ConfigContext};

/// Deletes one or more keys from the selected namespace.
pub struct UnsetCommand {
    context: ConfigContext,
}

impl UnsetCommand {
    /// Creates a new UnsetCommand over the shared context.
    pub fn new(context: ConfigContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Command for UnsetCommand {
    async fn execute(&self, args: &[String]) -> CommandResult {
        let report = self.context.service.del(args).await?;

        let removed: Vec<String> = report
            .succeeded
            .iter()
            .map(|key| format!("{}{key}{}", Colors::RED, Colors::RESET))
            .collect();

        Ok(format_action("unset", &removed))
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "unset".to_string(),
            description: "Delete one or more configuration values".to_string(),
            category: CATEGORY_NAME.to_string(),
            args: vec![CommandArg {
                name: "key".to_string(),
                description: "Dotted key to delete".to_string(),
                required: true,
                variadic: true,
                value_type: ArgType::Key,
            }],
            examples: vec!["renv config:unset BANANA database.port".to_string()],
        }
    }
}
