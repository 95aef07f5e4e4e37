use async_trait::async_trait;

use crate::{
    cli::{
        Command, CommandResult,
        formatting::render_node,
        types::{ArgType, CommandArg, CommandMetadata},
    },
    config_store::{ConfigNode, ConfigService},
};

use super::{CATEGORY_NAME, ConfigContext};

/// Shows the selected namespace with another namespace laid over it.
///
/// The source namespace gets its own connection. Nothing is written.
pub struct MergeCommand {
    context: ConfigContext,
}

impl MergeCommand {
    /// Creates a new MergeCommand over the shared context.
    pub fn new(context: ConfigContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Command for MergeCommand {
    async fn execute(&self, args: &[String]) -> CommandResult {
        let target = &self.context.service;
        let environment = args.first().map(String::as_str).unwrap_or_default();
        let application = args
            .get(1)
            .map(String::as_str)
            .unwrap_or_else(|| target.namespace().application());

        let source_settings = self.context.settings.with_namespace(application, environment);
        let source = ConfigService::connect(&source_settings)?;

        let merged = target.merge(&source).await?;

        render_node(
            &format!("{} <- {}", target.namespace(), source.namespace()),
            None,
            &ConfigNode::from(merged),
            self.context.format,
        )
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "merge".to_string(),
            description: "Preview another environment overlaid on this one".to_string(),
            category: CATEGORY_NAME.to_string(),
            args: vec![
                CommandArg {
                    name: "environment".to_string(),
                    description: "Environment whose values win".to_string(),
                    required: true,
                    variadic: false,
                    value_type: ArgType::String,
                },
                CommandArg {
                    name: "application".to_string(),
                    description: "Application of the source; defaults to the current one"
                        .to_string(),
                    required: false,
                    variadic: false,
                    value_type: ArgType::String,
                },
            ],
            examples: vec!["renv config:merge production -e staging".to_string()],
        }
    }
}
