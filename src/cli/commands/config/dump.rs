use async_trait::async_trait;

use crate::{
    cli::{Command, CommandResult, formatting::render_node, types::CommandMetadata},
    config_store::{ConfigNode, SEPARATOR},
};

use super::{CATEGORY_NAME, ConfigContext};

/// Prints every application and environment stored in the cluster.
pub struct DumpCommand {
    context: ConfigContext,
}

impl DumpCommand {
    /// Creates a new DumpCommand over the shared context.
    pub fn new(context: ConfigContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Command for DumpCommand {
    async fn execute(&self, _args: &[String]) -> CommandResult {
        let tree = self.context.service.dump().await?;

        render_node(
            &SEPARATOR.to_string(),
            None,
            &ConfigNode::from(tree),
            self.context.format,
        )
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "dump".to_string(),
            description: "Dump configuration for all applications and environments".to_string(),
            category: CATEGORY_NAME.to_string(),
            args: Vec::new(),
            examples: vec!["renv config:dump -o json".to_string()],
        }
    }
}
