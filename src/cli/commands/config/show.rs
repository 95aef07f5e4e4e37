use async_trait::async_trait;

use crate::{
    cli::{
        Command, CommandResult,
        formatting::render_node,
        types::{ArgType, CommandArg, CommandMetadata},
    },
    config_store::ConfigKey,
};

use super::{CATEGORY_NAME, ConfigContext};

/// Prints the selected namespace, or the part of it below a key.
///
/// # Example Usage
///
/// ```bash
/// renv config -e production
/// renv config database
/// renv config database.host -o json
/// ```
pub struct ShowCommand {
    context: ConfigContext,
}

impl ShowCommand {
    /// Creates a new ShowCommand over the shared context.
    pub fn new(context: ConfigContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Command for ShowCommand {
    async fn execute(&self, args: &[String]) -> CommandResult {
        let sub_key = args.first().map(|key| ConfigKey::parse(key)).transpose()?;

        let node = self.context.service.get_node(sub_key.as_ref()).await?;

        render_node(
            &self.context.service.namespace().to_string(),
            sub_key.as_ref(),
            &node,
            self.context.format,
        )
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "show".to_string(),
            description: "List all variables in /:application/:environment".to_string(),
            category: CATEGORY_NAME.to_string(),
            args: vec![CommandArg {
                name: "key".to_string(),
                description: "Only show the value or subtree at this dotted key".to_string(),
                required: false,
                variadic: false,
                value_type: ArgType::Key,
            }],
            examples: vec![
                "renv config -e production".to_string(),
                "renv config database -o json".to_string(),
            ],
        }
    }
}
