use async_trait::async_trait;

use crate::{
    cli::{
        Command, CommandResult,
        formatting::{Colors, format_action},
        types::{ArgType, CommandArg, CommandMetadata},
    },
    config_store::parse_pairs,
};

use super::{CATEGORY_NAME, ConfigContext};

/// Writes one or more `key=value` pairs into the selected namespace.
pub struct SetCommand {
    context: ConfigContext,
}

impl SetCommand {
    /// Creates a new SetCommand over the shared context.
    pub fn new(context: ConfigContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Command for SetCommand {
    async fn execute(&self, args: &[String]) -> CommandResult {
        self.context.service.set(args).await?;

        let written: Vec<String> = parse_pairs(args)?
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}{key}{} = {}{value}{}",
                    Colors::BOLD,
                    Colors::RESET,
                    Colors::GREEN,
                    Colors::RESET
                )
            })
            .collect();

        Ok(format_action("set", &written))
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "set".to_string(),
            description: "Set one or more configuration values".to_string(),
            category: CATEGORY_NAME.to_string(),
            args: vec![CommandArg {
                name: "pair".to_string(),
                description: "Dotted key and value, e.g. database.host=db1".to_string(),
                required: true,
                variadic: true,
                value_type: ArgType::Pair,
            }],
            examples: vec![
                "renv config:set BANANA=apple".to_string(),
                "renv config:set database.host=db1 database.port=5432 -e production".to_string(),
            ],
        }
    }
}
