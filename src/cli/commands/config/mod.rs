//! Configuration management commands.
mod dump;
mod import;
mod merge;
mod nuke;
mod set;
mod show;
mod unset;

use std::sync::Arc;

pub use dump::DumpCommand;
pub use import::ImportCommand;
pub use merge::MergeCommand;
pub use nuke::NukeCommand;
pub use set::SetCommand;
pub use show::ShowCommand;
pub use unset::UnsetCommand;

use crate::{
    cli::{CommandRegistry, formatting::OutputFormat},
    config_store::ConfigService,
    settings::Settings,
};

/// Category every configuration command is registered under.
pub const CATEGORY_NAME: &str = "config";

/// Dependencies shared by the configuration commands.
#[derive(Clone)]
pub struct ConfigContext {
    /// Service bound to the selected namespace
    pub service: Arc<ConfigService>,
    /// Settings the service was connected with
    pub settings: Arc<Settings>,
    /// How trees are printed
    pub format: OutputFormat,
}

impl ConfigContext {
    /// Bundles a connected service with its settings.
    pub fn new(service: ConfigService, settings: Settings, format: OutputFormat) -> Self {
        Self {
            service: Arc::new(service),
            settings: Arc::new(settings),
            format,
        }
    }
}

/// Registers all configuration-related commands with the command registry.
pub fn register_commands(registry: &mut CommandRegistry, context: ConfigContext) {
    registry.register_command(CATEGORY_NAME, Box::new(ShowCommand::new(context.clone())));
    registry.register_command(CATEGORY_NAME, Box::new(SetCommand::new(context.clone())));
    registry.register_command(CATEGORY_NAME, Box::new(UnsetCommand::new(context.clone())));
    registry.register_command(CATEGORY_NAME, Box::new(ImportCommand::new(context.clone())));
    registry.register_command(CATEGORY_NAME, Box::new(NukeCommand::new(context.clone())));
    registry.register_command(CATEGORY_NAME, Box::new(DumpCommand::new(context.clone())));
    registry.register_command(CATEGORY_NAME, Box::new(MergeCommand::new(context)));
}
