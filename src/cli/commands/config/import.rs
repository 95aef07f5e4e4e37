use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::cli::{
    CliError, Command, CommandResult,
    formatting::format_action,
    types::{ArgType, CommandArg, CommandMetadata},
};

use super::{CATEGORY_NAME, ConfigContext};

/// Loads a JSON document into the selected namespace.
///
/// Nested objects become dotted keys; the document can be placed below a
/// key instead of at the namespace root.
pub struct ImportCommand {
    context: ConfigContext,
}

impl ImportCommand {
    /// Creates a new ImportCommand over the shared context.
    pub fn new(context: ConfigContext) -> Self {
        Self { context }
    }

    fn read_document(path: &Path) -> Result<Value, CliError> {
        let content = fs::read_to_string(path).map_err(|e| CliError::ImportFile {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| CliError::ImportFile {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }
}

#[async_trait]
impl Command for ImportCommand {
    async fn execute(&self, args: &[String]) -> CommandResult {
        let path = args.first().map(PathBuf::from).ok_or_else(|| {
            CliError::InvalidArguments("Expected <path> argument for 'import'".to_string())
        })?;
        let sub_key = args.get(1).map(String::as_str);

        let document = Self::read_document(&path)?;
        debug!(path = %path.display(), "importing document");

        let report = self
            .context
            .service
            .set_object(&document, sub_key)
            .await?;

        let target = match sub_key {
            Some(sub_key) => format!("{} ({sub_key})", self.context.service.namespace()),
            None => self.context.service.namespace().to_string(),
        };

        Ok(format_action(
            "imported",
            &[format!("{} keys into {target}", report.succeeded.len())],
        ))
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "import".to_string(),
            description: "Import configuration from a JSON file".to_string(),
            category: CATEGORY_NAME.to_string(),
            args: vec![
                CommandArg {
                    name: "file".to_string(),
                    description: "JSON file holding an object".to_string(),
                    required: true,
                    variadic: false,
                    value_type: ArgType::Path,
                },
                CommandArg {
                    name: "key".to_string(),
                    description: "Dotted key to import below".to_string(),
                    required: false,
                    variadic: false,
                    value_type: ArgType::Key,
                },
            ],
            examples: vec![
                "renv config:import ./foo.json".to_string(),
                "renv config:import ./db.json database -e production".to_string(),
            ],
        }
    }
}
