use std::fs;

use serde::{Deserialize, Serialize};

use crate::logbook::*;

pub const DEFAULT_STORE_PATH: &str = "logbook.json";
pub const DEFAULT_ADMIN_CODE: &str = "9999";

/// The configuration of the command line program.
///
/// All the options are optional. The settings of the study itself (start date,
/// company name, ...) are kept in the store, not here.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogbookConfig {
    #[serde(rename = "storePath")]
    pub store_path: Option<String>,
    #[serde(rename = "adminCode")]
    pub admin_code: Option<String>,
    #[serde(rename = "exportDirectory")]
    pub export_directory: Option<String>,
}

impl LogbookConfig {
    pub fn store_path(&self) -> String {
        self.store_path
            .clone()
            .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string())
    }

    pub fn admin_code(&self) -> String {
        self.admin_code
            .clone()
            .unwrap_or_else(|| DEFAULT_ADMIN_CODE.to_string())
    }

    pub fn export_directory(&self) -> String {
        self.export_directory
            .clone()
            .unwrap_or_else(|| ".".to_string())
    }
}

pub fn read_config(path: &str) -> LogbookResult<LogbookConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read_config: content: {:?}", contents);
    let config: LogbookConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    if let Some(code) = &config.admin_code {
        ensure!(is_valid_code(code), InvalidCodeSnafu { code: code.clone() });
    }
    Ok(config)
}
