use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_RUNS: u64 = 200;
pub const DEFAULT_LANGUAGE: &str = "Solidity";

/// Compiler settings applied before every compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    pub optimize: bool,
    pub runs: u64,
    /// `None` lets the compiler pick its default EVM version.
    pub evm_version: Option<String>,
    pub language: String,
    pub use_file_configuration: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            optimize: false,
            runs: DEFAULT_RUNS,
            evm_version: None,
            language: DEFAULT_LANGUAGE.to_string(),
            use_file_configuration: false,
        }
    }
}

impl CompilerConfig {
    /// Parse a settings document, missing keys take their defaults. The
    /// document must be a JSON object.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        anyhow::ensure!(
            value.is_object(),
            "compiler settings must be a JSON object, found {}",
            value
        );
        Ok(serde_json::from_value(value)?)
    }

    /// The settings as compiler options, in the order they are applied.
    pub fn options(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("optimize", Value::Bool(self.optimize)),
            (
                "evmVersion",
                self.evm_version
                    .as_ref()
                    .map_or(Value::Null, |version| Value::String(version.clone())),
            ),
            ("language", Value::String(self.language.clone())),
            ("runs", Value::from(self.runs)),
            (
                "useFileConfiguration",
                Value::Bool(self.use_file_configuration),
            ),
        ]
    }
}
