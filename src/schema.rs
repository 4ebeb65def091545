use anyhow::{Context, Result, anyhow};
use jsonschema::JSONSchema;
use serde_json::Value;

const MODEL_SCHEMA: &str = include_str!("model.schema.json");

/// Compiled JSON Schema for program model documents.
pub(crate) struct ModelValidator {
    schema: JSONSchema,
}

impl ModelValidator {
    pub(crate) fn new() -> Result<Self> {
        let schema_value: Value =
            serde_json::from_str(MODEL_SCHEMA).context("failed to parse model schema")?;
        let schema = JSONSchema::compile(&schema_value)
            .map_err(|err| anyhow!("failed to compile model schema: {err}"))?;
        Ok(Self { schema })
    }

    pub(crate) fn validate(&self, document: &Value) -> Result<()> {
        if let Err(errors) = self.schema.validate(document) {
            let messages: Vec<String> = errors
                .map(|error| format!("{}: {}", error.instance_path, error))
                .collect();
            anyhow::bail!("program model does not match schema: {}", messages.join("; "));
        }
        Ok(())
    }
}
