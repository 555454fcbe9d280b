//! Connector manifest validation
//!
//! Catches manifest mistakes at load time with messages that name the
//! offending field.

use super::manifest::{ConnectorManifest, SourceConfig, SourceType};
use super::{PluginError, PluginResult};
use crate::duration::parse_timeout;

/// Connector manifest validator
pub struct ConnectorValidator;

impl ConnectorValidator {
    /// Validate a connector manifest
    pub fn validate(manifest: &ConnectorManifest) -> PluginResult<()> {
        Self::validate_name(&manifest.name)?;
        Self::validate_version(&manifest.version)?;
        Self::validate_type_id(&manifest.type_id)?;
        Self::validate_source(&manifest.source)?;
        Ok(())
    }

    fn validate_name(name: &str) -> PluginResult<()> {
        if name.is_empty() {
            return Err(PluginError::ValidationError(
                "Connector name cannot be empty".to_string(),
            ));
        }

        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(PluginError::ValidationError(format!(
                "Connector name '{}' contains invalid characters. Use only alphanumeric, hyphens, and underscores",
                name
            )));
        }

        Ok(())
    }

    fn validate_version(version: &str) -> PluginResult<()> {
        if version.trim().is_empty() {
            return Err(PluginError::ValidationError(
                "Connector version cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Type ids are matched verbatim, so surrounding whitespace is rejected
    fn validate_type_id(type_id: &str) -> PluginResult<()> {
        if type_id.trim().is_empty() {
            return Err(PluginError::ValidationError(
                "Connector type_id cannot be empty".to_string(),
            ));
        }
        if type_id.trim() != type_id {
            return Err(PluginError::ValidationError(format!(
                "Connector type_id '{}' has leading or trailing whitespace",
                type_id
            )));
        }
        Ok(())
    }

    fn validate_source(source: &SourceConfig) -> PluginResult<()> {
        match source.source_type {
            SourceType::File => {
                Self::require_field(&source.file_path, "source.file_path", SourceType::File)?;
                // File catalogs always serve every operation
                if !source.capabilities.is_empty() {
                    return Err(PluginError::ValidationError(
                        "source.capabilities is only supported for http sources".to_string(),
                    ));
                }
            }
            SourceType::Http => {
                Self::require_field(&source.endpoint, "source.endpoint", SourceType::Http)?;
                if let Some(endpoint) = &source.endpoint {
                    url::Url::parse(endpoint).map_err(|e| {
                        PluginError::ValidationError(format!(
                            "Invalid source.endpoint '{}': {}",
                            endpoint, e
                        ))
                    })?;
                }
            }
        }

        if let Some(auth) = &source.auth {
            let missing = auth.missing_fields();
            if !missing.is_empty() {
                return Err(PluginError::ValidationError(format!(
                    "source.auth is missing: {}",
                    missing.join(", ")
                )));
            }
        }

        if let Some(timeout) = &source.timeout {
            Self::validate_duration(timeout, "timeout")?;
        }

        Ok(())
    }

    fn validate_duration(duration: &str, field_name: &str) -> PluginResult<()> {
        parse_timeout(duration).map(|_| ()).map_err(|_| {
            PluginError::ValidationError(format!(
                "Invalid {} '{}'. Expected format: '500ms', '30s', '1m', '1h'",
                field_name, duration
            ))
        })
    }

    fn require_field<T>(
        field: &Option<T>,
        field_name: &str,
        source_type: SourceType,
    ) -> PluginResult<()> {
        if field.is_none() {
            return Err(PluginError::ValidationError(format!(
                "Missing required field '{}' for source type '{}'",
                field_name, source_type
            )));
        }
        Ok(())
    }
}
