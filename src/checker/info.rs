use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AuditKitError;
use crate::Result;

/// Version tag prefix a well-configured checker must carry.
pub const VERSION_PREFIX: &str = "Checker ";

const CLASS_NAME: &str = "class-name";
const NAME: &str = "name";
const VERSION: &str = "version";
const DESCRIPTION: &str = "description";

/// Descriptive identity of a checker.
///
/// The serialized field order is significant for document round-trips:
/// `class-name`, `name`, `version`, `description`. Runtime statistics never
/// appear in the persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerInfo {
    #[serde(rename = "class-name", default)]
    class_name: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    description: String,
}

impl CheckerInfo {
    /// Creates the identity block for a concrete checker type.
    ///
    /// Fresh checkers carry the `"Checker 1.0"` version tag.
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            name: String::new(),
            version: format!("{VERSION_PREFIX}1.0"),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, value: impl Into<String>) {
        self.version = value.into();
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.description = value.into();
    }

    /// Returns true if the checker is well configured and can be used.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.version.starts_with(VERSION_PREFIX)
    }

    /// Label used in log lines and error messages: the name when set,
    /// otherwise the class name.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.class_name
        } else {
            &self.name
        }
    }

    /// Merges the fields present in `root` into this identity.
    ///
    /// Absent fields are left untouched. A non-object root or a wrong-typed
    /// field is malformed; the merge stops there, leaving whatever was
    /// already merged in place.
    ///
    /// # Errors
    /// Returns [`AuditKitError::Document`] on malformed input.
    pub fn merge_value(&mut self, root: &Value) -> Result<()> {
        let Some(object) = root.as_object() else {
            return Err(AuditKitError::Document(format!(
                "expected an object, got: {root}"
            )));
        };
        if let Some(value) = object.get(CLASS_NAME) {
            self.class_name = string_field(CLASS_NAME, value)?;
        }
        if let Some(value) = object.get(NAME) {
            self.name = string_field(NAME, value)?;
        }
        if let Some(value) = object.get(VERSION) {
            self.version = string_field(VERSION, value)?;
        }
        if let Some(value) = object.get(DESCRIPTION) {
            self.description = string_field(DESCRIPTION, value)?;
        }
        Ok(())
    }

    /// Serializes the identity into its JSON document form.
    ///
    /// # Errors
    /// Returns [`AuditKitError::Json`] if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn string_field(field: &str, value: &Value) -> Result<String> {
    value.as_str().map(ToOwned::to_owned).ok_or_else(|| {
        AuditKitError::Document(format!("field '{field}' must be a string, got: {value}"))
    })
}

impl fmt::Display for CheckerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[path = "info_tests.rs"]
mod tests;
