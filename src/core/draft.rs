use crate::core::{DataType, FetchedField, FieldIssue, FieldKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key the registry indexes attestations by.
pub const SIGNER_FIELD: &str = "signer";

/// User-entered values for one fetched schema, keyed by field name.
/// A key exists only once its input has been edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttestationDraft {
    values: BTreeMap<String, String>,
}

impl AttestationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    /// What an input shows before it has been touched.
    pub fn value_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn indexing_value(&self) -> String {
        self.get(SIGNER_FIELD)
            .map(|signer| signer.to_lowercase())
            .unwrap_or_default()
    }

    /// Checks every recorded value against the declared type of its field.
    /// Untouched fields and fields with unknown types are not checked.
    pub fn validate_against(&self, fields: &[FetchedField]) -> Vec<FieldIssue> {
        fields
            .iter()
            .filter_map(|field| {
                let value = self.get(&field.name)?;
                if is_value_compatible_with_kind(value, &field.kind) {
                    None
                } else {
                    Some(FieldIssue {
                        field: field.name.clone(),
                        expected: field.kind.tag().to_string(),
                        value: value.to_string(),
                    })
                }
            })
            .collect()
    }
}

fn is_value_compatible_with_kind(value: &str, kind: &FieldKind) -> bool {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match kind {
        FieldKind::Known(DataType::Uint256) => digits(value),
        FieldKind::Known(DataType::Int256) => digits(value.strip_prefix('-').unwrap_or(value)),
        FieldKind::Known(DataType::Boolean) => value == "true" || value == "false",
        FieldKind::Known(DataType::Address) => value
            .strip_prefix("0x")
            .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit())),
        FieldKind::Known(DataType::String) => true,
        FieldKind::Unknown(_) => true,
    }
}
