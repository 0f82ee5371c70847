use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The field types a schema can declare through the builder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Uint256,
    Int256,
    String,
    Boolean,
    Address,
}

impl DataType {
    /// Menu order of the type selector.
    pub const ALL: [DataType; 5] = [
        DataType::Uint256,
        DataType::Int256,
        DataType::String,
        DataType::Boolean,
        DataType::Address,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Uint256 => "uint256",
            DataType::Int256 => "int256",
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Address => "address",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown data type '{0}'")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownDataType(s.to_string()))
    }
}

/// A field as authored in the builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Type tag of a field descriptor returned by the registry. Tags outside
/// the five known types are kept verbatim instead of being trusted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldKind {
    Known(DataType),
    Unknown(String),
}

impl FieldKind {
    pub fn is_known(&self) -> bool {
        matches!(self, FieldKind::Known(_))
    }

    pub fn tag(&self) -> &str {
        match self {
            FieldKind::Known(t) => t.as_str(),
            FieldKind::Unknown(tag) => tag,
        }
    }
}

impl From<DataType> for FieldKind {
    fn from(data_type: DataType) -> Self {
        FieldKind::Known(data_type)
    }
}

/// A field descriptor as fetched from the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchedField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

impl FetchedField {
    pub fn new(name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

impl From<FieldDefinition> for FetchedField {
    fn from(field: FieldDefinition) -> Self {
        Self {
            name: field.name,
            kind: FieldKind::Known(field.data_type),
        }
    }
}

/// A registered schema as seen by the composer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    pub id: String,
    pub name: String,
    pub fields: Vec<FetchedField>,
}

impl Schema {
    pub fn new(id: impl Into<String>, name: impl Into<String>, fields: Vec<FetchedField>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields,
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&FetchedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn unknown_fields(&self) -> impl Iterator<Item = &FetchedField> {
        self.fields.iter().filter(|f| !f.kind.is_known())
    }
}

/// Names that occur more than once, in order of their second occurrence.
pub fn duplicate_names<'a, I>(names: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for name in names {
        if !seen.insert(name) && !duplicates.contains(&name) {
            duplicates.push(name);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_tags_round_trip_through_from_str() {
        for t in DataType::ALL {
            assert_eq!(t.as_str().parse::<DataType>().unwrap(), t);
        }
        assert!("bytes32".parse::<DataType>().is_err());
        assert_eq!(
            "Uint256".parse::<DataType>().unwrap_err().to_string(),
            "unknown data type 'Uint256'"
        );
    }

    #[test]
    fn default_type_is_first_menu_entry() {
        assert_eq!(DataType::default(), DataType::ALL[0]);
    }

    #[test]
    fn field_definition_serializes_with_type_key() {
        let json = serde_json::to_value(FieldDefinition::new("amount", DataType::Uint256)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "amount", "type": "uint256"}));
    }

    #[test]
    fn fetched_field_flags_unknown_tags() {
        let fields: Vec<FetchedField> = serde_json::from_value(serde_json::json!([
            {"name": "signer", "type": "address"},
            {"name": "blob", "type": "bytes32"},
        ]))
        .unwrap();

        assert_eq!(fields[0].kind, FieldKind::Known(DataType::Address));
        assert_eq!(fields[1].kind, FieldKind::Unknown("bytes32".to_string()));
        assert_eq!(fields[1].kind.tag(), "bytes32");
    }

    #[test]
    fn duplicate_names_reports_each_name_once() {
        let dups = duplicate_names(["a", "b", "a", "c", "a", "b"]);
        assert_eq!(dups, vec!["a", "b"]);
        assert!(duplicate_names(["x", "y"]).is_empty());
    }
}
