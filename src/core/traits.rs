use crate::core::{FetchedField, FieldDefinition, RegistryResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateSchemaRequest {
    pub name: String,
    pub data: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchemaResponse {
    pub schema_id: String,
}

/// A schema as the registry reports it back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaRecord {
    #[serde(default)]
    pub name: String,
    pub data: Vec<FetchedField>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttestationRequest {
    pub schema_id: String,
    pub data: BTreeMap<String, String>,
    pub indexing_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttestationReceipt {
    pub attestation_id: String,
}

/// The attestation registry of record. Implementations own signing and
/// transport; callers treat every failure as opaque.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn create_schema(
        &self,
        request: CreateSchemaRequest,
    ) -> RegistryResult<CreateSchemaResponse>;

    async fn get_schema(&self, schema_id: &str) -> RegistryResult<SchemaRecord>;

    async fn create_attestation(
        &self,
        request: CreateAttestationRequest,
    ) -> RegistryResult<AttestationReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attestation_request_uses_registry_key_names() {
        let request = CreateAttestationRequest {
            schema_id: "0xABC".into(),
            data: BTreeMap::from([("signer".to_string(), "0xAb".to_string())]),
            indexing_value: "0xab".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "schemaId": "0xABC",
                "data": {"signer": "0xAb"},
                "indexingValue": "0xab",
            })
        );
    }

    #[test]
    fn schema_record_name_is_optional() {
        let record: SchemaRecord = serde_json::from_value(serde_json::json!({
            "data": [{"name": "amount", "type": "uint256"}]
        }))
        .unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.data.len(), 1);
    }
}
