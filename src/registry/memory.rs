use crate::config::SignerAccount;
use crate::core::{
    AttestationReceipt, CreateAttestationRequest, CreateSchemaRequest, CreateSchemaResponse,
    FetchedField, Registry, RegistryError, RegistryResult, SchemaRecord,
};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// An attestation as recorded by [`InMemoryRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAttestation {
    pub attestation_id: String,
    pub schema_id: String,
    pub attester: String,
    pub data: BTreeMap<String, String>,
    pub indexing_value: String,
}

#[derive(Default)]
struct Store {
    schemas: HashMap<String, SchemaRecord>,
    attestations: Vec<StoredAttestation>,
    next_schema: u64,
    next_attestation: u64,
}

/// Process-local registry. Identifiers are sequential per network and
/// nothing survives a restart.
pub struct InMemoryRegistry {
    network: String,
    signer: SignerAccount,
    store: RwLock<Store>,
}

impl InMemoryRegistry {
    pub fn new(network: impl Into<String>, signer: SignerAccount) -> Self {
        Self {
            network: network.into(),
            signer,
            store: RwLock::new(Store::default()),
        }
    }

    pub async fn attestation(&self, attestation_id: &str) -> Option<StoredAttestation> {
        let store = self.store.read().await;
        store
            .attestations
            .iter()
            .find(|a| a.attestation_id == attestation_id)
            .cloned()
    }

    /// Attestations recorded under an indexing value, oldest first.
    pub async fn attestations_by_index(&self, indexing_value: &str) -> Vec<StoredAttestation> {
        let store = self.store.read().await;
        store
            .attestations
            .iter()
            .filter(|a| a.indexing_value == indexing_value)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn create_schema(
        &self,
        request: CreateSchemaRequest,
    ) -> RegistryResult<CreateSchemaResponse> {
        if request.data.is_empty() {
            return Err(RegistryError::Rejected("schema has no fields".to_string()));
        }

        let mut store = self.store.write().await;
        store.next_schema += 1;
        let schema_id = format!("{}_schema_0x{:x}", self.network, store.next_schema);
        let record = SchemaRecord {
            name: request.name,
            data: request.data.into_iter().map(FetchedField::from).collect(),
        };
        store.schemas.insert(schema_id.clone(), record);

        Ok(CreateSchemaResponse { schema_id })
    }

    async fn get_schema(&self, schema_id: &str) -> RegistryResult<SchemaRecord> {
        let store = self.store.read().await;
        store
            .schemas
            .get(schema_id)
            .cloned()
            .ok_or_else(|| RegistryError::SchemaNotFound(schema_id.to_string()))
    }

    async fn create_attestation(
        &self,
        request: CreateAttestationRequest,
    ) -> RegistryResult<AttestationReceipt> {
        let mut store = self.store.write().await;
        let schema = store
            .schemas
            .get(&request.schema_id)
            .ok_or_else(|| RegistryError::SchemaNotFound(request.schema_id.clone()))?;
        if let Some(key) = request
            .data
            .keys()
            .find(|key| !schema.data.iter().any(|f| &f.name == *key))
        {
            return Err(RegistryError::Rejected(format!(
                "field '{}' is not part of schema {}",
                key, request.schema_id
            )));
        }

        store.next_attestation += 1;
        let attestation_id = format!("{}_attestation_0x{:x}", self.network, store.next_attestation);
        store.attestations.push(StoredAttestation {
            attestation_id: attestation_id.clone(),
            schema_id: request.schema_id,
            attester: self.signer.address().to_string(),
            data: request.data,
            indexing_value: request.indexing_value,
        });

        Ok(AttestationReceipt { attestation_id })
    }
}
