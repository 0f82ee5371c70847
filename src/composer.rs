use crate::core::activity::lock;
use crate::core::{
    Activity, AttestationDraft, AttestationReceipt, CreateAttestationRequest, FetchedField,
    FieldKind, Operation, Precondition, Registry, Result, Schema, Status, WorkflowError,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Default)]
pub struct ComposerOptions {
    /// Empty the draft after a successful submission.
    pub clear_draft_on_submit: bool,
    /// Check draft values against their declared types before submitting.
    pub validate_values: bool,
}

/// One input of the form derived from a fetched schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,
    pub kind: FieldKind,
    pub value: String,
    pub placeholder: String,
}

#[derive(Debug, Default)]
struct ComposerState {
    schema_id: String,
    schema: Option<Schema>,
    draft: AttestationDraft,
    last_receipt: Option<AttestationReceipt>,
}

/// Fetches a registered schema, collects values for its fields and submits
/// them as an attestation.
pub struct AttestationComposer {
    registry: Arc<dyn Registry>,
    options: ComposerOptions,
    state: Mutex<ComposerState>,
    activity: Mutex<Activity>,
}

impl AttestationComposer {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self::with_options(registry, ComposerOptions::default())
    }

    pub fn with_options(registry: Arc<dyn Registry>, options: ComposerOptions) -> Self {
        Self {
            registry,
            options,
            state: Mutex::new(ComposerState::default()),
            activity: Mutex::new(Activity::default()),
        }
    }

    pub fn set_schema_id(&self, text: impl Into<String>) {
        lock(&self.state).schema_id = text.into();
    }

    /// Loads the schema named by the identifier input, sent to the registry
    /// exactly as entered. On failure the previously fetched schema, if
    /// any, stays in place.
    pub async fn fetch_schema(&self) -> Result<Schema> {
        let schema_id = lock(&self.state).schema_id.clone();
        if schema_id.is_empty() {
            return Err(rejected(Precondition::EmptySchemaId));
        }
        let Some(guard) = Activity::try_begin(&self.activity) else {
            return Err(rejected(Precondition::Busy));
        };

        match self.registry.get_schema(&schema_id).await {
            Ok(record) => {
                let schema = Schema::new(schema_id, record.name, record.data);
                for field in schema.unknown_fields() {
                    tracing::warn!(
                        schema_id = %schema.id,
                        field = %field.name,
                        tag = field.kind.tag(),
                        "schema field has an unrecognized type"
                    );
                }
                tracing::info!(
                    schema_id = %schema.id,
                    fields = schema.fields.len(),
                    "schema fetched"
                );

                let mut state = lock(&self.state);
                state.schema = Some(schema.clone());
                state.draft.clear();
                drop(state);
                guard.finish(None);
                Ok(schema)
            }
            Err(source) => {
                tracing::error!(%schema_id, error = %source, "error fetching schema");
                guard.finish(Some(Status::Failed(Operation::FetchSchema)));
                Err(WorkflowError::OperationFailed {
                    operation: Operation::FetchSchema,
                    source,
                })
            }
        }
    }

    /// Records the text of one input. Values are not checked against the
    /// field's type here.
    pub fn set_field_value(&self, name: &str, value: impl Into<String>) -> Result<()> {
        let mut state = lock(&self.state);
        let known = match &state.schema {
            None => return Err(rejected(Precondition::NoSchemaFetched)),
            Some(schema) => schema.get_field(name).is_some(),
        };
        if !known {
            return Err(rejected(Precondition::UnknownField));
        }
        state.draft.set(name, value);
        Ok(())
    }

    /// Submits the draft against the fetched schema. The indexing value is
    /// the lower-cased `signer` entry, or empty.
    pub async fn submit_attestation(&self) -> Result<AttestationReceipt> {
        let request = {
            let state = lock(&self.state);
            let Some(schema) = &state.schema else {
                return Err(rejected(Precondition::NoSchemaFetched));
            };
            if state.draft.is_empty() {
                return Err(rejected(Precondition::EmptyDraft));
            }
            if self.options.validate_values {
                let issues = state.draft.validate_against(&schema.fields);
                if !issues.is_empty() {
                    tracing::warn!(
                        schema_id = %schema.id,
                        ?issues,
                        "draft does not match schema types"
                    );
                    return Err(WorkflowError::InvalidDraft(issues));
                }
            }
            CreateAttestationRequest {
                schema_id: schema.id.clone(),
                data: state.draft.values().clone(),
                indexing_value: state.draft.indexing_value(),
            }
        };
        let Some(guard) = Activity::try_begin(&self.activity) else {
            return Err(rejected(Precondition::Busy));
        };

        let schema_id = request.schema_id.clone();
        match self.registry.create_attestation(request).await {
            Ok(receipt) => {
                tracing::info!(
                    %schema_id,
                    attestation_id = %receipt.attestation_id,
                    "attestation created"
                );
                let mut state = lock(&self.state);
                state.last_receipt = Some(receipt.clone());
                if self.options.clear_draft_on_submit {
                    state.draft.clear();
                }
                drop(state);
                guard.finish(Some(Status::AttestationCreated));
                Ok(receipt)
            }
            Err(source) => {
                tracing::error!(%schema_id, error = %source, "error creating attestation");
                guard.finish(Some(Status::Failed(Operation::CreateAttestation)));
                Err(WorkflowError::OperationFailed {
                    operation: Operation::CreateAttestation,
                    source,
                })
            }
        }
    }

    /// One input per fetched field, in schema order.
    pub fn form(&self) -> Vec<FormInput> {
        let state = lock(&self.state);
        let Some(schema) = &state.schema else {
            return Vec::new();
        };
        schema
            .fields
            .iter()
            .map(|field| FormInput {
                name: field.name.clone(),
                kind: field.kind.clone(),
                value: state.draft.value_or_empty(&field.name).to_string(),
                placeholder: format!("Enter {}", field.name),
            })
            .collect()
    }

    pub fn schema_id(&self) -> String {
        lock(&self.state).schema_id.clone()
    }

    pub fn schema(&self) -> Option<Schema> {
        lock(&self.state).schema.clone()
    }

    pub fn fields(&self) -> Option<Vec<FetchedField>> {
        lock(&self.state).schema.as_ref().map(|s| s.fields.clone())
    }

    pub fn draft(&self) -> AttestationDraft {
        lock(&self.state).draft.clone()
    }

    pub fn last_receipt(&self) -> Option<AttestationReceipt> {
        lock(&self.state).last_receipt.clone()
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.activity).is_busy()
    }

    pub fn status(&self) -> Option<Status> {
        lock(&self.activity).status()
    }

    pub fn can_fetch(&self) -> bool {
        !self.is_busy() && !lock(&self.state).schema_id.is_empty()
    }

    pub fn can_submit(&self) -> bool {
        let state = lock(&self.state);
        !self.is_busy() && state.schema.is_some() && !state.draft.is_empty()
    }
}

fn rejected(precondition: Precondition) -> WorkflowError {
    tracing::debug!(?precondition, "attestation composer action rejected");
    WorkflowError::PreconditionNotMet(precondition)
}
