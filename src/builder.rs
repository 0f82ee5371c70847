use crate::core::activity::lock;
use crate::core::{
    Activity, CreateSchemaRequest, DataType, FieldDefinition, Operation, Precondition, Registry,
    Result, Status, WorkflowError, duplicate_names,
};
use std::sync::{Arc, Mutex};

/// What `add_field` does with a name that is already in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateNames {
    #[default]
    Allow,
    Reject,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuilderOptions {
    pub duplicate_names: DuplicateNames,
}

#[derive(Debug, Default)]
struct BuilderState {
    fields: Vec<FieldDefinition>,
    pending_name: String,
    pending_type: DataType,
    schema_id: Option<String>,
}

/// Accumulates field definitions and registers them as a schema.
pub struct SchemaBuilder {
    registry: Arc<dyn Registry>,
    options: BuilderOptions,
    state: Mutex<BuilderState>,
    activity: Mutex<Activity>,
}

impl SchemaBuilder {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self::with_options(registry, BuilderOptions::default())
    }

    pub fn with_options(registry: Arc<dyn Registry>, options: BuilderOptions) -> Self {
        Self {
            registry,
            options,
            state: Mutex::new(BuilderState::default()),
            activity: Mutex::new(Activity::default()),
        }
    }

    pub fn set_pending_name(&self, text: impl Into<String>) {
        lock(&self.state).pending_name = text.into();
    }

    pub fn set_pending_type(&self, data_type: DataType) {
        lock(&self.state).pending_type = data_type;
    }

    /// Appends the pending field and resets the inputs. Returns the index
    /// of the new field.
    pub fn add_field(&self) -> Result<usize> {
        let mut state = lock(&self.state);
        if state.pending_name.trim().is_empty() {
            return Err(rejected(Precondition::EmptyFieldName));
        }
        if self.options.duplicate_names == DuplicateNames::Reject
            && state.fields.iter().any(|f| f.name == state.pending_name)
        {
            return Err(rejected(Precondition::DuplicateFieldName));
        }

        let name = std::mem::take(&mut state.pending_name);
        let data_type = std::mem::take(&mut state.pending_type);
        state.fields.push(FieldDefinition::new(name, data_type));
        Ok(state.fields.len() - 1)
    }

    pub fn remove_field(&self, index: usize) -> Result<FieldDefinition> {
        let mut state = lock(&self.state);
        if index >= state.fields.len() {
            return Err(rejected(Precondition::IndexOutOfRange));
        }
        Ok(state.fields.remove(index))
    }

    /// Registers the current field list under `name` and stores the
    /// identifier the registry assigns.
    pub async fn register_schema(&self, name: &str) -> Result<String> {
        let fields = {
            let state = lock(&self.state);
            if state.fields.is_empty() {
                return Err(rejected(Precondition::NoFields));
            }
            state.fields.clone()
        };
        let Some(guard) = Activity::try_begin(&self.activity) else {
            return Err(rejected(Precondition::Busy));
        };

        let duplicates = duplicate_names(fields.iter().map(|f| f.name.as_str()));
        if !duplicates.is_empty() {
            tracing::warn!(
                schema = name,
                ?duplicates,
                "registering schema with duplicate field names"
            );
        }

        let request = CreateSchemaRequest {
            name: name.to_string(),
            data: fields,
        };
        match self.registry.create_schema(request).await {
            Ok(response) => {
                tracing::info!(schema = name, schema_id = %response.schema_id, "schema created");
                lock(&self.state).schema_id = Some(response.schema_id.clone());
                guard.finish(None);
                Ok(response.schema_id)
            }
            Err(source) => {
                tracing::error!(schema = name, error = %source, "error creating schema");
                guard.finish(Some(Status::Failed(Operation::CreateSchema)));
                Err(WorkflowError::OperationFailed {
                    operation: Operation::CreateSchema,
                    source,
                })
            }
        }
    }

    pub fn fields(&self) -> Vec<FieldDefinition> {
        lock(&self.state).fields.clone()
    }

    pub fn pending_name(&self) -> String {
        lock(&self.state).pending_name.clone()
    }

    pub fn pending_type(&self) -> DataType {
        lock(&self.state).pending_type
    }

    pub fn schema_id(&self) -> Option<String> {
        lock(&self.state).schema_id.clone()
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.activity).is_busy()
    }

    pub fn status(&self) -> Option<Status> {
        lock(&self.activity).status()
    }

    /// Whether the register control is enabled.
    pub fn can_register(&self) -> bool {
        !self.is_busy() && !lock(&self.state).fields.is_empty()
    }
}

fn rejected(precondition: Precondition) -> WorkflowError {
    tracing::debug!(?precondition, "schema builder action rejected");
    WorkflowError::PreconditionNotMet(precondition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        AttestationReceipt, CreateAttestationRequest, CreateSchemaResponse, RegistryError,
        RegistryResult, SchemaRecord,
    };
    use async_trait::async_trait;

    struct FixedId(&'static str);

    #[async_trait]
    impl Registry for FixedId {
        async fn create_schema(
            &self,
            _request: CreateSchemaRequest,
        ) -> RegistryResult<CreateSchemaResponse> {
            Ok(CreateSchemaResponse {
                schema_id: self.0.to_string(),
            })
        }

        async fn get_schema(&self, schema_id: &str) -> RegistryResult<SchemaRecord> {
            Err(RegistryError::SchemaNotFound(schema_id.to_string()))
        }

        async fn create_attestation(
            &self,
            _request: CreateAttestationRequest,
        ) -> RegistryResult<AttestationReceipt> {
            Err(RegistryError::Rejected("unsupported".into()))
        }
    }

    fn builder() -> SchemaBuilder {
        SchemaBuilder::new(Arc::new(FixedId("0xABC")))
    }

    fn add(builder: &SchemaBuilder, name: &str, data_type: DataType) -> Result<usize> {
        builder.set_pending_name(name);
        builder.set_pending_type(data_type);
        builder.add_field()
    }

    #[test]
    fn add_field_appends_in_call_order_and_resets_inputs() {
        let builder = builder();
        add(&builder, "amount", DataType::Uint256).unwrap();
        add(&builder, "signer", DataType::Address).unwrap();

        assert_eq!(
            builder.fields(),
            vec![
                FieldDefinition::new("amount", DataType::Uint256),
                FieldDefinition::new("signer", DataType::Address),
            ]
        );
        assert_eq!(builder.pending_name(), "");
        assert_eq!(builder.pending_type(), DataType::Uint256);
    }

    #[test]
    fn blank_names_are_ignored() {
        let builder = builder();
        for name in ["", "   ", "\t\n"] {
            let err = add(&builder, name, DataType::String).unwrap_err();
            assert!(matches!(err, WorkflowError::PreconditionNotMet(Precondition::EmptyFieldName)));
        }
        assert!(builder.fields().is_empty());
        assert_eq!(builder.pending_type(), DataType::String);
    }

    #[test]
    fn names_are_stored_untrimmed() {
        let builder = builder();
        add(&builder, " amount ", DataType::Uint256).unwrap();
        assert_eq!(builder.fields()[0].name, " amount ");
    }

    #[test]
    fn remove_field_preserves_order_of_remainder() {
        let builder = builder();
        for name in ["a", "b", "c", "d"] {
            add(&builder, name, DataType::String).unwrap();
        }

        let removed = builder.remove_field(1).unwrap();
        assert_eq!(removed.name, "b");
        let names: Vec<String> = builder.fields().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn remove_field_out_of_range_changes_nothing() {
        let builder = builder();
        add(&builder, "a", DataType::String).unwrap();

        let err = builder.remove_field(3).unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionNotMet(Precondition::IndexOutOfRange)));
        assert_eq!(builder.fields().len(), 1);
    }

    #[test]
    fn duplicates_are_allowed_by_default() {
        let builder = builder();
        add(&builder, "a", DataType::String).unwrap();
        add(&builder, "a", DataType::Uint256).unwrap();
        assert_eq!(builder.fields().len(), 2);
    }

    #[test]
    fn duplicates_can_be_rejected() {
        let builder = SchemaBuilder::with_options(
            Arc::new(FixedId("0x1")),
            BuilderOptions {
                duplicate_names: DuplicateNames::Reject,
            },
        );
        add(&builder, "a", DataType::String).unwrap();

        let err = add(&builder, "a", DataType::Uint256).unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionNotMet(Precondition::DuplicateFieldName)));
        assert_eq!(builder.fields().len(), 1);
        assert_eq!(builder.pending_name(), "a");
    }

    #[tokio::test]
    async fn register_requires_fields() {
        let builder = builder();
        assert!(!builder.can_register());

        let err = builder.register_schema("empty").await.unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionNotMet(Precondition::NoFields)));
        assert!(builder.schema_id().is_none());
        assert!(!builder.is_busy());
    }

    #[tokio::test]
    async fn register_stores_assigned_identifier() {
        let builder = builder();
        add(&builder, "amount", DataType::Uint256).unwrap();
        assert!(builder.can_register());

        let id = builder.register_schema("SDK Test").await.unwrap();
        assert_eq!(id, "0xABC");
        assert_eq!(builder.schema_id().as_deref(), Some("0xABC"));
        assert!(!builder.is_busy());
        assert_eq!(builder.status(), None);
    }
}
