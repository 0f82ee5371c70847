use anyhow::Context;
use attestkit::registry::InMemoryRegistry;
use attestkit::{AppConfig, AttestationComposer, DataType, SchemaBuilder};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Define a schema, register it, then attest against it.
#[derive(Parser, Debug)]
#[command(name = "attestkit", version, about)]
struct Cli {
    /// Schema field as `name:type`, repeatable.
    #[arg(long = "field", value_parser = parse_field, required = true)]
    fields: Vec<(String, DataType)>,

    /// Attestation value as `name=value`, repeatable. Without any, the
    /// schema is registered and fetched but nothing is attested.
    #[arg(long = "value", value_parser = parse_value)]
    values: Vec<(String, String)>,

    /// Overrides ATTEST_SCHEMA_NAME.
    #[arg(long)]
    schema_name: Option<String>,
}

fn parse_field(s: &str) -> Result<(String, DataType), String> {
    let (name, tag) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected name:type, got '{s}'"))?;
    let data_type = tag.parse::<DataType>().map_err(|e| e.to_string())?;
    Ok((name.to_string(), data_type))
}

fn parse_value(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    Ok((name.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let outcome = run(cli, config).await?;

    println!("schema: {}", outcome.schema_id);
    if let Some(attestation_id) = outcome.attestation_id {
        println!("attestation: {attestation_id}");
    }
    Ok(())
}

struct Outcome {
    schema_id: String,
    attestation_id: Option<String>,
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<Outcome> {
    let schema_name = cli.schema_name.unwrap_or_else(|| config.schema_name.clone());
    tracing::info!(network = %config.network, signer = config.signer.address(), "starting");

    let registry = Arc::new(InMemoryRegistry::new(
        config.network.clone(),
        config.signer.clone(),
    ));

    let builder = SchemaBuilder::with_options(registry.clone(), config.builder);
    for (name, data_type) in cli.fields {
        builder.set_pending_name(name.as_str());
        builder.set_pending_type(data_type);
        builder
            .add_field()
            .with_context(|| format!("cannot add field '{name}'"))?;
    }
    let schema_id = builder.register_schema(&schema_name).await?;

    let composer = AttestationComposer::with_options(registry, config.composer);
    composer.set_schema_id(schema_id.clone());
    composer.fetch_schema().await?;
    if cli.values.is_empty() {
        tracing::info!(%schema_id, "no --value given, skipping attestation");
        return Ok(Outcome {
            schema_id,
            attestation_id: None,
        });
    }
    for (name, value) in cli.values {
        composer
            .set_field_value(&name, value)
            .with_context(|| format!("cannot set value for '{name}'"))?;
    }
    let receipt = composer.submit_attestation().await?;

    Ok(Outcome {
        schema_id,
        attestation_id: Some(receipt.attestation_id),
    })
}
