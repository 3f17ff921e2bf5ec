//! PowerDNS DNS Agent
//!
//! Adds, replaces and removes record values in a PowerDNS zone, touching
//! only the record sets that need to change.
//!
//! # Usage
//! ```bash
//! # List records
//! powerdns-dns --server-url http://127.0.0.1:8081 list --zone example.org
//!
//! # Add a TXT value next to whatever is already there
//! powerdns-dns append --zone example.org --name _acme-challenge --type TXT --value token
//!
//! # Preview the removal without applying it
//! powerdns-dns delete --zone example.org --name _acme-challenge --type TXT --value token --dry-run
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use powerdns_dns::{PowerDnsClient, Provider, ProviderConfig, Record, TokenSource};

// ============================================================
// CLI Definition
// ============================================================

#[derive(Parser)]
#[command(name = "powerdns-dns")]
#[command(about = "PowerDNS record-set reconciliation agent", long_about = None)]
#[command(version)]
struct Cli {
    /// PowerDNS API base URL
    #[arg(long, env = "PDNS_SERVER_URL")]
    server_url: String,

    /// PowerDNS server ID
    #[arg(long, env = "PDNS_SERVER_ID", default_value = "localhost")]
    server_id: String,

    /// PowerDNS API key
    #[arg(long, env = "PDNS_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// GCP Project ID for Secret Manager (used when no API key is given)
    #[arg(long, env = "GCP_PROJECT_ID")]
    gcp_project: Option<String>,

    /// Secret name holding the PowerDNS API key
    #[arg(long, default_value = "powerdns-api-key")]
    secret_name: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RecordArgs {
    /// Zone name (e.g., example.org)
    #[arg(long)]
    zone: String,

    /// Record name, relative to the zone or absolute (e.g., www, @)
    #[arg(long)]
    name: String,

    /// Record type (A, AAAA, CNAME, TXT, MX)
    #[arg(long = "type")]
    record_type: String,

    /// Record value; repeat for several values
    #[arg(long = "value", required = true)]
    values: Vec<String>,

    /// TTL in seconds
    #[arg(long, default_value = "300")]
    ttl: u32,
}

impl RecordArgs {
    fn records(&self) -> Vec<Record> {
        let record_type = self.record_type.to_uppercase();
        self.values
            .iter()
            .map(|v| Record::new(&self.name, &record_type, v, self.ttl))
            .collect()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List records in a zone
    List {
        /// Zone name
        #[arg(long)]
        zone: String,
    },

    /// Add values, keeping those already present
    Append {
        #[command(flatten)]
        record: RecordArgs,

        /// Print the planned changes instead of applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Replace all values of a name/type
    Set {
        #[command(flatten)]
        record: RecordArgs,
    },

    /// Remove values, deleting the set once it is empty
    Delete {
        #[command(flatten)]
        record: RecordArgs,

        /// Print the planned changes instead of applying them
        #[arg(long)]
        dry_run: bool,
    },
}

// ============================================================
// Main Entry Point
// ============================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs)?;

    info!("🚀 PowerDNS DNS Agent starting...");

    let source = TokenSource::from_options(
        cli.api_token.clone(),
        cli.gcp_project.clone(),
        &cli.secret_name,
    )?;
    let api_token = source.resolve().await?;

    let config = ProviderConfig::new(&cli.server_url, api_token)
        .server_id(&cli.server_id)
        .timeout_secs(cli.timeout);
    let client = PowerDnsClient::new(config).context("Failed to create PowerDNS client")?;
    let provider = Provider::new(client);

    match cli.command {
        Commands::List { zone } => {
            info!("📋 Listing records for zone: {}", zone);
            let records = provider
                .get_records(&zone)
                .await
                .with_context(|| format!("Failed to list records for {}", zone))?;

            println!("\n{:<40} {:<6} {:<8} {:<40}", "NAME", "TYPE", "TTL", "VALUE");
            println!("{}", "-".repeat(96));
            for record in &records {
                println!(
                    "{:<40} {:<6} {:<8} {:<40}",
                    record.name,
                    record.record_type,
                    record.ttl,
                    truncate(&record.value, 40)
                );
            }

            info!("✅ Listed {} records", records.len());
        }

        Commands::Append { record, dry_run } => {
            let records = record.records();
            if dry_run {
                let plan = provider
                    .plan_append(&record.zone, &records)
                    .await
                    .context("Failed to plan append")?;
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }

            info!(
                "➕ Appending {} value(s) to {} {}",
                records.len(),
                record.name,
                record.record_type
            );
            let applied = provider
                .append_records(&record.zone, &records)
                .await
                .context("Failed to append records")?;

            println!("✅ Appended {} record(s)", applied.len());
        }

        Commands::Set { record } => {
            let records = record.records();
            info!(
                "✏️  Setting {} {} -> {:?}",
                record.name, record.record_type, record.values
            );
            let applied = provider
                .set_records(&record.zone, &records)
                .await
                .context("Failed to set records")?;

            println!("✅ Set {} record(s)", applied.len());
        }

        Commands::Delete { record, dry_run } => {
            let records = record.records();
            if dry_run {
                let plan = provider
                    .plan_delete(&record.zone, &records)
                    .await
                    .context("Failed to plan delete")?;
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }

            warn!(
                "🗑️  Deleting {} value(s) from {} {}",
                records.len(),
                record.name,
                record.record_type
            );
            let deleted = provider
                .delete_records(&record.zone, &records)
                .await
                .context("Failed to delete records")?;

            println!("✅ Deleted {} record(s)", deleted.len());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
