use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use env_logger::Env;
use nessus_client::{
    cli::{Cli, Commands},
    config::Config,
    AlertQuery, Credentials, ExportRequest, NessusClient, ScanListQuery,
};
use serde_json::Value;
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(&path.to_string_lossy())
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    // CLI flags override the configuration file.
    if let Some(server) = &cli.server {
        config.server.url = server.clone();
    }
    if cli.insecure {
        config.server.verify_tls = false;
    }
    if let Some(timeout) = cli.timeout {
        config.server.request_timeout = Some(timeout);
    }
    if let Some(username) = &cli.username {
        config.auth.username = Some(username.clone());
    }
    if let Some(password) = &cli.password {
        config.auth.password = Some(password.clone());
    }
    if let Some(access_key) = &cli.access_key {
        config.auth.access_key = Some(access_key.clone());
    }
    if let Some(secret_key) = &cli.secret_key {
        config.auth.secret_key = Some(secret_key.clone());
    }

    let credentials = config.credentials()?;
    let needs_session = matches!(credentials, Credentials::UserPassword { .. });

    let mut client = match config.request_timeout() {
        Some(timeout) => NessusClient::with_timeout(
            &config.server.url,
            credentials,
            config.server.verify_tls,
            timeout,
        )?,
        None => NessusClient::new(&config.server.url, credentials, config.server.verify_tls)?,
    };

    if needs_session {
        client.session_create().await?;
    }

    match cli.command {
        Commands::Status => print_json(&client.server_status().await?)?,

        Commands::Properties => print_json(&client.server_properties().await?)?,

        Commands::HealthAlerts {
            since_hours,
            start_time,
            end_time,
        } => {
            let start_time =
                start_time.or_else(|| since_hours.map(|h| Utc::now().timestamp() - h * 3600));
            let query = AlertQuery {
                start_time,
                end_time,
            };
            print_json(&client.server_health_alerts(&query).await?)?;
        }

        Commands::Scans { folder_id, since } => {
            let query = ScanListQuery {
                folder_id,
                last_modification_date: since,
            };
            print_json(&client.scans_list(&query).await?)?;
        }

        Commands::Scan { scan_id } => print_json(&client.scans_details(scan_id).await?)?,

        Commands::Configure {
            scan_id,
            uuid,
            settings,
        } => {
            let settings: Value = match settings {
                Some(raw) => serde_json::from_str(&raw).context("--settings is not valid JSON")?,
                None => Value::Object(Default::default()),
            };
            print_json(&client.scans_configure(scan_id, &uuid, settings).await?)?;
        }

        Commands::Host { scan_id, host_id } => {
            print_json(&client.scans_host_details(scan_id, host_id).await?)?;
        }

        Commands::PluginOutput {
            scan_id,
            host_id,
            plugin_id,
            history_id,
        } => {
            print_json(
                &client
                    .scans_plugin_output(scan_id, host_id, plugin_id, history_id)
                    .await?,
            )?;
        }

        Commands::Attachment {
            scan_id,
            attachment_id,
            key,
            output,
        } => {
            let bytes = client
                .scans_attachment(scan_id, attachment_id, key.as_deref().unwrap_or(""))
                .await?;
            write_file(&output, &bytes).await?;
        }

        Commands::ExportFormats { scan_id } => {
            print_json(&client.scans_export_formats(scan_id).await?)?;
        }

        Commands::ExportRequest { scan_id, format } => {
            let export = ExportRequest::new(format.into());
            print_json(&client.scans_export_request(scan_id, &export).await?)?;
        }

        Commands::ExportStatus { scan_id, file_id } => {
            print_json(&client.scans_export_status(scan_id, file_id).await?)?;
        }

        Commands::ExportDownload {
            scan_id,
            file_id,
            output,
        } => {
            let bytes = client.scans_export_download(scan_id, file_id).await?;
            write_file(&output, &bytes).await?;
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
