use crate::alert::{compose_alerts, dispatch_alerts, AlertRequest, DispatchSummary};
use crate::cert::{evaluate, format_remaining, parse_columns, scan_directory, ExpiryReport};
use crate::cli::args::*;
use crate::config::{resolve_hostname, MonitorConfig};
use crate::pagerduty::PagerDutyClient;
use crate::utils::errors::{PagerError, Result};
use crate::utils::output::{build_table_data, OutputFormat};
use chrono::{DateTime, Utc};
use clap::CommandFactory;
use clap_complete::generate;
use std::io;
use std::path::PathBuf;

pub async fn handle_command(cli: Cli) -> Result<()> {
    // Initialize logging - always to stderr
    if !cli.quiet {
        let log_level = match cli.verbose {
            0 => "x509_expiry_pager=info",
            1 => "x509_expiry_pager=debug",
            _ => "x509_expiry_pager=trace",
        };

        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(log_level)
            .init();
    }

    let output = OutputFormat::new(cli.raw);

    match cli.command {
        Commands::Check {
            target,
            routing_key,
            hostname,
            events_url,
        } => {
            let config = MonitorConfig::new(
                PathBuf::from(target.cert_dir),
                target.seconds_to_expiry,
                routing_key,
                resolve_hostname(hostname.as_deref()),
                events_url,
            );
            run_check(&config, Utc::now()).await?;
            Ok(())
        }
        Commands::List { target, columns } => {
            handle_list_command(&target, columns.as_deref(), &output)
        }
        Commands::Completion { ref command } => handle_completion_command(command),
    }
}

/// How the alerting half of a check run ended
#[derive(Debug)]
pub enum CheckOutcome {
    /// No routing key, alerts were composed but not sent
    DispatchDisabled { pending: usize },
    /// The HTTP client could not be built, nothing was sent
    ClientUnavailable { pending: usize, error: PagerError },
    Dispatched(DispatchSummary),
}

/// Scan, evaluate and alert.
///
/// Per-alert failures are inside the outcome; only an unreadable directory
/// fails the run.
pub async fn run_check(config: &MonitorConfig, now: DateTime<Utc>) -> Result<CheckOutcome> {
    let alerts = prepare_alerts(config, now)?;

    let Some(routing_key) = config.routing_key.as_ref() else {
        tracing::warn!(
            "No PagerDuty routing key configured, skipping {} alerts",
            alerts.len()
        );
        return Ok(CheckOutcome::DispatchDisabled {
            pending: alerts.len(),
        });
    };

    if alerts.is_empty() {
        return Ok(CheckOutcome::Dispatched(DispatchSummary::default()));
    }

    let client = match PagerDutyClient::new(routing_key.clone(), config.events_url.clone()) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!("Unable to create PagerDuty client, no alerts sent: {error}");
            return Ok(CheckOutcome::ClientUnavailable {
                pending: alerts.len(),
                error,
            });
        }
    };

    tracing::debug!("Using PagerDuty endpoint {}", client.events_url());

    let summary = dispatch_alerts(&client, &alerts).await;
    tracing::info!(
        "dispatched {} alerts: {} accepted, {} rejected, {} failed",
        summary.attempted(),
        summary.accepted(),
        summary.rejected(),
        summary.failed()
    );

    Ok(CheckOutcome::Dispatched(summary))
}

/// Build the alerts for this run, logging every certificate on the way
pub fn prepare_alerts(config: &MonitorConfig, now: DateTime<Utc>) -> Result<Vec<AlertRequest>> {
    let records = scan_directory(&config.cert_dir)?;
    let report = evaluate(&records, config.seconds_to_expiry, now);

    log_report(&report);

    Ok(compose_alerts(&report, &config.hostname))
}

fn log_report(report: &ExpiryReport<'_>) {
    for classification in &report.classifications {
        tracing::info!(
            "certificate {} issued by {} has {} until expiry",
            classification.record.subject,
            classification.record.issuer_common_name,
            format_remaining(classification.time_to_expiry)
        );
    }

    tracing::info!(
        "found {} certificates with less than {} seconds till expiry",
        report.near_expiry().count(),
        report.threshold_seconds
    );
}

fn handle_list_command(
    target: &TargetArgs,
    columns: Option<&str>,
    output: &OutputFormat,
) -> Result<()> {
    let columns = parse_columns(columns)?;
    let records = scan_directory(&PathBuf::from(&target.cert_dir))?;
    let report = evaluate(&records, target.seconds_to_expiry, Utc::now());

    if report.classifications.is_empty() {
        return Ok(());
    }

    let table = build_table_data(&report.classifications, &columns);
    output.print_table(&table);
    Ok(())
}

fn handle_completion_command(command: &CompletionCommands) -> Result<()> {
    let mut cmd = Cli::command();
    generate(command.shell(), &mut cmd, "x509-expiry-pager", &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Severity;
    use crate::cert::loader::tests::generate_cert_expiring;
    use crate::pagerduty::DEFAULT_EVENTS_URL;
    use std::fs;
    use std::time::Duration as StdDuration;

    /// 2030-01-01T00:00:00Z
    fn base_expiry() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn config_for(dir: &std::path::Path, routing_key: Option<&str>, events_url: &str) -> MonitorConfig {
        MonitorConfig::new(
            dir.to_path_buf(),
            3600,
            routing_key.map(str::to_string),
            "web01".to_string(),
            events_url.to_string(),
        )
    }

    /// a.pem expires 10s after `now`, b.pem 1,000,000s after
    fn write_scenario(dir: &std::path::Path) -> DateTime<Utc> {
        let now = base_expiry() - chrono::Duration::seconds(10);
        let (a, _) = generate_cert_expiring("a.example.com", 2030, StdDuration::ZERO);
        let (b, _) = generate_cert_expiring("b.example.com", 2030, StdDuration::from_secs(999_990));
        fs::write(dir.join("a.pem"), a).unwrap();
        fs::write(dir.join("b.pem"), b).unwrap();
        now
    }

    #[test]
    fn test_scenario_only_near_expiry_alerted() {
        let dir = tempfile::tempdir().unwrap();
        let now = write_scenario(dir.path());
        let config = config_for(dir.path(), None, DEFAULT_EVENTS_URL);

        let alerts = prepare_alerts(&config, now).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].details.filename, "a.pem");
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].dedup_key, "web01_a.pem");
        assert_eq!(alerts[0].details.subject, "CN=a.example.com");
    }

    #[test]
    fn test_prepare_alerts_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir.path().join("gone"), None, DEFAULT_EVENTS_URL);

        let result = prepare_alerts(&config, Utc::now());

        assert!(matches!(result, Err(PagerError::DirectoryUnreadable { .. })));
    }

    #[tokio::test]
    async fn test_run_check_without_routing_key_skips_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let now = write_scenario(dir.path());
        let config = config_for(dir.path(), Some(""), DEFAULT_EVENTS_URL);

        let outcome = run_check(&config, now).await.unwrap();

        assert!(matches!(outcome, CheckOutcome::DispatchDisabled { pending: 1 }));
    }

    #[tokio::test]
    async fn test_run_check_survives_unreachable_api() {
        let dir = tempfile::tempdir().unwrap();
        let now = write_scenario(dir.path());

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v2/enqueue", listener.local_addr().unwrap());
        drop(listener);
        let config = config_for(dir.path(), Some("R0UT1NG"), &url);

        let summary = match run_check(&config, now).await.unwrap() {
            CheckOutcome::Dispatched(summary) => summary,
            other => panic!("expected a dispatch attempt, got {other:?}"),
        };

        assert_eq!(summary.attempted(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.outcomes[0].filename, "a.pem");
    }

    #[test]
    fn test_negative_threshold_only_alerts_past_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let now = write_scenario(dir.path());
        let mut config = config_for(dir.path(), None, DEFAULT_EVENTS_URL);
        config.seconds_to_expiry = -5;

        assert!(prepare_alerts(&config, now).unwrap().is_empty());

        let after_a = now + chrono::Duration::seconds(20);
        let alerts = prepare_alerts(&config, after_a).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].details.filename, "a.pem");
    }
}
