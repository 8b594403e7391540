use std::future::Future;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use namedrop_dns::{
    NamedropProvider, Record, RecordAppender, RecordDeleter, RecordGetter, RecordSetter, TtlMode,
};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

mod settings;

/// Manage DNS records through a NameDrop server.
#[derive(Debug, Parser)]
#[command(name = "namedrop", version)]
struct Cli {
    /// Print records as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all records in a zone.
    Get { zone: String },
    /// Add a record to a zone.
    Append(RecordArgs),
    /// Create or update a record in a zone.
    Set(RecordArgs),
    /// Delete a record from a zone.
    Delete(RecordArgs),
}

#[derive(Debug, Args)]
struct RecordArgs {
    zone: String,
    name: String,
    #[arg(value_name = "TYPE")]
    kind: String,
    value: String,
    /// Record TTL, e.g. `5m` or `3600s`.
    #[arg(long, value_parser = humantime::parse_duration, default_value = "0s")]
    ttl: Duration,
    #[arg(long, default_value_t = 0)]
    priority: u32,
}

impl RecordArgs {
    fn record(&self) -> Record {
        Record {
            name: self.name.clone(),
            r#type: self.kind.clone(),
            value: self.value.clone(),
            ttl: self.ttl,
            priority: self.priority,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    run(cli).await
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Settings::new()?;

    let mut provider = NamedropProvider::new(cfg.token()?);
    if let Some(uri) = &cfg.server_uri {
        provider = provider.with_server_uri(uri)?;
    }
    if cfg.propagate_ttl {
        provider = provider.with_ttl_mode(TtlMode::Propagate);
    }

    let records = until_signal(execute(&provider, &cli.command), tokio::signal::ctrl_c()).await?;

    println!("{}", render(&records, cli.json)?);
    Ok(())
}

async fn execute<P>(provider: &P, command: &Command) -> Result<Vec<Record>, <P as RecordGetter>::Error>
where
    P: RecordGetter
        + RecordAppender<Error = <P as RecordGetter>::Error>
        + RecordSetter<Error = <P as RecordGetter>::Error>
        + RecordDeleter<Error = <P as RecordGetter>::Error>,
{
    match command {
        Command::Get { zone } => provider.get_records(zone).await,
        Command::Append(args) => provider.append_records(&args.zone, &[args.record()]).await,
        Command::Set(args) => provider.set_records(&args.zone, &[args.record()]).await,
        Command::Delete(args) => provider.delete_records(&args.zone, &[args.record()]).await,
    }
}

/// Runs `op` unless `signal` fires first. A failure to listen for the
/// signal is returned as is.
async fn until_signal<T, E>(
    op: impl Future<Output = Result<T, E>>,
    signal: impl Future<Output = std::io::Result<()>>,
) -> Result<T, Box<dyn std::error::Error>>
where
    E: std::error::Error + 'static,
{
    tokio::select! {
        res = op => Ok(res?),
        res = signal => {
            res?;
            Err("operation cancelled".into())
        }
    }
}

fn render(records: &[Record], json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(records);
    }

    Ok(records.iter()
        .map(|r| format!(
            "{}\t{}\t{}\t{}\t{}",
            r.name,
            r.r#type,
            r.value,
            humantime::format_duration(r.ttl),
            r.priority,
        ))
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_record_command() {
        let cli = Cli::try_parse_from([
            "namedrop", "set", "example.com.", "@", "MX", "mail.example.com",
            "--ttl", "5m", "--priority", "10",
        ]).unwrap();

        let Command::Set(args) = cli.command else { panic!("expected set") };
        assert_eq!(args.zone, "example.com.");
        assert_eq!(args.record(), Record {
            name: "@".into(),
            r#type: "MX".into(),
            value: "mail.example.com".into(),
            ttl: Duration::from_secs(300),
            priority: 10,
        });
    }

    #[test]
    fn parses_get_with_json() {
        let cli = Cli::try_parse_from(["namedrop", "get", "example.com", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Get { ref zone } if zone == "example.com"));
    }

    #[test]
    fn record_defaults() {
        let cli = Cli::try_parse_from(["namedrop", "append", "example.com", "www", "A", "192.0.2.1"]).unwrap();
        let Command::Append(args) = cli.command else { panic!("expected append") };
        assert_eq!(args.ttl, Duration::ZERO);
        assert_eq!(args.priority, 0);
    }

    #[tokio::test]
    async fn signal_cancels_operation() {
        let op = std::future::pending::<Result<(), std::io::Error>>();
        let err = until_signal(op, std::future::ready(Ok(()))).await.unwrap_err();
        assert_eq!(err.to_string(), "operation cancelled");
    }

    #[tokio::test]
    async fn signal_listener_failure_is_not_cancellation() {
        let op = std::future::pending::<Result<(), std::io::Error>>();
        let signal = std::future::ready(Err(std::io::Error::new(std::io::ErrorKind::Other, "no signal handler")));

        let err = until_signal(op, signal).await.unwrap_err();
        assert!(err.downcast_ref::<std::io::Error>().is_some());
        assert_eq!(err.to_string(), "no signal handler");
    }

    #[tokio::test]
    async fn completed_operation_is_returned() {
        let op = std::future::ready(Ok::<_, std::io::Error>(7));
        let res = until_signal(op, std::future::pending()).await.unwrap();
        assert_eq!(res, 7);
    }

    #[test]
    fn renders_table_and_json() {
        let records = vec![Record {
            name: "www".into(),
            r#type: "A".into(),
            value: "192.0.2.1".into(),
            ttl: Duration::from_secs(300),
            priority: 0,
        }];

        assert_eq!(render(&records, false).unwrap(), "www\tA\t192.0.2.1\t5m\t0");

        let json: serde_json::Value = serde_json::from_str(&render(&records, true).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!([
            { "name": "www", "type": "A", "value": "192.0.2.1", "ttl": 300, "priority": 0 }
        ]));
    }
}
