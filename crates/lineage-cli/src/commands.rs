use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;
use lineage_store::{FileStore, LineageStore, StoreValidator};
use lineage_types::SourceId;

use crate::cli::*;
use crate::config::LineageConfig;
use crate::demo;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = LineageConfig::load(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Demo(args) => cmd_demo(config, args, cli.format, &mut out),
        Command::Inspect(args) => cmd_inspect(config, args, cli.format, &mut out),
    }
}

fn with_store_override(mut config: LineageConfig, store: Option<PathBuf>) -> LineageConfig {
    if let Some(path) = store {
        config.store_path = path;
    }
    config
}

fn cmd_demo(
    config: LineageConfig,
    args: DemoArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let config = with_store_override(config, args.store);
    demo::run(&config, args.append, format, out)?;
    Ok(())
}

fn cmd_inspect(
    config: LineageConfig,
    args: InspectArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let config = with_store_override(config, args.store);
    let path = config.store_path.as_path();
    if !path.exists() {
        anyhow::bail!("no event store at {}", path.display());
    }
    let store = FileStore::open(path, config.store_config())
        .with_context(|| format!("opening store {}", path.display()))?;

    let sources = match args.source {
        Some(id) => vec![id.parse::<SourceId>()?],
        None => store.sources()?,
    };
    let report = StoreValidator::validate(&store)?;

    if format == OutputFormat::Json {
        let chains: serde_json::Map<String, serde_json::Value> = sources
            .iter()
            .map(|s| -> anyhow::Result<(String, serde_json::Value)> {
                Ok((s.to_string(), serde_json::to_value(store.read_chain(s)?)?))
            })
            .collect::<anyhow::Result<_>>()?;
        let doc = serde_json::json!({
            "store": path.display().to_string(),
            "event_count": report.event_count,
            "valid": report.is_valid(),
            "violations": report
                .violations
                .iter()
                .map(|v| v.description.clone())
                .collect::<Vec<_>>(),
            "chains": chains,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
        return Ok(());
    }

    writeln!(out, "Store {} ({} events)", path.display().to_string().bold(), report.event_count)?;
    for source in &sources {
        let chain = store.read_chain(source)?;
        writeln!(out, "\n{} {}", "source".dimmed(), source.as_str().cyan().bold())?;
        for event in &chain {
            writeln!(
                out,
                "  {} ts={} hash={} prev={} {}",
                format!("#{:03}", event.index).yellow(),
                event.timestamp,
                event.event_hash.short_hex(),
                if event.is_chain_start() {
                    "GENESIS".to_string()
                } else {
                    event.prev_hash.short_hex()
                },
                event.payload.dimmed()
            )?;
        }
    }

    writeln!(out)?;
    if report.is_valid() {
        writeln!(out, "{} Chain integrity verified", "✓".green().bold())?;
        writeln!(out, "  Global indices: {}", "gap-free".green())?;
        writeln!(out, "  Source chains: {}", "linked".green())?;
    } else {
        writeln!(out, "{} {} violation(s)", "✗".red().bold(), report.violations.len())?;
        for v in &report.violations {
            writeln!(out, "  #{:03} {:?}: {}", v.index, v.kind, v.description)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_config(dir: &tempfile::TempDir) -> LineageConfig {
        let config = LineageConfig {
            store_path: dir.path().join("inspect.wal"),
            bootstrap_rounds: 2,
            misbehavior_rounds: 2,
            ..LineageConfig::default()
        };
        demo::run(&config, false, OutputFormat::Json, &mut Vec::new()).unwrap();
        config
    }

    fn inspect_args(source: Option<&str>) -> InspectArgs {
        InspectArgs {
            store: None,
            source: source.map(str::to_string),
        }
    }

    #[test]
    fn inspect_reports_valid_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = seeded_config(&dir);
        let mut out = Vec::new();
        cmd_inspect(config, inspect_args(None), OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("8 events"));
        assert!(text.contains("Chain integrity verified"));
        assert!(text.contains("GENESIS"));
    }

    #[test]
    fn inspect_json_filters_by_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = seeded_config(&dir);
        let mut out = Vec::new();
        cmd_inspect(config, inspect_args(Some("attacker")), OutputFormat::Json, &mut out).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc["valid"], true);
        let chains = doc["chains"].as_object().unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains["attacker"].as_array().unwrap().len(), 4);
        assert_eq!(chains["attacker"][0]["prev_hash"], "0".repeat(64));
    }

    #[test]
    fn inspect_missing_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = LineageConfig {
            store_path: dir.path().join("absent.wal"),
            ..LineageConfig::default()
        };
        let err = cmd_inspect(config, inspect_args(None), OutputFormat::Text, &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("no event store"));
    }

    #[test]
    fn store_flag_overrides_config() {
        let config = with_store_override(LineageConfig::default(), Some("elsewhere.wal".into()));
        assert_eq!(config.store_path, PathBuf::from("elsewhere.wal"));
    }
}
