//! Reports built from stored activities.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clan_inspector::connect_and_migrate;
use clan_inspector::report::{play_hours, play_hours_tsv, social_graph};
use clap::Subcommand;

use crate::commands::shared::{parse_date, parse_time_zone};
use crate::config::Config;

#[derive(Subcommand)]
pub enum ReportAction {
    /// Co-play graph of enabled members as JSON (nodes and weighted links)
    Social {
        /// Only activities after this date (YYYY-MM-DD or RFC 3339)
        #[arg(short, long, value_parser = parse_date)]
        from: DateTime<Utc>,

        /// Only activities before this date (YYYY-MM-DD or RFC 3339)
        #[arg(short, long, value_parser = parse_date)]
        to: DateTime<Utc>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Emit each pair in both directions
        #[arg(long)]
        include_reverse: bool,
    },
    /// Per-member histogram of local play hours as TSV
    Hours {
        /// Only activities after this date (YYYY-MM-DD or RFC 3339)
        #[arg(short, long, value_parser = parse_date)]
        from: DateTime<Utc>,

        /// Only activities before this date (YYYY-MM-DD or RFC 3339)
        #[arg(short, long, value_parser = parse_date)]
        to: DateTime<Utc>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// IANA time zone for local hours, e.g. Europe/London (default from config)
        #[arg(short = 'z', long, value_parser = parse_time_zone)]
        time_zone: Option<chrono_tz::Tz>,
    },
}

fn write_output(out: Option<&Path>, content: &str) -> std::io::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content)?;
            eprintln!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

fn check_range(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<(), String> {
    if from >= to {
        return Err(format!("--from ({from}) must be before --to ({to})"));
    }
    Ok(())
}

/// Handle `clan-inspector report ...`.
pub(crate) async fn handle_report(
    action: ReportAction,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect_and_migrate(database_url).await?;

    match action {
        ReportAction::Social {
            from,
            to,
            out,
            include_reverse,
        } => {
            check_range(from, to)?;
            let graph = social_graph(&db, from, to, include_reverse).await?;
            tracing::info!(
                nodes = graph.nodes.len(),
                links = graph.links.len(),
                "Built social graph"
            );
            write_output(out.as_deref(), &serde_json::to_string_pretty(&graph)?)?;
        }
        ReportAction::Hours {
            from,
            to,
            out,
            time_zone,
        } => {
            check_range(from, to)?;
            let zone = match time_zone {
                Some(zone) => zone,
                None => parse_time_zone(&config.report.time_zone)?,
            };
            let hours = play_hours(&db, from, to, &zone).await?;
            tracing::info!(players = hours.len(), time_zone = zone.name(), "Built play hours");
            write_output(out.as_deref(), &play_hours_tsv(&hours))?;
        }
    }

    Ok(())
}
