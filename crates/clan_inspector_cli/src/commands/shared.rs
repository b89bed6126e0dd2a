use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use clan_inspector::bungie::BungieClient;
use clan_inspector::platform::{ActivitySource, RateLimitedSource, RosterSource};

use crate::config::Config;

/// Output format for tabular commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Everything the commands ask of the remote API.
pub(crate) trait BungieSource: ActivitySource + RosterSource {}

impl<T: ActivitySource + RosterSource> BungieSource for T {}

/// Build the Bungie.net client from config, paced by the configured request
/// rate unless `no_rate_limit` is set.
pub(crate) fn build_source(
    config: &Config,
    no_rate_limit: bool,
) -> Result<Box<dyn BungieSource>, Box<dyn std::error::Error>> {
    let bungie = &config.bungie;

    let mut client = BungieClient::with_timeout(
        config.api_key()?,
        bungie.membership_type,
        Duration::from_secs(bungie.timeout_secs),
    )?
    .with_base_url(&bungie.base_url)
    .with_activity_batch_size(bungie.activity_batch_size);

    if let Some(clan_id) = &bungie.clan_id {
        client = client.with_clan_id(clan_id.clone());
    }

    if no_rate_limit {
        tracing::warn!("Proactive rate limiting disabled");
        return Ok(Box::new(client));
    }

    Ok(Box::new(RateLimitedSource::new(
        client,
        bungie.requests_per_second,
    )))
}

/// Parse a report bound: `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
pub(crate) fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| format!("invalid date: {s}"));
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got '{s}'"))
}

/// Parse an IANA time zone name such as `Europe/London`.
pub(crate) fn parse_time_zone(s: &str) -> Result<chrono_tz::Tz, String> {
    s.parse::<chrono_tz::Tz>()
        .map_err(|e| format!("unknown time zone '{s}': {e}"))
}

/// Format an optional timestamp for a table cell.
pub(crate) fn format_time(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}
