use std::collections::HashSet;

use reqwest::Client;
use serde::Serialize;
use teloxide::types::UserId;

use crate::stats::StatsSnapshot;

/// Base URL of the roster-and-stats collector.
const COLLECTOR_BASE: &str = "https://file2earn.top/r";

/// What the collector expects in its `data` parameter.
#[derive(Serialize)]
struct StatsReport {
    #[serde(rename = "userCount")]
    user_count: u64,
    #[serde(rename = "linksProcessed")]
    links_processed: u64,
}

/// Client for the remote service that remembers user IDs (for broadcasts)
/// and receives the daily counter reports.
pub struct Collector {
    client: Client,
}

impl Collector {
    pub fn new(client: Client) -> Self {
        Collector { client }
    }

    /// Tell the collector this user exists, for later broadcasts.
    pub async fn push_user(&self, user: UserId) -> Result<(), reqwest::Error> {
        self.client
            .get(format!("{COLLECTOR_BASE}/id.php"))
            .query(&[("data", user.0.to_string())])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Everyone the collector has seen, oldest first, without repeats.
    pub async fn fetch_roster(&self) -> Result<Vec<UserId>, reqwest::Error> {
        let body = self
            .client
            .get(format!("{COLLECTOR_BASE}/ids.txt"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_roster(&body))
    }

    /// Ship the cumulative counters.
    pub async fn push_stats(&self, snapshot: &StatsSnapshot) -> Result<(), reqwest::Error> {
        let report = StatsReport {
            user_count: snapshot.users,
            links_processed: snapshot.links_resolved,
        };
        let data =
            serde_json::to_string(&report).expect("Serializing a flat struct never fails");

        self.client
            .get(format!("{COLLECTOR_BASE}/"))
            .query(&[("data", data)])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// One user ID per line. Blank and garbled lines are skipped; repeated IDs
/// are kept once, in first-seen order.
fn parse_roster(body: &str) -> Vec<UserId> {
    let mut seen = HashSet::new();
    body.lines()
        .filter_map(|line| line.trim().parse::<u64>().ok())
        .map(UserId)
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_is_deduplicated_and_garbage_tolerant() {
        let body = "123\n456\n\n  123 \nnot-a-number\n789\n";
        assert_eq!(
            parse_roster(body),
            vec![UserId(123), UserId(456), UserId(789)]
        );
    }

    #[test]
    fn empty_roster_parses_to_nothing() {
        assert!(parse_roster("").is_empty());
        assert!(parse_roster("\n\n").is_empty());
    }
}
