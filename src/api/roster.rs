//! Roster Fetcher (`GET developers/`).

use std::collections::HashSet;

use super::{ApiClient, Endpoint};
use crate::error::RosterFetchError;
use crate::types::Developer;

pub const ROSTER_PATH: &str = "developers/";

impl ApiClient {
    /// Fetch the developer roster in server order.
    ///
    /// Any failure here is fatal to the view: without a roster there is
    /// nothing to fan out over.
    pub async fn fetch_roster(&self) -> Result<Vec<Developer>, RosterFetchError> {
        let json = self.get(Endpoint::Roster, ROSTER_PATH).await?;

        let roster: Vec<Developer> = serde_json::from_value(json)
            .map_err(|e| RosterFetchError::Malformed(e.to_string()))?;

        let mut seen = HashSet::new();
        for dev in &roster {
            if !seen.insert(dev.id) {
                return Err(RosterFetchError::DuplicateDeveloper(dev.id));
            }
        }

        log::info!("Roster: {} developers", roster.len());
        Ok(roster)
    }
}
