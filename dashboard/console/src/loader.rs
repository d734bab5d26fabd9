//! Reference data: the Tola list and the contributors of the selected Tola.
//!
//! ## Sequencing
//!
//! Every call to [`ReferenceData::select_tola`] starts a new generation and
//! hands out a [`ContributorFetch`] ticket tagged with it. A response is only
//! installed by [`ReferenceData::apply`] while its ticket is still current, so
//! a slow answer for an earlier selection can never overwrite a later one.
//! Superseded tickets are also cancelled, which lets [`fetch_contributors`]
//! return without waiting on the network.
//!
//! Load failures are logged and otherwise swallowed: the previous list stays.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::api::ApiClient;
use crate::errors::Result;
use crate::models::{Tola, TolaContributor};

/// A pending contributor load for one Tola selection.
#[derive(Debug, Clone)]
pub struct ContributorFetch {
    generation: u64,
    tola_id: i64,
    cancel: CancellationToken,
}

impl ContributorFetch {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Default)]
pub struct ReferenceData {
    tolas: Vec<Tola>,
    selected: Option<i64>,
    contributors: Vec<TolaContributor>,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl ReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the Tola list. Returns `false` (and keeps the old list) on failure.
    pub async fn load_tolas(&mut self, api: &ApiClient) -> bool {
        match api.list_tolas().await {
            Ok(tolas) => {
                debug!("Loaded {} tolas", tolas.len());
                self.tolas = tolas;
                true
            }
            Err(e) => {
                error!("Error fetching tolas: {e}");
                false
            }
        }
    }

    pub fn tolas(&self) -> &[Tola] {
        &self.tolas
    }

    /// Look a Tola up by numeric id or by name (case-insensitive).
    pub fn find_tola(&self, key: &str) -> Option<&Tola> {
        find_tola(&self.tolas, key)
    }

    pub fn selected_tola_id(&self) -> Option<i64> {
        self.selected
    }

    pub fn selected_tola(&self) -> Option<&Tola> {
        let id = self.selected?;
        self.tolas.iter().find(|t| t.id == id)
    }

    pub fn contributors(&self) -> &[TolaContributor] {
        &self.contributors
    }

    pub fn contributor(&self, id: i64) -> Option<&TolaContributor> {
        self.contributors.iter().find(|c| c.id == id)
    }

    /// Change the selected Tola.
    ///
    /// The contributor list is cleared immediately so nothing from the
    /// previous Tola stays selectable. Returns the ticket to load the new
    /// Tola's contributors, or `None` when the selection was cleared.
    pub fn select_tola(&mut self, tola_id: Option<i64>) -> Option<ContributorFetch> {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }

        self.generation += 1;
        self.selected = tola_id;
        self.contributors.clear();

        let tola_id = tola_id?;
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        Some(ContributorFetch {
            generation: self.generation,
            tola_id,
            cancel,
        })
    }

    /// Install the outcome of a contributor load.
    ///
    /// Returns `true` only when the list was replaced. Stale tickets are
    /// ignored; failures are logged and leave the list as it is.
    pub fn apply(&mut self, fetch: &ContributorFetch, result: Result<Vec<TolaContributor>>) -> bool {
        if fetch.generation != self.generation {
            debug!(
                "Discarding stale contributor list for tola {} (generation {} != {})",
                fetch.tola_id, fetch.generation, self.generation
            );
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(contributors) => {
                info!(
                    "Loaded {} contributors for tola {}",
                    contributors.len(),
                    fetch.tola_id
                );
                self.contributors = contributors;
                true
            }
            Err(e) => {
                error!("Error fetching contributors for tola {}: {e}", fetch.tola_id);
                false
            }
        }
    }

    /// Select a Tola and load its contributors in one step.
    pub async fn select_and_load(&mut self, api: &ApiClient, tola_id: Option<i64>) -> bool {
        let Some(fetch) = self.select_tola(tola_id) else {
            return true;
        };
        match fetch_contributors(api, &fetch).await {
            Some(result) => self.apply(&fetch, result),
            None => false,
        }
    }
}

/// Match by id first, then by case-insensitive name.
pub fn find_tola<'a>(tolas: &'a [Tola], key: &str) -> Option<&'a Tola> {
    let key = key.trim();
    key.parse::<i64>()
        .ok()
        .and_then(|id| tolas.iter().find(|t| t.id == id))
        .or_else(|| tolas.iter().find(|t| t.tola_name.eq_ignore_ascii_case(key)))
}

/// Run one contributor load. `None` means the ticket was superseded before
/// the backend answered.
pub async fn fetch_contributors(
    api: &ApiClient,
    fetch: &ContributorFetch,
) -> Option<Result<Vec<TolaContributor>>> {
    tokio::select! {
        _ = fetch.cancel.cancelled() => {
            debug!("Contributor load for tola {} cancelled", fetch.tola_id);
            None
        }
        result = api.list_tola_contributors(fetch.tola_id) => Some(result),
    }
}
