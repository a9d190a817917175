// Cohort loader: fetches every configured player one at a time and builds the
// combined event stream and summaries.
//
// Progress is reported over an mpsc channel after each player so a consumer
// can render incrementally. Dropping the receiver cancels the run: no further
// fetches are issued and whatever was already loaded is returned.

use std::sync::Arc;

use hoopscope_core::event::{CourtEvent, HalfcourtAction, Player};
use hoopscope_core::geometry::Orientation;
use hoopscope_core::normalize::normalize_with;
use hoopscope_core::payload::PlayerPayload;
use hoopscope_core::summary::{bucket_breakdown, cohort_ranks, BucketTotals, PlayerSummary};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::source::PayloadSource;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Progress messages emitted while a cohort loads.
#[derive(Debug, Clone)]
pub enum LoadUpdate {
    /// A player was fetched and appended to the cohort. `summary` is not yet
    /// ranked against the cohort.
    PlayerLoaded {
        player: Player,
        events: Vec<CourtEvent>,
        summary: PlayerSummary,
    },
    /// The source had no payload for this id.
    PlayerAbsent { player_id: i64 },
    /// The fetch failed; the run continues with the next id.
    PlayerFailed { player_id: i64, message: String },
    /// Every id was attempted. Carries the ranked summaries.
    Finished { summaries: Vec<PlayerSummary> },
}

/// Everything loaded for a cohort, in fetch order.
#[derive(Debug, Clone, Default)]
pub struct Cohort {
    pub players: Vec<Player>,
    pub events: Vec<CourtEvent>,
    /// Final ranks once loading stops: the provider's when every loaded
    /// payload carried them, otherwise ranked against the loaded players.
    pub summaries: Vec<PlayerSummary>,
    /// Provider per-bucket totals, keyed by player id.
    pub breakdowns: Vec<(i64, Vec<(HalfcourtAction, BucketTotals)>)>,
    pub failures: Vec<(i64, String)>,
    /// Set when the run stopped early because the receiver went away.
    pub cancelled: bool,
}

impl Cohort {
    pub fn breakdown(&self, player_id: i64) -> Option<&[(HalfcourtAction, BucketTotals)]> {
        self.breakdowns
            .iter()
            .find(|(id, _)| *id == player_id)
            .map(|(_, rows)| rows.as_slice())
    }

    fn push(&mut self, player: Player, mut events: Vec<CourtEvent>, summary: PlayerSummary) {
        self.players.push(player);
        self.events.append(&mut events);
        self.summaries.push(summary);
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

pub struct Loader {
    source: Arc<dyn PayloadSource>,
    player_ids: Vec<i64>,
    orientation: Orientation,
}

impl Loader {
    pub fn new(source: Arc<dyn PayloadSource>, player_ids: Vec<i64>) -> Self {
        Self {
            source,
            player_ids,
            orientation: Orientation::AsDiagram,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Fetch each player strictly in order, then rank the cohort.
    ///
    /// A failed fetch is logged, reported and skipped, as is a payload whose
    /// own id is already in the cohort. Returns when every id was attempted
    /// or when `tx`'s receiver is dropped.
    pub async fn run(self, tx: mpsc::Sender<LoadUpdate>) -> Cohort {
        info!(
            "Loading {} players from {}",
            self.player_ids.len(),
            self.source.describe()
        );

        let mut cohort = Cohort::default();

        for &requested in &self.player_ids {
            if tx.is_closed() {
                cohort.cancelled = true;
                break;
            }

            let update = match self.source.fetch(requested).await {
                Ok(Some(payload)) => {
                    let (player, events, summary) = self.build(&payload, requested);
                    if cohort.players.iter().any(|p| p.id == player.id) {
                        let message =
                            format!("payload reports player id {} which is already loaded", player.id);
                        warn!("Skipping player {requested}: {message}");
                        cohort.failures.push((requested, message.clone()));
                        LoadUpdate::PlayerFailed {
                            player_id: requested,
                            message,
                        }
                    } else {
                        debug!(
                            "player {} ({}): {} events",
                            player.id,
                            player.name,
                            events.len()
                        );
                        cohort.push(player.clone(), events.clone(), summary.clone());
                        cohort.breakdowns.push((player.id, bucket_breakdown(&payload)));
                        LoadUpdate::PlayerLoaded {
                            player,
                            events,
                            summary,
                        }
                    }
                }
                Ok(None) => {
                    debug!("no payload for player {requested}");
                    LoadUpdate::PlayerAbsent {
                        player_id: requested,
                    }
                }
                Err(e) => {
                    warn!("Failed to load player {requested}: {e}");
                    let message = e.to_string();
                    cohort.failures.push((requested, message.clone()));
                    LoadUpdate::PlayerFailed {
                        player_id: requested,
                        message,
                    }
                }
            };

            if tx.send(update).await.is_err() {
                cohort.cancelled = true;
                break;
            }
        }

        cohort.summaries = cohort_ranks(&cohort.summaries);

        if cohort.cancelled {
            info!(
                "Loading cancelled after {} players, {} events",
                cohort.players.len(),
                cohort.events.len()
            );
        } else {
            info!(
                "Loaded {} players, {} events",
                cohort.players.len(),
                cohort.events.len()
            );
            let _ = tx
                .send(LoadUpdate::Finished {
                    summaries: cohort.summaries.clone(),
                })
                .await;
        }

        cohort
    }

    fn build(&self, payload: &PlayerPayload, requested: i64) -> (Player, Vec<CourtEvent>, PlayerSummary) {
        let player = player_from_payload(payload, requested);
        let events = normalize_with(payload, player.id, self.orientation);
        let summary = PlayerSummary::from_provider_totals(player.clone(), payload);
        (player, events, summary)
    }
}

/// The player a payload describes. The payload's own id wins over the
/// requested one. A missing name becomes `Player <requested>`.
pub fn player_from_payload(payload: &PlayerPayload, requested: i64) -> Player {
    let name = payload
        .name
        .clone()
        .unwrap_or_else(|| format!("Player {requested}"));
    Player {
        id: payload.player_id.unwrap_or(requested),
        name,
        team: payload.team.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
