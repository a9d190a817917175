// Consumer-side filtering: which events a view shows, and how its shots spread
// over the zones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::event::{ActionType, CourtEvent, Player};
use crate::geometry::{CourtGeometry, ShotZone, STANDARD};

/// Which player(s) a view is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSelection {
    #[default]
    All,
    Player(i64),
}

impl PlayerSelection {
    pub fn matches(&self, player_id: i64) -> bool {
        match self {
            PlayerSelection::All => true,
            PlayerSelection::Player(id) => *id == player_id,
        }
    }
}

/// Player selection plus one visibility toggle per action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub selection: PlayerSelection,
    pub show_shots: bool,
    pub show_passes: bool,
    pub show_turnovers: bool,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            selection: PlayerSelection::All,
            show_shots: true,
            show_passes: true,
            show_turnovers: true,
        }
    }
}

impl EventFilter {
    pub fn shows(&self, action: ActionType) -> bool {
        match action {
            ActionType::Shot => self.show_shots,
            ActionType::Pass => self.show_passes,
            ActionType::Turnover => self.show_turnovers,
        }
    }

    pub fn accepts(&self, event: &CourtEvent) -> bool {
        self.selection.matches(event.player_id) && self.shows(event.action_type)
    }

    /// Events passing the filter, in their original order.
    pub fn apply<'a>(&self, events: &'a [CourtEvent]) -> Vec<&'a CourtEvent> {
        events.iter().filter(|e| self.accepts(e)).collect()
    }
}

/// Histogram of events per zone on the standard court.
///
/// Sorted by count, highest first; equal counts keep the order in which their
/// zone first appeared.
pub fn zone_counts<'a, I>(events: I) -> Vec<(ShotZone, usize)>
where
    I: IntoIterator<Item = &'a CourtEvent>,
{
    zone_counts_with(&STANDARD, events)
}

/// [`zone_counts`] classified against `court`.
pub fn zone_counts_with<'a, I>(court: &CourtGeometry, events: I) -> Vec<(ShotZone, usize)>
where
    I: IntoIterator<Item = &'a CourtEvent>,
{
    let mut seen: Vec<ShotZone> = Vec::new();
    let mut counts: HashMap<ShotZone, usize> = HashMap::new();
    for e in events {
        let zone = e.zone_with(court);
        let n = counts.entry(zone).or_insert(0);
        if *n == 0 {
            seen.push(zone);
        }
        *n += 1;
    }

    let mut rows: Vec<(ShotZone, usize)> = seen.into_iter().map(|z| (z, counts[&z])).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

/// Display name of `id` within `players`, or `#<id>` when unknown.
pub fn player_name(players: &[Player], id: i64) -> String {
    players
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("#{id}"))
}

pub fn selection_label(players: &[Player], selection: PlayerSelection) -> String {
    match selection {
        PlayerSelection::All => "All players".to_string(),
        PlayerSelection::Player(id) => player_name(players, id),
    }
}
