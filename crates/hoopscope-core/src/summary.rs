// Summary aggregation: per-player counts and cross-player ranks.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::ops::{Index, IndexMut};

use crate::event::{ActionType, CourtEvent, HalfcourtAction, Player};
use crate::geometry;
use crate::payload::PlayerPayload;

// ---------------------------------------------------------------------------
// Count keys
// ---------------------------------------------------------------------------

/// The ten aggregate metrics, in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CountKey {
    TotalShotAttempts,
    TotalPoints,
    TotalPasses,
    TotalPotentialAssists,
    TotalTurnovers,
    TotalPassingTurnovers,
    PickAndRollCount,
    IsolationCount,
    PostUpCount,
    OffBallScreenCount,
}

impl CountKey {
    pub const ALL: [CountKey; 10] = [
        CountKey::TotalShotAttempts,
        CountKey::TotalPoints,
        CountKey::TotalPasses,
        CountKey::TotalPotentialAssists,
        CountKey::TotalTurnovers,
        CountKey::TotalPassingTurnovers,
        CountKey::PickAndRollCount,
        CountKey::IsolationCount,
        CountKey::PostUpCount,
        CountKey::OffBallScreenCount,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Field name in the provider payload.
    pub fn wire_name(&self) -> &'static str {
        match self {
            CountKey::TotalShotAttempts => "totalShotAttempts",
            CountKey::TotalPoints => "totalPoints",
            CountKey::TotalPasses => "totalPasses",
            CountKey::TotalPotentialAssists => "totalPotentialAssists",
            CountKey::TotalTurnovers => "totalTurnovers",
            CountKey::TotalPassingTurnovers => "totalPassingTurnovers",
            CountKey::PickAndRollCount => "pickAndRollCount",
            CountKey::IsolationCount => "isolationCount",
            CountKey::PostUpCount => "postUpCount",
            CountKey::OffBallScreenCount => "offBallScreenCount",
        }
    }

    /// Field name of the matching rank in the provider payload.
    pub fn rank_name(&self) -> &'static str {
        match self {
            CountKey::TotalShotAttempts => "totalShotAttemptsRank",
            CountKey::TotalPoints => "totalPointsRank",
            CountKey::TotalPasses => "totalPassesRank",
            CountKey::TotalPotentialAssists => "totalPotentialAssistsRank",
            CountKey::TotalTurnovers => "totalTurnoversRank",
            CountKey::TotalPassingTurnovers => "totalPassingTurnoversRank",
            CountKey::PickAndRollCount => "pickAndRollCountRank",
            CountKey::IsolationCount => "isolationCountRank",
            CountKey::PostUpCount => "postUpCountRank",
            CountKey::OffBallScreenCount => "offBallScreenCountRank",
        }
    }

    /// Short column header for tables.
    pub fn label(&self) -> &'static str {
        match self {
            CountKey::TotalShotAttempts => "FGA",
            CountKey::TotalPoints => "PTS",
            CountKey::TotalPasses => "PASS",
            CountKey::TotalPotentialAssists => "POTAST",
            CountKey::TotalTurnovers => "TOV",
            CountKey::TotalPassingTurnovers => "PASSTOV",
            CountKey::PickAndRollCount => "PNR",
            CountKey::IsolationCount => "ISO",
            CountKey::PostUpCount => "POST",
            CountKey::OffBallScreenCount => "OBS",
        }
    }

    /// The per-bucket count key for a half-court action.
    pub fn for_action(action: HalfcourtAction) -> CountKey {
        match action {
            HalfcourtAction::PickAndRoll => CountKey::PickAndRollCount,
            HalfcourtAction::Isolation => CountKey::IsolationCount,
            HalfcourtAction::PostUp => CountKey::PostUpCount,
            HalfcourtAction::OffBallScreen => CountKey::OffBallScreenCount,
        }
    }
}

// ---------------------------------------------------------------------------
// Counts and ranks
// ---------------------------------------------------------------------------

/// One value per [`CountKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts([u32; 10]);

/// One 1-based cohort rank per [`CountKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ranks([u32; 10]);

impl Counts {
    pub fn get(&self, key: CountKey) -> u32 {
        self.0[key.index()]
    }

    /// `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (CountKey, u32)> + '_ {
        CountKey::ALL.iter().map(move |&k| (k, self.get(k)))
    }
}

impl Ranks {
    pub fn get(&self, key: CountKey) -> u32 {
        self.0[key.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CountKey, u32)> + '_ {
        CountKey::ALL.iter().map(move |&k| (k, self.get(k)))
    }
}

impl Index<CountKey> for Counts {
    type Output = u32;

    fn index(&self, key: CountKey) -> &u32 {
        &self.0[key.index()]
    }
}

impl IndexMut<CountKey> for Counts {
    fn index_mut(&mut self, key: CountKey) -> &mut u32 {
        &mut self.0[key.index()]
    }
}

impl Index<CountKey> for Ranks {
    type Output = u32;

    fn index(&self, key: CountKey) -> &u32 {
        &self.0[key.index()]
    }
}

impl IndexMut<CountKey> for Ranks {
    fn index_mut(&mut self, key: CountKey) -> &mut u32 {
        &mut self.0[key.index()]
    }
}

impl Serialize for Counts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CountKey::ALL.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.wire_name(), &value)?;
        }
        map.end()
    }
}

impl Serialize for Ranks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CountKey::ALL.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.rank_name(), &value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// PlayerSummary
// ---------------------------------------------------------------------------

/// A player's counts and, once the cohort is complete, ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub player: Player,
    pub counts: Counts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranks: Option<Ranks>,
}

impl PlayerSummary {
    pub fn new(player: Player, counts: Counts) -> Self {
        Self {
            player,
            counts,
            ranks: None,
        }
    }

    /// Read the provider's precomputed totals, and its ranks when the payload
    /// carries any rank field.
    pub fn from_provider_totals(player: Player, payload: &PlayerPayload) -> Self {
        let mut counts = Counts::default();
        for key in CountKey::ALL {
            counts[key] = payload.count(key.wire_name());
        }

        let has_ranks = CountKey::ALL.iter().any(|k| payload.has_field(k.rank_name()));
        let ranks = has_ranks.then(|| {
            let mut ranks = Ranks::default();
            for key in CountKey::ALL {
                ranks[key] = payload.count(key.rank_name());
            }
            ranks
        });

        Self {
            player,
            counts,
            ranks,
        }
    }

    /// Recount from a flat event list. Events of other players are skipped.
    ///
    /// Potential assists and passing turnovers cannot be recovered from
    /// flattened events and stay at zero.
    pub fn from_events(player: Player, events: &[CourtEvent]) -> Self {
        let mut counts = Counts::default();
        for e in events.iter().filter(|e| e.player_id == player.id) {
            match e.action_type {
                ActionType::Shot => {
                    counts[CountKey::TotalShotAttempts] += 1;
                    if e.made {
                        counts[CountKey::TotalPoints] += if geometry::is_three(e.x, e.y) { 3 } else { 2 };
                    }
                }
                ActionType::Pass => counts[CountKey::TotalPasses] += 1,
                ActionType::Turnover => counts[CountKey::TotalTurnovers] += 1,
            }
            if let Some(action) = e.halfcourt_action {
                counts[CountKey::for_action(action)] += 1;
            }
        }
        Self::new(player, counts)
    }

    pub fn rank(&self, key: CountKey) -> Option<u32> {
        self.ranks.map(|r| r.get(key))
    }
}

/// Rank every summary against the cohort, one metric at a time.
///
/// For each key the cohort is stable-sorted by value, descending; a player's
/// rank is its 1-based position. Equal values keep their incoming order.
/// Existing ranks on the inputs are ignored and the inputs are not modified.
pub fn with_ranks(all: &[PlayerSummary]) -> Vec<PlayerSummary> {
    let mut ranks = vec![Ranks::default(); all.len()];
    let mut order: Vec<usize> = (0..all.len()).collect();

    for key in CountKey::ALL {
        order.sort_by_key(|&i| i);
        order.sort_by(|&a, &b| all[b].counts[key].cmp(&all[a].counts[key]));
        for (pos, &i) in order.iter().enumerate() {
            ranks[i][key] = pos as u32 + 1;
        }
    }

    all.iter()
        .zip(ranks)
        .map(|(s, r)| PlayerSummary {
            player: s.player.clone(),
            counts: s.counts,
            ranks: Some(r),
        })
        .collect()
}

/// Final ranks for a loaded cohort.
///
/// When every summary carries provider ranks they are kept as-is. Otherwise
/// the whole cohort is ranked with [`with_ranks`], so a table never mixes
/// provider and cohort positions.
pub fn cohort_ranks(all: &[PlayerSummary]) -> Vec<PlayerSummary> {
    if !all.is_empty() && all.iter().all(|s| s.ranks.is_some()) {
        all.to_vec()
    } else {
        with_ranks(all)
    }
}

// ---------------------------------------------------------------------------
// Per-bucket breakdown
// ---------------------------------------------------------------------------

/// Provider totals for a single half-court action bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketTotals {
    pub shot_attempts: u32,
    pub points: u32,
    pub passes: u32,
    pub potential_assists: u32,
    pub turnovers: u32,
    pub passing_turnovers: u32,
}

/// Totals for each bucket present in the payload, in bucket order.
pub fn bucket_breakdown(payload: &PlayerPayload) -> Vec<(HalfcourtAction, BucketTotals)> {
    HalfcourtAction::ALL
        .into_iter()
        .filter_map(|action| {
            let bucket = payload.bucket(action)?;
            Some((
                action,
                BucketTotals {
                    shot_attempts: bucket.count("totalShotAttempts"),
                    points: bucket.count("totalPoints"),
                    passes: bucket.count("totalPasses"),
                    potential_assists: bucket.count("totalPotentialAssists"),
                    turnovers: bucket.count("totalTurnovers"),
                    passing_turnovers: bucket.count("totalPassingTurnovers"),
                },
            ))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
