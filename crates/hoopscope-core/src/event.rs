// Flattened court events and the players that produce them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{self, CourtGeometry, ShotZone};

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player in a loaded cohort. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

impl Player {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            team: None,
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Action vocabularies
// ---------------------------------------------------------------------------

/// What happened at an event's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Shot,
    Pass,
    Turnover,
}

impl ActionType {
    pub const ALL: [ActionType; 3] = [ActionType::Shot, ActionType::Pass, ActionType::Turnover];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Shot => "shot",
            ActionType::Pass => "pass",
            ActionType::Turnover => "turnover",
        }
    }

    /// Marker fill color for court charts.
    pub fn marker_color(&self) -> &'static str {
        match self {
            ActionType::Shot => "#1f77b4",
            ActionType::Pass => "#2ca02c",
            ActionType::Turnover => "#d62728",
        }
    }

    /// Marker radius in display units. Shots are drawn larger.
    pub fn marker_radius(&self) -> f64 {
        match self {
            ActionType::Shot => 4.0,
            ActionType::Pass | ActionType::Turnover => 3.0,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The half-court action bucket an event was recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HalfcourtAction {
    PickAndRoll,
    Isolation,
    PostUp,
    OffBallScreen,
}

impl HalfcourtAction {
    /// Bucket iteration order used when flattening payloads.
    pub const ALL: [HalfcourtAction; 4] = [
        HalfcourtAction::PickAndRoll,
        HalfcourtAction::Isolation,
        HalfcourtAction::PostUp,
        HalfcourtAction::OffBallScreen,
    ];

    /// Key of this bucket in the provider payload.
    pub fn payload_key(&self) -> &'static str {
        match self {
            HalfcourtAction::PickAndRoll => "pickAndRoll",
            HalfcourtAction::Isolation => "isolation",
            HalfcourtAction::PostUp => "postUp",
            HalfcourtAction::OffBallScreen => "offBallScreen",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HalfcourtAction::PickAndRoll => "Pick & Roll",
            HalfcourtAction::Isolation => "Isolation",
            HalfcourtAction::PostUp => "Post-up",
            HalfcourtAction::OffBallScreen => "Off-Ball Screen",
        }
    }
}

impl fmt::Display for HalfcourtAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Event time as the provider sent it: either a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Number(f64),
    Text(String),
}

impl Timestamp {
    /// Interpret the timestamp as a UTC instant.
    ///
    /// Text is parsed as RFC 3339; numbers are epoch milliseconds. Anything
    /// else yields `None`.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Timestamp::Number(ms) if ms.is_finite() => DateTime::from_timestamp_millis(*ms as i64),
            Timestamp::Number(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CourtEvent
// ---------------------------------------------------------------------------

/// One shot, pass or turnover at a court location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtEvent {
    pub player_id: i64,
    pub x: f64,
    pub y: f64,
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halfcourt_action: Option<HalfcourtAction>,
    pub made: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl CourtEvent {
    /// Zone of this event on the standard court.
    pub fn zone(&self) -> ShotZone {
        geometry::shot_zone(self.x, self.y)
    }

    pub fn zone_with(&self, court: &CourtGeometry) -> ShotZone {
        court.shot_zone(self.x, self.y)
    }

    pub fn distance_from_hoop(&self) -> f64 {
        geometry::distance_from_hoop(self.x, self.y)
    }

    pub fn display_x(&self) -> f64 {
        geometry::to_display_x(self.x)
    }

    pub fn display_y(&self) -> f64 {
        geometry::to_display_y(self.y)
    }
}
