// Event normalizer: flattens a player's bucketed payload into one ordered
// event stream.
//
// Order: buckets in `HalfcourtAction::ALL` order; inside a bucket all shots,
// then all passes (each possibly followed by its turnover), then turnovers.

use crate::event::{ActionType, CourtEvent, HalfcourtAction, Timestamp};
use crate::geometry::Orientation;
use crate::payload::{Bucket, Location, PlayerPayload};

/// Flatten `payload` into events attributed to `player_id`.
pub fn flatten_buckets(payload: &PlayerPayload, player_id: i64) -> Vec<CourtEvent> {
    normalize_with(payload, player_id, Orientation::AsDiagram)
}

/// Like [`flatten_buckets`], mapping every location through `orientation`
/// first.
pub fn normalize_with(
    payload: &PlayerPayload,
    player_id: i64,
    orientation: Orientation,
) -> Vec<CourtEvent> {
    let mut events = Vec::new();
    for action in HalfcourtAction::ALL {
        if let Some(bucket) = payload.bucket(action) {
            push_bucket(&mut events, bucket, action, player_id, orientation);
        }
    }
    events
}

fn push_bucket(
    events: &mut Vec<CourtEvent>,
    bucket: &Bucket,
    action: HalfcourtAction,
    player_id: i64,
    orientation: Orientation,
) {
    let event = |loc: Location, action_type, made, timestamp: Option<&Timestamp>| {
        let (x, y) = orientation.normalize(loc.x, loc.y);
        CourtEvent {
            player_id,
            x,
            y,
            action_type,
            halfcourt_action: Some(action),
            made,
            timestamp: timestamp.cloned(),
        }
    };

    for shot in &bucket.shots {
        let loc = shot.loc.unwrap_or_default();
        events.push(event(loc, ActionType::Shot, shot.points > 0.0, shot.timestamp()));
    }

    for pass in &bucket.passes {
        // Where the ball went, else where it started.
        let loc = pass.end_loc.or(pass.start_loc).unwrap_or_default();
        events.push(event(loc, ActionType::Pass, false, pass.timestamp()));
        if pass.is_turnover {
            let tov_loc = pass.end_loc.or(pass.start_loc).unwrap_or(loc);
            events.push(event(tov_loc, ActionType::Turnover, false, pass.timestamp()));
        }
    }

    for tov in &bucket.turnovers {
        let loc = tov.loc.unwrap_or_default();
        events.push(event(loc, ActionType::Turnover, false, tov.timestamp()));
    }
}
