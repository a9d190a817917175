// Half-court geometry: display mapping, distance, three-point test and shot
// zone classification.
//
// Coordinates are in feet with the origin at the hoop's projection onto the
// floor. Positive y points away from the baseline toward half court.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

// ---------------------------------------------------------------------------
// Court dimensions
// ---------------------------------------------------------------------------

/// Dimensions of a half court plus the tolerances used by the zone classifier.
///
/// `CourtGeometry::default()` is a standard NBA half court. Every field can be
/// overridden (e.g. from the `[court]` config table) to classify against
/// alternate court dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtGeometry {
    pub px_per_ft: f64,
    pub court_width_ft: f64,
    pub court_length_ft: f64,
    pub y_min_ft: f64,
    pub y_max_ft: f64,
    pub hoop_radius_ft: f64,
    pub restricted_radius_ft: f64,
    pub lane_width_ft: f64,
    pub ft_circle_radius_ft: f64,
    pub ft_circle_center_y_ft: f64,
    pub corner_three_ft: f64,
    pub arc_radius_ft: f64,
    /// y at which the straight corner three-point line meets the arc.
    pub corner_break_y_ft: f64,
    /// Boundary tolerance in feet, absorbs floating-point noise near lines.
    pub zone_epsilon_ft: f64,
    /// Angular tolerance (radians) on the elbow wedge edge.
    pub angle_epsilon_rad: f64,
}

impl Default for CourtGeometry {
    fn default() -> Self {
        Self {
            px_per_ft: 10.0,
            court_width_ft: 50.0,
            court_length_ft: 47.0,
            y_min_ft: -4.0,
            y_max_ft: 47.0,
            hoop_radius_ft: 0.75,
            restricted_radius_ft: 4.0,
            lane_width_ft: 16.0,
            ft_circle_radius_ft: 6.0,
            ft_circle_center_y_ft: 13.5,
            corner_three_ft: 22.0,
            arc_radius_ft: 23.75,
            corner_break_y_ft: 7.8,
            zone_epsilon_ft: 0.15,
            angle_epsilon_rad: 1e-3,
        }
    }
}

/// The standard court, shared by the free-function shorthands below.
pub const STANDARD: CourtGeometry = CourtGeometry {
    px_per_ft: 10.0,
    court_width_ft: 50.0,
    court_length_ft: 47.0,
    y_min_ft: -4.0,
    y_max_ft: 47.0,
    hoop_radius_ft: 0.75,
    restricted_radius_ft: 4.0,
    lane_width_ft: 16.0,
    ft_circle_radius_ft: 6.0,
    ft_circle_center_y_ft: 13.5,
    corner_three_ft: 22.0,
    arc_radius_ft: 23.75,
    corner_break_y_ft: 7.8,
    zone_epsilon_ft: 0.15,
    angle_epsilon_rad: 1e-3,
};

// ---------------------------------------------------------------------------
// Shot zones
// ---------------------------------------------------------------------------

/// Named shot region of the half court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotZone {
    InnerPaint,
    CornerThree,
    AboveBreakThree,
    ElbowFt,
    LeftMidrange,
    RightMidrange,
    /// Outside the two-point region yet not caught by either three-point
    /// test. Only reachable with non-finite input or a negative tolerance.
    Undefined,
}

impl ShotZone {
    pub const ALL: [ShotZone; 7] = [
        ShotZone::InnerPaint,
        ShotZone::CornerThree,
        ShotZone::AboveBreakThree,
        ShotZone::ElbowFt,
        ShotZone::LeftMidrange,
        ShotZone::RightMidrange,
        ShotZone::Undefined,
    ];

    /// Display label used by charts and reports.
    pub fn label(&self) -> &'static str {
        match self {
            ShotZone::InnerPaint => "Inner Paint",
            ShotZone::CornerThree => "Corner Three",
            ShotZone::AboveBreakThree => "Above-the-Break Three",
            ShotZone::ElbowFt => "Elbow/FT",
            ShotZone::LeftMidrange => "Left Midrange",
            ShotZone::RightMidrange => "Right Midrange",
            ShotZone::Undefined => "Undefined",
        }
    }

    pub fn is_three(&self) -> bool {
        matches!(self, ShotZone::CornerThree | ShotZone::AboveBreakThree)
    }
}

impl fmt::Display for ShotZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Data orientation
// ---------------------------------------------------------------------------

/// How a provider's axes relate to the court diagram. Applied to raw
/// locations before they become events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    AsDiagram,
    NegateX,
    NegateY,
    NegateBoth,
}

impl Orientation {
    pub fn normalize(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Orientation::AsDiagram => (x, y),
            Orientation::NegateX => (-x, y),
            Orientation::NegateY => (x, -y),
            Orientation::NegateBoth => (-x, -y),
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry operations
// ---------------------------------------------------------------------------

impl CourtGeometry {
    /// Court feet to display x. The hoop sits at the horizontal center.
    pub fn to_display_x(&self, x_ft: f64) -> f64 {
        (x_ft + self.court_width_ft / 2.0) * self.px_per_ft
    }

    /// Court feet to display y. Flipped so the basket end is at the top.
    pub fn to_display_y(&self, y_ft: f64) -> f64 {
        (self.y_max_ft - y_ft) * self.px_per_ft
    }

    pub fn view_width(&self) -> f64 {
        self.court_width_ft * self.px_per_ft
    }

    pub fn view_height(&self) -> f64 {
        (self.y_max_ft - self.y_min_ft) * self.px_per_ft
    }

    pub fn distance_from_hoop(&self, x: f64, y: f64) -> f64 {
        x.hypot(y)
    }

    /// Whether a shot from `(x, y)` is worth three points.
    ///
    /// True in the corner strip or beyond the arc above the break. The
    /// boundaries carry the same tolerance, in the same direction, as
    /// [`CourtGeometry::shot_zone`], so a point is a three here exactly when
    /// its zone is `CornerThree` or `AboveBreakThree`.
    pub fn is_three(&self, x: f64, y: f64) -> bool {
        let eps = self.zone_epsilon_ft;
        let corner = x.abs() >= self.corner_three_ft - eps && y <= self.corner_break_y_ft + eps;
        let above_break =
            self.distance_from_hoop(x, y) >= self.arc_radius_ft - eps && y > self.corner_break_y_ft + eps;
        corner || above_break
    }

    /// Classify `(x, y)` into a [`ShotZone`]. First matching rule wins.
    pub fn shot_zone(&self, x: f64, y: f64) -> ShotZone {
        let eps = self.zone_epsilon_ft;
        let ax = x.abs();
        let r = self.distance_from_hoop(x, y);

        if self.in_inner_paint(x, y) {
            return ShotZone::InnerPaint;
        }

        if ax >= self.corner_three_ft - eps && y <= self.corner_break_y_ft + eps {
            return ShotZone::CornerThree;
        }

        if r >= self.arc_radius_ft - eps && y > self.corner_break_y_ft + eps {
            return ShotZone::AboveBreakThree;
        }

        let inside_corner_flat = y <= self.corner_break_y_ft + eps && ax <= self.corner_three_ft + eps;
        let inside_arc = r <= self.arc_radius_ft + eps;
        if !(inside_corner_flat || inside_arc) {
            return ShotZone::Undefined;
        }

        if self.angle_off_vertical(x, y) <= self.elbow_half_angle() + self.angle_epsilon_rad {
            return ShotZone::ElbowFt;
        }

        if x < 0.0 {
            ShotZone::LeftMidrange
        } else {
            ShotZone::RightMidrange
        }
    }

    /// Half-width of the elbow wedge: the angle between straight up and the
    /// line from the hoop to a top corner of the lane.
    pub fn elbow_half_angle(&self) -> f64 {
        FRAC_PI_2 - self.ft_circle_center_y_ft.atan2(self.lane_width_ft / 2.0)
    }

    fn in_inner_paint(&self, x: f64, y: f64) -> bool {
        x.abs() <= self.lane_width_ft / 2.0
            && y >= 0.0
            && y <= self.ft_circle_center_y_ft + self.zone_epsilon_ft
    }

    /// Angular deviation of `(x, y)` from straight up, in `[0, PI]`.
    fn angle_off_vertical(&self, x: f64, y: f64) -> f64 {
        let diff = (y.atan2(x) - FRAC_PI_2).abs();
        if diff > PI {
            2.0 * PI - diff
        } else {
            diff
        }
    }
}

// ---------------------------------------------------------------------------
// Standard-court shorthands
// ---------------------------------------------------------------------------

pub fn to_display_x(x_ft: f64) -> f64 {
    STANDARD.to_display_x(x_ft)
}

pub fn to_display_y(y_ft: f64) -> f64 {
    STANDARD.to_display_y(y_ft)
}

pub fn distance_from_hoop(x: f64, y: f64) -> f64 {
    STANDARD.distance_from_hoop(x, y)
}

pub fn is_three(x: f64, y: f64) -> bool {
    STANDARD.is_three(x, y)
}

pub fn shot_zone(x: f64, y: f64) -> ShotZone {
    STANDARD.shot_zone(x, y)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    /// Sample the court (and a margin around it) on a 0.05 ft grid.
    fn grid() -> impl Iterator<Item = (f64, f64)> {
        (-600..=600).flat_map(|i| {
            (-100..=1000).map(move |j| (i as f64 * 0.05, j as f64 * 0.05))
        })
    }

    #[test]
    fn standard_matches_default() {
        assert_eq!(STANDARD, CourtGeometry::default());
    }

    #[test]
    fn display_mapping() {
        assert!(approx_eq(to_display_x(0.0), 250.0, 1e-9));
        assert!(approx_eq(to_display_x(-25.0), 0.0, 1e-9));
        assert!(approx_eq(to_display_y(47.0), 0.0, 1e-9));
        assert!(approx_eq(to_display_y(15.0), 320.0, 1e-9));
        // Larger court y is higher on screen (smaller display y).
        assert!(to_display_y(20.0) < to_display_y(10.0));
        assert!(approx_eq(STANDARD.view_width(), 500.0, 1e-9));
        assert!(approx_eq(STANDARD.view_height(), 510.0, 1e-9));
    }

    #[test]
    fn distance_is_euclidean() {
        assert!(approx_eq(distance_from_hoop(3.0, 4.0), 5.0, 1e-12));
        assert!(approx_eq(distance_from_hoop(0.0, 0.0), 0.0, 1e-12));
    }

    #[test]
    fn known_zones() {
        assert_eq!(shot_zone(0.0, 5.0), ShotZone::InnerPaint);
        assert_eq!(shot_zone(23.0, 5.0), ShotZone::CornerThree);
        assert_eq!(shot_zone(-23.0, 2.0), ShotZone::CornerThree);
        assert_eq!(shot_zone(0.0, 30.0), ShotZone::AboveBreakThree);
        assert_eq!(shot_zone(-10.0, 10.0), ShotZone::LeftMidrange);
        assert_eq!(shot_zone(10.0, 10.0), ShotZone::RightMidrange);
        assert_eq!(shot_zone(0.0, 18.0), ShotZone::ElbowFt);
    }

    #[test]
    fn paint_extends_to_free_throw_circle_center() {
        assert_eq!(shot_zone(8.0, 13.6), ShotZone::InnerPaint);
        assert_eq!(shot_zone(-8.0, 0.0), ShotZone::InnerPaint);
        // Just above the tolerance band: straight-on, so elbow.
        assert_eq!(shot_zone(0.0, 13.7), ShotZone::ElbowFt);
    }

    #[test]
    fn behind_the_baseline_is_midrange() {
        // Below y = 0 the paint rule does not apply; the corner flat still
        // counts as two-point territory.
        assert_eq!(shot_zone(-1.0, -2.0), ShotZone::LeftMidrange);
        assert_eq!(shot_zone(0.0, -2.0), ShotZone::RightMidrange);
    }

    #[test]
    fn undefined_for_non_finite_input() {
        assert_eq!(shot_zone(f64::NAN, 5.0), ShotZone::Undefined);
        assert_eq!(shot_zone(0.0, f64::NAN), ShotZone::Undefined);
        assert!(!is_three(f64::NAN, 5.0));
    }

    #[test]
    fn undefined_with_negative_tolerance() {
        // A negative tolerance opens a gap between the corner line and the
        // corner flat.
        let court = CourtGeometry {
            zone_epsilon_ft: -0.1,
            ..CourtGeometry::default()
        };
        assert_eq!(court.shot_zone(22.0, -10.0), ShotZone::Undefined);
        assert_eq!(court.shot_zone(22.2, -10.0), ShotZone::CornerThree);
    }

    #[test]
    fn elbow_wedge_edges() {
        let alpha = STANDARD.elbow_half_angle();
        assert!(approx_eq(alpha.to_degrees(), 30.65, 0.01));

        // 20 ft out, just inside and just outside the wedge.
        let inside = FRAC_PI_2 - alpha + 0.01;
        let outside = FRAC_PI_2 - alpha - 0.01;
        assert_eq!(shot_zone(20.0 * inside.cos(), 20.0 * inside.sin()), ShotZone::ElbowFt);
        assert_eq!(
            shot_zone(20.0 * outside.cos(), 20.0 * outside.sin()),
            ShotZone::RightMidrange
        );
        assert_eq!(
            shot_zone(-20.0 * outside.cos(), 20.0 * outside.sin()),
            ShotZone::LeftMidrange
        );
    }

    #[test]
    fn tolerance_band_near_corner_line() {
        assert_eq!(shot_zone(21.9, 5.0), ShotZone::CornerThree);
        assert!(is_three(21.9, 5.0));
        assert_eq!(shot_zone(21.8, 5.0), ShotZone::RightMidrange);
        assert!(!is_three(21.8, 5.0));
    }

    #[test]
    fn is_three_basic() {
        assert!(is_three(23.0, 5.0));
        assert!(is_three(0.0, 25.0));
        assert!(!is_three(0.0, 5.0));
        assert!(!is_three(-10.0, 10.0));
    }

    #[test]
    fn zone_is_total() {
        for (x, y) in grid().step_by(7) {
            let zone = shot_zone(x, y);
            assert!(ShotZone::ALL.contains(&zone));
        }
    }

    #[test]
    fn is_three_agrees_with_zone() {
        for (x, y) in grid() {
            let zone = shot_zone(x, y);
            match zone {
                ShotZone::CornerThree | ShotZone::AboveBreakThree => {
                    assert!(is_three(x, y), "{zone:?} at ({x}, {y}) should be a three")
                }
                ShotZone::InnerPaint
                | ShotZone::ElbowFt
                | ShotZone::LeftMidrange
                | ShotZone::RightMidrange => {
                    assert!(!is_three(x, y), "{zone:?} at ({x}, {y}) should be a two")
                }
                ShotZone::Undefined => {}
            }
        }
    }

    #[test]
    fn zero_tolerance_reproduces_exact_lines() {
        let court = CourtGeometry {
            zone_epsilon_ft: 0.0,
            ..CourtGeometry::default()
        };
        assert!(!court.is_three(21.99, 5.0));
        assert!(court.is_three(22.0, 5.0));
        assert!(!court.is_three(0.0, 23.74));
        assert!(court.is_three(0.0, 23.75));
    }

    #[test]
    fn alternate_court_dimensions() {
        // Shorter line, like a FIBA/college court.
        let court = CourtGeometry {
            arc_radius_ft: 22.15,
            corner_three_ft: 21.65,
            ..CourtGeometry::default()
        };
        assert_eq!(court.shot_zone(0.0, 22.5), ShotZone::AboveBreakThree);
        assert_eq!(shot_zone(0.0, 22.5), ShotZone::ElbowFt);
    }

    #[test]
    fn orientation_normalize() {
        assert_eq!(Orientation::AsDiagram.normalize(1.0, 2.0), (1.0, 2.0));
        assert_eq!(Orientation::NegateX.normalize(1.0, 2.0), (-1.0, 2.0));
        assert_eq!(Orientation::NegateY.normalize(1.0, 2.0), (1.0, -2.0));
        assert_eq!(Orientation::NegateBoth.normalize(1.0, 2.0), (-1.0, -2.0));
    }

    #[test]
    fn zone_labels_round_trip_display() {
        for zone in ShotZone::ALL {
            assert_eq!(zone.to_string(), zone.label());
        }
        assert_eq!(ShotZone::AboveBreakThree.label(), "Above-the-Break Three");
    }
}
