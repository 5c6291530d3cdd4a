//! Signature plausibility heuristics.
//!
//! Runs once when the host asks for the exported image. The checks are
//! ordered cheapest first and the first failure wins, so every stroke
//! history maps to exactly one verdict. Inputs are bare samples; nothing
//! here touches a drawing surface.

use crate::stroke::{Stroke, strokes_bounds, total_points};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Why a stroke history was not accepted as a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("No signature detected.")]
    Empty,
    #[error("Signature too small. Please provide a wider signature.")]
    TooSmall,
    #[error("Please draw a proper signature, not a dot.")]
    Dot,
    #[error("Please draw a proper signature, not a straight line.")]
    StraightLine,
    #[error("Please draw a realistic signature, not a simple shape.")]
    SimpleShape,
    #[error("Please draw a realistic signature, not a rectangle.")]
    Rectangle,
    #[error("Please draw a realistic signature, not a circle.")]
    Circle,
}

/// Host-facing result: `{valid, reason}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Result<(), Rejection>> for Verdict {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Verdict {
                valid: true,
                reason: None,
            },
            Err(rejection) => Verdict {
                valid: false,
                reason: Some(rejection.to_string()),
            },
        }
    }
}

/// Thresholds for the heuristics. Distances are in logical surface units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub min_points: usize,
    pub min_width: f64,
    pub min_height: f64,
    pub min_area: f64,
    pub max_aspect: f64,
    pub min_aspect: f64,
    /// Per-axis movement a sample pair needs before it counts as a heading.
    pub direction_noise: f64,
    pub min_direction_changes: usize,
    /// Turn angle, in degrees, above which a sample triplet is a corner.
    pub corner_angle_degrees: f64,
    pub max_corners: usize,
    pub rectangle_corners: usize,
    pub circle_min_points: usize,
    /// First-to-last gap below which a single stroke counts as closed.
    pub circle_close_distance: f64,
    pub circle_min_aspect: f64,
    pub circle_max_aspect: f64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_points: 20,
            min_width: 50.0,
            min_height: 15.0,
            min_area: 500.0,
            max_aspect: 20.0,
            min_aspect: 0.05,
            direction_noise: 2.0,
            min_direction_changes: 3,
            corner_angle_degrees: 45.0,
            max_corners: 10,
            rectangle_corners: 4,
            circle_min_points: 10,
            circle_close_distance: 30.0,
            circle_min_aspect: 0.7,
            circle_max_aspect: 1.4,
        }
    }
}

/// Validate with the default thresholds.
pub fn validate(strokes: &[Stroke]) -> Result<(), Rejection> {
    validate_with(strokes, &ValidationRules::default())
}

/// Validate a sealed stroke history.
pub fn validate_with(strokes: &[Stroke], rules: &ValidationRules) -> Result<(), Rejection> {
    let count = total_points(strokes);
    if count == 0 {
        return Err(Rejection::Empty);
    }
    if count < rules.min_points {
        return Err(Rejection::TooSmall);
    }

    let Some(bounds) = strokes_bounds(strokes) else {
        return Err(Rejection::Empty);
    };
    let (width, height) = (bounds.width(), bounds.height());

    if width < rules.min_width || height < rules.min_height {
        return Err(Rejection::TooSmall);
    }
    if width * height < rules.min_area {
        return Err(Rejection::Dot);
    }

    let aspect = width / height;
    if aspect > rules.max_aspect || aspect < rules.min_aspect {
        return Err(Rejection::StraightLine);
    }

    if direction_changes(strokes, rules.direction_noise) < rules.min_direction_changes {
        return Err(Rejection::SimpleShape);
    }

    let corners = corner_count(strokes, rules.corner_angle_degrees.to_radians(), rules.max_corners);
    if corners == rules.rectangle_corners && single_stroke(strokes).is_some() {
        return Err(Rejection::Rectangle);
    }

    if is_circle(strokes, rules) {
        return Err(Rejection::Circle);
    }

    Ok(())
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Count heading flips across all strokes.
///
/// A sample pair contributes only if it moves more than `noise` on some axis.
/// A flip is recorded when a non-zero axis sign differs from the last
/// recorded heading; the heading then becomes the pair's sign vector. The
/// heading carries over from one stroke to the next.
pub fn direction_changes(strokes: &[Stroke], noise: f64) -> usize {
    let mut changes = 0;
    let mut heading: (i8, i8) = (0, 0);

    for stroke in strokes {
        for pair in stroke.points().windows(2) {
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            if dx.abs() <= noise && dy.abs() <= noise {
                continue;
            }

            let dir = (sign(dx), sign(dy));
            if (dir.0 != 0 && dir.0 != heading.0) || (dir.1 != 0 && dir.1 != heading.1) {
                changes += 1;
                heading = dir;
            }
        }
    }

    changes
}

/// Count sharp turns between consecutive segments of each stroke, capped.
pub fn corner_count(strokes: &[Stroke], threshold: f64, cap: usize) -> usize {
    let mut corners = 0;

    for stroke in strokes {
        for w in stroke.points().windows(3) {
            let incoming = (w[1].y - w[0].y).atan2(w[1].x - w[0].x);
            let outgoing = (w[2].y - w[1].y).atan2(w[2].x - w[1].x);

            let mut turn = (outgoing - incoming).abs();
            if turn > PI {
                turn = 2.0 * PI - turn;
            }
            if turn > threshold {
                corners += 1;
            }
        }
    }

    corners.min(cap)
}

/// The only stroke with samples, if there is exactly one.
fn single_stroke(strokes: &[Stroke]) -> Option<&Stroke> {
    let mut drawn = strokes.iter().filter(|s| !s.is_empty());
    match (drawn.next(), drawn.next()) {
        (Some(stroke), None) => Some(stroke),
        _ => None,
    }
}

/// A single closed, roughly square-bounded stroke.
fn is_circle(strokes: &[Stroke], rules: &ValidationRules) -> bool {
    let Some(stroke) = single_stroke(strokes) else {
        return false;
    };
    if stroke.len() < rules.circle_min_points {
        return false;
    }
    let (Some(first), Some(last), Some(bounds)) = (stroke.first(), stroke.last(), stroke.bounds())
    else {
        return false;
    };

    if first.distance(last) >= rules.circle_close_distance {
        return false;
    }

    let ratio = bounds.width() / bounds.height();
    (rules.circle_min_aspect..=rules.circle_max_aspect).contains(&ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::SamplePoint;

    fn stroke(points: &[(f64, f64)]) -> Stroke {
        Stroke::from_points(
            points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| SamplePoint::new(x, y, i as u64 * 16))
                .collect(),
        )
    }

    fn line(from: (f64, f64), to: (f64, f64), n: usize) -> Vec<(f64, f64)> {
        (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
            })
            .collect()
    }

    /// Closed square path starting mid-edge so all four corners are turns.
    fn square(side: f64, step: f64) -> Vec<(f64, f64)> {
        let mut pts = Vec::new();
        let half = side / 2.0;
        let corners = [(side, 0.0), (side, side), (0.0, side), (0.0, 0.0), (half, 0.0)];
        let mut cur = (half, 0.0);
        pts.push(cur);
        for &next in &corners {
            let dist = (next.0 - cur.0).hypot(next.1 - cur.1);
            let n = (dist / step).round() as usize;
            for i in 1..=n {
                let t = i as f64 / n as f64;
                pts.push((cur.0 + (next.0 - cur.0) * t, cur.1 + (next.1 - cur.1) * t));
            }
            cur = next;
        }
        pts
    }

    /// Sampled ellipse; `n` divisible by 4 puts samples on all four extremes.
    fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64, n: usize) -> Vec<(f64, f64)> {
        (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * 2.0 * PI;
                (cx + rx * a.cos(), cy + ry * a.sin())
            })
            .collect()
    }

    fn circle(cx: f64, cy: f64, r: f64, n: usize) -> Vec<(f64, f64)> {
        ellipse(cx, cy, r, r, n)
    }

    /// `n` samples spanning exactly `width` by `height`, alternating rows.
    fn bounded_zigzag(width: f64, height: f64, n: usize) -> Vec<(f64, f64)> {
        let step = width / (n - 1) as f64;
        (0..n)
            .map(|i| {
                let x = if i == n - 1 { width } else { i as f64 * step };
                (x, if i % 2 == 0 { 0.0 } else { height })
            })
            .collect()
    }

    fn zigzag(x0: f64, n: usize, amplitude: f64) -> Vec<(f64, f64)> {
        (0..n)
            .map(|i| (x0 + i as f64 * 10.0, if i % 2 == 0 { 0.0 } else { amplitude }))
            .collect()
    }

    #[test]
    fn test_no_strokes_is_empty() {
        assert_eq!(validate(&[]), Err(Rejection::Empty));
        assert_eq!(Rejection::Empty.to_string(), "No signature detected.");
    }

    #[test]
    fn test_zero_points_is_empty() {
        assert_eq!(validate(&[Stroke::new()]), Err(Rejection::Empty));
    }

    #[test]
    fn test_few_points_too_small_regardless_of_extent() {
        for n in 1..20 {
            let pts = line((0.0, 0.0), (1000.0, 600.0), n.max(2));
            let s = stroke(&pts[..n]);
            assert_eq!(validate(&[s]), Err(Rejection::TooSmall), "n = {n}");
        }
    }

    #[test]
    fn test_two_distant_points_too_small() {
        let s = stroke(&[(0.0, 0.0), (200.0, 5.0)]);
        assert_eq!(validate(&[s]), Err(Rejection::TooSmall));
    }

    #[test]
    fn test_flat_box_too_small() {
        // Enough points, but only 5 units tall.
        let s = stroke(&zigzag(0.0, 25, 5.0));
        assert_eq!(validate(&[s]), Err(Rejection::TooSmall));
    }

    #[test]
    fn test_tiny_cluster_is_too_small_with_default_rules() {
        let pts: Vec<_> = (0..25).map(|i| ((i % 3) as f64, (i % 2) as f64 * 2.0)).collect();
        assert_eq!(validate(&[stroke(&pts)]), Err(Rejection::TooSmall));
    }

    #[test]
    fn test_dot_when_extent_checks_are_relaxed() {
        let rules = ValidationRules {
            min_width: 1.0,
            min_height: 1.0,
            ..ValidationRules::default()
        };
        let pts: Vec<_> = (0..25).map(|i| ((i % 3) as f64, (i % 2) as f64 * 2.0)).collect();
        assert_eq!(validate_with(&[stroke(&pts)], &rules), Err(Rejection::Dot));
    }

    #[test]
    fn test_horizontal_300_by_2_fails_extent_first() {
        let s = stroke(&line((0.0, 0.0), (300.0, 2.0), 30));
        assert_eq!(validate(&[s]), Err(Rejection::TooSmall));
    }

    #[test]
    fn test_straight_line() {
        let s = stroke(&line((0.0, 0.0), (400.0, 16.0), 30));
        assert_eq!(validate(&[s]), Err(Rejection::StraightLine));
    }

    #[test]
    fn test_vertical_line() {
        let s = stroke(&line((0.0, 0.0), (50.0, 1200.0), 30));
        assert_eq!(validate(&[s]), Err(Rejection::StraightLine));
    }

    #[test]
    fn test_check_mark_is_simple_shape() {
        let mut pts = line((0.0, 60.0), (30.0, 100.0), 10);
        pts.extend(line((33.0, 96.0), (120.0, 0.0), 15));
        assert_eq!(validate(&[stroke(&pts)]), Err(Rejection::SimpleShape));
    }

    #[test]
    fn test_rectangle() {
        let pts = square(100.0, 10.0);
        assert!(pts.len() >= 20);
        let s = stroke(&pts);
        assert_eq!(corner_count(std::slice::from_ref(&s), PI / 4.0, 10), 4);
        assert_eq!(validate(&[s]), Err(Rejection::Rectangle));
    }

    #[test]
    fn test_rectangle_in_two_strokes_is_not_rectangle() {
        let pts = square(100.0, 10.0);
        let (a, b) = pts.split_at(pts.len() / 2);
        let result = validate(&[stroke(a), stroke(b)]);
        assert_ne!(result, Err(Rejection::Rectangle));
    }

    #[test]
    fn test_circle() {
        let s = stroke(&circle(100.0, 100.0, 50.0, 36));
        assert_eq!(validate(&[s]), Err(Rejection::Circle));
    }

    #[test]
    fn test_open_arc_is_not_circle() {
        let pts = circle(100.0, 100.0, 50.0, 36);
        let s = stroke(&pts[..27]);
        assert_ne!(validate(&[s]), Err(Rejection::Circle));
    }

    #[test]
    fn test_circle_with_empty_stroke_is_still_circle() {
        let s = stroke(&circle(100.0, 100.0, 50.0, 36));
        assert_eq!(validate(&[Stroke::new(), s, Stroke::new()]), Err(Rejection::Circle));
    }

    #[test]
    fn test_rectangle_with_empty_stroke_is_still_rectangle() {
        let s = stroke(&square(100.0, 10.0));
        assert_eq!(validate(&[s, Stroke::new()]), Err(Rejection::Rectangle));
    }

    #[test]
    fn test_minimum_extent_is_accepted() {
        assert_eq!(validate(&[stroke(&bounded_zigzag(50.0, 15.0, 21))]), Ok(()));
        assert_eq!(
            validate(&[stroke(&bounded_zigzag(49.9, 15.0, 21))]),
            Err(Rejection::TooSmall)
        );
        assert_eq!(
            validate(&[stroke(&bounded_zigzag(50.0, 14.9, 21))]),
            Err(Rejection::TooSmall)
        );
    }

    #[test]
    fn test_minimum_area_is_not_a_dot() {
        let rules = ValidationRules {
            min_width: 1.0,
            min_height: 1.0,
            ..ValidationRules::default()
        };
        let exact = stroke(&bounded_zigzag(50.0, 10.0, 21));
        assert_eq!(validate_with(&[exact], &rules), Ok(()));

        let under = stroke(&bounded_zigzag(50.0, 9.9, 21));
        assert_eq!(validate_with(&[under], &rules), Err(Rejection::Dot));
    }

    #[test]
    fn test_aspect_limits_are_not_lines() {
        assert_eq!(validate(&[stroke(&bounded_zigzag(300.0, 15.0, 21))]), Ok(()));
        assert_eq!(
            validate(&[stroke(&bounded_zigzag(301.0, 15.0, 21))]),
            Err(Rejection::StraightLine)
        );

        // 50 wide and 1000 tall is exactly the minimum aspect.
        let tall: Vec<_> = (0..21)
            .map(|i| (if i % 2 == 0 { 0.0 } else { 50.0 }, i as f64 * 50.0))
            .collect();
        assert_eq!(validate(&[stroke(&tall)]), Ok(()));
    }

    #[test]
    fn test_circle_gap_of_close_distance_is_open() {
        // Starts at (150, 100); ending 30 below it leaves the loop open.
        let mut pts = circle(100.0, 100.0, 50.0, 36);
        pts.push((150.0, 70.0));
        assert_eq!(validate(&[stroke(&pts)]), Ok(()));

        let mut pts = circle(100.0, 100.0, 50.0, 36);
        pts.push((150.0, 70.1));
        assert_eq!(validate(&[stroke(&pts)]), Err(Rejection::Circle));
    }

    #[test]
    fn test_circle_aspect_bounds_are_inclusive() {
        let narrow = stroke(&ellipse(35.0, 50.0, 35.0, 50.0, 36));
        assert_eq!(validate(&[narrow]), Err(Rejection::Circle));

        let wide = stroke(&ellipse(70.0, 50.0, 70.0, 50.0, 36));
        assert_eq!(validate(&[wide]), Err(Rejection::Circle));

        let narrower = stroke(&ellipse(34.0, 50.0, 34.0, 50.0, 36));
        assert_eq!(validate(&[narrower]), Ok(()));

        let wider = stroke(&ellipse(71.0, 50.0, 71.0, 50.0, 36));
        assert_eq!(validate(&[wider]), Ok(()));
    }

    #[test]
    fn test_realistic_signature_is_valid() {
        let first = stroke(&zigzag(0.0, 21, 30.0));
        let second = stroke(&[(20.0, 40.0), (60.0, 35.0), (110.0, 42.0), (160.0, 38.0)]);
        assert_eq!(validate(&[first, second]), Ok(()));
    }

    #[test]
    fn test_single_cursive_stroke_is_valid() {
        let s = stroke(&zigzag(0.0, 30, 40.0));
        assert_eq!(validate(&[s]), Ok(()));
    }

    #[test]
    fn test_direction_changes_ignore_noise() {
        let s = stroke(&[(0.0, 0.0), (1.0, 1.0), (0.0, 2.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(direction_changes(&[s], 2.0), 0);
    }

    #[test]
    fn test_direction_heading_carries_across_strokes() {
        let a = stroke(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = stroke(&[(100.0, 0.0), (110.0, 0.0)]);
        // First pair sets heading (1, 0); second stroke keeps it.
        assert_eq!(direction_changes(&[a, b], 2.0), 1);
    }

    #[test]
    fn test_corner_count_is_capped() {
        let s = stroke(&zigzag(0.0, 40, 30.0));
        assert_eq!(corner_count(&[s], PI / 4.0, 10), 10);
    }

    #[test]
    fn test_verdict_is_deterministic() {
        let strokes = vec![stroke(&circle(50.0, 50.0, 40.0, 30))];
        let a = Verdict::from(validate(&strokes));
        let b = Verdict::from(validate(&strokes));
        assert_eq!(a, b);
        assert!(!a.valid);
        assert_eq!(
            a.reason.as_deref(),
            Some("Please draw a realistic signature, not a circle.")
        );
    }

    #[test]
    fn test_verdict_serializes_without_reason_when_valid() {
        let json = serde_json::to_string(&Verdict::from(Ok(()))).unwrap();
        assert_eq!(json, r#"{"valid":true}"#);
    }
}
