// src/tolerance.rs - Distance metric, tolerance schedule and candidate merging

use log::debug;

use crate::contour::Pixel;
use crate::errors::ExtractionError;

/// Distance used to decide whether two candidates are the same vertex.
///
/// This is `|dx + dy|`, not a true metric: points on an anti-diagonal of each
/// other (dx = -dy) are at distance 0. Trained feature tables depend on it.
#[inline]
pub fn distance(p1: &Pixel, p2: &Pixel) -> u32 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    (dx + dy).unsigned_abs()
}

/// `floor(width * percent%) + floor(height * percent%)`
pub fn tolerance_for(width: u32, height: u32, percent: u32) -> u32 {
    let scale = |side: u32| (u64::from(side) * u64::from(percent) / 100) as u32;
    scale(width) + scale(height)
}

/// Tolerance growth parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToleranceSettings {
    pub initial_percent: u32,
    pub step_percent: u32,
    pub max_escalations: u32,
}

impl Default for ToleranceSettings {
    fn default() -> Self {
        Self {
            initial_percent: 3,
            step_percent: 1,
            max_escalations: 100,
        }
    }
}

/// Strictly increasing sequence of tolerances for one image.
///
/// Percent steps that leave the integer tolerance unchanged are folded into
/// the next larger value; each of them still counts against the cap.
#[derive(Debug, Clone)]
pub struct ToleranceSchedule {
    width: u32,
    height: u32,
    percent: u32,
    step: u32,
    escalations: u32,
    max_escalations: u32,
    current: u32,
}

impl ToleranceSchedule {
    pub fn new(width: u32, height: u32, settings: ToleranceSettings) -> Self {
        Self {
            width,
            height,
            percent: settings.initial_percent,
            step: settings.step_percent,
            escalations: 0,
            max_escalations: settings.max_escalations,
            current: tolerance_for(width, height, settings.initial_percent),
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    pub fn escalations(&self) -> u32 {
        self.escalations
    }

    /// Move to the next larger tolerance, or `None` once the cap is spent
    pub fn escalate(&mut self) -> Option<u32> {
        while self.escalations < self.max_escalations {
            self.escalations += 1;
            self.percent += self.step;
            let next = tolerance_for(self.width, self.height, self.percent);
            if next > self.current {
                self.current = next;
                return Some(next);
            }
        }
        None
    }
}

/// Result of collapsing the candidate set down to three points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub points: [Pixel; 3],
    /// Tolerance of the last pass
    pub tolerance: u32,
    pub escalations: u32,
}

/// Collapse near-duplicate candidates until exactly three remain.
///
/// Candidates sit in an arena addressed by index; a pair is skipped only when
/// both indices are the same slot, so two slots holding equal pixels can still
/// merge. Within a pass, for each live `u` and each live `q != u`, `q` is
/// dropped when `distance(u, q) <= tolerance`. Removal stops the moment three
/// candidates are left.
pub fn merge_candidates(
    candidates: &[Pixel],
    mut schedule: ToleranceSchedule,
) -> Result<MergeOutcome, ExtractionError> {
    if candidates.len() < 3 {
        return Err(ExtractionError::InsufficientCandidates {
            found: candidates.len(),
        });
    }

    let mut alive = vec![true; candidates.len()];
    let mut remaining = candidates.len();
    let mut tolerance = schedule.current();

    while remaining > 3 {
        'pass: for u in 0..candidates.len() {
            if !alive[u] {
                continue;
            }
            for q in 0..candidates.len() {
                if remaining <= 3 {
                    break 'pass;
                }
                if q == u || !alive[q] {
                    continue;
                }
                if distance(&candidates[u], &candidates[q]) <= tolerance {
                    alive[q] = false;
                    remaining -= 1;
                }
            }
        }

        if remaining > 3 {
            tolerance = schedule.escalate().ok_or_else(|| ExtractionError::MergeDidNotConverge {
                remaining,
                escalations: schedule.escalations(),
            })?;
            debug!(
                "{} candidates left, tolerance raised to {} ({}%)",
                remaining,
                tolerance,
                schedule.percent()
            );
        }
    }

    let kept: Vec<Pixel> = candidates
        .iter()
        .zip(&alive)
        .filter(|(_, keep)| **keep)
        .map(|(p, _)| *p)
        .collect();

    let points: [Pixel; 3] = kept.try_into().map_err(|rest: Vec<Pixel>| {
        ExtractionError::InsufficientCandidates { found: rest.len() }
    })?;

    Ok(MergeOutcome {
        points,
        tolerance,
        escalations: schedule.escalations(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(x: i32, y: i32) -> Pixel {
        Pixel::new(x, y, 255)
    }

    #[test]
    fn distance_is_signed_sum_of_deltas() {
        assert_eq!(distance(&px(3, 4), &px(1, 1)), 5);
        assert_eq!(distance(&px(1, 1), &px(3, 4)), 5);
        // Far apart along the anti-diagonal, yet "equal"
        assert_eq!(distance(&px(0, 10), &px(10, 0)), 0);
    }

    #[test]
    fn tolerance_floors_each_axis() {
        assert_eq!(tolerance_for(28, 28, 3), 0);
        assert_eq!(tolerance_for(28, 28, 4), 2);
        assert_eq!(tolerance_for(100, 50, 3), 4);
        assert_eq!(tolerance_for(200, 200, 10), 40);
    }

    #[test]
    fn schedule_is_strictly_increasing_and_bounded() {
        for (w, h) in [(28, 28), (50, 37), (640, 480), (3, 3)] {
            let mut schedule = ToleranceSchedule::new(w, h, ToleranceSettings::default());
            let mut previous = schedule.current();
            while let Some(next) = schedule.escalate() {
                assert!(next > previous, "{} !> {} for {}x{}", next, previous, w, h);
                previous = next;
            }
            assert_eq!(schedule.escalations(), 100);
            assert_eq!(schedule.escalate(), None);
        }
    }

    #[test]
    fn schedule_skips_flat_steps() {
        // 28 * 5%, 6% and 7% floor to 1 per axis, same as 4%
        let mut schedule = ToleranceSchedule::new(28, 28, ToleranceSettings::default());
        assert_eq!(schedule.escalate(), Some(2));
        assert_eq!(schedule.percent(), 4);
        assert_eq!(schedule.escalate(), Some(4));
        assert_eq!(schedule.percent(), 8);
        assert_eq!(schedule.escalations(), 5);
    }

    #[test]
    fn three_candidates_pass_through() {
        let candidates = [px(10, 0), px(0, 10), px(0, 0)];
        let schedule = ToleranceSchedule::new(11, 11, ToleranceSettings::default());
        let outcome = merge_candidates(&candidates, schedule).unwrap();
        assert_eq!(outcome.points, candidates);
        assert_eq!(outcome.escalations, 0);
    }

    #[test]
    fn merges_close_pairs_at_initial_tolerance() {
        // 100x100: initial tolerance 6
        let candidates = [px(10, 10), px(11, 10), px(50, 80), px(52, 80), px(90, 10)];
        let schedule = ToleranceSchedule::new(100, 100, ToleranceSettings::default());
        let outcome = merge_candidates(&candidates, schedule).unwrap();
        assert_eq!(outcome.points, [px(10, 10), px(50, 80), px(90, 10)]);
        assert_eq!(outcome.escalations, 0);
        assert_eq!(outcome.tolerance, 6);
    }

    #[test]
    fn escalates_when_pairs_sit_just_outside_tolerance() {
        let candidates = [px(10, 10), px(17, 10), px(50, 80), px(57, 80), px(90, 10)];
        let schedule = ToleranceSchedule::new(100, 100, ToleranceSettings::default());
        let outcome = merge_candidates(&candidates, schedule).unwrap();
        assert_eq!(outcome.points, [px(10, 10), px(50, 80), px(90, 10)]);
        assert_eq!(outcome.escalations, 1);
        assert_eq!(outcome.tolerance, 8);
    }

    #[test]
    fn rejects_when_cap_is_exhausted() {
        let candidates = [px(10, 10), px(17, 10), px(50, 80), px(57, 80), px(90, 10)];
        let settings = ToleranceSettings {
            max_escalations: 0,
            ..ToleranceSettings::default()
        };
        let schedule = ToleranceSchedule::new(100, 100, settings);
        assert_eq!(
            merge_candidates(&candidates, schedule),
            Err(ExtractionError::MergeDidNotConverge {
                remaining: 5,
                escalations: 0
            })
        );
    }

    #[test]
    fn equal_pixels_in_distinct_slots_still_merge() {
        let candidates = [px(5, 5), px(5, 5), px(40, 60), px(80, 5)];
        let schedule = ToleranceSchedule::new(100, 100, ToleranceSettings::default());
        let outcome = merge_candidates(&candidates, schedule).unwrap();
        assert_eq!(outcome.points, [px(5, 5), px(40, 60), px(80, 5)]);
    }

    #[test]
    fn too_few_candidates() {
        let schedule = ToleranceSchedule::new(28, 28, ToleranceSettings::default());
        assert_eq!(
            merge_candidates(&[px(1, 1), px(20, 3)], schedule),
            Err(ExtractionError::InsufficientCandidates { found: 2 })
        );
    }
}
