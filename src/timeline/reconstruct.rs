use std::collections::{BTreeSet, HashSet};

use crate::family::model::PersonId;
use crate::foundation::core::Point;
use crate::layout::graph::EdgeLayout;
use crate::timeline::action::{AnimAction, EdgeId, Timeline};

/// One edge to draw at a given time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeProgress<'a> {
    /// Edge id within the timeline.
    pub id: EdgeId,
    /// Edge geometry.
    pub edge: &'a EdgeLayout,
    /// Drawn fraction in `[0, 1]`.
    pub progress: f64,
}

/// Everything visible at one instant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameState<'a> {
    /// People shown so far.
    pub visible: BTreeSet<PersonId>,
    /// Completed edges first (in completion order), then edges still growing.
    pub edges: Vec<EdgeProgress<'a>>,
}

impl Timeline {
    /// Replay the timeline up to `t` seconds.
    ///
    /// Pure: the result depends only on `self` and `t`, so frames may be requested in any order
    /// and from several threads. Times before 0 (or NaN) yield an empty state.
    pub fn state_at(&self, t: f64) -> FrameState<'_> {
        let mut visible = BTreeSet::new();
        let mut completed = Vec::<EdgeId>::new();
        let mut done = HashSet::<EdgeId>::new();
        let mut growing = Vec::<(EdgeId, f64)>::new();

        for (action, &start) in self.actions().iter().zip(self.starts()) {
            if t.is_nan() || start > t {
                break;
            }
            match action {
                AnimAction::Appear { persons } => visible.extend(persons.iter().copied()),
                AnimAction::DrawLine { duration, edges } => {
                    if t >= start + duration {
                        for id in edges {
                            if done.insert(*id) {
                                completed.push(*id);
                            }
                        }
                    } else {
                        let progress = if *duration > 0.0 {
                            ((t - start) / duration).clamp(0.0, 1.0)
                        } else {
                            1.0
                        };
                        growing.extend(edges.iter().map(|id| (*id, progress)));
                    }
                }
                AnimAction::Pause { .. } => {}
            }
        }

        let edges = completed
            .into_iter()
            .map(|id| (id, 1.0))
            .chain(growing.into_iter().filter(|(id, _)| !done.contains(id)))
            .filter_map(|(id, progress)| {
                self.edge(id).map(|edge| EdgeProgress { id, edge, progress })
            })
            .collect();
        FrameState { visible, edges }
    }
}

/// Leading part of a polyline covering `progress` of its arc length.
///
/// `progress <= 0` (or NaN) gives the first point, `progress >= 1` the whole list, and a
/// zero-length path its first point. The last returned point is interpolated inside the segment
/// where the target length falls.
pub fn interpolate_along_path(points: &[Point], progress: f64) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if progress.is_nan() || progress <= 0.0 || points.len() < 2 {
        return vec![first];
    }
    if progress >= 1.0 {
        return points.to_vec();
    }

    let lengths: Vec<f64> = points.windows(2).map(|w| w[0].distance(w[1])).collect();
    let total: f64 = lengths.iter().sum();
    if total <= 0.0 {
        return vec![first];
    }

    let target = total * progress;
    let mut walked = 0.0;
    let mut out = vec![first];
    for (i, len) in lengths.iter().copied().enumerate() {
        if walked + len >= target {
            let t = if len > 0.0 { (target - walked) / len } else { 0.0 };
            out.push(points[i].lerp(points[i + 1], t));
            break;
        }
        walked += len;
        out.push(points[i + 1]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/reconstruct.rs"]
mod tests;
