use crate::family::model::PersonId;
use crate::foundation::error::{FamflowError, FamflowResult};
use crate::layout::graph::EdgeLayout;

/// Index of an edge owned by a [`Timeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub usize);

/// One step of a reveal animation.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimAction {
    /// Show people instantly.
    Appear {
        /// Newly shown people.
        persons: Vec<PersonId>,
    },
    /// Grow edges from tail to head over `duration` seconds.
    DrawLine {
        /// Seconds.
        duration: f64,
        /// Edges drawn together.
        edges: Vec<EdgeId>,
    },
    /// Hold the current picture.
    Pause {
        /// Seconds.
        duration: f64,
    },
}

impl AnimAction {
    /// Length in seconds; always 0 for [`AnimAction::Appear`].
    pub fn duration(&self) -> f64 {
        match self {
            Self::Appear { .. } => 0.0,
            Self::DrawLine { duration, .. } | Self::Pause { duration } => *duration,
        }
    }
}

/// Validated action sequence with cumulative start times and the edge geometry it draws.
#[derive(Clone, Debug)]
pub struct Timeline {
    actions: Vec<AnimAction>,
    starts: Vec<f64>,
    edges: Vec<EdgeLayout>,
    total: f64,
}

impl Timeline {
    /// Build a timeline, rejecting unusable sequences.
    ///
    /// Fails on an empty action list, a negative or non-finite duration, an edge id outside
    /// `edges`, or a total duration that is not strictly positive.
    pub fn new(actions: Vec<AnimAction>, edges: Vec<EdgeLayout>) -> FamflowResult<Self> {
        if actions.is_empty() {
            return Err(FamflowError::timeline("timeline has no actions"));
        }
        let mut starts = Vec::with_capacity(actions.len());
        let mut t = 0.0f64;
        for (i, action) in actions.iter().enumerate() {
            let d = action.duration();
            if !d.is_finite() || d < 0.0 {
                return Err(FamflowError::timeline(format!(
                    "action {i} has invalid duration {d}"
                )));
            }
            if let AnimAction::DrawLine { edges: ids, .. } = action
                && let Some(bad) = ids.iter().find(|id| id.0 >= edges.len())
            {
                return Err(FamflowError::timeline(format!(
                    "action {i} references unknown edge {}",
                    bad.0
                )));
            }
            starts.push(t);
            t += d;
        }
        if !t.is_finite() || t <= 0.0 {
            return Err(FamflowError::timeline(format!(
                "total duration must be > 0, got {t}"
            )));
        }
        Ok(Self {
            actions,
            starts,
            edges,
            total: t,
        })
    }

    /// Actions in playback order.
    pub fn actions(&self) -> &[AnimAction] {
        &self.actions
    }

    /// Start time of each action, parallel to [`Timeline::actions`].
    pub fn starts(&self) -> &[f64] {
        &self.starts
    }

    /// Edge geometry referenced by [`EdgeId`].
    pub fn edges(&self) -> &[EdgeLayout] {
        &self.edges
    }

    /// Geometry of one edge.
    pub fn edge(&self, id: EdgeId) -> Option<&EdgeLayout> {
        self.edges.get(id.0)
    }

    /// Sum of all action durations, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.total
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/action.rs"]
mod tests;
