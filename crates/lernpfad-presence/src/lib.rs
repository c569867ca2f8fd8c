#![warn(clippy::unwrap_used, clippy::expect_used)]

//! In-memory exhibit data and the enter/exit presence workflow.
//!
//! [`MemoryMuseum`] implements every collaborator trait the recommendation
//! engine reads from. Occupancy counters are atomics and are only ever
//! changed through [`OccupancyLedger::adjust_occupancy`] semantics: decrements
//! clamp at zero, increments are not capped.

pub mod error;
pub mod snapshot;
mod workflow;

use lernpfad_core::{
    ActivityId, ActivityState, ActivityStates, Edge, OccupancyLedger, StoreError, TargetId,
    TargetState, TargetStates, Theme, ThemeId, Topology,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use time::OffsetDateTime;

pub use error::{PresenceError, Result};
pub use snapshot::MuseumSnapshot;
pub use workflow::ActivityProgress;

/// A single stay of a learner at a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub target: TargetId,
    /// Physical visit (`true`) or virtual materials (`false`).
    pub is_entity: bool,
    #[serde(with = "time::serde::iso8601")]
    pub entered_at: OffsetDateTime,
    #[serde(with = "time::serde::iso8601::option")]
    pub left_at: Option<OffsetDateTime>,
}

/// Stored state of one learning activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub theme: ThemeId,
    pub enable_virtual: bool,
    #[serde(with = "time::serde::iso8601")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::iso8601::option")]
    pub ended_at: Option<OffsetDateTime>,
    /// Target the learner is walking to, holding a reserved place.
    pub entering: Option<TargetId>,
    pub visits: Vec<Visit>,
}

impl ActivityRecord {
    #[must_use]
    pub fn is_learning(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Target the learner is currently inside, if any.
    #[must_use]
    pub fn current_target(&self) -> Option<TargetId> {
        self.open_visit().map(|v| v.target)
    }

    fn open_visit(&self) -> Option<&Visit> {
        self.visits.iter().find(|v| v.left_at.is_none())
    }
}

#[derive(Debug)]
struct TargetRecord {
    capacity: u32,
    saturation: u32,
    learn_time: u32,
    occupancy: AtomicU32,
}

impl TargetRecord {
    fn state(&self, id: TargetId) -> TargetState {
        TargetState {
            id,
            capacity: self.capacity,
            occupancy: self.occupancy.load(Ordering::Acquire),
            saturation: self.saturation,
            learn_time: self.learn_time,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    targets: BTreeMap<TargetId, TargetRecord>,
    edges: Vec<Edge>,
    memberships: BTreeMap<(TargetId, ThemeId), u32>,
    themes: BTreeMap<ThemeId, Theme>,
    activities: BTreeMap<ActivityId, ActivityRecord>,
}

fn adjust(
    targets: &BTreeMap<TargetId, TargetRecord>,
    target: TargetId,
    delta: i32,
) -> lernpfad_core::Result<u32> {
    let record = targets
        .get(&target)
        .ok_or(StoreError::UnknownTarget(target))?;
    let previous = match record.occupancy.fetch_update(
        Ordering::AcqRel,
        Ordering::Acquire,
        |m| Some(m.saturating_add_signed(delta)),
    ) {
        Ok(prev) | Err(prev) => prev,
    };
    Ok(previous.saturating_add_signed(delta))
}

/// Thread-safe in-memory store of targets, edges, themes and activities.
#[derive(Debug)]
pub struct MemoryMuseum {
    inner: RwLock<Inner>,
    next_activity: AtomicU64,
}

impl Default for MemoryMuseum {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            next_activity: AtomicU64::new(1),
        }
    }
}

impl MemoryMuseum {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or replaces a target, including its current occupancy.
    pub fn add_target(&self, state: TargetState) {
        self.write().targets.insert(
            state.id,
            TargetRecord {
                capacity: state.capacity,
                saturation: state.saturation,
                learn_time: state.learn_time,
                occupancy: AtomicU32::new(state.occupancy),
            },
        );
    }

    /// Appends a directed edge. Edges keep their insertion order.
    pub fn add_edge(&self, from: TargetId, to: TargetId, move_time: u32) {
        self.write().edges.push(Edge {
            from,
            to,
            move_time,
        });
    }

    pub fn set_membership(&self, target: TargetId, theme: ThemeId, weight: u32) {
        self.write().memberships.insert((target, theme), weight);
    }

    pub fn add_theme(&self, theme: Theme) {
        self.write().themes.insert(theme.id, theme);
    }

    /// Starts a new learning activity for `theme`.
    pub fn start_activity(&self, theme: ThemeId, enable_virtual: bool) -> Result<ActivityId> {
        let mut inner = self.write();
        if !inner.themes.contains_key(&theme) {
            return Err(PresenceError::ThemeNotFound(theme));
        }
        let id = ActivityId(self.next_activity.fetch_add(1, Ordering::Relaxed));
        inner.activities.insert(
            id,
            ActivityRecord {
                id,
                theme,
                enable_virtual,
                started_at: OffsetDateTime::now_utc(),
                ended_at: None,
                entering: None,
                visits: Vec::new(),
            },
        );
        tracing::info!(activity = %id, %theme, enable_virtual, "Activity started");
        Ok(id)
    }

    /// Copy of the stored activity record.
    pub fn activity(&self, activity: ActivityId) -> Result<ActivityRecord> {
        self.read()
            .activities
            .get(&activity)
            .cloned()
            .ok_or(PresenceError::ActivityNotFound(activity))
    }
}

impl Topology for MemoryMuseum {
    fn edges_from(&self, target: TargetId) -> lernpfad_core::Result<Vec<Edge>> {
        Ok(self
            .read()
            .edges
            .iter()
            .filter(|e| e.from == target)
            .copied()
            .collect())
    }

    fn membership_weight(
        &self,
        target: TargetId,
        theme: ThemeId,
    ) -> lernpfad_core::Result<Option<u32>> {
        Ok(self.read().memberships.get(&(target, theme)).copied())
    }

    fn theme(&self, theme: ThemeId) -> lernpfad_core::Result<Option<Theme>> {
        Ok(self.read().themes.get(&theme).cloned())
    }
}

impl TargetStates for MemoryMuseum {
    fn target_state(&self, target: TargetId) -> lernpfad_core::Result<Option<TargetState>> {
        Ok(self.read().targets.get(&target).map(|r| r.state(target)))
    }
}

impl ActivityStates for MemoryMuseum {
    fn activity_state(&self, activity: ActivityId) -> lernpfad_core::Result<Option<ActivityState>> {
        Ok(self.read().activities.get(&activity).map(|a| ActivityState {
            id: a.id,
            theme: a.theme,
            enable_virtual: a.enable_virtual,
        }))
    }

    fn is_target_visited(&self, activity: ActivityId, target: TargetId) -> lernpfad_core::Result<bool> {
        Ok(self
            .read()
            .activities
            .get(&activity)
            .is_some_and(|a| a.visits.iter().any(|v| v.target == target)))
    }
}

impl OccupancyLedger for MemoryMuseum {
    fn adjust_occupancy(&self, target: TargetId, delta: i32) -> lernpfad_core::Result<u32> {
        adjust(&self.read().targets, target, delta)
    }
}
