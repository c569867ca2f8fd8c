//! JSON persistence of a [`MemoryMuseum`].

use lernpfad_core::{ActivityId, Edge, StoreError, TargetId, TargetState, Theme, ThemeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::Ordering;

use crate::{ActivityRecord, MemoryMuseum, Result};

/// Theme membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub target: TargetId,
    pub theme: ThemeId,
    pub weight: u32,
}

/// Serializable copy of everything a [`MemoryMuseum`] holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MuseumSnapshot {
    #[serde(default)]
    pub targets: Vec<TargetState>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
    #[serde(default)]
    pub themes: Vec<Theme>,
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
}

impl MuseumSnapshot {
    /// Checks that every activity row points at stored themes and targets
    /// and that activity ids are unique.
    pub fn check(&self) -> lernpfad_core::Result<()> {
        let targets: BTreeSet<TargetId> = self.targets.iter().map(|t| t.id).collect();
        let themes: BTreeSet<ThemeId> = self.themes.iter().map(|t| t.id).collect();
        let mut seen = BTreeSet::new();
        for activity in &self.activities {
            if !seen.insert(activity.id) {
                return Err(StoreError::Corrupt(format!(
                    "duplicate activity {}",
                    activity.id
                )));
            }
            if !themes.contains(&activity.theme) {
                return Err(StoreError::Corrupt(format!(
                    "activity {} references unknown theme {}",
                    activity.id, activity.theme
                )));
            }
            let referenced = activity
                .visits
                .iter()
                .map(|v| v.target)
                .chain(activity.entering);
            for target in referenced {
                if !targets.contains(&target) {
                    return Err(StoreError::Corrupt(format!(
                        "activity {} references unknown target {target}",
                        activity.id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl MemoryMuseum {
    /// Copies the current state. Occupancy is read per target, so counters
    /// changed concurrently may already be newer than the activity records.
    #[must_use]
    pub fn snapshot(&self) -> MuseumSnapshot {
        let inner = self.read();
        MuseumSnapshot {
            targets: inner
                .targets
                .iter()
                .map(|(id, record)| record.state(*id))
                .collect(),
            edges: inner.edges.clone(),
            memberships: inner
                .memberships
                .iter()
                .map(|(&(target, theme), &weight)| Membership {
                    target,
                    theme,
                    weight,
                })
                .collect(),
            themes: inner.themes.values().cloned().collect(),
            activities: inner.activities.values().cloned().collect(),
        }
    }

    #[must_use]
    pub fn from_snapshot(snapshot: MuseumSnapshot) -> Self {
        let museum = MemoryMuseum::new();
        for target in snapshot.targets {
            museum.add_target(target);
        }
        for edge in snapshot.edges {
            museum.add_edge(edge.from, edge.to, edge.move_time);
        }
        for m in snapshot.memberships {
            museum.set_membership(m.target, m.theme, m.weight);
        }
        for theme in snapshot.themes {
            museum.add_theme(theme);
        }

        let next = snapshot
            .activities
            .iter()
            .map(|a| a.id.0)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        museum.next_activity.store(next, Ordering::Relaxed);
        museum.write().activities = snapshot
            .activities
            .into_iter()
            .map(|a| (a.id, a))
            .collect::<BTreeMap<ActivityId, ActivityRecord>>();
        museum
    }

    /// Loads a museum from a JSON file. A missing file yields `None`, rows
    /// failing [`MuseumSnapshot::check`] yield [`StoreError::Corrupt`].
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)?;
        let snapshot: MuseumSnapshot = serde_json::from_reader(file)?;
        snapshot.check()?;
        tracing::debug!(
            path = %path.display(),
            targets = snapshot.targets.len(),
            activities = snapshot.activities.len(),
            "Museum snapshot loaded"
        );
        Ok(Some(Self::from_snapshot(snapshot)))
    }

    /// Writes the museum as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &self.snapshot())?;
        Ok(())
    }
}
