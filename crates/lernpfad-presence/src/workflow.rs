//! Enter/exit workflow of a learning activity.
//!
//! Every transition updates the activity record and the occupancy counters
//! under one write lock, so a concurrent reader never sees a visit without
//! its matching occupancy change.

use lernpfad_core::event::{PresenceEvent, PresenceKind};
use lernpfad_core::{ActivityId, TargetId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;

use crate::{adjust, ActivityRecord, MemoryMuseum, PresenceError, Result, TargetRecord, Visit};

/// How far a learner got through the theme of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityProgress {
    /// Number of targets belonging to the activity's theme.
    pub target_total: usize,
    /// Distinct targets entered so far.
    pub learned: usize,
    pub remaining: usize,
}

fn learning_mut(
    activities: &mut BTreeMap<ActivityId, ActivityRecord>,
    activity: ActivityId,
) -> Result<&mut ActivityRecord> {
    let record = activities
        .get_mut(&activity)
        .ok_or(PresenceError::ActivityNotFound(activity))?;
    if !record.is_learning() {
        return Err(PresenceError::ActivityFinished(activity));
    }
    Ok(record)
}

fn release_entering(
    targets: &BTreeMap<TargetId, TargetRecord>,
    record: &mut ActivityRecord,
) -> Result<Option<TargetId>> {
    let Some(target) = record.entering.take() else {
        return Ok(None);
    };
    adjust(targets, target, -1)?;
    Ok(Some(target))
}

fn leave(
    targets: &BTreeMap<TargetId, TargetRecord>,
    record: &mut ActivityRecord,
    target: TargetId,
    now: OffsetDateTime,
) -> Result<()> {
    let activity = record.id;
    let visit = record
        .visits
        .iter_mut()
        .find(|v| v.target == target && v.left_at.is_none())
        .ok_or(PresenceError::NotInTarget { activity, target })?;
    visit.left_at = Some(now);
    if visit.is_entity {
        adjust(targets, target, -1)?;
    }
    Ok(())
}

impl MemoryMuseum {
    /// The learner starts walking to `target` and reserves a place there.
    ///
    /// A previous reservation of the same activity is released first.
    pub fn begin_entering(&self, activity: ActivityId, target: TargetId) -> Result<()> {
        let mut guard = self.write();
        let inner = &mut *guard;
        if !inner.targets.contains_key(&target) {
            return Err(PresenceError::TargetNotFound(target));
        }
        let record = learning_mut(&mut inner.activities, activity)?;
        if let Some(current) = record.current_target() {
            return Err(PresenceError::AlreadyInTarget {
                activity,
                target: current,
            });
        }

        release_entering(&inner.targets, record)?;
        adjust(&inner.targets, target, 1)?;
        record.entering = Some(target);
        tracing::debug!(%activity, target_id = %target, "Entering target");
        Ok(())
    }

    /// Gives up the pending reservation, if there is one.
    pub fn cancel_entering(&self, activity: ActivityId) -> Result<Option<TargetId>> {
        let mut guard = self.write();
        let inner = &mut *guard;
        let record = learning_mut(&mut inner.activities, activity)?;
        let released = release_entering(&inner.targets, record)?;
        if let Some(target) = released {
            tracing::debug!(%activity, target_id = %target, "Entering cancelled");
        }
        Ok(released)
    }

    /// The learner enters `target`, physically (`is_entity`) or through
    /// virtual materials. The target counts as visited from now on.
    pub fn enter_target(&self, activity: ActivityId, target: TargetId, is_entity: bool) -> Result<()> {
        let mut guard = self.write();
        let inner = &mut *guard;
        if !inner.targets.contains_key(&target) {
            return Err(PresenceError::TargetNotFound(target));
        }
        let record = learning_mut(&mut inner.activities, activity)?;
        if let Some(current) = record.current_target() {
            return Err(PresenceError::AlreadyInTarget {
                activity,
                target: current,
            });
        }

        if is_entity {
            adjust(&inner.targets, target, 1)?;
        }
        record.visits.push(Visit {
            target,
            is_entity,
            entered_at: OffsetDateTime::now_utc(),
            left_at: None,
        });
        release_entering(&inner.targets, record)?;
        tracing::debug!(%activity, target_id = %target, is_entity, "Entered target");
        Ok(())
    }

    /// The learner leaves `target`.
    pub fn exit_target(&self, activity: ActivityId, target: TargetId) -> Result<()> {
        let mut guard = self.write();
        let inner = &mut *guard;
        let record = learning_mut(&mut inner.activities, activity)?;
        leave(&inner.targets, record, target, OffsetDateTime::now_utc())?;
        tracing::debug!(%activity, target_id = %target, "Left target");
        Ok(())
    }

    /// Ends the activity: leaves the current target, drops the pending
    /// reservation and stamps the end time.
    pub fn finish_activity(&self, activity: ActivityId) -> Result<()> {
        let mut guard = self.write();
        let inner = &mut *guard;
        let record = learning_mut(&mut inner.activities, activity)?;
        let now = OffsetDateTime::now_utc();
        if let Some(current) = record.current_target() {
            leave(&inner.targets, record, current, now)?;
        }
        release_entering(&inner.targets, record)?;
        record.ended_at = Some(now);
        tracing::info!(%activity, visits = record.visits.len(), "Activity finished");
        Ok(())
    }

    /// Applies a presence event through the matching workflow step.
    pub fn apply(&self, event: &PresenceEvent) -> Result<()> {
        match event.kind {
            PresenceKind::Enter => self.enter_target(event.activity, event.target, event.is_entity),
            PresenceKind::Exit => self.exit_target(event.activity, event.target),
            PresenceKind::Entering => self.begin_entering(event.activity, event.target),
            PresenceKind::CancelEntering => self.cancel_entering(event.activity).map(|_| ()),
        }
    }

    /// Progress through the activity's theme.
    ///
    /// `learned` counts distinct targets actually entered, physically or
    /// virtually. A reservation alone does not count. `remaining` is
    /// `target_total - learned` with every theme member included, the start
    /// target as well.
    pub fn progress(&self, activity: ActivityId) -> Result<ActivityProgress> {
        let inner = self.read();
        let record = inner
            .activities
            .get(&activity)
            .ok_or(PresenceError::ActivityNotFound(activity))?;
        let target_total = inner
            .memberships
            .keys()
            .filter(|(_, theme)| *theme == record.theme)
            .count();
        let learned = record
            .visits
            .iter()
            .map(|v| v.target)
            .collect::<BTreeSet<_>>()
            .len();
        Ok(ActivityProgress {
            target_total,
            learned,
            remaining: target_total.saturating_sub(learned),
        })
    }
}
