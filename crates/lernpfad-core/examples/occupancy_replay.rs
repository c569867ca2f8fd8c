use lernpfad_core::event::{PresenceEvent, PresenceKind};
use lernpfad_core::{ActivityId, TargetId};
use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

/// Net occupancy per target, following the enter/exit rules of the
/// presence workflow: only physical visits and reservations hold a place.
#[derive(Default)]
struct Tally {
    occupancy: BTreeMap<TargetId, u32>,
    /// Open visits with their `is_entity` flag.
    inside: BTreeMap<(ActivityId, TargetId), bool>,
    /// Pending reservation per activity.
    reserved: BTreeMap<ActivityId, TargetId>,
}

impl Tally {
    fn adjust(&mut self, target: TargetId, delta: i32) {
        let slot = self.occupancy.entry(target).or_insert(0);
        *slot = slot.saturating_add_signed(delta);
    }

    fn release(&mut self, activity: ActivityId) {
        if let Some(target) = self.reserved.remove(&activity) {
            self.adjust(target, PresenceKind::CancelEntering.occupancy_delta());
        }
    }

    fn apply(&mut self, event: &PresenceEvent) {
        let (activity, target) = (event.activity, event.target);
        match event.kind {
            PresenceKind::Enter => {
                if event.is_entity {
                    self.adjust(target, event.kind.occupancy_delta());
                }
                self.inside.insert((activity, target), event.is_entity);
                self.release(activity);
            }
            PresenceKind::Exit => {
                // leaving a virtual visit frees nothing
                if self.inside.remove(&(activity, target)) == Some(true) {
                    self.adjust(target, event.kind.occupancy_delta());
                }
            }
            PresenceKind::Entering => {
                self.release(activity);
                self.adjust(target, event.kind.occupancy_delta());
                self.reserved.insert(activity, target);
            }
            PresenceKind::CancelEntering => self.release(activity),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1);
    let reader: Box<dyn BufRead> = match path {
        Some(p) => Box::new(BufReader::new(File::open(p)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut tally = Tally::default();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event: PresenceEvent = serde_json::from_str(&line)?;
        tally.apply(&event);
    }

    for (target, count) in tally.occupancy {
        println!("{target}\t{count}");
    }

    Ok(())
}
