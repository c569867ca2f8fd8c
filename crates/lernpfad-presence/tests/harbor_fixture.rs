use lernpfad_core::event::PresenceEvent;
use lernpfad_core::{ActivityId, ActivityStates, TargetId, TargetStates};
use lernpfad_presence::{ActivityProgress, MemoryMuseum, PresenceError};
use std::path::PathBuf;

fn harbor() -> MemoryMuseum {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/museum/harbor.json");
    MemoryMuseum::load(&path)
        .expect("fixture should parse")
        .expect("fixture should exist")
}

#[test]
fn fixture_activity_keeps_its_history() {
    let museum = harbor();
    let activity = ActivityId(7);

    assert!(museum.is_target_visited(activity, TargetId(1)).expect("visited"));
    assert!(museum.is_target_visited(activity, TargetId(3)).expect("visited"));
    assert!(!museum.is_target_visited(activity, TargetId(2)).expect("visited"));
    assert_eq!(
        museum.progress(activity).expect("progress"),
        ActivityProgress {
            target_total: 4,
            learned: 2,
            remaining: 2
        }
    );
}

#[test]
fn new_activities_do_not_collide_with_loaded_ones() {
    let museum = harbor();
    let theme = museum
        .activity_state(ActivityId(7))
        .expect("lookup")
        .expect("activity 7")
        .theme;
    let fresh = museum.start_activity(theme, false).expect("start");
    assert_eq!(fresh, ActivityId(8));
}

#[test]
fn replayed_events_fill_a_target() {
    let museum = harbor();
    let lines = r#"{"type":"entering","activity":7,"target":2}
{"type":"enter","activity":7,"target":2}"#;
    for line in lines.lines() {
        let event: PresenceEvent = serde_json::from_str(line).expect("event");
        museum.apply(&event).expect("apply");
    }
    let state = museum.target_state(TargetId(2)).expect("lookup").expect("target 2");
    assert_eq!(state.occupancy, 1);

    let err = museum
        .apply(&serde_json::from_str(r#"{"type":"exit","activity":7,"target":4}"#).expect("event"))
        .expect_err("not inside target 4");
    assert!(matches!(err, PresenceError::NotInTarget { .. }));
}
