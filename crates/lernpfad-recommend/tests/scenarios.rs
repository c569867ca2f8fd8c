//! Scenario tests for the recommendation engine against the in-memory museum.

use lernpfad_core::{ActivityId, TargetId, TargetState, Theme, ThemeId};
use lernpfad_presence::MemoryMuseum;
use lernpfad_recommend::{ErrorClass, PathRecommender, RecommendError};

const T1: ThemeId = ThemeId(1);
const HERE: TargetId = TargetId(100);
/// Root target whose single edge makes `gamma == S + 1 == 2.0`.
const ANCHOR: TargetId = TargetId(50);

fn target(id: u32, capacity: u32, occupancy: u32, saturation: u32, learn_time: u32) -> TargetState {
    TargetState {
        id: TargetId(id),
        capacity,
        occupancy,
        saturation,
        learn_time,
    }
}

/// Museum with theme `T1` and a root edge yielding `gamma = 2.0`:
/// entity `1·(1 − 0 + 1)/(0 + 10) = 0.2`, virtual `1/10 = 0.1`.
fn museum() -> MemoryMuseum {
    let m = MemoryMuseum::new();
    m.add_theme(Theme {
        id: T1,
        name: "Maritime history".into(),
        start_target: ANCHOR,
        learn_time: 90,
    });
    m.add_target(target(50, 10, 0, 1, 10));
    m.add_target(target(100, 10, 0, 1, 10));
    m.add_edge(TargetId::ROOT, ANCHOR, 0);
    m.set_membership(ANCHOR, T1, 1);
    m
}

fn link(m: &MemoryMuseum, state: TargetState, move_time: u32, weight: u32) {
    m.add_target(state);
    m.add_edge(HERE, state.id, move_time);
    m.set_membership(state.id, T1, weight);
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn recommend(m: &MemoryMuseum, activity: ActivityId) -> Vec<lernpfad_core::RecommendationCandidate> {
    PathRecommender::new(m, m, m)
        .recommend(HERE, activity)
        .expect("recommendation should succeed")
}

#[test]
fn gamma_is_finite_and_positive() {
    let m = museum();
    let gamma = PathRecommender::new(&m, &m, &m)
        .normalization_parameter(T1)
        .expect("gamma");
    assert!(gamma.is_finite() && gamma > 0.0);
    assert!(close(gamma, 2.0));
}

#[test]
fn full_target_becomes_virtual_candidate() {
    let m = museum();
    link(&m, target(1, 5, 5, 2, 10), 3, 4);
    let activity = m.start_activity(T1, true).expect("activity");

    let list = recommend(&m, activity);
    assert_eq!(list.len(), 1);
    let a = list[0];
    assert_eq!(a.next_target, TargetId(1));
    assert!(!a.is_entity);
    assert!(close(a.path_cost, 0.0));
    assert!(close(a.virtual_cost, 0.4));
}

#[test]
fn full_target_dropped_without_virtual_fallback() {
    let m = museum();
    link(&m, target(1, 5, 5, 2, 10), 3, 4);
    let activity = m.start_activity(T1, false).expect("activity");

    assert!(recommend(&m, activity).is_empty());
}

#[test]
fn open_target_becomes_entity_candidate() {
    let m = museum();
    link(&m, target(2, 5, 2, 3, 5), 4, 6);
    let activity = m.start_activity(T1, false).expect("activity");

    let list = recommend(&m, activity);
    assert_eq!(list.len(), 1);
    let b = list[0];
    assert_eq!(b.next_target, TargetId(2));
    assert!(b.is_entity);
    assert!(close(b.path_cost, 2.4));
    assert!(close(b.virtual_cost, 1.2));
}

#[test]
fn visited_targets_never_reappear() {
    let m = museum();
    link(&m, target(1, 5, 5, 2, 10), 3, 4);
    link(&m, target(2, 5, 2, 3, 5), 4, 6);
    let activity = m.start_activity(T1, true).expect("activity");

    m.enter_target(activity, TargetId(1), false).expect("enter");
    m.exit_target(activity, TargetId(1)).expect("exit");
    m.enter_target(activity, TargetId(2), true).expect("enter");

    assert!(recommend(&m, activity).is_empty());
}

#[test]
fn ranking_is_descending_by_path_cost() {
    let m = museum();
    link(&m, target(1, 5, 5, 2, 10), 3, 4);
    link(&m, target(2, 5, 2, 3, 5), 4, 6);
    link(&m, target(3, 5, 0, 1, 10), 10, 1);
    link(&m, target(4, 5, 4, 4, 2), 1, 9);
    let activity = m.start_activity(T1, true).expect("activity");

    let list = recommend(&m, activity);
    assert_eq!(list.len(), 4);
    assert!(list.windows(2).all(|w| w[0].path_cost >= w[1].path_cost));
    assert_eq!(list.last().map(|c| c.next_target), Some(TargetId(1)));
}

#[test]
fn repeated_calls_are_identical() {
    let m = museum();
    link(&m, target(1, 5, 5, 2, 10), 3, 4);
    link(&m, target(2, 5, 2, 3, 5), 4, 6);
    link(&m, target(3, 5, 2, 3, 5), 4, 6);
    let activity = m.start_activity(T1, true).expect("activity");

    let first = recommend(&m, activity);
    let second = recommend(&m, activity);
    assert_eq!(first, second);
    // equal costs keep edge order
    let ids: Vec<u32> = first.iter().map(|c| c.next_target.0).collect();
    assert_eq!(ids, vec![2, 3, 1]);
}

#[test]
fn occupancy_changes_move_a_target_to_virtual() {
    let m = museum();
    link(&m, target(2, 2, 1, 3, 5), 4, 6);
    let watcher = m.start_activity(T1, true).expect("activity");
    let visitor = m.start_activity(T1, true).expect("activity");

    assert!(recommend(&m, watcher)[0].is_entity);

    m.enter_target(visitor, TargetId(2), true).expect("enter");
    let list = recommend(&m, watcher);
    assert!(!list[0].is_entity);
    assert!(close(list[0].path_cost, 0.0));

    m.exit_target(visitor, TargetId(2)).expect("exit");
    assert!(recommend(&m, watcher)[0].is_entity);
}

#[test]
fn no_outgoing_edges_is_empty() {
    let m = museum();
    let activity = m.start_activity(T1, false).expect("activity");
    let list = PathRecommender::new(&m, &m, &m)
        .recommend(TargetId(50), activity)
        .expect("recommendation");
    assert!(list.is_empty());
}

#[test]
fn unknown_activity_is_not_found() {
    let m = museum();
    let err = PathRecommender::new(&m, &m, &m)
        .recommend(HERE, ActivityId(4242))
        .expect_err("activity does not exist");
    assert!(matches!(err, RecommendError::ActivityNotFound(_)));
    assert_eq!(err.class(), ErrorClass::NotFound);
}

#[test]
fn zero_learn_time_is_invalid_configuration() {
    let m = museum();
    link(&m, target(7, 5, 0, 2, 0), 1, 3);
    let activity = m.start_activity(T1, false).expect("activity");
    let err = PathRecommender::new(&m, &m, &m)
        .recommend(HERE, activity)
        .expect_err("learn time zero");
    assert!(matches!(err, RecommendError::ZeroLearnTime(t) if t == TargetId(7)));
    assert_eq!(err.class(), ErrorClass::InvalidConfiguration);
}

#[test]
fn theme_without_root_weight_is_invalid_configuration() {
    let m = museum();
    m.add_theme(Theme {
        id: ThemeId(2),
        name: "Empty".into(),
        start_target: ANCHOR,
        learn_time: 10,
    });
    let activity = m.start_activity(ThemeId(2), true).expect("activity");
    let err = PathRecommender::new(&m, &m, &m)
        .recommend(HERE, activity)
        .expect_err("no virtual weight");
    assert!(matches!(err, RecommendError::ZeroVirtualWeight(t) if t == ThemeId(2)));
}
