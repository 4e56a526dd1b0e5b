use super::*;
use test_log::test;

use crate::table::PaginationMode::{HostFed, Local};

#[test]
fn initial_cutoff_is_one_page() {
    let state = PaginationState::new(25);
    assert_eq!(state.cutoff(), 25);
    assert_eq!(state.visible_len(10), 10);
    assert_eq!(state.visible_len(100), 25);
}

#[test]
fn zero_page_size_is_clamped() {
    let state = PaginationState::new(0);
    assert_eq!(state.page_size(), 1);
    assert_eq!(state.cutoff(), 1);
}

#[test]
fn local_cutoff_grows_monotonically_until_exhausted() {
    let mut state = PaginationState::new(3);
    let working_len = 10;

    let mut cutoffs = vec![state.cutoff()];
    for _ in 0..10 {
        state.on_sentinel_visibility(true, Local, working_len, false);
        cutoffs.push(state.cutoff());
    }

    assert!(cutoffs.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(state.cutoff(), 12);
    assert!(state.cutoff() >= working_len);
}

#[test]
fn local_sentinel_is_idle_once_everything_is_shown() {
    let mut state = PaginationState::new(5);
    assert_eq!(
        state.on_sentinel_visibility(true, Local, 3, false),
        SentinelOutcome::Idle
    );
    assert_eq!(state.cutoff(), 5);
}

#[test]
fn hidden_sentinel_does_nothing() {
    let mut state = PaginationState::new(2);
    assert_eq!(
        state.on_sentinel_visibility(false, Local, 10, false),
        SentinelOutcome::Idle
    );
    assert!(!state.sentinel_visible());
    assert_eq!(state.cutoff(), 2);
}

#[test]
fn visible_sentinel_acts_again_after_rearm() {
    let mut state = PaginationState::new(2);
    // Everything shown, sentinel stays visible: disarmed.
    assert_eq!(
        state.on_sentinel_visibility(true, Local, 2, false),
        SentinelOutcome::Idle
    );
    assert!(state.sentinel_visible());
    assert_eq!(
        state.on_sentinel_visibility(true, Local, 6, false),
        SentinelOutcome::Idle
    );

    // New data arrived.
    state.rearm();
    assert_eq!(
        state.on_sentinel_visibility(true, Local, 6, false),
        SentinelOutcome::Advanced
    );
    assert_eq!(state.cutoff(), 4);
}

#[test]
fn scrolling_away_and_back_rearms() {
    let mut state = PaginationState::new(2);
    state.on_sentinel_visibility(true, Local, 2, false);
    assert_eq!(
        state.on_sentinel_visibility(true, Local, 4, false),
        SentinelOutcome::Idle
    );

    state.on_sentinel_visibility(false, Local, 4, false);
    assert_eq!(
        state.on_sentinel_visibility(true, Local, 4, false),
        SentinelOutcome::Advanced
    );
}

#[test]
fn host_fed_fetches_once_per_delivery() {
    let mut state = PaginationState::new(10);

    assert_eq!(
        state.on_sentinel_visibility(true, HostFed, 10, true),
        SentinelOutcome::FetchMore
    );
    assert!(state.fetch_in_flight());
    assert_eq!(state.cutoff(), 20);

    // Still waiting for the host.
    assert_eq!(
        state.on_sentinel_visibility(true, HostFed, 10, true),
        SentinelOutcome::Idle
    );
    state.on_sentinel_visibility(false, HostFed, 10, true);
    assert_eq!(
        state.on_sentinel_visibility(true, HostFed, 10, true),
        SentinelOutcome::Idle
    );

    state.fetch_completed();
    assert!(!state.fetch_in_flight());
    assert_eq!(
        state.on_sentinel_visibility(true, HostFed, 20, true),
        SentinelOutcome::FetchMore
    );
    assert_eq!(state.cutoff(), 30);
}

#[test]
fn host_fed_without_more_upstream_behaves_locally() {
    let mut state = PaginationState::new(10);
    assert_eq!(
        state.on_sentinel_visibility(true, HostFed, 15, false),
        SentinelOutcome::Advanced
    );
    assert!(!state.fetch_in_flight());
    assert_eq!(
        state.on_sentinel_visibility(true, HostFed, 15, false),
        SentinelOutcome::Idle
    );
}
