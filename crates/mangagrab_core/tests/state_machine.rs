use mangagrab_core::{transition, ChapterEvent, ChapterState};

fn run(events: &[ChapterEvent]) -> ChapterState {
    events.iter().fold(ChapterState::default(), |state, event| {
        transition(state, *event).expect("valid transition")
    })
}

#[test]
fn happy_path_ends_published() {
    let state = run(&[
        ChapterEvent::StartFetch,
        ChapterEvent::FetchFinished,
        ChapterEvent::Publish,
    ]);
    assert_eq!(state, ChapterState::Published);
    assert!(state.is_terminal());
}

#[test]
fn existing_archive_skips_before_fetch_or_at_assembly() {
    assert_eq!(run(&[ChapterEvent::AlreadyPresent]), ChapterState::Skipped);

    // Another writer published the archive while pages were in flight.
    let state = run(&[
        ChapterEvent::StartFetch,
        ChapterEvent::FetchFinished,
        ChapterEvent::AlreadyPresent,
    ]);
    assert_eq!(state, ChapterState::Skipped);

    let err = transition(ChapterState::Fetching, ChapterEvent::AlreadyPresent).unwrap_err();
    assert_eq!(err.from, ChapterState::Fetching);
}

#[test]
fn failure_is_accepted_from_every_active_state() {
    for state in [
        ChapterState::Pending,
        ChapterState::Fetching,
        ChapterState::Assembling,
    ] {
        assert_eq!(
            transition(state, ChapterEvent::Fail).unwrap(),
            ChapterState::Failed
        );
    }
}

#[test]
fn terminal_states_reject_further_events() {
    for state in [
        ChapterState::Published,
        ChapterState::Skipped,
        ChapterState::Failed,
    ] {
        assert!(transition(state, ChapterEvent::Fail).is_err());
        assert!(transition(state, ChapterEvent::StartFetch).is_err());
    }
}

#[test]
fn publish_requires_assembling() {
    assert!(transition(ChapterState::Fetching, ChapterEvent::Publish).is_err());
    assert!(transition(ChapterState::Pending, ChapterEvent::FetchFinished).is_err());
}
