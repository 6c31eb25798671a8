use std::sync::Once;

use harvest_core::{
    update, Effect, HarvestPlan, HarvestState, Msg, Page, PlannedWindow, Record, RunPhase,
    Window,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn full_page(window: Window) -> Page {
    let records = (window.offset..window.end())
        .map(|n| Record {
            id: n.to_string(),
            ..Record::default()
        })
        .collect();
    Page::new(records, window.size)
}

fn fetched_window(effects: &[Effect]) -> Option<PlannedWindow> {
    effects.iter().find_map(|effect| match effect {
        Effect::FetchWindow(planned) => Some(*planned),
        _ => None,
    })
}

#[test]
fn start_requests_first_window() {
    init_logging();
    let plan = HarvestPlan::new("cat:astro-ph", 4, 1, 2).unwrap();
    let (state, effects) = update(HarvestState::new(plan), Msg::Start);

    assert_eq!(
        state.phase(),
        RunPhase::Fetching {
            batch_index: 0,
            page_index: 0
        }
    );
    assert_eq!(
        effects,
        vec![Effect::FetchWindow(PlannedWindow {
            batch_index: 0,
            page_index: 0,
            window: Window::new(0, 1),
        })]
    );
}

#[test]
fn start_with_empty_plan_finishes_immediately() {
    init_logging();
    let plan = HarvestPlan::new("cat:astro-ph", 1, 1, 2).unwrap();
    let (state, effects) = update(HarvestState::new(plan), Msg::Start);

    assert_eq!(state.phase(), RunPhase::Finished);
    assert_eq!(effects, vec![Effect::Finish]);
}

#[test]
fn page_within_batch_paces_then_fetches_next() {
    init_logging();
    let plan = HarvestPlan::new("q", 4, 2, 4).unwrap();
    let (state, effects) = update(HarvestState::new(plan), Msg::Start);
    let first = fetched_window(&effects).unwrap();

    let (state, effects) = update(state, Msg::PageFetched(full_page(first.window)));
    assert_eq!(state.buffered_records(), 2);
    assert_eq!(
        effects,
        vec![
            Effect::Pace,
            Effect::FetchWindow(PlannedWindow {
                batch_index: 0,
                page_index: 1,
                window: Window::new(2, 2),
            }),
        ]
    );
}

#[test]
fn full_batch_flushes_drained_batch_then_paces() {
    init_logging();
    let plan = HarvestPlan::new("q", 4, 1, 2).unwrap();
    let (state, effects) = update(HarvestState::new(plan), Msg::Start);
    let w0 = fetched_window(&effects).unwrap();
    let (state, effects) = update(state, Msg::PageFetched(full_page(w0.window)));
    let w1 = fetched_window(&effects).unwrap();
    let (state, effects) = update(state, Msg::PageFetched(full_page(w1.window)));

    assert_eq!(state.phase(), RunPhase::Flushing { batch_index: 0 });
    assert_eq!(state.buffered_records(), 0);
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[1], Effect::Pace);
    match &effects[0] {
        Effect::FlushBatch { batch_index, batch } => {
            assert_eq!(*batch_index, 0);
            assert_eq!(batch.id, vec!["0".to_string(), "1".to_string()]);
        }
        other => panic!("expected flush, got {other:?}"),
    }
}

#[test]
fn flush_moves_to_next_batch_and_finishes_after_last() {
    init_logging();
    let plan = HarvestPlan::new("q", 2, 1, 1).unwrap();
    let (state, effects) = update(HarvestState::new(plan), Msg::Start);
    let w0 = fetched_window(&effects).unwrap();
    let (state, _) = update(state, Msg::PageFetched(full_page(w0.window)));
    let (state, effects) = update(state, Msg::BatchFlushed { batch_index: 0 });

    assert_eq!(state.last_flushed(), Some(0));
    let w1 = fetched_window(&effects).unwrap();
    assert_eq!(w1.batch_index, 1);
    assert_eq!(w1.window.offset, 1);

    let (state, _) = update(state, Msg::PageFetched(full_page(w1.window)));
    let (state, effects) = update(state, Msg::BatchFlushed { batch_index: 1 });
    assert_eq!(state.phase(), RunPhase::Finished);
    assert_eq!(effects, vec![Effect::Finish]);
    assert_eq!(state.batches_flushed(), 2);
    assert_eq!(state.pages_fetched(), 2);
}

#[test]
fn flush_ack_for_wrong_batch_is_ignored() {
    init_logging();
    let plan = HarvestPlan::new("q", 2, 1, 1).unwrap();
    let (state, effects) = update(HarvestState::new(plan), Msg::Start);
    let w0 = fetched_window(&effects).unwrap();
    let (state, _) = update(state, Msg::PageFetched(full_page(w0.window)));
    let (state, effects) = update(state, Msg::BatchFlushed { batch_index: 5 });

    assert!(effects.is_empty());
    assert_eq!(state.phase(), RunPhase::Flushing { batch_index: 0 });
    assert_eq!(state.last_flushed(), None);
}

#[test]
fn abort_discards_partial_batch() {
    init_logging();
    let plan = HarvestPlan::new("q", 4, 1, 2).unwrap();
    let (state, effects) = update(HarvestState::new(plan), Msg::Start);
    let w0 = fetched_window(&effects).unwrap();
    let (state, _) = update(state, Msg::PageFetched(full_page(w0.window)));
    assert_eq!(state.buffered_records(), 1);

    let (state, effects) = update(state, Msg::Abort);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), RunPhase::Aborted);
    assert_eq!(state.buffered_records(), 0);
    assert_eq!(state.last_flushed(), None);

    let (state, effects) = update(state, Msg::Start);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), RunPhase::Aborted);
}

#[test]
fn incomplete_page_is_rejected_and_aborts() {
    init_logging();
    let plan = HarvestPlan::new("q", 4, 2, 4).unwrap();
    let (state, _) = update(HarvestState::new(plan), Msg::Start);
    let short = Page::new(vec![Record::default()], 2);
    let (state, effects) = update(state, Msg::PageFetched(short));

    assert_eq!(state.phase(), RunPhase::Aborted);
    assert!(matches!(effects.as_slice(), [Effect::Reject(_)]));
}

#[test]
fn resumed_state_starts_at_given_batch() {
    init_logging();
    let plan = HarvestPlan::new("q", 8, 2, 4).unwrap();
    let state = HarvestState::resume_from(plan, 1);
    assert_eq!(state.last_flushed(), Some(0));

    let (_state, effects) = update(state, Msg::Start);
    let first = fetched_window(&effects).unwrap();
    assert_eq!(first.batch_index, 1);
    assert_eq!(first.window, Window::new(4, 2));
}

#[test]
fn page_outside_fetching_is_ignored() {
    let plan = HarvestPlan::new("q", 4, 1, 2).unwrap();
    let state = HarvestState::new(plan);
    let (next, effects) = update(state.clone(), Msg::PageFetched(full_page(Window::new(0, 1))));

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
