use harvest_core::{update, HarvestPlan, HarvestState, Msg};

#[test]
fn flush_ack_before_start_is_noop() {
    let plan = HarvestPlan::new("cat:astro-ph", 10, 5, 5).unwrap();
    let state = HarvestState::new(plan);
    let (next, effects) = update(state.clone(), Msg::BatchFlushed { batch_index: 0 });

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn finished_run_ignores_restart_and_abort() {
    let plan = HarvestPlan::new("cat:astro-ph", 0, 5, 5).unwrap();
    let (finished, _) = update(HarvestState::new(plan), Msg::Start);

    for msg in [Msg::Start, Msg::Abort] {
        let (next, effects) = update(finished.clone(), msg);
        assert_eq!(finished, next);
        assert!(effects.is_empty());
    }
}
