use framelord_core::{
    FrameScanReport, FrameScanReportPatch, FrameScanStore, Listener, NewRecord, RecordPatch,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counter() -> (Arc<AtomicUsize>, Listener) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let listener: Listener = Arc::new(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (calls, listener)
}

fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

#[test]
fn each_listener_fires_once_per_add() {
    let store = FrameScanStore::new();
    let counters: Vec<Arc<AtomicUsize>> = (0..5)
        .map(|_| {
            let (calls, listener) = counter();
            let _ = store.subscribe(listener);
            calls
        })
        .collect();

    store.add(NewRecord::new(FrameScanReport::default()));

    assert!(counters.iter().all(|calls| count(calls) == 1));
}

#[test]
fn unsubscribed_listener_stops_receiving() {
    let store = FrameScanStore::new();
    let (first_calls, first) = counter();
    let (second_calls, second) = counter();
    let first_sub = store.subscribe(first);
    let _second_sub = store.subscribe(second);

    store.add(NewRecord::new(FrameScanReport::default()));
    assert_eq!((count(&first_calls), count(&second_calls)), (1, 1));

    first_sub.unsubscribe();
    first_sub.unsubscribe();
    store.add(NewRecord::new(FrameScanReport::default()));
    assert_eq!((count(&first_calls), count(&second_calls)), (1, 2));
    assert_eq!(store.listener_count(), 1);
}

#[test]
fn back_to_back_mutations_deliver_separate_rounds() {
    let store = FrameScanStore::new();
    let (calls, listener) = counter();
    let _sub = store.subscribe(listener);

    let record = store.add(NewRecord::new(FrameScanReport::default()));
    store.update(
        record.id.as_str(),
        RecordPatch::payload(FrameScanReportPatch {
            score: Some(5),
            ..FrameScanReportPatch::default()
        }),
    );
    store.delete(record.id.as_str());

    assert_eq!(count(&calls), 3);
}

#[test]
fn no_op_mutations_do_not_notify() {
    let store = FrameScanStore::new();
    let (calls, listener) = counter();
    let _sub = store.subscribe(listener);

    assert!(store
        .update("missing", RecordPatch::payload(FrameScanReportPatch::default()))
        .is_none());
    assert!(!store.delete("missing"));
    assert!(store.import_json("{not json").is_err());

    assert_eq!(count(&calls), 0);
}

#[test]
fn clear_always_notifies() {
    let store = FrameScanStore::new();
    let (calls, listener) = counter();
    let _sub = store.subscribe(listener);

    store.clear();
    store.clear();

    assert_eq!(count(&calls), 2);
}

#[test]
fn same_listener_twice_is_delivered_once() {
    let store = FrameScanStore::new();
    let (calls, listener) = counter();
    let _a = store.subscribe(Arc::clone(&listener));
    let _b = store.subscribe(listener);

    store.add(NewRecord::new(FrameScanReport::default()));

    assert_eq!(count(&calls), 1);
    assert_eq!(store.listener_count(), 1);
}

#[test]
fn panicking_listener_does_not_suppress_others() {
    let store = FrameScanStore::new();
    let (before_calls, before) = counter();
    let (after_calls, after) = counter();
    let _before = store.subscribe(before);
    let _bad = store.subscribe_fn(|| panic!("subscriber bug"));
    let _after = store.subscribe(after);

    let record = store.add(NewRecord::new(FrameScanReport::default()));

    assert_eq!(count(&before_calls), 1);
    assert_eq!(count(&after_calls), 1);
    assert!(store.get_by_id(record.id.as_str()).is_some());
}

#[test]
fn listener_may_unsubscribe_itself_during_delivery() {
    use std::sync::Mutex;

    let store = Arc::new(FrameScanStore::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<framelord_core::Subscription>>> = Arc::new(Mutex::new(None));

    let seen = Arc::clone(&calls);
    let own_slot = Arc::clone(&slot);
    let subscription = store.subscribe_fn(move || {
        seen.fetch_add(1, Ordering::SeqCst);
        if let Some(sub) = own_slot.lock().unwrap().as_ref() {
            sub.unsubscribe();
        }
    });
    *slot.lock().unwrap() = Some(subscription);

    store.add(NewRecord::new(FrameScanReport::default()));
    store.add(NewRecord::new(FrameScanReport::default()));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.listener_count(), 0);
}
