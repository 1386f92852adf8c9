mod common;
use common::{Recorder, n, recording_registry};
use notifying::{error::*, *};

#[test]
fn nested_paths_join_keys_from_the_outermost_ancestor() {
    let (registry, recorder) = recording_registry();
    let _sibling = ScalarCell::<i32>::new(registry.root(), "leaf");
    let root = Composite::new(registry.root(), "root");
    let _before = ScalarCell::<i32>::new(root.scope(), "before");
    let mid = Composite::new(root.scope(), "mid");
    let _other = ScalarCell::<i32>::new(mid.scope(), "other");
    let leaf = ScalarCell::<i32>::new(mid.scope(), "leaf");

    leaf.set(1);
    assert_eq!(recorder.take(), [n("root.mid.leaf", "1")]);
    assert_eq!(registry.path(leaf.node_id()).to_string(), "root.mid.leaf");
    assert_eq!(registry.resolve(&"root.mid.leaf".into()), Some(leaf.node_id()));
}

#[test]
fn composites_never_notify_themselves() {
    let (registry, recorder) = recording_registry();
    let s1 = Composite::new(registry.root(), "s1");
    let d1 = ScalarCell::with_value(s1.scope(), "d1", 1.0f64);
    let af1 = ArrayCell::<f32, 2>::new(s1.scope(), "af1");
    let inner = Composite::new(s1.scope(), "inner");
    let _flag = ScalarCell::<bool>::new(inner.scope(), "flag");

    s1.send_update();
    inner.send_update();
    assert!(recorder.take().is_empty());

    registry.notify_all();
    assert_eq!(recorder.take(), [n("s1.d1", "1"), n("s1.af1", "[0 0 ]"), n("s1.inner.flag", "false")]);

    // only the leaves below `inner`
    inner.notify_all();
    assert_eq!(recorder.take(), [n("s1.inner.flag", "false")]);

    assert_eq!(s1.children(), [d1.node_id(), af1.node_id(), inner.node_id()]);
    assert_eq!(s1.to_string(), "<Struct s1 updated>");
}

#[test]
fn composites_reject_text_updates() {
    let (registry, _recorder) = recording_registry();
    let s1 = Composite::new(registry.root(), "s1");

    let err = registry.update("s1", "anything").unwrap_err();
    assert_eq!(err, UpdateError::Unsupported { path: "s1".into() });
    assert!(s1.apply_text_update("anything").is_err());
}

#[test]
fn unknown_path_reports_not_found_and_mutates_nothing() {
    let (registry, recorder) = recording_registry();
    let i1 = ScalarCell::with_value(registry.root(), "i1", 3i32);

    assert_eq!(registry.update("k", "text"), Ok(false));
    assert_eq!(registry.update("i1.x", "5"), Ok(false));
    assert_eq!(registry.update("", "5"), Ok(false));
    assert_eq!(registry.update_by_key("k", "text"), Ok(false));
    assert_eq!(i1.get(), 3);
    assert!(recorder.take().is_empty());
}

#[test]
fn update_by_path_distinguishes_same_named_fields() {
    let (registry, recorder) = recording_registry();
    let i1 = ScalarCell::<i32>::new(registry.root(), "i1");
    let s1 = Composite::new(registry.root(), "s1");
    let nested = ScalarCell::<i32>::new(s1.scope(), "i1");

    assert!(registry.update("s1.i1", "5").unwrap());
    assert_eq!((i1.get(), nested.get()), (0, 5));

    assert!(registry.update("i1", "45").unwrap());
    assert_eq!((i1.get(), nested.get()), (45, 5));
    assert!(recorder.take().is_empty());
}

#[test]
fn update_by_key_takes_the_first_registered_match() {
    let (registry, _recorder) = recording_registry();
    let s1 = Composite::new(registry.root(), "s1");
    let nested = ScalarCell::<i32>::new(s1.scope(), "i1");
    let top = ScalarCell::<i32>::new(registry.root(), "i1");

    assert!(registry.update_by_key("i1", "9").unwrap());
    assert_eq!((nested.get(), top.get()), (9, 0));
}

#[test]
fn update_by_key_reaches_array_elements_by_index() {
    let (registry, _recorder) = recording_registry();
    let a2 = ArrayCell::<u32, 2>::new(registry.root(), "a2");
    let af1 = ArrayCell::<f32, 2>::new(registry.root(), "af1");
    let zero = ScalarCell::<u32>::new(registry.root(), "0");

    // element keys are indices, so the first array's element wins
    assert!(registry.update_by_key("0", "7").unwrap());
    assert_eq!((a2.values(), af1.values(), zero.get()), ([7, 0], [0.0, 0.0], 0));

    // the full path keeps them apart
    assert!(registry.update("0", "3").unwrap());
    assert!(registry.update("af1.0", "1.5").unwrap());
    assert_eq!((a2.values(), af1.values(), zero.get()), ([7, 0], [1.5, 0.0], 3));
}

#[test]
fn keys_containing_dots_are_still_addressable() {
    let (registry, recorder) = recording_registry();
    let s1 = Composite::new(registry.root(), "s1");
    let dotted = ScalarCell::<i32>::new(s1.scope(), "a.b");
    let top = ScalarCell::<i32>::new(registry.root(), "x.y");

    dotted.set(1);
    assert_eq!(recorder.take(), [n("s1.a.b", "1")]);

    assert!(registry.update("s1.a.b", "5").unwrap());
    assert!(registry.update("x.y", "6").unwrap());
    assert_eq!((dotted.get(), top.get()), (5, 6));
    assert_eq!(registry.resolve(&"s1.a.b".into()), Some(dotted.node_id()));
    assert_eq!(registry.update("s1.a", "1"), Ok(false));
}

#[test]
fn single_segment_keys_win_over_dotted_ones() {
    let (registry, _recorder) = recording_registry();
    let dotted = ScalarCell::<i32>::new(registry.root(), "a.b");
    let a = Composite::new(registry.root(), "a");
    let b = ScalarCell::<i32>::new(a.scope(), "b");

    assert!(registry.update("a.b", "2").unwrap());
    assert_eq!((dotted.get(), b.get()), (0, 2));
}

#[test]
fn duplicate_siblings_resolve_to_the_earliest() {
    let (registry, recorder) = recording_registry();
    let first = ScalarCell::<i32>::new(registry.root(), "dup");
    let second = ScalarCell::<i32>::new(registry.root(), "dup");

    assert_eq!(registry.len(), 2);
    assert!(registry.update("dup", "4").unwrap());
    assert_eq!((first.get(), second.get()), (4, 0));

    // both still notify under the same path
    second.set(1);
    assert_eq!(recorder.take(), [n("dup", "1")]);
}

#[test]
fn set_listener_redirects_later_notifications() {
    let (registry, first) = recording_registry();
    let i1 = ScalarCell::<i32>::new(registry.root(), "i1");
    i1.set(1);

    let second = Recorder::default();
    registry.set_listener(second.clone());
    i1.set(2);

    assert_eq!(first.take(), [n("i1", "1")]);
    assert_eq!(second.take(), [n("i1", "2")]);
}

#[test]
fn dropped_cells_are_skipped() {
    let (registry, recorder) = recording_registry();
    let kept = ScalarCell::<i32>::new(registry.root(), "kept");
    {
        let _gone = ScalarCell::<i32>::new(registry.root(), "gone");
    }

    registry.notify_all();
    assert_eq!(recorder.take(), [n("kept", "0")]);
    assert_eq!(registry.update("gone", "1"), Ok(false));
    // registration is never pruned
    assert_eq!(registry.len(), 2);
    assert!(registry.observable(kept.node_id()).is_some());
}

#[test]
fn registries_are_independent() {
    let (left, left_seen) = recording_registry();
    let (right, right_seen) = recording_registry();
    let a = ScalarCell::<i32>::new(left.root(), "x");
    let _b = ScalarCell::<i32>::new(right.root(), "x");

    a.set(1);
    assert!(right.update("x", "2").unwrap());
    assert_eq!(a.get(), 1);
    assert_eq!(left_seen.take(), [n("x", "1")]);
    assert!(right_seen.take().is_empty());
}

#[test]
fn closure_listeners_and_reentrant_reads() {
    use std::sync::{Arc, Mutex};

    let seen = Arc::new(Mutex::new(Vec::new()));
    let registry = {
        let seen = seen.clone();
        Registry::with_listener(move |path: &KeyPath, value: &str| seen.lock().unwrap().push(format!("{path}={value}")))
    };
    let counter = ScalarCell::<u32>::new(registry.root(), "counter");
    let mirror = ScalarCell::<u32>::new(registry.root(), "mirror");

    // a listener that reads the registry and cells while being notified must not deadlock
    let watcher = {
        let registry = registry.clone();
        let mirror = mirror.clone();
        let seen = seen.clone();
        move |path: &KeyPath, value: &str| {
            seen.lock().unwrap().push(format!("{path}={value}"));
            if path == "counter" {
                let _ = registry.len();
                seen.lock().unwrap().push(format!("mirror={}", mirror.get()));
            }
        }
    };
    counter.set(1);
    registry.set_listener(watcher);
    counter.set(2);

    assert_eq!(*seen.lock().unwrap(), ["counter=1", "counter=2", "mirror=0"]);
}

#[test]
fn registration_order_matches_construction_order() {
    let (registry, _recorder) = recording_registry();
    assert!(registry.is_empty());
    let s1 = Composite::new(registry.root(), "s1");
    let i1 = ScalarCell::<i32>::new(s1.scope(), "i1");

    assert!(s1.node_id() < i1.node_id());
    assert_eq!(registry.key(i1.node_id()).as_deref(), Some("i1"));
    assert_eq!(registry.parent(i1.node_id()), Some(s1.node_id()));
    assert_eq!(registry.children(s1.node_id()), [i1.node_id()]);
}
