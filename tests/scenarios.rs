//! End-to-end rendering scenarios against the in-memory host.

use std::cell::Cell;
use std::rc::Rc;

use spark_fiber::engine::descendants;
use spark_fiber::{
    Attributes, Callback, Component, Element, Error, Event, HookError, MemoryHost, Mutation,
    NodeId, Renderer, UnitBudget, Value, WorkStatus, attrs, build, text,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn el(kind: &str) -> Element {
    build(kind, Attributes::new(), Vec::<Element>::new())
}

fn greeting(second: &str) -> Element {
    build("div", Attributes::new(), [
        build("h1", Attributes::new(), ["Hello"]),
        build(second, Attributes::new(), ["World"]),
    ])
}

fn mounted(element: Element) -> (Renderer<MemoryHost>, NodeId) {
    init_tracing();
    let host = MemoryHost::new();
    let container = host.container();
    let mut renderer = Renderer::new(host);
    renderer.render(element, container);
    renderer.flush().unwrap();
    (renderer, container)
}

fn count(mutations: &[Mutation], pred: impl Fn(&Mutation) -> bool) -> usize {
    mutations.iter().filter(|m| pred(m)).count()
}

/// Live fibers equal the committed tree: nothing leaks across generations.
fn assert_arena_holds_current_tree(renderer: &Renderer<MemoryHost>) {
    let root = renderer.current_root().unwrap();
    let tree = descendants(&renderer.context().arena, root).len() + 1;
    assert_eq!(renderer.fiber_count(), tree);
}

// =============================================================================
// Initial render and re-render
// =============================================================================

#[test]
fn test_initial_render_builds_host_tree() {
    let (renderer, container) = mounted(greeting("h2"));
    let host = renderer.host();

    assert_eq!(host.markup(container), "<div><h1>Hello</h1><h2>World</h2></div>");
    let log = host.mutations();
    assert_eq!(count(log, |m| matches!(m, Mutation::Create { .. })), 5);
    assert_eq!(count(log, |m| matches!(m, Mutation::Insert { .. })), 5);
    assert_eq!(count(log, |m| matches!(m, Mutation::SetAttribute { .. })), 2);
    assert_eq!(count(log, |m| matches!(m, Mutation::Remove { .. })), 0);

    let summary = renderer.last_commit().unwrap();
    assert_eq!(summary.placed, 5);
    assert_eq!(summary.deleted, 0);
    assert_arena_holds_current_tree(&renderer);
}

#[test]
fn test_identical_rerender_touches_nothing() {
    let (mut renderer, container) = mounted(greeting("h2"));
    renderer.host_mut().take_mutations();

    renderer.render(greeting("h2"), container);
    renderer.flush().unwrap();

    assert!(renderer.host().mutations().is_empty());
    let summary = renderer.last_commit().unwrap();
    assert!(summary.is_noop());
    assert_eq!(summary.updated, 5);
}

#[test]
fn test_update_keeps_host_nodes() {
    let (mut renderer, container) = mounted(greeting("h2"));
    let h1 = renderer.host().find("h1").unwrap();
    let nodes = renderer.host().node_count();

    let changed = build("div", attrs([("id", "app")]), [
        build("h1", Attributes::new(), ["Hi"]),
        build("h2", Attributes::new(), ["World"]),
    ]);
    renderer.render(changed, container);
    renderer.flush().unwrap();

    assert_eq!(renderer.host().find("h1"), Some(h1));
    assert_eq!(renderer.host().node_count(), nodes);
    assert_eq!(
        renderer.host().markup(container),
        "<div id=\"app\"><h1>Hi</h1><h2>World</h2></div>"
    );
    assert_arena_holds_current_tree(&renderer);
}

#[test]
fn test_replacing_kind_removes_before_inserting() {
    let (mut renderer, container) = mounted(greeting("h2"));
    let div = renderer.host().find("div").unwrap();
    let h2 = renderer.host().find("h2").unwrap();
    renderer.host_mut().take_mutations();

    renderer.render(greeting("p"), container);
    renderer.flush().unwrap();

    let log = renderer.host_mut().take_mutations();
    let p = renderer.host().find("p").unwrap();
    let removed = log
        .iter()
        .position(|m| *m == Mutation::Remove { parent: div, child: h2 })
        .unwrap();
    let inserted = log
        .iter()
        .position(|m| matches!(m, Mutation::Insert { child, .. } if *child == p))
        .unwrap();
    assert!(removed < inserted);
    assert_eq!(renderer.host().markup(container), "<div><h1>Hello</h1><p>World</p></div>");
    assert_eq!(renderer.last_commit().unwrap().deleted, 1);
    assert_arena_holds_current_tree(&renderer);
}

#[test]
fn test_placed_node_goes_before_kept_sibling() {
    let (mut renderer, container) = mounted(build("div", Attributes::new(), [el("h1"), el("h2")]));
    let h2 = renderer.host().find("h2").unwrap();
    renderer.host_mut().take_mutations();

    renderer.render(build("div", Attributes::new(), [el("p"), el("h2")]), container);
    renderer.flush().unwrap();

    let p = renderer.host().find("p").unwrap();
    assert!(renderer.host().mutations().iter().any(|m| matches!(
        m,
        Mutation::Insert { child, before: Some(anchor), .. } if *child == p && *anchor == h2
    )));
    assert_eq!(renderer.host().markup(container), "<div><p></p><h2></h2></div>");
}

#[test]
fn test_removing_component_removes_its_host_nodes() {
    let inner = Component::new("Inner", |_, _| build("p", Attributes::new(), ["inner"]));
    let outer = {
        let inner = inner.clone();
        Component::new("Outer", move |_, _| {
            build(&inner, Attributes::new(), Vec::<Element>::new())
        })
    };
    let app = build("div", Attributes::new(), [
        build(&outer, Attributes::new(), Vec::<Element>::new()),
    ]);
    let (mut renderer, container) = mounted(app);
    let div = renderer.host().find("div").unwrap();
    let p = renderer.host().find("p").unwrap();
    assert_eq!(renderer.host().markup(container), "<div><p>inner</p></div>");
    renderer.host_mut().take_mutations();

    renderer.render(build("div", Attributes::new(), [el("h1")]), container);
    renderer.flush().unwrap();

    assert!(renderer.host().mutations().contains(&Mutation::Remove { parent: div, child: p }));
    assert_eq!(renderer.host().markup(container), "<div><h1></h1></div>");
    assert_arena_holds_current_tree(&renderer);
}

// =============================================================================
// State
// =============================================================================

/// `button(onClick: +1) > count`, counting evaluations.
fn counter(evaluations: Rc<Cell<usize>>) -> Component {
    Component::new("Counter", move |hooks, _| {
        evaluations.set(evaluations.get() + 1);
        let (count, set_count) = hooks.use_state(1_i64);
        let on_click = Callback::new(move |_| set_count.update(|c| c + 1));
        build("button", attrs([("onClick", Value::Handler(on_click))]), [count])
    })
}

fn click(renderer: &Renderer<MemoryHost>) {
    let button = renderer.host().find("button").unwrap();
    assert_eq!(renderer.host().dispatch(button, &Event::new("click")), 1);
}

#[test]
fn test_queued_updates_apply_in_order() {
    let counter = counter(Rc::new(Cell::new(0)));
    let app = build(&counter, Attributes::new(), Vec::<Element>::new());
    let (mut renderer, container) = mounted(app);
    assert_eq!(renderer.host().text_content(container), "1");

    click(&renderer);
    click(&renderer);
    assert_eq!(renderer.status(), WorkStatus::Yielded);
    renderer.flush().unwrap();

    assert_eq!(renderer.host().text_content(container), "3");
    assert_eq!(renderer.commits(), 2);
    // The fresh handler replaced the old one
    click(&renderer);
    renderer.flush().unwrap();
    assert_eq!(renderer.host().text_content(container), "4");
    assert_arena_holds_current_tree(&renderer);
}

#[test]
fn test_state_update_abandons_generation_in_progress() {
    let evaluations = Rc::new(Cell::new(0));
    let counter = counter(evaluations.clone());
    let app = build("div", Attributes::new(), [
        build(&counter, Attributes::new(), Vec::<Element>::new()),
        build("footer", Attributes::new(), ["end"]),
    ]);
    let (mut renderer, container) = mounted(app);
    assert_eq!(evaluations.get(), 1);

    click(&renderer);
    // root, div, Counter
    assert_eq!(renderer.resume(UnitBudget::new(3)).unwrap(), WorkStatus::Yielded);
    assert_eq!(evaluations.get(), 2);
    assert_eq!(renderer.commits(), 1);

    // The committed handler still belongs to the current tree
    click(&renderer);
    renderer.flush().unwrap();

    assert_eq!(evaluations.get(), 3);
    assert_eq!(renderer.commits(), 2);
    assert_eq!(renderer.generation(), 3);
    assert_eq!(renderer.host().text_content(container), "3end");
    assert_arena_holds_current_tree(&renderer);
}

#[test]
fn test_changing_slot_count_is_reported() {
    let extra = Rc::new(Cell::new(false));
    let flaky = {
        let extra = extra.clone();
        Component::new("Flaky", move |hooks, _| {
            let (value, _) = hooks.use_state(0_u8);
            if extra.get() {
                hooks.use_state(0_u8);
            }
            build("span", Attributes::new(), [i64::from(value)])
        })
    };
    let app = || build(&flaky, Attributes::new(), Vec::<Element>::new());
    let (mut renderer, container) = mounted(app());

    extra.set(true);
    renderer.render(app(), container);
    let err = renderer.flush().unwrap_err();

    assert!(matches!(
        err,
        Error::Hook(HookError::SlotCountChanged { expected: 1, found: 2, .. })
    ));
    assert_eq!(renderer.host().markup(container), "<span>0</span>");
    assert_eq!(renderer.status(), WorkStatus::Idle);
    assert_arena_holds_current_tree(&renderer);
}

// =============================================================================
// Scheduling
// =============================================================================

#[test]
fn test_resume_continues_where_it_yielded() {
    let first = Rc::new(Cell::new(0));
    let second = Rc::new(Cell::new(0));
    let a = counter(first.clone());
    let b = counter(second.clone());
    let app = build("div", Attributes::new(), [
        build(&a, Attributes::new(), Vec::<Element>::new()),
        build(&b, Attributes::new(), Vec::<Element>::new()),
    ]);

    init_tracing();
    let host = MemoryHost::new();
    let container = host.container();
    let mut renderer = Renderer::new(host);
    renderer.render(app, container);

    // root, div, first counter
    assert_eq!(renderer.resume(UnitBudget::new(3)).unwrap(), WorkStatus::Yielded);
    assert_eq!((first.get(), second.get()), (1, 0));
    assert!(renderer.host().children(container).is_empty());

    let mut slices = 1;
    while renderer.resume(UnitBudget::new(2)).unwrap() == WorkStatus::Yielded {
        slices += 1;
    }
    assert!(slices > 1);
    assert_eq!((first.get(), second.get()), (1, 1));
    assert_eq!(renderer.commits(), 1);
    assert_eq!(renderer.host().text_content(container), "11");
}

#[test]
fn test_failed_commit_leaves_current_tree_usable() {
    let (mut renderer, container) = mounted(greeting("h2"));
    renderer.render(greeting("p"), container);
    renderer.host_mut().fail_on("remove child");

    assert!(matches!(renderer.flush(), Err(Error::Host(_))));
    assert_eq!(renderer.host().markup(container), "<div><h1>Hello</h1><h2>World</h2></div>");
    assert!(renderer.context().deletions.is_empty());
    assert_arena_holds_current_tree(&renderer);

    renderer.render(greeting("p"), container);
    renderer.flush().unwrap();
    assert_eq!(renderer.host().markup(container), "<div><h1>Hello</h1><p>World</p></div>");
}

#[test]
fn test_commit_failing_after_removal_keeps_trees_in_sync() {
    let (mut renderer, container) = mounted(greeting("h2"));
    renderer.render(greeting("p"), container);
    renderer.host_mut().fail_on("insert child");

    // h2 is gone from the host before the insertion of p fails
    assert!(matches!(renderer.flush(), Err(Error::Host(_))));
    assert_eq!(renderer.host().markup(container), "<div><h1>Hello</h1></div>");
    assert_arena_holds_current_tree(&renderer);

    renderer.render(greeting("p"), container);
    renderer.flush().unwrap();
    assert_eq!(renderer.host().markup(container), "<div><h1>Hello</h1><p>World</p></div>");

    renderer.render(greeting("h2"), container);
    renderer.flush().unwrap();
    assert_eq!(renderer.host().markup(container), "<div><h1>Hello</h1><h2>World</h2></div>");
    assert_arena_holds_current_tree(&renderer);
}

#[test]
fn test_commit_failure_takes_back_insertions_and_deltas() {
    let (mut renderer, container) = mounted(build("div", Attributes::new(), [el("h1"), el("h2")]));
    // p is created without attributes, so the only set happens in commit
    let next = || {
        build("div", Attributes::new(), [
            el("p"),
            build("h2", attrs([("id", "x")]), Vec::<Element>::new()),
        ])
    };
    renderer.render(next(), container);
    renderer.host_mut().fail_on("set attribute");

    assert!(matches!(renderer.flush(), Err(Error::Host(_))));
    assert_eq!(renderer.host().markup(container), "<div><h2></h2></div>");
    assert!(renderer.host().find("p").is_none());
    assert_arena_holds_current_tree(&renderer);

    renderer.render(next(), container);
    renderer.flush().unwrap();
    assert_eq!(renderer.host().markup(container), "<div><p></p><h2 id=\"x\"></h2></div>");
}

#[test]
fn test_reversed_delta_restores_attributes() {
    let (mut renderer, container) = mounted(greeting("h2"));
    let h1 = renderer.host().find("h1").unwrap();
    let next = build("div", Attributes::new(), [
        build("h1", attrs([("id", "title")]), ["Hello"]),
        build("p", Attributes::new(), ["World"]),
    ]);
    renderer.render(next, container);
    renderer.host_mut().fail_on("insert child");

    assert!(renderer.flush().is_err());
    // Cleared back, as the committed h1 has no id
    let attributes = &renderer.host().node(h1).unwrap().attributes;
    assert_eq!(attributes.get("id"), Some(&Value::from("")));

    renderer.render(greeting("h2"), container);
    renderer.flush().unwrap();
    assert_eq!(
        renderer.host().markup(container),
        "<div><h1 id=\"\">Hello</h1><h2>World</h2></div>"
    );
}

#[test]
fn test_text_value_change_updates_in_place() {
    let (mut renderer, container) = mounted(build("p", Attributes::new(), [text(1_i64)]));
    let node = renderer.host().find(spark_fiber::TEXT_KIND).unwrap();
    renderer.host_mut().take_mutations();

    renderer.render(build("p", Attributes::new(), [text(2_i64)]), container);
    renderer.flush().unwrap();

    assert_eq!(
        renderer.host().mutations(),
        &[Mutation::SetAttribute {
            node,
            key: spark_fiber::TEXT_VALUE_KEY.into(),
            value: Value::Int(2),
        }]
    );
}

// =============================================================================
// Properties
// =============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn arb_kinds() -> impl Strategy<Value = Vec<&'static str>> {
        prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..6)
    }

    fn list(kinds: &[&str]) -> Element {
        build("div", Attributes::new(), kinds.iter().map(|k| el(k)).collect::<Vec<_>>())
    }

    proptest! {
        /// Removals match the positions whose kind changed or disappeared,
        /// and the host ends up holding exactly the new list.
        #[test]
        fn positional_diff_matches_host(old in arb_kinds(), new in arb_kinds()) {
            let (mut renderer, container) = mounted(list(&old));
            renderer.host_mut().take_mutations();

            renderer.render(list(&new), container);
            renderer.flush().unwrap();

            let changed = |i: usize| i >= new.len() || i >= old.len() || old[i] != new[i];
            let expected_removed = (0..old.len()).filter(|&i| changed(i)).count();
            let expected_inserted = (0..new.len()).filter(|&i| changed(i)).count();
            let log = renderer.host().mutations();
            // Only placed positions get a fresh host node
            prop_assert_eq!(
                count(log, |m| matches!(m, Mutation::Create { .. })),
                expected_inserted
            );
            prop_assert_eq!(count(log, |m| matches!(m, Mutation::Remove { .. })), expected_removed);
            prop_assert_eq!(
                count(log, |m| matches!(m, Mutation::Insert { .. })),
                expected_inserted
            );

            let div = renderer.host().find("div").unwrap();
            let kinds: Vec<String> = renderer
                .host()
                .children(div)
                .iter()
                .filter_map(|&id| renderer.host().node(id).map(|n| n.kind.clone()))
                .collect();
            prop_assert_eq!(kinds, new.iter().map(|k| k.to_string()).collect::<Vec<_>>());
            assert_arena_holds_current_tree(&renderer);
        }
    }
}
