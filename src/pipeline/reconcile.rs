//! Reconciler - positional diff of one fiber's children.
//!
//! # Algorithm
//!
//! The alternate's child chain and the new element list are walked in lock-step
//! by position (no keys). At each position:
//!
//! 1. same kind            -> UPDATE fiber reusing the old host node
//! 2. new element, no match -> PLACE fiber, host node created later
//! 3. old fiber, no match   -> old fiber marked DELETE in place, queued in deletions
//!
//! Emitted fibers are linked as `child` (first) or as the previous emitted
//! fiber's `sibling`. A pure deletion emits nothing and takes no chain slot.
//!
//! Reordering an unkeyed list therefore shows up as update/place/delete triples
//! rather than moves. State slots are matched by the same positions.

use crate::element::Element;
use crate::engine::{EffectTag, Fiber, FiberId};

use super::context::WorkContext;

/// Build `parent`'s child fibers for `elements`, diffed against
/// `parent.alternate`'s children.
pub fn reconcile_children<N: Clone>(
    ctx: &mut WorkContext<N>,
    parent: FiberId,
    elements: &[Element],
) {
    let mut old = ctx.arena[parent]
        .alternate
        .and_then(|alternate| ctx.arena[alternate].child);
    let mut previous: Option<FiberId> = None;
    let mut index = 0;

    ctx.arena[parent].child = None;

    while index < elements.len() || old.is_some() {
        let element = elements.get(index);
        let same_kind = match (old, element) {
            (Some(old_id), Some(element)) => ctx.arena[old_id].kind == element.kind,
            _ => false,
        };

        let emitted = match (old, element) {
            (Some(old_id), Some(element)) if same_kind => {
                let host_node = ctx.arena[old_id].host_node.clone();
                Some(ctx.arena.insert(Fiber::update(element, parent, old_id, host_node)))
            }
            (_, Some(element)) => Some(ctx.arena.insert(Fiber::placement(element, parent))),
            (_, None) => None,
        };

        if let Some(old_id) = old {
            if !same_kind {
                ctx.arena[old_id].effect = EffectTag::Delete;
                ctx.deletions.push(old_id);
            }
            old = ctx.arena[old_id].sibling;
        }

        if let Some(new_id) = emitted {
            match previous {
                None => ctx.arena[parent].child = Some(new_id),
                Some(prev_id) => ctx.arena[prev_id].sibling = Some(new_id),
            }
            previous = Some(new_id);
        }

        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Props, build, text};
    use crate::engine::Children;
    use crate::types::Attributes;

    fn el(kind: &str) -> Element {
        build(kind, Attributes::new(), Vec::<Element>::new())
    }

    /// Start a generation and reconcile its root against `elements`.
    fn generation(ctx: &mut WorkContext<u32>, elements: &[Element]) -> FiberId {
        let root = ctx.begin_generation(0, Props::default());
        reconcile_children(ctx, root, elements);
        root
    }

    fn kinds(ctx: &WorkContext<u32>, parent: FiberId) -> Vec<(String, EffectTag)> {
        Children::new(&ctx.arena, parent)
            .map(|id| (ctx.arena[id].kind.to_string(), ctx.arena[id].effect))
            .collect()
    }

    #[test]
    fn test_first_generation_places_everything() {
        let mut ctx = WorkContext::new();
        let root = generation(&mut ctx, &[el("h1"), el("h2")]);
        assert_eq!(
            kinds(&ctx, root),
            vec![("h1".into(), EffectTag::Place), ("h2".into(), EffectTag::Place)]
        );
        assert!(ctx.deletions.is_empty());
    }

    #[test]
    fn test_same_kind_updates_and_reuses_host_node() {
        let mut ctx = WorkContext::new();
        let root = generation(&mut ctx, &[el("h1")]);
        let first = ctx.arena[root].child.unwrap();
        ctx.arena[first].host_node = Some(42);
        ctx.promote();

        let root = generation(&mut ctx, &[el("h1")]);
        let second = ctx.arena[root].child.unwrap();
        assert_eq!(ctx.arena[second].effect, EffectTag::Update);
        assert_eq!(ctx.arena[second].host_node, Some(42));
        assert_eq!(ctx.arena[second].alternate, Some(first));
    }

    #[test]
    fn test_kind_change_places_and_deletes() {
        let mut ctx = WorkContext::new();
        generation(&mut ctx, &[el("h1"), el("h2")]);
        ctx.promote();
        let old_h2 = Children::new(&ctx.arena, ctx.current_root.unwrap()).nth(1).unwrap();

        let root = generation(&mut ctx, &[el("h1"), el("p")]);
        assert_eq!(
            kinds(&ctx, root),
            vec![("h1".into(), EffectTag::Update), ("p".into(), EffectTag::Place)]
        );
        assert_eq!(ctx.deletions, vec![old_h2]);
        assert_eq!(ctx.arena[old_h2].effect, EffectTag::Delete);
    }

    #[test]
    fn test_shrinking_list_emits_no_fiber_for_deleted_tail() {
        let mut ctx = WorkContext::new();
        generation(&mut ctx, &[el("a"), el("b"), el("c")]);
        ctx.promote();

        let root = generation(&mut ctx, &[el("a")]);
        assert_eq!(kinds(&ctx, root), vec![("a".into(), EffectTag::Update)]);
        assert_eq!(ctx.deletions.len(), 2);
        let a = ctx.arena[root].child.unwrap();
        assert_eq!(ctx.arena[a].sibling, None);
    }

    #[test]
    fn test_empty_to_empty() {
        let mut ctx = WorkContext::new();
        let root = generation(&mut ctx, &[]);
        assert_eq!(ctx.arena[root].child, None);
        assert!(ctx.deletions.is_empty());
    }

    #[test]
    fn test_text_children_compare_by_kind_only() {
        let mut ctx = WorkContext::new();
        generation(&mut ctx, &[text("old")]);
        ctx.promote();

        let root = generation(&mut ctx, &[text("new")]);
        assert_eq!(kinds(&ctx, root)[0].1, EffectTag::Update);
    }
}
