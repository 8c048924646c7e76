//! Unit of work - process one fiber and pick the next.
//!
//! A unit is atomic: the loop may only yield between units.
//!
//! - component fiber: evaluate with [`Hooks`], reconcile the returned element
//! - host fiber: create the host node if it has none, reconcile its children
//!
//! Successor order is depth-first pre-order bounded by the work-in-progress
//! root: child, else sibling, else the nearest ancestor's sibling.

use std::rc::Rc;

use tracing::trace;

use crate::element::{Component, Element, ElementKind, Props};
use crate::engine::{FiberId, next_in_subtree};
use crate::error::Result;
use crate::host::{HostAdapter, HostError};
use crate::state::{Hooks, RenderRequest};
use crate::types::Attributes;

use super::commit::apply_attribute_delta;
use super::context::WorkContext;
use super::reconcile::reconcile_children;

/// Process `id` and return the next unit of the generation, if any.
pub fn perform_unit_of_work<H: HostAdapter>(
    ctx: &mut WorkContext<H::Node>,
    host: &mut H,
    request: &RenderRequest,
    id: FiberId,
) -> Result<Option<FiberId>> {
    let fiber = &ctx.arena[id];
    trace!(fiber = %id, kind = %fiber.kind, effect = ?fiber.effect, "unit of work");

    match fiber.kind.clone() {
        ElementKind::Component(component) => {
            update_function_component(ctx, request, id, &component)?
        }
        ElementKind::Host(name) => update_host_component(ctx, host, id, &name)?,
    }

    let root = ctx.wip_root.unwrap_or(id);
    Ok(next_in_subtree(&ctx.arena, id, root))
}

fn update_function_component<N: Clone>(
    ctx: &mut WorkContext<N>,
    request: &RenderRequest,
    id: FiberId,
    component: &Component,
) -> Result<()> {
    let fiber = &ctx.arena[id];
    let previous = fiber
        .alternate
        .map(|alternate| ctx.arena[alternate].state_slots.clone());
    let props = fiber.props.clone();

    let mut hooks = Hooks::new(component.name(), previous, request.clone());
    let child = component.render(&mut hooks, &props);
    ctx.arena[id].state_slots = hooks.finish()?;

    reconcile_children(ctx, id, std::slice::from_ref(&child));
    Ok(())
}

fn update_host_component<H: HostAdapter>(
    ctx: &mut WorkContext<H::Node>,
    host: &mut H,
    id: FiberId,
    name: &str,
) -> Result<()> {
    let props = ctx.arena[id].props.clone();
    if ctx.arena[id].host_node.is_none() {
        let node = create_host_node(host, name, &props)?;
        ctx.arena[id].host_node = Some(node);
    }
    reconcile_children(ctx, id, &props.children);
    Ok(())
}

/// Create a detached node with its initial attributes and bindings.
fn create_host_node<H: HostAdapter>(
    host: &mut H,
    kind: &str,
    props: &Props,
) -> Result<H::Node, HostError> {
    let node = host.create_node(kind)?;
    apply_attribute_delta(host, &node, &Attributes::new(), &props.attributes)?;
    Ok(node)
}

/// Props of a root fiber rendering `element`.
pub(crate) fn root_props(element: Element) -> Props {
    Props {
        attributes: Rc::new(Attributes::new()),
        children: Rc::from(vec![element]),
    }
}
