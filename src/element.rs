//! Element model - immutable tree descriptions.
//!
//! Elements are produced fresh on every render request and never mutated.
//! Storage is shared (`Rc`), so cloning an element or its props is cheap and
//! fibers can hold on to the props of the generation they were built from.
//!
//! ```ignore
//! use spark_fiber::{attrs, build, Attributes};
//!
//! let tree = build("div", attrs([("id", "app")]), [
//!     build("h1", Attributes::new(), ["Hello"]),
//!     build("h2", Attributes::new(), ["World"]),
//! ]);
//! ```

use std::fmt;
use std::rc::Rc;

use crate::state::Hooks;
use crate::types::{Attributes, TEXT_KIND, TEXT_VALUE_KEY, Value};

// =============================================================================
// Component
// =============================================================================

type RenderFn = dyn Fn(&mut Hooks, &Props) -> Element;

/// A function component.
///
/// Identity is the function allocation: clones of one `Component` are the
/// same kind, two `Component::new` calls with equal closures are not.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    /// Create a component from its render function.
    pub fn new(
        name: impl Into<Rc<str>>,
        render: impl Fn(&mut Hooks, &Props) -> Element + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            render: Rc::new(render),
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the component.
    pub(crate) fn render(&self, hooks: &mut Hooks, props: &Props) -> Element {
        (self.render)(hooks, props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

// =============================================================================
// Kind
// =============================================================================

/// What an element renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A host-renderable node type ("div", [`TEXT_KIND`], ...).
    Host(Rc<str>),
    /// A function component. Has no host node of its own.
    Component(Component),
}

impl ElementKind {
    /// Host kind name, if this is a host kind.
    pub fn host_name(&self) -> Option<&str> {
        match self {
            ElementKind::Host(name) => Some(name),
            ElementKind::Component(_) => None,
        }
    }

    /// Check if this is a component kind.
    pub fn is_component(&self) -> bool {
        matches!(self, ElementKind::Component(_))
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Host(name) => f.write_str(name),
            ElementKind::Component(c) => write!(f, "<{}>", c.name()),
        }
    }
}

impl From<&str> for ElementKind {
    fn from(name: &str) -> Self {
        ElementKind::Host(Rc::from(name))
    }
}

impl From<Component> for ElementKind {
    fn from(component: Component) -> Self {
        ElementKind::Component(component)
    }
}

impl From<&Component> for ElementKind {
    fn from(component: &Component) -> Self {
        ElementKind::Component(component.clone())
    }
}

// =============================================================================
// Props & Element
// =============================================================================

/// Attributes plus ordered children of one element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    pub attributes: Rc<Attributes>,
    pub children: Rc<[Element]>,
}

impl Props {
    /// Look up an attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Immutable description of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub props: Props,
}

impl Element {
    /// Text content, if this is a text element.
    pub fn text_value(&self) -> Option<&Value> {
        match &self.kind {
            ElementKind::Host(name) if &**name == TEXT_KIND => self.props.get(TEXT_VALUE_KEY),
            _ => None,
        }
    }
}

/// Build an element.
///
/// Every child input goes through `Into<Element>`; plain strings and numbers
/// become text elements.
pub fn build<K, C, I>(kind: K, attributes: Attributes, children: I) -> Element
where
    K: Into<ElementKind>,
    C: Into<Element>,
    I: IntoIterator<Item = C>,
{
    Element {
        kind: kind.into(),
        props: Props {
            attributes: Rc::new(attributes),
            children: children.into_iter().map(Into::into).collect(),
        },
    }
}

/// Build a text element.
pub fn text(value: impl Into<Value>) -> Element {
    let mut attributes = Attributes::new();
    attributes.insert(TEXT_VALUE_KEY.to_string(), value.into());
    Element {
        kind: ElementKind::from(TEXT_KIND),
        props: Props {
            attributes: Rc::new(attributes),
            children: Rc::from(Vec::new()),
        },
    }
}

impl From<&str> for Element {
    fn from(s: &str) -> Self {
        text(s)
    }
}

impl From<String> for Element {
    fn from(s: String) -> Self {
        text(s)
    }
}

impl From<i64> for Element {
    fn from(n: i64) -> Self {
        text(n)
    }
}

impl From<i32> for Element {
    fn from(n: i32) -> Self {
        text(n)
    }
}

impl From<f64> for Element {
    fn from(n: f64) -> Self {
        text(n)
    }
}
