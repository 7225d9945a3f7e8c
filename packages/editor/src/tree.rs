//! # Tree Renderer
//!
//! Turns the document into a virtual tree of editable elements. Node shape
//! semantics belong to a [`NodeView`] supplied by the host; the renderer only
//! walks the value, hands each map, list and primitive to the view, and
//! contains failures.
//!
//! Every view call is an isolation boundary. A view that returns an error
//! or panics costs only the subtree it was rendering: the fault is reported
//! to the host, logged, and the subtree renders as [`TreeNode::Empty`].

use crate::{Document, ErrorSink, Path, ViewBinding};
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, error};

/// Language sentinel under which nothing is rendered
pub const NO_LANGUAGE: &str = "none";

/// Virtual tree produced by a render pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TreeNode {
    Empty,

    Text {
        content: String,
    },

    Element {
        tag: String,
        path: Path,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    pub fn text(content: impl Into<String>) -> Self {
        TreeNode::Text {
            content: content.into(),
        }
    }

    pub fn element(tag: impl Into<String>, path: Path) -> Self {
        TreeNode::Element {
            tag: tag.into(),
            path,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute (ignored on non-elements)
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let TreeNode::Element { attributes, .. } = &mut self {
            attributes.insert(name.into(), value.into());
        }
        self
    }

    /// Builder: append children (ignored on non-elements)
    pub fn with_children(mut self, nodes: impl IntoIterator<Item = TreeNode>) -> Self {
        if let TreeNode::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TreeNode::Empty)
    }

    /// Find the element rendered for `path`
    pub fn find(&self, target: &Path) -> Option<&TreeNode> {
        match self {
            TreeNode::Element { path, children, .. } => {
                if path == target {
                    return Some(self);
                }
                children.iter().find_map(|child| child.find(target))
            }
            _ => None,
        }
    }

    /// Indented plain-text outline, one node per line
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(0, &mut out);
        out
    }

    fn write_outline(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match self {
            TreeNode::Empty => {}
            TreeNode::Text { content } => {
                let _ = writeln!(out, "{indent}{content:?}");
            }
            TreeNode::Element {
                tag,
                path,
                attributes,
                children,
            } => {
                let _ = write!(out, "{indent}<{tag}");
                for (name, value) in attributes {
                    let _ = write!(out, " {name}={value:?}");
                }
                let _ = writeln!(out, "> {path}");
                for child in children {
                    child.write_outline(depth + 1, out);
                }
            }
        }
    }
}

/// A subtree that failed to render
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (at '{path}')")]
pub struct RenderError {
    pub path: Path,
    pub message: String,
}

impl RenderError {
    pub fn new(path: Path, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

/// Ambient information for a render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub lang: String,

    /// Document version being rendered
    pub version: u64,
}

/// Schema-driven rendering capability, keyed by node shape.
///
/// Children are already rendered when a container reaches the view.
pub trait NodeView {
    fn render_map(
        &self,
        path: &Path,
        map: &Map<String, Value>,
        entries: Vec<(String, TreeNode)>,
        context: &RenderContext,
    ) -> Result<TreeNode, RenderError>;

    fn render_list(
        &self,
        path: &Path,
        items: Vec<TreeNode>,
        context: &RenderContext,
    ) -> Result<TreeNode, RenderError>;

    fn render_primitive(
        &self,
        path: &Path,
        value: &Value,
        context: &RenderContext,
    ) -> Result<TreeNode, RenderError>;
}

/// Shape-only view: maps become `map` elements with one `entry` per key,
/// lists become `list` elements, primitives become typed `field` elements
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicNodeView;

impl NodeView for BasicNodeView {
    fn render_map(
        &self,
        path: &Path,
        _map: &Map<String, Value>,
        entries: Vec<(String, TreeNode)>,
        _context: &RenderContext,
    ) -> Result<TreeNode, RenderError> {
        let children = entries.into_iter().map(|(key, node)| {
            TreeNode::element("entry", path.child(key.as_str()))
                .with_attribute("key", key)
                .with_children([node])
        });
        Ok(TreeNode::element("map", path.clone()).with_children(children))
    }

    fn render_list(
        &self,
        path: &Path,
        items: Vec<TreeNode>,
        _context: &RenderContext,
    ) -> Result<TreeNode, RenderError> {
        Ok(TreeNode::element("list", path.clone())
            .with_attribute("length", items.len().to_string())
            .with_children(items))
    }

    fn render_primitive(
        &self,
        path: &Path,
        value: &Value,
        _context: &RenderContext,
    ) -> Result<TreeNode, RenderError> {
        let (kind, text) = match value {
            Value::Null => ("null", "null".to_string()),
            Value::Bool(b) => ("boolean", b.to_string()),
            Value::Number(n) => ("number", n.to_string()),
            Value::String(s) => ("string", s.clone()),
            Value::Array(_) | Value::Object(_) => {
                return Err(RenderError::new(path.clone(), "container passed as primitive"))
            }
        };
        Ok(TreeNode::element("field", path.clone())
            .with_attribute("kind", kind)
            .with_children([TreeNode::text(text)]))
    }
}

/// Renders the bound document through a [`NodeView`]
pub struct TreeRenderer {
    view: Option<Rc<dyn NodeView>>,
    errors: Rc<dyn ErrorSink>,
    lang: String,
    binding: ViewBinding,
    generation: Rc<Cell<u64>>,
    rendered: Cell<Option<u64>>,
}

impl TreeRenderer {
    pub fn new(errors: Rc<dyn ErrorSink>) -> Self {
        Self {
            view: None,
            errors,
            lang: NO_LANGUAGE.to_string(),
            binding: ViewBinding::new(),
            generation: Rc::new(Cell::new(0)),
            rendered: Cell::new(None),
        }
    }

    /// Bind to a document, or unbind with `None`
    pub fn set_document(&mut self, document: Option<Document>) {
        if let Some(document) = &document {
            if self.binding.is_bound_to(document) {
                return;
            }
        }

        let generation = self.generation.clone();
        self.binding.bind_optional(document.as_ref(), move || {
            generation.set(generation.get() + 1);
        });
        self.invalidate();
    }

    pub fn set_view(&mut self, view: Option<Rc<dyn NodeView>>) {
        self.view = view;
        self.invalidate();
    }

    pub fn set_lang(&mut self, lang: impl Into<String>) {
        let lang = lang.into();
        if lang != self.lang {
            self.lang = lang;
            self.invalidate();
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Bumped by every notification from the bound document
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// True when the output of the last [`TreeRenderer::render`] no longer
    /// reflects the document
    pub fn is_stale(&self) -> bool {
        self.rendered.get() != Some(self.generation.get())
    }

    /// Render the whole document from its current value
    pub fn render(&self) -> TreeNode {
        self.rendered.set(Some(self.generation.get()));

        if self.lang == NO_LANGUAGE {
            return TreeNode::Empty;
        }
        let (Some(document), Some(view)) = (self.binding.document(), self.view.as_deref()) else {
            return TreeNode::Empty;
        };

        let value = document.value();
        let context = RenderContext {
            lang: self.lang.clone(),
            version: document.version(),
        };
        debug!(version = context.version, lang = %context.lang, "Rendering tree");

        self.render_node(view, &Path::root(), &value, &context)
    }

    fn render_node(
        &self,
        view: &dyn NodeView,
        path: &Path,
        value: &Value,
        context: &RenderContext,
    ) -> TreeNode {
        match value {
            Value::Object(map) => {
                let entries = map
                    .iter()
                    .map(|(key, child)| {
                        let node = self.render_node(view, &path.child(key.as_str()), child, context);
                        (key.clone(), node)
                    })
                    .collect();
                self.isolate(path, || view.render_map(path, map, entries, context))
            }
            Value::Array(items) => {
                let items = items
                    .iter()
                    .enumerate()
                    .map(|(index, child)| self.render_node(view, &path.child(index), child, context))
                    .collect();
                self.isolate(path, || view.render_list(path, items, context))
            }
            primitive => self.isolate(path, || view.render_primitive(path, primitive, context)),
        }
    }

    fn isolate<F>(&self, path: &Path, render: F) -> TreeNode
    where
        F: FnOnce() -> Result<TreeNode, RenderError>,
    {
        let failure = match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(Ok(node)) => return node,
            Ok(Err(err)) => err,
            Err(payload) => RenderError::new(path.clone(), panic_message(payload.as_ref())),
        };

        error!(path = %failure.path, error = %failure.message, "Subtree failed to render");
        self.errors
            .report_error(&format!("Error rendering the tree: {}", failure.message));
        TreeNode::Empty
    }

    fn invalidate(&self) {
        self.generation.set(self.generation.get() + 1);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "view panicked".to_string()
    }
}
