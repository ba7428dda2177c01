//! Browser bindings for the overlay.
//!
//! [`DomTree`] walks the text nodes under a rendered overlay root,
//! [`DomSelectionSource`] reads the document selection, and [`OverlayBinding`]
//! wires both to a [`SelectionHighlighter`] driven by `selectionchange`
//! events and zero-delay timeouts.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Node, Range, Window};

use crate::highlight::{SelectionHighlighter, SelectionSource};
use crate::render::{BlockscriptStyle, OverlayProps, render_overlay_html};
use crate::schedule::TimeoutScheduler;
use crate::selection::{Anchor, SelectedIndexSet, SelectionError, SelectionRange, TextLeaf, TextTree};

// NodeFilter.SHOW_TEXT
const SHOW_TEXT: u32 = 0x4;

fn js_error(err: &JsValue) -> SelectionError {
	SelectionError::Traversal(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Text nodes under a DOM root.
#[derive(Debug, Clone)]
pub struct DomTree {
	document: Document,
	root: Node,
}

impl DomTree {
	pub fn new(document: Document, root: Node) -> Self {
		Self { document, root }
	}
}

impl TextTree for DomTree {
	type Node = Node;

	fn text_leaves(&self) -> impl Iterator<Item = Result<TextLeaf<Node>, SelectionError>> + '_ {
		let mut walker = Some(
			self.document
				.create_tree_walker_with_what_to_show(&self.root, SHOW_TEXT),
		);

		std::iter::from_fn(move || {
			let current = match walker.as_ref()? {
				Ok(current) => current,
				Err(err) => {
					let err = js_error(err);
					walker = None;
					return Some(Err(err));
				}
			};

			match current.next_node() {
				Ok(Some(node)) => {
					let len = node.text_content().map_or(0, |text| text.encode_utf16().count());
					Some(Ok(TextLeaf { node, len }))
				}
				Ok(None) => {
					walker = None;
					None
				}
				Err(err) => {
					walker = None;
					Some(Err(js_error(&err)))
				}
			}
		})
	}

	fn contains(&self, node: &Node) -> bool {
		self.root.contains(Some(node))
	}

	fn same_node(&self, a: &Node, b: &Node) -> bool {
		a.is_same_node(Some(b))
	}
}

/// Converts a DOM range into a [`SelectionRange`].
///
/// Anchors placed on element boundaries, as produced by triple-click or
/// select-all, are moved onto the adjacent text node.
pub fn selection_range(range: &Range) -> Result<SelectionRange<Node>, JsValue> {
	Ok(SelectionRange {
		start: text_anchor(range.start_container()?, range.start_offset()?),
		end: text_anchor(range.end_container()?, range.end_offset()?),
		common_ancestor: range.common_ancestor_container()?,
		collapsed: range.collapsed(),
	})
}

fn text_anchor(container: Node, offset: u32) -> Anchor<Node> {
	if container.node_type() == Node::TEXT_NODE {
		return Anchor::new(container, offset as usize);
	}

	let children = container.child_nodes();
	if let Some(text) = children.item(offset).and_then(|child| first_text(&child)) {
		return Anchor::new(text, 0);
	}
	if offset > 0
		&& let Some(text) = children.item(offset - 1).and_then(|child| last_text(&child))
	{
		let len = text.text_content().map_or(0, |t| t.encode_utf16().count());
		return Anchor::new(text, len);
	}

	// Left as is; the index walk reports it as not found.
	Anchor::new(container, offset as usize)
}

fn first_text(node: &Node) -> Option<Node> {
	if node.node_type() == Node::TEXT_NODE {
		return Some(node.clone());
	}
	let mut child = node.first_child();
	while let Some(current) = child {
		if let Some(text) = first_text(&current) {
			return Some(text);
		}
		child = current.next_sibling();
	}
	None
}

fn last_text(node: &Node) -> Option<Node> {
	if node.node_type() == Node::TEXT_NODE {
		return Some(node.clone());
	}
	let mut child = node.last_child();
	while let Some(current) = child {
		if let Some(text) = last_text(&current) {
			return Some(text);
		}
		child = current.previous_sibling();
	}
	None
}

/// Reads the document selection relative to an overlay root.
#[derive(Debug, Clone)]
pub struct DomSelectionSource {
	window: Window,
	document: Document,
	root: Node,
}

impl DomSelectionSource {
	pub fn new(window: Window, document: Document, root: Node) -> Self {
		Self {
			window,
			document,
			root,
		}
	}
}

impl SelectionSource for DomSelectionSource {
	type Tree = DomTree;

	fn root(&self) -> Option<DomTree> {
		self.root
			.is_connected()
			.then(|| DomTree::new(self.document.clone(), self.root.clone()))
	}

	fn selection(&self) -> Option<SelectionRange<Node>> {
		let selection = self.window.get_selection().ok().flatten()?;
		if selection.range_count() == 0 {
			return None;
		}
		let range = selection.get_range_at(0).ok()?;
		selection_range(&range)
			.map_err(|err| tracing::warn!(?err, "failed to read selection range"))
			.ok()
	}
}

/// A `selectionchange` listener on a document, removed on drop.
pub struct SelectionChangeListener {
	target: Document,
	callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl SelectionChangeListener {
	pub fn attach(document: &Document, mut on_change: impl FnMut() + 'static) -> Result<Self, JsValue> {
		let callback = Closure::wrap(Box::new(move |_event: web_sys::Event| {
			on_change();
		}) as Box<dyn FnMut(_)>);

		document.add_event_listener_with_callback("selectionchange", callback.as_ref().unchecked_ref())?;

		Ok(Self {
			target: document.clone(),
			callback,
		})
	}
}

impl Drop for SelectionChangeListener {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback("selectionchange", self.callback.as_ref().unchecked_ref());
	}
}

pub type DomHighlighter = SelectionHighlighter<DomSelectionSource, TimeoutScheduler>;

/// A rendered overlay kept in sync with the document selection.
///
/// Dropping the binding unmounts the highlighter and removes the listener.
pub struct OverlayBinding {
	highlighter: Rc<RefCell<DomHighlighter>>,
	_listener: SelectionChangeListener,
}

impl OverlayBinding {
	/// Renders `props` into `root` and starts tracking the selection.
	pub fn mount(root: &Element, props: &OverlayProps) -> Result<Self, JsValue> {
		let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
		let document = window
			.document()
			.ok_or_else(|| JsValue::from_str("window has no document"))?;

		root.set_inner_html(&render_overlay_html(props, &SelectedIndexSet::new()));

		let styled = root.clone();
		let source = DomSelectionSource::new(window, document.clone(), root.clone().into());
		let mut highlighter = SelectionHighlighter::new(props.content.clone(), source, TimeoutScheduler)
			.on_change(move |selected| apply_styles(&styled, selected));
		highlighter.mount();

		let highlighter = Rc::new(RefCell::new(highlighter));
		let weak = Rc::downgrade(&highlighter);
		let listener = SelectionChangeListener::attach(&document, move || {
			if let Some(highlighter) = weak.upgrade() {
				highlighter.borrow_mut().notify_selection_change();
			}
		})?;

		Ok(Self {
			highlighter,
			_listener: listener,
		})
	}

	pub fn selected(&self) -> SelectedIndexSet {
		self.highlighter.borrow().selected()
	}
}

impl Drop for OverlayBinding {
	fn drop(&mut self) {
		self.highlighter.borrow_mut().unmount();
	}
}

fn apply_styles(root: &Element, selected: &SelectedIndexSet) {
	let Ok(spans) = root.query_selector_all("span[data-index]") else {
		return;
	};
	for i in 0..spans.length() {
		let Some(span) = spans.item(i).and_then(|node| node.dyn_into::<Element>().ok()) else {
			continue;
		};
		let Some(index) = span
			.get_attribute("data-index")
			.and_then(|value| value.parse::<usize>().ok())
		else {
			continue;
		};
		span.set_class_name(BlockscriptStyle::for_selection(selected.contains(index)).class_name());
	}
}
