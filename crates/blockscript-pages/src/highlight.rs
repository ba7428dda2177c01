//! Selection-driven highlighting for a mounted overlay.
//!
//! [`SelectionHighlighter`] owns the selected index set of one overlay
//! instance. A selection change notification does not recompute right away:
//! it schedules a single deferred recomputation through a [`Coalescer`], so a
//! burst of notifications recomputes once. Unmounting (or dropping the
//! highlighter) cancels the pending recomputation, and the task itself only
//! holds a weak reference to the state.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::render::{Character, characters};
use crate::schedule::{Coalescer, Scheduler};
use crate::selection::{
	SelectedIndexSet, SelectionRange, TextTree, compute_selected_indices, utf16_len,
};

/// Where the highlighter reads the rendered tree and the current selection.
pub trait SelectionSource {
	type Tree: TextTree;

	/// The overlay's rendered root, or `None` when it is not rendered.
	fn root(&self) -> Option<Self::Tree>;

	/// The current selection, or `None` when nothing is selected.
	fn selection(&self) -> Option<SelectionRange<<Self::Tree as TextTree>::Node>>;
}

type ChangeListener = Box<dyn Fn(&SelectedIndexSet)>;

struct HighlightState {
	content: String,
	content_length: usize,
	selected: SelectedIndexSet,
	mounted: bool,
	listener: Option<ChangeListener>,
}

/// Tracks which characters of an overlay are selected.
pub struct SelectionHighlighter<Src: SelectionSource + 'static, S: Scheduler> {
	state: Rc<RefCell<HighlightState>>,
	source: Rc<Src>,
	coalescer: Coalescer<S>,
}

impl<Src: SelectionSource + 'static, S: Scheduler> SelectionHighlighter<Src, S> {
	pub fn new(content: impl Into<String>, source: Src, scheduler: S) -> Self {
		let content = content.into();
		Self {
			state: Rc::new(RefCell::new(HighlightState {
				content_length: utf16_len(&content),
				content,
				selected: SelectedIndexSet::new(),
				mounted: false,
				listener: None,
			})),
			source: Rc::new(source),
			coalescer: Coalescer::new(scheduler),
		}
	}

	/// Registers a callback invoked whenever a recomputation changes the set.
	pub fn on_change(self, listener: impl Fn(&SelectedIndexSet) + 'static) -> Self {
		self.state.borrow_mut().listener = Some(Box::new(listener));
		self
	}

	/// Starts reacting to selection changes with an empty selection.
	pub fn mount(&mut self) {
		let mut state = self.state.borrow_mut();
		state.mounted = true;
		state.selected.clear();
		tracing::debug!(content_length = state.content_length, "overlay mounted");
	}

	/// Stops reacting to selection changes and cancels a pending recomputation.
	pub fn unmount(&mut self) {
		self.coalescer.cancel();
		self.state.borrow_mut().mounted = false;
		tracing::debug!("overlay unmounted");
	}

	pub fn is_mounted(&self) -> bool {
		self.state.borrow().mounted
	}

	/// Schedules a recomputation of the selected set.
	///
	/// Ignored while unmounted. A recomputation already pending is replaced.
	pub fn notify_selection_change(&mut self) {
		if !self.state.borrow().mounted {
			return;
		}

		let state = Rc::downgrade(&self.state);
		let source = Rc::clone(&self.source);
		self.coalescer.schedule(move || recompute(&state, &*source));
	}

	/// Whether a recomputation is scheduled but has not run yet.
	pub fn has_pending_update(&self) -> bool {
		self.coalescer.has_pending()
	}

	/// Replaces the content and clears the selection.
	pub fn set_content(&mut self, content: impl Into<String>) {
		self.coalescer.cancel();
		let mut state = self.state.borrow_mut();
		state.content = content.into();
		state.content_length = utf16_len(&state.content);
		state.selected.clear();
	}

	pub fn content(&self) -> String {
		self.state.borrow().content.clone()
	}

	/// Snapshot of the selected index set.
	pub fn selected(&self) -> SelectedIndexSet {
		self.state.borrow().selected.clone()
	}

	/// The content's characters with their current selection state.
	pub fn characters(&self) -> Vec<Character> {
		let state = self.state.borrow();
		characters(&state.content, &state.selected)
	}
}

impl<Src: SelectionSource + 'static, S: Scheduler> fmt::Debug for SelectionHighlighter<Src, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("SelectionHighlighter")
			.field("content", &state.content)
			.field("selected", &state.selected)
			.field("mounted", &state.mounted)
			.field("coalescer", &self.coalescer)
			.finish()
	}
}

fn recompute<Src: SelectionSource>(state: &Weak<RefCell<HighlightState>>, source: &Src) {
	let Some(state) = state.upgrade() else {
		return;
	};

	let content_length = {
		let state = state.borrow();
		if !state.mounted {
			return;
		}
		state.content_length
	};

	let selected = match (source.root(), source.selection()) {
		(Some(root), Some(selection)) => compute_selected_indices(&root, &selection, content_length),
		_ => SelectedIndexSet::new(),
	};

	let changed = {
		let mut state = state.borrow_mut();
		if state.selected == selected {
			false
		} else {
			state.selected = selected;
			true
		}
	};

	if changed {
		let state = state.borrow();
		tracing::trace!(selected = state.selected.len(), "selection highlight updated");
		if let Some(listener) = &state.listener {
			listener(&state.selected);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schedule::MicrotaskQueue;
	use crate::selection::{LeafList, NodeId};
	use rstest::rstest;
	use std::cell::Cell;

	#[derive(Clone, Default)]
	struct FakeSource {
		tree: Rc<RefCell<Option<LeafList>>>,
		selection: Rc<RefCell<Option<SelectionRange<NodeId>>>>,
		reads: Rc<Cell<usize>>,
	}

	impl FakeSource {
		fn rendered(content: &str) -> Self {
			let source = Self::default();
			*source.tree.borrow_mut() = Some(LeafList::per_char(content));
			source
		}

		fn select(&self, start: (usize, usize), end: (usize, usize)) {
			let range = self.tree.borrow().as_ref().map(|tree| tree.range(start, end));
			*self.selection.borrow_mut() = range;
		}
	}

	impl SelectionSource for FakeSource {
		type Tree = LeafList;

		fn root(&self) -> Option<LeafList> {
			self.reads.set(self.reads.get() + 1);
			self.tree.borrow().clone()
		}

		fn selection(&self) -> Option<SelectionRange<NodeId>> {
			self.selection.borrow().clone()
		}
	}

	fn selected(h: &SelectionHighlighter<FakeSource, MicrotaskQueue>) -> Vec<usize> {
		h.selected().iter().copied().collect()
	}

	#[rstest]
	fn test_recompute_is_deferred() {
		let queue = MicrotaskQueue::new();
		let source = FakeSource::rendered("AB");
		let mut highlighter = SelectionHighlighter::new("AB", source.clone(), queue.clone());
		highlighter.mount();

		source.select((0, 0), (0, 1));
		highlighter.notify_selection_change();
		assert!(highlighter.selected().is_empty());
		assert!(highlighter.has_pending_update());

		queue.run_until_idle();
		assert_eq!(selected(&highlighter), vec![0]);
		assert_eq!(
			highlighter.characters().iter().map(Character::style).collect::<Vec<_>>(),
			vec![crate::render::BlockscriptStyle::High, crate::render::BlockscriptStyle::Low]
		);
	}

	#[rstest]
	fn test_burst_recomputes_once() {
		let queue = MicrotaskQueue::new();
		let source = FakeSource::rendered("ABCD");
		let mut highlighter = SelectionHighlighter::new("ABCD", source.clone(), queue.clone());
		highlighter.mount();

		for end in 1..4 {
			source.select((0, 0), (end, 1));
			highlighter.notify_selection_change();
		}

		assert_eq!(queue.run_until_idle(), 1);
		assert_eq!(source.reads.get(), 1);
		assert_eq!(selected(&highlighter), vec![0, 1, 2, 3]);
	}

	#[rstest]
	fn test_unmount_cancels_pending_recompute() {
		let queue = MicrotaskQueue::new();
		let source = FakeSource::rendered("AB");
		let mut highlighter = SelectionHighlighter::new("AB", source.clone(), queue.clone());
		highlighter.mount();

		source.select((0, 0), (1, 1));
		highlighter.notify_selection_change();
		highlighter.unmount();

		assert_eq!(queue.run_until_idle(), 0);
		assert_eq!(source.reads.get(), 0);
		assert!(highlighter.selected().is_empty());
	}

	#[rstest]
	fn test_notifications_ignored_while_unmounted() {
		let queue = MicrotaskQueue::new();
		let source = FakeSource::rendered("AB");
		let mut highlighter = SelectionHighlighter::new("AB", source.clone(), queue.clone());

		source.select((0, 0), (1, 1));
		highlighter.notify_selection_change();

		assert!(!highlighter.has_pending_update());
		assert!(queue.is_empty());
	}

	#[rstest]
	fn test_drop_cancels_pending_recompute() {
		let queue = MicrotaskQueue::new();
		let source = FakeSource::rendered("AB");
		{
			let mut highlighter = SelectionHighlighter::new("AB", source.clone(), queue.clone());
			highlighter.mount();
			source.select((0, 0), (1, 1));
			highlighter.notify_selection_change();
		}

		assert_eq!(queue.run_until_idle(), 0);
		assert_eq!(source.reads.get(), 0);
	}

	#[rstest]
	fn test_cleared_selection_clears_highlight() {
		let queue = MicrotaskQueue::new();
		let source = FakeSource::rendered("AB");
		let mut highlighter = SelectionHighlighter::new("AB", source.clone(), queue.clone());
		highlighter.mount();

		source.select((0, 0), (1, 1));
		highlighter.notify_selection_change();
		queue.run_until_idle();
		assert_eq!(selected(&highlighter), vec![0, 1]);

		*source.selection.borrow_mut() = None;
		highlighter.notify_selection_change();
		queue.run_until_idle();
		assert!(highlighter.selected().is_empty());
	}

	#[rstest]
	fn test_unrendered_root_yields_empty_set() {
		let queue = MicrotaskQueue::new();
		let source = FakeSource::default();
		let mut highlighter = SelectionHighlighter::new("AB", source.clone(), queue.clone());
		highlighter.mount();

		highlighter.notify_selection_change();
		queue.run_until_idle();

		assert!(highlighter.selected().is_empty());
	}

	#[rstest]
	fn test_listener_fires_only_on_change() {
		let queue = MicrotaskQueue::new();
		let source = FakeSource::rendered("AB");
		let calls = Rc::new(Cell::new(0));
		let counter = Rc::clone(&calls);
		let mut highlighter = SelectionHighlighter::new("AB", source.clone(), queue.clone())
			.on_change(move |_| counter.set(counter.get() + 1));
		highlighter.mount();

		source.select((0, 0), (0, 1));
		highlighter.notify_selection_change();
		queue.run_until_idle();
		highlighter.notify_selection_change();
		queue.run_until_idle();

		assert_eq!(calls.get(), 1);
	}

	#[rstest]
	fn test_set_content_resets_selection() {
		let queue = MicrotaskQueue::new();
		let source = FakeSource::rendered("AB");
		let mut highlighter = SelectionHighlighter::new("AB", source.clone(), queue.clone());
		highlighter.mount();

		source.select((0, 0), (1, 1));
		highlighter.notify_selection_change();
		queue.run_until_idle();

		highlighter.set_content("XYZ");
		assert!(highlighter.selected().is_empty());
		assert_eq!(highlighter.content(), "XYZ");
		assert_eq!(highlighter.characters().len(), 3);
	}
}
