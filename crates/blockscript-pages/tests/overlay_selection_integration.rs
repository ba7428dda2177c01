//! End-to-end overlay behavior over an in-memory leaf list.

use std::cell::RefCell;
use std::rc::Rc;

use blockscript_pages::selection::NodeId;
use blockscript_pages::{
	BlockscriptStyle, LeafList, MicrotaskQueue, OverlayProps, SelectedIndexSet, SelectionHighlighter,
	SelectionRange, SelectionSource, characters, compute_selected_indices, render_overlay_html,
};
use proptest::prelude::*;
use rstest::{fixture, rstest};

/// Selection source whose current range is set by the test.
#[derive(Clone)]
struct ScriptedSource {
	tree: LeafList,
	selection: Rc<RefCell<Option<SelectionRange<NodeId>>>>,
}

impl ScriptedSource {
	fn select(&self, start: (usize, usize), end: (usize, usize)) {
		*self.selection.borrow_mut() = Some(self.tree.range(start, end));
	}
}

impl SelectionSource for ScriptedSource {
	type Tree = LeafList;

	fn root(&self) -> Option<LeafList> {
		Some(self.tree.clone())
	}

	fn selection(&self) -> Option<SelectionRange<NodeId>> {
		self.selection.borrow().clone()
	}
}

#[fixture]
fn overlay() -> (ScriptedSource, MicrotaskQueue) {
	let source = ScriptedSource {
		tree: LeafList::per_char("AB"),
		selection: Rc::new(RefCell::new(None)),
	};
	(source, MicrotaskQueue::new())
}

#[rstest]
fn test_selecting_first_character_highlights_it(overlay: (ScriptedSource, MicrotaskQueue)) {
	let (source, queue) = overlay;
	let mut highlighter = SelectionHighlighter::new("AB", source.clone(), queue.clone());
	highlighter.mount();

	source.select((0, 0), (0, 1));
	highlighter.notify_selection_change();
	queue.run_until_idle();

	let styles: Vec<_> = highlighter.characters().iter().map(|c| c.style()).collect();
	assert_eq!(styles, vec![BlockscriptStyle::High, BlockscriptStyle::Low]);

	let html = render_overlay_html(&OverlayProps::new("AB"), &highlighter.selected());
	assert!(html.contains(r#"<span class="high-blockscript" data-index="0">A</span>"#));
	assert!(html.contains(r#"<span class="low-blockscript" data-index="1">B</span>"#));
}

#[rstest]
fn test_two_instances_do_not_share_state(overlay: (ScriptedSource, MicrotaskQueue)) {
	let (source, queue) = overlay;
	let other = ScriptedSource {
		tree: LeafList::per_char("AB"),
		selection: Rc::new(RefCell::new(None)),
	};
	let mut first = SelectionHighlighter::new("AB", source.clone(), queue.clone());
	let mut second = SelectionHighlighter::new("AB", other, queue.clone());
	first.mount();
	second.mount();

	source.select((1, 0), (1, 1));
	first.notify_selection_change();
	second.notify_selection_change();
	assert_eq!(queue.run_until_idle(), 2);

	assert!(first.selected().contains(1));
	assert!(second.selected().is_empty());
}

#[rstest]
fn test_remount_starts_empty(overlay: (ScriptedSource, MicrotaskQueue)) {
	let (source, queue) = overlay;
	let mut highlighter = SelectionHighlighter::new("AB", source.clone(), queue.clone());
	highlighter.mount();
	source.select((0, 0), (1, 1));
	highlighter.notify_selection_change();
	queue.run_until_idle();
	assert_eq!(highlighter.selected().len(), 2);

	highlighter.unmount();
	highlighter.mount();

	assert!(highlighter.selected().is_empty());
}

proptest! {
	#[test]
	fn prop_selected_indices_are_contiguous_and_bounded(
		leaves in proptest::collection::vec("[a-z\u{e9}\u{1F600}]{0,4}", 1..8),
		picks in (any::<usize>(), any::<usize>(), any::<usize>(), any::<usize>()),
	) {
		let tree = LeafList::new(leaves.clone());
		let lens: Vec<usize> = leaves.iter().map(|s| s.encode_utf16().count()).collect();
		let total: usize = lens.iter().sum();

		let a = picks.0 % leaves.len();
		let b = picks.1 % leaves.len();
		let (start_leaf, end_leaf) = (a.min(b), a.max(b));
		let start_off = picks.2 % (lens[start_leaf] + 1);
		let end_off = picks.3 % (lens[end_leaf] + 1);

		let selection = tree.range((start_leaf, start_off), (end_leaf, end_off));
		let selected = compute_selected_indices(&tree, &selection, total);

		let flat_start = lens[..start_leaf].iter().sum::<usize>() + start_off;
		let flat_end = lens[..end_leaf].iter().sum::<usize>() + end_off;
		let expected = if flat_start >= flat_end {
			SelectedIndexSet::new()
		} else {
			SelectedIndexSet::from_range(flat_start..flat_end)
		};

		prop_assert_eq!(&selected, &expected);
		prop_assert!(selected.iter().all(|&i| i < total));
	}

	#[test]
	fn prop_rendering_is_deterministic_for_equal_inputs(
		content in "[a-z<&\"\u{e9}\u{1F600}]{1,12}",
		picks in (any::<usize>(), any::<usize>()),
	) {
		let build = || {
			let tree = LeafList::per_char(&content);
			let a = picks.0 % tree.len();
			let b = picks.1 % tree.len();
			let (start, end) = (a.min(b), a.max(b));
			let end_len = content.chars().nth(end).map_or(0, char::len_utf16);
			let selection = tree.range((start, 0), (end, end_len));
			compute_selected_indices(&tree, &selection, content.encode_utf16().count())
		};

		let first = build();
		let second = build();
		prop_assert_eq!(&first, &second);

		let chars = characters(&content, &first);
		prop_assert_eq!(&chars, &characters(&content, &second));
		prop_assert!(chars.iter().all(|c| c.is_selected == first.contains(c.index)));

		let props = OverlayProps::new(content.clone());
		prop_assert_eq!(
			render_overlay_html(&props, &first),
			render_overlay_html(&props, &second)
		);
	}
}
