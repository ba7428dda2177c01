//! Selection to character index reconciliation.
//!
//! A browser reports a selection as two `(node, offset)` anchors. The overlay
//! renders its content as a flat run of text leaves, so mapping the anchors
//! back to content indices is a single in-order walk over those leaves that
//! accumulates their lengths.
//!
//! Tree access goes through [`TextTree`], so the walk runs the same against
//! the live DOM (see `dom` on wasm32) and against an in-memory [`LeafList`].
//!
//! Offsets and lengths are counted in UTF-16 code units, which is what DOM
//! ranges use.

use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;
use std::ops::Range;

/// Which end of a selection an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSide {
	Start,
	End,
}

impl fmt::Display for AnchorSide {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AnchorSide::Start => f.write_str("start"),
			AnchorSide::End => f.write_str("end"),
		}
	}
}

/// Failure while mapping a selection onto content indices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
	/// The tree could not be walked
	#[error("failed to walk text leaves: {0}")]
	Traversal(String),

	/// An anchor offset points past the end of its leaf
	#[error("{side} anchor offset {offset} exceeds leaf length {len}")]
	OffsetOutOfBounds {
		side: AnchorSide,
		offset: usize,
		len: usize,
	},

	/// An anchor node is not one of the text leaves under the root
	#[error("{0} anchor is not a text leaf under the root")]
	AnchorNotFound(AnchorSide),

	/// The end anchor was reached before the start anchor
	#[error("end anchor precedes start anchor")]
	EndBeforeStart,
}

/// A text-bearing leaf and its length in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLeaf<N> {
	pub node: N,
	pub len: usize,
}

/// One end of a selection: a node and an offset inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor<N> {
	pub node: N,
	pub offset: usize,
}

impl<N> Anchor<N> {
	pub fn new(node: N, offset: usize) -> Self {
		Self { node, offset }
	}
}

/// A selection range, normalized so `start` precedes `end` in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRange<N> {
	pub start: Anchor<N>,
	pub end: Anchor<N>,
	/// Deepest node containing both anchors
	pub common_ancestor: N,
	/// True when the range selects nothing
	pub collapsed: bool,
}

/// Ordered access to the text leaves under a root container.
pub trait TextTree {
	type Node;

	/// Text leaves under the root in document order.
	fn text_leaves(&self) -> impl Iterator<Item = Result<TextLeaf<Self::Node>, SelectionError>> + '_;

	/// Whether `node` is the root or one of its descendants.
	fn contains(&self, node: &Self::Node) -> bool;

	/// Node identity.
	fn same_node(&self, a: &Self::Node, b: &Self::Node) -> bool;
}

/// Set of selected content indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedIndexSet {
	indices: BTreeSet<usize>,
}

impl SelectedIndexSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Every index in `range`.
	pub fn from_range(range: Range<usize>) -> Self {
		Self {
			indices: range.collect(),
		}
	}

	pub fn contains(&self, index: usize) -> bool {
		self.indices.contains(&index)
	}

	pub fn len(&self) -> usize {
		self.indices.len()
	}

	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}

	pub fn clear(&mut self) {
		self.indices.clear();
	}

	/// Indices in ascending order.
	pub fn iter(&self) -> btree_set::Iter<'_, usize> {
		self.indices.iter()
	}
}

impl FromIterator<usize> for SelectedIndexSet {
	fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
		Self {
			indices: iter.into_iter().collect(),
		}
	}
}

impl<'a> IntoIterator for &'a SelectedIndexSet {
	type Item = &'a usize;
	type IntoIter = btree_set::Iter<'a, usize>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Maps a selection onto the content indices it covers.
///
/// Returns an empty set for collapsed selections and for selections whose
/// common ancestor lies outside `root`. The result is clamped to
/// `[0, content_length)`.
///
/// # Errors
///
/// Returns a [`SelectionError`] if the walk fails or an anchor cannot be
/// resolved to a position under `root`.
///
/// # Examples
///
/// ```
/// use blockscript_pages::selection::{LeafList, try_compute_selected_indices};
///
/// let tree = LeafList::per_char("AB");
/// let selection = tree.range((0, 0), (0, 1));
///
/// let selected = try_compute_selected_indices(&tree, &selection, 2).unwrap();
/// assert_eq!(selected.iter().copied().collect::<Vec<_>>(), vec![0]);
/// ```
pub fn try_compute_selected_indices<T: TextTree>(
	root: &T,
	selection: &SelectionRange<T::Node>,
	content_length: usize,
) -> Result<SelectedIndexSet, SelectionError> {
	if selection.collapsed || !root.contains(&selection.common_ancestor) {
		return Ok(SelectedIndexSet::new());
	}

	let mut running = 0usize;
	let mut start = None;
	let mut end = None;

	for leaf in root.text_leaves() {
		let leaf = leaf?;

		if start.is_none() && root.same_node(&leaf.node, &selection.start.node) {
			start = Some(running + offset_within(&selection.start, leaf.len, AnchorSide::Start)?);
		}

		if root.same_node(&leaf.node, &selection.end.node) {
			if start.is_none() {
				return Err(SelectionError::EndBeforeStart);
			}
			end = Some(running + offset_within(&selection.end, leaf.len, AnchorSide::End)?);
			break;
		}

		running += leaf.len;
	}

	let start = start.ok_or(SelectionError::AnchorNotFound(AnchorSide::Start))?;
	let end = end.ok_or(SelectionError::AnchorNotFound(AnchorSide::End))?;

	Ok(SelectedIndexSet::from_range(start..end.min(content_length)))
}

/// Like [`try_compute_selected_indices`], but never fails.
///
/// Errors are logged and turned into an empty set, which clears the
/// highlighting instead of breaking the caller.
pub fn compute_selected_indices<T: TextTree>(
	root: &T,
	selection: &SelectionRange<T::Node>,
	content_length: usize,
) -> SelectedIndexSet {
	match try_compute_selected_indices(root, selection, content_length) {
		Ok(selected) => selected,
		Err(error) => {
			tracing::warn!(%error, "failed to map selection; clearing highlight");
			SelectedIndexSet::new()
		}
	}
}

fn offset_within<N>(anchor: &Anchor<N>, len: usize, side: AnchorSide) -> Result<usize, SelectionError> {
	if anchor.offset > len {
		return Err(SelectionError::OffsetOutOfBounds {
			side,
			offset: anchor.offset,
			len,
		});
	}
	Ok(anchor.offset)
}

/// UTF-16 length of a string, the unit DOM offsets are expressed in.
pub fn utf16_len(text: &str) -> usize {
	text.chars().map(char::len_utf16).sum()
}

/// Node in a [`LeafList`]. `NodeId(0)` is the root container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// In-memory [`TextTree`]: a root container holding a flat list of text leaves.
///
/// This mirrors what the overlay renders, one leaf per character, and is used
/// server-side and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafList {
	texts: Vec<String>,
}

impl LeafList {
	pub fn new<I, S>(texts: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			texts: texts.into_iter().map(Into::into).collect(),
		}
	}

	/// One leaf per character of `content`.
	pub fn per_char(content: &str) -> Self {
		Self::new(content.chars().map(String::from))
	}

	pub fn root(&self) -> NodeId {
		NodeId(0)
	}

	/// Node of the leaf at position `i`.
	pub fn leaf(&self, i: usize) -> NodeId {
		NodeId(i + 1)
	}

	pub fn len(&self) -> usize {
		self.texts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.texts.is_empty()
	}

	/// Builds a normalized range between two `(leaf, offset)` positions.
	///
	/// The common ancestor is the leaf itself when both anchors share it and
	/// the root otherwise; the range is collapsed when both positions resolve
	/// to the same flat offset.
	pub fn range(&self, start: (usize, usize), end: (usize, usize)) -> SelectionRange<NodeId> {
		let common_ancestor = if start.0 == end.0 {
			self.leaf(start.0)
		} else {
			self.root()
		};
		SelectionRange {
			start: Anchor::new(self.leaf(start.0), start.1),
			end: Anchor::new(self.leaf(end.0), end.1),
			common_ancestor,
			collapsed: self.flat_offset(start) == self.flat_offset(end),
		}
	}

	fn flat_offset(&self, (leaf, offset): (usize, usize)) -> usize {
		self.texts.iter().take(leaf).map(|t| utf16_len(t)).sum::<usize>() + offset
	}
}

impl TextTree for LeafList {
	type Node = NodeId;

	fn text_leaves(&self) -> impl Iterator<Item = Result<TextLeaf<NodeId>, SelectionError>> + '_ {
		self.texts.iter().enumerate().map(|(i, text)| {
			Ok(TextLeaf {
				node: NodeId(i + 1),
				len: utf16_len(text),
			})
		})
	}

	fn contains(&self, node: &NodeId) -> bool {
		node.0 <= self.texts.len()
	}

	fn same_node(&self, a: &NodeId, b: &NodeId) -> bool {
		a == b
	}
}
