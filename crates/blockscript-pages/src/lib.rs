//! Blockscript Pages - selection-aware text overlay
//!
//! Renders a piece of text one character per span and highlights the
//! characters covered by the user's selection.
//!
//! ## Architecture
//!
//! - [`selection`]: maps a selection range onto content indices
//! - [`schedule`]: deferred, cancellable tasks and the [`Coalescer`](schedule::Coalescer)
//! - [`highlight`]: per-instance selection state with coalesced recomputation
//! - [`render`]: character styling and overlay markup
//! - `dom`: browser bindings (wasm32 only)
//!
//! ## Example
//!
//! ```
//! use blockscript_pages::{LeafList, MicrotaskQueue, SelectionHighlighter, SelectionRange, SelectionSource};
//!
//! struct Fixed(LeafList);
//!
//! impl SelectionSource for Fixed {
//!     type Tree = LeafList;
//!
//!     fn root(&self) -> Option<LeafList> {
//!         Some(self.0.clone())
//!     }
//!
//!     fn selection(&self) -> Option<SelectionRange<blockscript_pages::selection::NodeId>> {
//!         Some(self.0.range((0, 0), (0, 1)))
//!     }
//! }
//!
//! let queue = MicrotaskQueue::new();
//! let mut highlighter = SelectionHighlighter::new("AB", Fixed(LeafList::per_char("AB")), queue.clone());
//! highlighter.mount();
//! highlighter.notify_selection_change();
//! queue.run_until_idle();
//!
//! assert!(highlighter.selected().contains(0));
//! assert!(!highlighter.selected().contains(1));
//! ```

pub mod highlight;
pub mod render;
pub mod schedule;
pub mod selection;

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub mod dom;

pub use highlight::{SelectionHighlighter, SelectionSource};
pub use render::{BlockscriptStyle, Character, OverlayProps, characters, render_overlay_html};
pub use schedule::{Coalescer, MicrotaskQueue, Scheduler, TaskHandle};
pub use selection::{
	Anchor, LeafList, SelectedIndexSet, SelectionError, SelectionRange, TextLeaf, TextTree,
	compute_selected_indices, try_compute_selected_indices,
};

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub use schedule::LocalTaskScheduler;

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use dom::OverlayBinding;
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use schedule::TimeoutScheduler;
