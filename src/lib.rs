//! # Blockscript
//!
//! Text overlays whose characters light up as the reader selects them, served
//! behind content-addressed HTTP caching.
//!
//! ## Feature Flags
//!
//! - `full` (default) - everything below
//! - `middleware` - [`ConditionalCacheMiddleware`](middleware::ConditionalCacheMiddleware):
//!   strong SHA-256 ETags and `304 Not Modified` revalidation
//! - `pages` - the selection-highlighting overlay: index reconciliation,
//!   coalesced recomputation and character rendering
//!
//! The HTTP primitives in [`http`] are always available.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use blockscript::http::{Handler, MiddlewareChain, Request, Response, handler_fn};
//! use blockscript::middleware::ConditionalCacheMiddleware;
//! use blockscript::pages::{OverlayProps, SelectedIndexSet, render_overlay_html};
//!
//! let overlay = Arc::new(handler_fn(|_request: Request| async {
//!     let html = render_overlay_html(&OverlayProps::new("gm"), &SelectedIndexSet::new());
//!     Ok(Response::ok().with_header("content-type", "text/html").with_body(html))
//! }));
//! let app = MiddlewareChain::new(overlay)
//!     .with_middleware(Arc::new(ConditionalCacheMiddleware::new()));
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let response = runtime.block_on(app.handle(Request::get("/"))).unwrap();
//! assert_eq!(response.status.as_u16(), 200);
//! ```

pub use blockscript_http as http;

#[cfg(feature = "middleware")]
pub use blockscript_middleware as middleware;

#[cfg(feature = "pages")]
pub use blockscript_pages as pages;

/// Commonly used types.
pub mod prelude {
	pub use blockscript_http::{Body, Handler, Middleware, MiddlewareChain, Request, Response};

	#[cfg(feature = "middleware")]
	pub use blockscript_middleware::{ConditionalCacheConfig, ConditionalCacheMiddleware};

	#[cfg(feature = "pages")]
	pub use blockscript_pages::{
		BlockscriptStyle, OverlayProps, SelectedIndexSet, SelectionHighlighter,
		compute_selected_indices, render_overlay_html,
	};
}
