//! Shared helpers for cross-crate integration tests.

use std::sync::Arc;

use blockscript::http::{MiddlewareChain, Request, Response, handler_fn};
use blockscript::middleware::ConditionalCacheMiddleware;
use blockscript::pages::{OverlayProps, SelectedIndexSet, render_overlay_html};

/// Props of the overlay served by [`overlay_app`].
pub fn overlay_props() -> OverlayProps {
	OverlayProps::new("gm <3")
		.with_background_image("/static/bg.png")
		.with_tx_hash("0x5f1d")
}

/// Markup [`overlay_app`] serves for every request.
pub fn overlay_html() -> String {
	render_overlay_html(&overlay_props(), &SelectedIndexSet::new())
}

/// A handler serving [`overlay_html`] behind the conditional cache.
pub fn overlay_app() -> MiddlewareChain {
	let handler = Arc::new(handler_fn(|_request: Request| async {
		Ok(Response::ok()
			.with_header("content-type", "text/html; charset=utf-8")
			.with_body(overlay_html()))
	}));
	MiddlewareChain::new(handler).with_middleware(Arc::new(ConditionalCacheMiddleware::new()))
}
