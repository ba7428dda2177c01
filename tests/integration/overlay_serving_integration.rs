//! Serving a rendered overlay through the conditional cache.

use blockscript::http::{Handler, MiddlewareChain, Request};
use blockscript::middleware::{DEFAULT_CACHE_CONTROL, Validator};
use blockscript_integration_tests::{overlay_app, overlay_html};
use hyper::StatusCode;
use hyper::header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH};
use rstest::{fixture, rstest};

#[fixture]
fn app() -> MiddlewareChain {
	overlay_app()
}

#[rstest]
#[tokio::test]
async fn test_overlay_is_tagged_with_its_content_hash(app: MiddlewareChain) {
	let response = app.handle(Request::get("/overlay")).await.unwrap();

	let expected = overlay_html();
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(
		response.headers.get(ETAG).unwrap().to_str().unwrap(),
		Validator::of(expected.as_bytes()).as_str()
	);
	assert_eq!(
		response.headers.get(CACHE_CONTROL).unwrap().to_str().unwrap(),
		DEFAULT_CACHE_CONTROL
	);
	assert_eq!(response.headers.get("content-type").unwrap(), "text/html; charset=utf-8");
	assert_eq!(response.body.as_bytes().unwrap().as_ref(), expected.as_bytes());
}

#[rstest]
#[tokio::test]
async fn test_revalidation_returns_not_modified(app: MiddlewareChain) {
	let first = app.handle(Request::get("/overlay")).await.unwrap();
	let etag = first.headers.get(ETAG).unwrap().to_str().unwrap().to_string();

	let request = Request::builder()
		.uri("/overlay")
		.header(IF_NONE_MATCH, etag.clone())
		.build()
		.unwrap();
	let second = app.handle(request).await.unwrap();

	assert_eq!(second.status, StatusCode::NOT_MODIFIED);
	assert!(second.body.is_absent());
	assert_eq!(second.headers.get(ETAG).unwrap().to_str().unwrap(), etag);
}

#[rstest]
#[tokio::test]
async fn test_rendering_is_stable_across_requests(app: MiddlewareChain) {
	let first = app.handle(Request::get("/overlay")).await.unwrap();
	let second = app.handle(Request::get("/overlay")).await.unwrap();

	assert_eq!(first.headers.get(ETAG), second.headers.get(ETAG));
}
