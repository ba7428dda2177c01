//! Single-pass body buffering.
//!
//! The body is read once. On success the caller gets the bytes and their
//! validator; on failure it gets back a body that replays everything already
//! read followed by the untouched remainder of the original stream.

use blockscript_http::{Body, BoxError, StreamBody};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt};

use crate::error::HashComputationError;
use crate::etag::{Validator, ValidatorHasher};

pub(crate) struct Drained {
	pub(crate) bytes: Bytes,
	pub(crate) validator: Validator,
}

pub(crate) struct DrainFailure {
	pub(crate) error: HashComputationError,
	pub(crate) body: Body,
}

pub(crate) async fn drain_and_hash(
	body: Body,
	limit: Option<usize>,
) -> Result<Drained, DrainFailure> {
	match body {
		Body::Empty => Ok(Drained {
			validator: Validator::of(&[]),
			bytes: Bytes::new(),
		}),
		Body::Full(bytes) => {
			if let Some(limit) = limit
				&& bytes.len() > limit
			{
				return Err(DrainFailure {
					error: HashComputationError::TooLarge { limit },
					body: Body::Full(bytes),
				});
			}
			Ok(Drained {
				validator: Validator::of(&bytes),
				bytes,
			})
		}
		Body::Stream(stream) => drain_stream(stream, limit).await,
	}
}

async fn drain_stream(mut stream: StreamBody, limit: Option<usize>) -> Result<Drained, DrainFailure> {
	let mut chunks: Vec<Bytes> = Vec::new();
	let mut hasher = ValidatorHasher::new();

	while let Some(item) = stream.next().await {
		match item {
			Ok(chunk) => {
				if let Some(limit) = limit
					&& hasher.len() + chunk.len() > limit
				{
					chunks.push(chunk);
					return Err(DrainFailure {
						error: HashComputationError::TooLarge { limit },
						body: replay(chunks, None, stream),
					});
				}
				hasher.update(&chunk);
				chunks.push(chunk);
			}
			Err(err) => {
				return Err(DrainFailure {
					error: HashComputationError::Stream(err.to_string()),
					body: replay(chunks, Some(err), stream),
				});
			}
		}
	}

	let mut buffer = BytesMut::with_capacity(hasher.len());
	for chunk in &chunks {
		buffer.extend_from_slice(chunk);
	}

	Ok(Drained {
		bytes: buffer.freeze(),
		validator: hasher.finish(),
	})
}

fn replay(chunks: Vec<Bytes>, error: Option<BoxError>, rest: StreamBody) -> Body {
	let consumed = chunks
		.into_iter()
		.map(Ok)
		.chain(error.map(Err))
		.collect::<Vec<Result<Bytes, BoxError>>>();
	Body::from_stream(stream::iter(consumed).chain(rest))
}
