//! File transfers, which are limited by how long they go without data rather
//! than by their total duration.

use crate::errors::{check, UfdlError};
use bytes::{Bytes, BytesMut};
use camino::Utf8Path;
use futures::{Stream, StreamExt};
use reqwest_middleware::RequestBuilder;
use std::future::Future;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Send a download request and wait for a successful response.
async fn send(req: RequestBuilder, idle: Duration) -> Result<reqwest::Response, UfdlError> {
    let res = within(idle, req.send()).await??;
    check(res).await
}

/// Download the whole response body into memory.
pub(crate) async fn receive(req: RequestBuilder, idle: Duration) -> Result<Bytes, UfdlError> {
    let mut stream = Box::pin(send(req, idle).await?.bytes_stream());
    let mut body = BytesMut::new();
    while let Some(chunk) = next_chunk(&mut stream, idle).await? {
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Write the response body to `dst`, returning the number of bytes written.
pub(crate) async fn receive_to(
    req: RequestBuilder,
    idle: Duration,
    dst: &Utf8Path,
) -> Result<u64, UfdlError> {
    let mut stream = Box::pin(send(req, idle).await?.bytes_stream());
    let mut file = fs_err::tokio::File::create(dst.as_std_path()).await?;
    let mut written = 0;
    while let Some(chunk) = next_chunk(&mut stream, idle).await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

async fn next_chunk<S>(stream: &mut S, idle: Duration) -> Result<Option<Bytes>, UfdlError>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    Ok(within(idle, stream.next()).await?.transpose()?)
}

async fn within<F: Future>(idle: Duration, future: F) -> Result<F::Output, UfdlError> {
    tokio::time::timeout(idle, future)
        .await
        .map_err(|_| UfdlError::Stalled(idle))
}
