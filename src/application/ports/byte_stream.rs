use std::io;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::{self, BoxStream};

/// Owned chunked byte stream passed between the client, the store and HTTP bodies.
pub type ByteStream = BoxStream<'static, Result<Bytes, io::Error>>;

pub fn single_chunk(data: Bytes) -> ByteStream {
    stream::once(async move { Ok(data) }).boxed()
}

/// Drains a stream into one buffer.
pub async fn collect_bytes(mut stream: ByteStream) -> Result<Bytes, io::Error> {
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(Bytes::from(buf))
}
