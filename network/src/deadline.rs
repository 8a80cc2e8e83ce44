//! One read at a time, raced against a timer.
//!
//! Whichever of the read and the timer finishes first decides the outcome.
//! The other future is dropped on the spot, so a read that completes after the
//! deadline is never observed.

use std::{future::Future, time::Duration};

use bytes::BytesMut;
use log::{debug, trace};
use protocol::{hex, ping::frame_complete, DecodingError};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    select, time,
};

use crate::{channel::DatagramChannel, Error};

/// Largest payload a UDP datagram over IPv4 can carry.
pub const MAX_DATAGRAM_SIZE: usize = 65507;

/// Upper bound for a single stream response.
pub const MAX_STREAM_SIZE: usize = 1024 * 1024;

const READ_CHUNK: usize = 4096;

/// When a stream read has seen enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Stop as soon as this byte has been read.
    Terminator(u8),
    /// Stop once a complete var-int length-prefixed frame is buffered.
    Frame,
}

impl Completion {
    fn is_complete(self, buffer: &[u8], fresh: usize) -> bool {
        match self {
            Completion::Terminator(byte) => buffer[buffer.len() - fresh..].contains(&byte),
            Completion::Frame => frame_complete(buffer),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamLimits {
    pub max_bytes: usize,
    pub completion: Completion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatagramLimits {
    pub min_bytes: usize,
    pub max_bytes: usize,
}

/// Runs `operation` unless `deadline` elapses first, in which case it is
/// dropped and [`Error::Timeout`] is returned.
pub async fn with_deadline<T, F>(deadline: Duration, operation: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    select! {
        biased;
        result = operation => result,
        _ = time::sleep(deadline) => {
            trace!("deadline of {deadline:?} elapsed");
            Err(Error::Timeout(deadline))
        }
    }
}

/// Reads until the completion condition holds, the peer closes the stream or
/// `max_bytes` have been read. EOF is not an error, the bytes read so far are
/// returned.
pub async fn read_stream_with_deadline<R>(
    reader: &mut R,
    limits: StreamLimits,
    deadline: Duration,
) -> Result<BytesMut, Error>
where
    R: AsyncRead + Unpin,
{
    with_deadline(deadline, read_stream(reader, limits)).await
}

async fn read_stream<R>(reader: &mut R, limits: StreamLimits) -> Result<BytesMut, Error>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::new();
    let mut chunk = [0u8; READ_CHUNK];

    while buffer.len() < limits.max_bytes {
        let want = READ_CHUNK.min(limits.max_bytes - buffer.len());
        let read = reader.read(&mut chunk[..want]).await.map_err(Error::Read)?;
        if read == 0 {
            trace!("stream closed after {} bytes", buffer.len());
            break;
        }

        buffer.extend_from_slice(&chunk[..read]);
        if limits.completion.is_complete(&buffer, read) {
            break;
        }
    }

    trace!("received {} bytes: {}", buffer.len(), hex(&buffer));
    Ok(buffer)
}

/// Receives exactly one datagram. Fewer than `min_bytes` is a truncated
/// response.
pub async fn recv_datagram_with_deadline<C>(
    channel: &mut C,
    limits: DatagramLimits,
    deadline: Duration,
) -> Result<Vec<u8>, Error>
where
    C: DatagramChannel,
{
    recv_reply_with_deadline(channel, limits, deadline, |_| true).await
}

/// Receives datagrams until one passes `is_reply`, dropping the rest. The
/// deadline covers the whole wait, not each datagram.
pub async fn recv_reply_with_deadline<C, F>(
    channel: &mut C,
    limits: DatagramLimits,
    deadline: Duration,
    is_reply: F,
) -> Result<Vec<u8>, Error>
where
    C: DatagramChannel,
    F: Fn(&[u8]) -> bool,
{
    with_deadline(deadline, async move {
        let mut buffer = vec![0u8; limits.max_bytes];
        loop {
            let read = channel.recv(&mut buffer).await.map_err(Error::Read)?;
            let datagram = &buffer[..read];
            trace!("received datagram: {}", hex(datagram));

            if !is_reply(datagram) {
                debug!("dropping stray datagram of {read} bytes");
                continue;
            }

            if read < limits.min_bytes {
                return Err(Error::Decode(DecodingError::TruncatedResponse {
                    expected: limits.min_bytes,
                    actual: read,
                }));
            }

            buffer.truncate(read);
            return Ok(buffer);
        }
    })
    .await
}
