//! Bidirectional byte relay for upgraded connections.
//!
//! Each direction is copied in order with an explicit flush per chunk. When
//! one direction ends, its write side is shut down and the other direction
//! gets `grace` to finish before both halves are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Buffer size for relay operations (32KB)
const RELAY_BUFFER_SIZE: usize = 32 * 1024;

/// Byte counts for a finished relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub client_to_upstream: u64,
    pub upstream_to_client: u64,
}

/// Copy until EOF or error, then shut down the writer.
async fn pump<R, W>(mut reader: R, mut writer: W, total: &AtomicU64)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; RELAY_BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        if writer.write_all(&buf[..n]).await.is_err() {
            break;
        }
        if writer.flush().await.is_err() {
            break;
        }
        total.fetch_add(n as u64, Ordering::Relaxed);
    }
    let _ = writer.shutdown().await;
}

/// Relay bytes between client and upstream until both sides finish, or one
/// side finishes and the other exceeds `grace`.
pub async fn relay<C, U>(client: C, upstream: U, grace: Duration) -> RelayStats
where
    C: AsyncRead + AsyncWrite,
    U: AsyncRead + AsyncWrite,
{
    let (client_read, client_write) = tokio::io::split(client);
    let (upstream_read, upstream_write) = tokio::io::split(upstream);

    let sent = AtomicU64::new(0);
    let received = AtomicU64::new(0);

    let upload = pump(client_read, upstream_write, &sent);
    let download = pump(upstream_read, client_write, &received);
    tokio::pin!(upload, download);

    tokio::select! {
        _ = &mut upload => {
            if tokio::time::timeout(grace, &mut download).await.is_err() {
                tracing::debug!("Upstream kept streaming past close grace; dropping relay");
            }
        }
        _ = &mut download => {
            if tokio::time::timeout(grace, &mut upload).await.is_err() {
                tracing::debug!("Client kept streaming past close grace; dropping relay");
            }
        }
    }

    RelayStats {
        client_to_upstream: sent.load(Ordering::Relaxed),
        upstream_to_client: received.load(Ordering::Relaxed),
    }
}
