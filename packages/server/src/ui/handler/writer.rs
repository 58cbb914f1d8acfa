//! Outbound half of a connection.
//!
//! Drains the session queue into the socket so that a slow peer never blocks
//! the tasks that push to it.

use std::time::Duration;

use bytes::Bytes;
use tokio::{
    io::AsyncWriteExt,
    net::tcp::OwnedWriteHalf,
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::domain::SessionId;

/// Time allowed to flush queued frames once the session is closing
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

pub(super) struct WriterTask {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl WriterTask {
    /// Start writing frames from `outbound` to `writer`.
    ///
    /// A write error cancels `failure`, which is the session's own token.
    pub(super) fn spawn(
        session_id: SessionId,
        writer: OwnedWriteHalf,
        outbound: mpsc::Receiver<Bytes>,
        failure: CancellationToken,
    ) -> Self {
        let stop = CancellationToken::new();
        let handle = tokio::spawn(write_loop(
            session_id,
            writer,
            outbound,
            stop.clone(),
            failure,
        ));
        Self { stop, handle }
    }

    /// Flush what is already queued, then close the write half
    pub(super) async fn finish(self) {
        self.stop.cancel();
        let mut handle = self.handle;
        match tokio::time::timeout(FLUSH_TIMEOUT, &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Writer task failed: {}", e),
            Err(_) => {
                tracing::warn!("Writer did not flush within {:?}, aborting", FLUSH_TIMEOUT);
                handle.abort();
            }
        }
    }
}

async fn write_loop(
    session_id: SessionId,
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::Receiver<Bytes>,
    stop: CancellationToken,
    failure: CancellationToken,
) {
    if let Err(e) = drain(&mut writer, &mut outbound, &stop).await {
        tracing::debug!("Session {} write failed: {}", session_id, e);
        failure.cancel();
        return;
    }
    if let Err(e) = writer.shutdown().await {
        tracing::debug!("Session {} shutdown failed: {}", session_id, e);
    }
}

async fn drain(
    writer: &mut OwnedWriteHalf,
    outbound: &mut mpsc::Receiver<Bytes>,
    stop: &CancellationToken,
) -> std::io::Result<()> {
    loop {
        tokio::select! {
            biased;
            frame = outbound.recv() => match frame {
                Some(frame) => writer.write_all(&frame).await?,
                None => return Ok(()),
            },
            _ = stop.cancelled() => {
                while let Ok(frame) = outbound.try_recv() {
                    writer.write_all(&frame).await?;
                }
                return Ok(());
            }
        }
    }
}
