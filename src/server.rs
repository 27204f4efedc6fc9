use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error};

use crate::commands;
use crate::protocol;
use crate::store::SharedKeyspace;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Accepts connections forever, spawning one task per client. Pair with a
/// `select!` against a shutdown signal to terminate.
pub async fn run(listener: TcpListener, store: SharedKeyspace) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted connection");
                tokio::spawn(handle_connection(stream, store.clone()));
            }
            Err(e) => error!(?e, "accept error"),
        }
    }
}

pub async fn handle_connection(stream: TcpStream, store: SharedKeyspace) {
    let client_id = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed);
    // Disable Nagle: send replies immediately rather than waiting to coalesce
    // small writes.
    let _ = stream.set_nodelay(true);
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::with_capacity(64 * 1024, read_half);
    // BufWriter accumulates replies; we flush only when no more pipelined
    // commands are buffered, collapsing N pipelined writes into one syscall.
    let mut writer = BufWriter::with_capacity(64 * 1024, write_half);
    loop {
        match protocol::read_line(&mut reader).await {
            Ok(None) => break,
            Ok(Some(line)) => {
                let reply = {
                    let mut ks = store.write().await;
                    commands::execute(&line, &mut ks)
                };
                // Blank lines get no reply, but may still need to flush
                // replies buffered before them.
                let Some(reply) = reply else {
                    if reader.buffer().is_empty() && writer.flush().await.is_err() {
                        break;
                    }
                    continue;
                };
                if writer.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
                if writer.write_all(b"\n").await.is_err() {
                    break;
                }
                // Only flush when the read buffer is drained: pipelined
                // commands share a flush.
                if reader.buffer().is_empty() && writer.flush().await.is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!(client_id, error = %e, "protocol error, closing connection");
                break;
            }
        }
    }
    debug!(client_id, "connection closed");
}
