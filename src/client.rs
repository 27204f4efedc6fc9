use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{info, warn};

use crate::cli::ClientArgs;

/// Interactive client: stdin lines go to the server, server lines go to
/// stdout as they arrive (multi-line replies print naturally). Exits on
/// stdin EOF, Ctrl-C, or when the server closes the connection.
pub async fn run(args: ClientArgs) -> Result<()> {
    let addr = format!("{}:{}", args.host, args.port);
    let stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("failed to connect to {addr}"))?;
    info!("connected to {addr}");

    let (read_half, mut writer) = stream.into_split();
    let mut server_lines = BufReader::new(read_half).lines();
    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = server_lines.next_line() => {
                match line? {
                    Some(line) => println!("{line}"),
                    None => {
                        eprintln!("server closed the connection");
                        break;
                    }
                }
            }
            line = stdin_lines.next_line() => {
                match line? {
                    Some(line) => {
                        writer.write_all(line.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                    }
                    None => break,
                }
            }
            ctrl_c = tokio::signal::ctrl_c() => {
                if let Err(e) = ctrl_c {
                    warn!(?e, "ctrl-c handler failed");
                }
                break;
            }
        }
    }

    if let Err(e) = writer.shutdown().await {
        warn!(?e, "failed to shut down the connection cleanly");
    }
    Ok(())
}
