use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Commands longer than this are a protocol error; the connection is
/// closed.
pub const MAX_LINE_LEN: usize = 64 * 1024;

fn line_too_long() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "line too long")
}

/// Reads one `\n`-terminated record, without the terminator. Framing is on
/// `\n` alone: a `\r` before it stays in the line and later falls out as
/// token whitespace. Returns `None` on EOF; an unterminated trailing
/// fragment is dropped with the connection.
pub async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(None);
        }
        if let Some(pos) = chunk.iter().position(|&b| b == b'\n') {
            if buf.len().saturating_add(pos) > MAX_LINE_LEN {
                return Err(line_too_long());
            }
            buf.extend_from_slice(&chunk[..pos]);
            reader.consume(pos + 1);
            break;
        }
        if buf.len().saturating_add(chunk.len()) > MAX_LINE_LEN {
            return Err(line_too_long());
        }
        let take = chunk.len();
        buf.extend_from_slice(chunk);
        reader.consume(take);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Splits a request line into whitespace-separated tokens. No quoting.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}
