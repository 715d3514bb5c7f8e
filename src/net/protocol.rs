//! Wire protocol framing.
//!
//! One request per connection: the query bytes, terminated by a
//! newline, a peer half-close, or the request buffer filling up.
//! Trailing `\n`, `\r`, and NUL padding bytes are stripped to
//! recover the literal query; interior whitespace is preserved and
//! significant. The response is a single newline-terminated verdict
//! line, after which the server closes the connection. The client
//! applies the same convention when sending.

use tokio::io::{AsyncRead, AsyncReadExt};

/// Raw request frame as read off the socket
#[derive(Debug, PartialEq, Eq)]
pub enum RawRequest {
    /// Query bytes up to (excluding) the terminator
    Frame(Vec<u8>),

    /// The buffer filled without a terminator; rejected, never
    /// truncated and compared
    Oversized,

    /// Peer closed before sending any bytes
    Disconnected,
}

/// Read one request frame, at most `max_bytes` of payload.
///
/// Returns when a newline arrives, the peer half-closes, or the
/// buffer is full. Bytes following the first newline are ignored.
pub async fn read_request<S>(stream: &mut S, max_bytes: usize) -> std::io::Result<RawRequest>
where
    S: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; max_bytes];
    let mut filled = 0usize;

    loop {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;

        if buf[..filled].contains(&b'\n') {
            break;
        }
        if filled == max_bytes {
            return Ok(RawRequest::Oversized);
        }
    }

    if filled == 0 {
        return Ok(RawRequest::Disconnected);
    }

    let end = buf[..filled]
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(filled);
    buf.truncate(end);
    Ok(RawRequest::Frame(buf))
}

/// Strip trailing terminator and padding bytes from a frame.
pub fn strip_padding(frame: &[u8]) -> &[u8] {
    let mut end = frame.len();
    while end > 0 && matches!(frame[end - 1], b'\0' | b'\r' | b'\n') {
        end -= 1;
    }
    &frame[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    async fn read_from(bytes: &[u8], max: usize) -> RawRequest {
        let mut cursor = Cursor::new(bytes.to_vec());
        read_request(&mut cursor, max).await.unwrap()
    }

    #[tokio::test]
    async fn test_newline_terminated_request() {
        let req = read_from(b"apple\n", 1024).await;
        assert_eq!(req, RawRequest::Frame(b"apple".to_vec()));
    }

    #[tokio::test]
    async fn test_half_close_terminated_request() {
        // No newline; EOF ends the frame
        let req = read_from(b"apple", 1024).await;
        assert_eq!(req, RawRequest::Frame(b"apple".to_vec()));
    }

    #[tokio::test]
    async fn test_bytes_after_newline_ignored() {
        let req = read_from(b"apple\nbanana\n", 1024).await;
        assert_eq!(req, RawRequest::Frame(b"apple".to_vec()));
    }

    #[tokio::test]
    async fn test_empty_connection_is_disconnect() {
        let req = read_from(b"", 1024).await;
        assert_eq!(req, RawRequest::Disconnected);
    }

    #[tokio::test]
    async fn test_bare_newline_is_empty_frame() {
        let req = read_from(b"\n", 1024).await;
        assert_eq!(req, RawRequest::Frame(Vec::new()));
    }

    #[tokio::test]
    async fn test_oversized_request_rejected() {
        let payload = vec![b'x'; 1024];
        let req = read_from(&payload, 1024).await;
        assert_eq!(req, RawRequest::Oversized);
    }

    #[tokio::test]
    async fn test_exactly_full_buffer_with_terminator_accepted() {
        let mut payload = vec![b'x'; 1023];
        payload.push(b'\n');
        let req = read_from(&payload, 1024).await;
        assert_eq!(req, RawRequest::Frame(vec![b'x'; 1023]));
    }

    #[test]
    fn test_strip_padding_nul_and_crlf() {
        assert_eq!(strip_padding(b"apple\r"), b"apple");
        assert_eq!(strip_padding(b"apple\0\0\0"), b"apple");
        assert_eq!(strip_padding(b"apple\0\0\r\n"), b"apple");
        assert_eq!(strip_padding(b"apple"), b"apple");
    }

    #[test]
    fn test_strip_padding_preserves_interior_bytes() {
        assert_eq!(strip_padding(b"  two words  \0"), b"  two words  ");
        assert_eq!(strip_padding(b"a\0b"), b"a\0b");
        assert_eq!(strip_padding(b""), b"");
    }
}
