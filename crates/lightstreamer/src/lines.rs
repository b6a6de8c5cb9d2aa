use bytes::{Buf, BytesMut};
use futures::{Stream, StreamExt};

/// Splits a chunked byte stream into CRLF (or LF) terminated lines.
pub struct LineReader<S> {
    inner: S,
    buffer: BytesMut,
    finished: bool,
}

impl<S, B, E> LineReader<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: BytesMut::new(),
            finished: false,
        }
    }

    /// Next complete line without its terminator. A trailing fragment without
    /// newline is returned once the stream ends. Invalid UTF-8 is replaced.
    pub async fn next_line(&mut self) -> Result<Option<String>, E> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
                let mut line = self.buffer.split_to(pos);
                self.buffer.advance(1);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            if self.finished {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let rest = self.buffer.split();
                return Ok(Some(String::from_utf8_lossy(&rest).into_owned()));
            }

            match self.inner.next().await {
                Some(chunk) => self.buffer.extend_from_slice(chunk?.as_ref()),
                None => self.finished = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::stream;

    fn reader(chunks: Vec<&'static str>) -> LineReader<impl Stream<Item = Result<&'static [u8], ()>> + Unpin> {
        LineReader::new(stream::iter(
            chunks.into_iter().map(|c| Ok::<_, ()>(c.as_bytes())),
        ))
    }

    #[test]
    fn lines_split_across_chunks() {
        let mut lines = reader(vec!["CONOK,S1,500", "00,5000,*\r\nPRO", "BE\r\nU,1,1,a\n"]);
        block_on(async {
            assert_eq!(lines.next_line().await, Ok(Some("CONOK,S1,50000,5000,*".into())));
            assert_eq!(lines.next_line().await, Ok(Some("PROBE".into())));
            assert_eq!(lines.next_line().await, Ok(Some("U,1,1,a".into())));
            assert_eq!(lines.next_line().await, Ok(None));
        });
    }

    #[test]
    fn trailing_fragment_is_flushed_at_end() {
        let mut lines = reader(vec!["LOOP,0\r\nEND,4"]);
        block_on(async {
            assert_eq!(lines.next_line().await, Ok(Some("LOOP,0".into())));
            assert_eq!(lines.next_line().await, Ok(Some("END,4".into())));
            assert_eq!(lines.next_line().await, Ok(None));
        });
    }

    #[test]
    fn errors_are_passed_through() {
        let mut lines = LineReader::new(stream::iter(vec![
            Ok::<&[u8], &str>(b"A\r\n"),
            Err("reset"),
        ]));
        block_on(async {
            assert_eq!(lines.next_line().await, Ok(Some("A".into())));
            assert_eq!(lines.next_line().await, Err("reset"));
        });
    }
}
