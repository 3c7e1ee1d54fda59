// src/exec/stream.rs

//! Draining a child's output pipe into the unit's results.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::warn;

use crate::unit::{Status, Unit};

/// Bytes requested per read.
pub const CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn label(self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }

    fn append(self, unit: &Unit, text: &str) {
        match self {
            StreamKind::Stdout => unit.results().append_stdout(text),
            StreamKind::Stderr => unit.results().append_stderr(text),
        }
    }
}

/// Incremental UTF-8 decoding across read boundaries.
///
/// A character split between two reads is held back until the rest of it
/// arrives; invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(std::str::from_utf8(&self.pending[..valid]).unwrap_or_default());
                    match e.error_len() {
                        // Truncated character at the end: wait for more.
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                    }
                }
            }
        }
    }

    /// Flush whatever is left once the stream has ended.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Read `reader` to the end, appending each chunk to the unit's buffer for
/// `kind` and calling `on_update` after every append.
///
/// A read error other than end-of-stream marks the unit `Failed` and stops
/// this reader only.
pub async fn drain<R>(
    unit: &Unit,
    mut reader: R,
    kind: StreamKind,
    on_update: &(dyn Fn(&Unit) + Send + Sync),
) where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut carry = Utf8Carry::default();

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let text = carry.decode(&buf[..n]);
                if !text.is_empty() {
                    kind.append(unit, &text);
                    on_update(unit);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(
                    unit = %unit.name(),
                    stream = kind.label(),
                    error = %e,
                    "could not read output of unit; marking it failed"
                );
                unit.results().set_status(Status::Failed);
                on_update(unit);
                break;
            }
        }
    }

    let rest = carry.finish();
    if !rest.is_empty() {
        kind.append(unit, &rest);
        on_update(unit);
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use super::*;
    use crate::config::model::UnitConfig;

    fn unit() -> Unit {
        Unit::new(
            "reader",
            0,
            UnitConfig {
                command: "true".into(),
                ..UnitConfig::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn split_character_is_carried_over() {
        let bytes = "héllo".as_bytes();
        let mut carry = Utf8Carry::default();
        // Split inside the two-byte 'é'.
        let first = carry.decode(&bytes[..2]);
        let second = carry.decode(&bytes[2..]);
        assert_eq!(first, "h");
        assert_eq!(second, "éllo");
        assert_eq!(carry.finish(), "");
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn truncated_tail_is_flushed_lossily() {
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.decode(&[b'x', 0xE2, 0x82]), "x");
        assert_eq!(carry.finish(), "\u{FFFD}");
    }

    #[tokio::test]
    async fn drain_appends_everything_and_notifies() {
        let unit = unit();
        let updates = AtomicUsize::new(0);
        let data = "line\n".repeat(600);

        drain(&unit, data.as_bytes(), StreamKind::Stderr, &|_: &Unit| {
            updates.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        assert_eq!(unit.stderr(), data);
        assert!(unit.stdout().is_empty());
        // 3000 bytes in 1024-byte reads.
        assert_eq!(updates.load(Ordering::SeqCst), 3);
    }

    struct Broken {
        sent: bool,
    }

    impl AsyncRead for Broken {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.sent {
                Poll::Ready(Err(io::Error::other("pipe went away")))
            } else {
                self.sent = true;
                buf.put_slice(b"partial");
                Poll::Ready(Ok(()))
            }
        }
    }

    #[tokio::test]
    async fn read_error_marks_unit_failed() {
        let unit = unit();
        unit.results().set_status(Status::Running);

        drain(&unit, Broken { sent: false }, StreamKind::Stdout, &|_: &Unit| {}).await;

        assert_eq!(unit.stdout(), "partial");
        assert_eq!(unit.status(), Status::Failed);
    }
}
