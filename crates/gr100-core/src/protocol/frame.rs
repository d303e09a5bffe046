//! Frame reader primitives
//!
//! Every response is read as a fixed-size frame: all bytes or an error,
//! never a partial frame.

use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use super::{Channel, ProtocolError, ACK_BYTE};

/// Read exactly `N` bytes from the channel.
///
/// Fails with [`ProtocolError::ShortRead`] on end of stream and
/// [`ProtocolError::Timeout`] when the channel's read timeout expires; both
/// report how many bytes had arrived.
pub fn read_frame<const N: usize, R: Read + ?Sized>(
    channel: &mut R,
) -> Result<[u8; N], ProtocolError> {
    let mut frame = [0u8; N];
    let mut received = 0;

    while received < N {
        match channel.read(&mut frame[received..]) {
            Ok(0) => {
                return Err(ProtocolError::ShortRead {
                    expected: N,
                    received,
                })
            }
            Ok(n) => received += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                return Err(ProtocolError::Timeout {
                    expected: N,
                    received,
                })
            }
            Err(e) => return Err(ProtocolError::IoError(e)),
        }
    }

    Ok(frame)
}

/// Read the single handshake byte and report whether the device is ready
pub fn read_ack<R: Read + ?Sized>(channel: &mut R) -> Result<bool, ProtocolError> {
    let [byte] = read_frame::<1, R>(channel)?;
    if byte != ACK_BYTE {
        tracing::debug!(byte = format_args!("0x{:02X}", byte), "unexpected handshake byte");
    }
    Ok(byte == ACK_BYTE)
}

/// Discard whatever the device still has queued.
///
/// Reads with `window` as the per-read timeout until the line goes quiet,
/// reaches end of stream, or the overall deadline of `window * 4` passes.
/// Errors are the expected way out and are swallowed. Returns the number
/// of bytes thrown away.
pub fn drain<C: Channel + ?Sized>(channel: &mut C, window: Duration) -> usize {
    if channel.set_timeout(window).is_err() {
        return 0;
    }

    let deadline = Instant::now() + window * 4;
    let mut buf = [0u8; 64];
    let mut discarded = 0;

    while Instant::now() < deadline {
        match channel.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                tracing::trace!(bytes = ?&buf[..n], "drained stale bytes");
                discarded += n;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }

    if discarded > 0 {
        tracing::debug!(discarded, "drained stale data from channel");
    }
    discarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_frame_exact() {
        let mut input = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        let frame: [u8; 4] = read_frame(&mut input).expect("frame");
        assert_eq!(frame, [1, 2, 3, 4]);
    }

    #[test]
    fn test_read_frame_short() {
        let mut input = Cursor::new(vec![1u8, 2, 3]);
        let err = read_frame::<8, _>(&mut input).unwrap_err();
        match err {
            ProtocolError::ShortRead { expected, received } => {
                assert_eq!(expected, 8);
                assert_eq!(received, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_ack() {
        let mut input = Cursor::new(vec![0xAAu8, 0x55]);
        assert!(read_ack(&mut input).expect("first"));
        assert!(!read_ack(&mut input).expect("second"));
        assert!(read_ack(&mut input).is_err());
    }
}
