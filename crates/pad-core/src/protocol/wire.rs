//! Binary codec for the fixed-size wire records.
//!
//! The link delivers small packets with no framing guarantees beyond a single
//! write, so every record here is either fixed-size or self-delimiting:
//!
//! ```text
//! trackpad frame   [delta_x: i8][delta_y: i8][gesture: u8]          3 bytes
//! chunk ack        [stream_index: u8][chunk_index: u8]              2 bytes
//! app list request [0x01]                                           1 byte
//! app record       [removed: u8][bundle_id NUL][name NUL][icon...]  variable
//! ```
//!
//! Deltas are scaled by [`DELTA_SCALE`] and saturated to the i8 range before
//! encoding. This is lossy by design (the packet budget is 3 bytes); callers
//! must not assume round-trip fidelity for large deltas.

use serde::{Deserialize, Serialize};

use crate::error::PadError;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Fixed multiplier applied to raw pointer deltas before clamping.
pub const DELTA_SCALE: f32 = 1.5;

/// Size of an encoded [`TrackpadFrame`] in bytes.
pub const TRACKPAD_FRAME_LEN: usize = 3;

/// Size of an encoded [`ChunkAck`] in bytes.
pub const CHUNK_ACK_LEN: usize = 2;

/// Single-byte payload written to request a full app-list sync from the host.
pub const APP_LIST_REQUEST: [u8; 1] = [0x01];

// ── Gesture discriminants ─────────────────────────────────────────────────────

/// Gesture discriminant carried in the third byte of a trackpad frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum GestureKind {
    Move = 0,
    LeftClick = 1,
    RightClick = 2,
    Scroll = 3,
    SwitchSpaceLeft = 4,
    SwitchSpaceRight = 5,
}

impl TryFrom<u8> for GestureKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GestureKind::Move),
            1 => Ok(GestureKind::LeftClick),
            2 => Ok(GestureKind::RightClick),
            3 => Ok(GestureKind::Scroll),
            4 => Ok(GestureKind::SwitchSpaceLeft),
            5 => Ok(GestureKind::SwitchSpaceRight),
            _ => Err(()),
        }
    }
}

// ── Trackpad frame ────────────────────────────────────────────────────────────

/// Decoded form of the 3-byte pointer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackpadFrame {
    /// Horizontal delta after scaling and saturation.
    pub delta_x: i8,
    /// Vertical delta after scaling and saturation.
    pub delta_y: i8,
    /// Which gesture produced the frame.
    pub gesture: GestureKind,
}

/// Encodes a pointer delta pair and gesture into the 3-byte wire record.
///
/// The raw deltas are scaled by [`DELTA_SCALE`] and clamped to `[-128, 127]`,
/// so this function cannot fail.
pub fn encode_trackpad_frame(dx: f32, dy: f32, gesture: GestureKind) -> [u8; TRACKPAD_FRAME_LEN] {
    let clamped_x = (dx * DELTA_SCALE).clamp(-128.0, 127.0) as i8;
    let clamped_y = (dy * DELTA_SCALE).clamp(-128.0, 127.0) as i8;
    [clamped_x as u8, clamped_y as u8, gesture as u8]
}

/// Decodes a 3-byte trackpad frame.
///
/// # Errors
///
/// Returns [`PadError::MalformedPayload`] if the buffer is not exactly three
/// bytes or the gesture byte is unknown.
pub fn decode_trackpad_frame(bytes: &[u8]) -> Result<TrackpadFrame, PadError> {
    if bytes.len() != TRACKPAD_FRAME_LEN {
        return Err(PadError::MalformedPayload(format!(
            "trackpad frame: need {TRACKPAD_FRAME_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    let gesture = GestureKind::try_from(bytes[2])
        .map_err(|_| PadError::MalformedPayload(format!("unknown gesture: 0x{:02X}", bytes[2])))?;
    Ok(TrackpadFrame {
        delta_x: bytes[0] as i8,
        delta_y: bytes[1] as i8,
        gesture,
    })
}

// ── Chunk acknowledgment ──────────────────────────────────────────────────────

/// Per-chunk acknowledgment written back to the sender.
///
/// Acks are a courtesy signal for the sender's flow control, not a
/// correctness gate: the assembler emits one for every chunk it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkAck {
    /// Which logical transfer the chunk belonged to.
    pub stream_index: u8,
    /// Which chunk within that transfer is being acknowledged.
    pub chunk_index: u8,
}

impl ChunkAck {
    /// Encodes the ack into its 2-byte wire form.
    pub fn to_bytes(self) -> [u8; CHUNK_ACK_LEN] {
        [self.stream_index, self.chunk_index]
    }

    /// Decodes a 2-byte ack.
    ///
    /// # Errors
    ///
    /// Returns [`PadError::MalformedPayload`] if the buffer is not exactly
    /// two bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PadError> {
        if bytes.len() != CHUNK_ACK_LEN {
            return Err(PadError::MalformedPayload(format!(
                "chunk ack: need {CHUNK_ACK_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(ChunkAck {
            stream_index: bytes[0],
            chunk_index: bytes[1],
        })
    }
}

// ── App record ────────────────────────────────────────────────────────────────

/// One host-application entry carried by a completed chunked transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRecord {
    /// Reverse-DNS identifier the host uses for the application.
    pub bundle_identifier: String,
    /// Human-readable name for display.
    pub display_name: String,
    /// Icon bitmap bytes, opaque to this layer.
    pub icon: Vec<u8>,
    /// True when the record announces that the app quit.
    pub removed: bool,
}

/// Decodes a fully reassembled app record.
///
/// Layout: `[removed: 1][bundle_identifier NUL][display_name NUL][icon...]`.
/// The icon is everything after the second terminator and may be empty.
///
/// # Errors
///
/// Returns [`PadError::MalformedPayload`] if the buffer has fewer than two
/// bytes, either NUL terminator is missing, or a field is not valid UTF-8.
pub fn decode_app_record(bytes: &[u8]) -> Result<AppRecord, PadError> {
    if bytes.len() < 2 {
        return Err(PadError::MalformedPayload(format!(
            "app record: need at least 2 bytes, got {}",
            bytes.len()
        )));
    }

    let removed = bytes[0] == 1;
    let rest = &bytes[1..];

    let (bundle_identifier, rest) = read_nul_terminated(rest, "bundle_identifier")?;
    let (display_name, icon) = read_nul_terminated(rest, "display_name")?;

    Ok(AppRecord {
        bundle_identifier,
        display_name,
        icon: icon.to_vec(),
        removed,
    })
}

/// Encodes an app record into the NUL-delimited layout.
///
/// This is the host side of [`decode_app_record`]; the client crate uses it
/// for its loopback demo and both crates use it in tests.
pub fn encode_app_record(record: &AppRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(
        2 + record.bundle_identifier.len() + record.display_name.len() + record.icon.len() + 1,
    );
    buf.push(if record.removed { 1 } else { 0 });
    buf.extend_from_slice(record.bundle_identifier.as_bytes());
    buf.push(0);
    buf.extend_from_slice(record.display_name.as_bytes());
    buf.push(0);
    buf.extend_from_slice(&record.icon);
    buf
}

/// Reads a NUL-terminated UTF-8 field and returns it with the remaining bytes.
fn read_nul_terminated<'a>(buf: &'a [u8], field: &str) -> Result<(String, &'a [u8]), PadError> {
    let nul = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| PadError::MalformedPayload(format!("{field}: missing NUL terminator")))?;
    let text = std::str::from_utf8(&buf[..nul])
        .map_err(|e| PadError::MalformedPayload(format!("{field}: invalid UTF-8: {e}")))?
        .to_string();
    Ok((text, &buf[nul + 1..]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Trackpad frame ────────────────────────────────────────────────────────

    #[test]
    fn test_trackpad_frame_scales_and_round_trips() {
        // Arrange: 10.0 * 1.5 = 15.0, -4.0 * 1.5 = -6.0, both exact in i8
        let bytes = encode_trackpad_frame(10.0, -4.0, GestureKind::Move);

        // Act
        let frame = decode_trackpad_frame(&bytes).expect("decode");

        // Assert
        assert_eq!(frame.delta_x, 15);
        assert_eq!(frame.delta_y, -6);
        assert_eq!(frame.gesture, GestureKind::Move);
    }

    #[test]
    fn test_trackpad_frame_saturates_large_deltas() {
        let bytes = encode_trackpad_frame(500.0, -500.0, GestureKind::Move);
        let frame = decode_trackpad_frame(&bytes).expect("decode");

        assert_eq!(frame.delta_x, 127, "positive overflow clamps to 127");
        assert_eq!(frame.delta_y, -128, "negative overflow clamps to -128");
    }

    #[test]
    fn test_trackpad_frame_zero_delta_gestures() {
        for kind in [
            GestureKind::LeftClick,
            GestureKind::RightClick,
            GestureKind::SwitchSpaceLeft,
            GestureKind::SwitchSpaceRight,
        ] {
            let bytes = encode_trackpad_frame(0.0, 0.0, kind);
            let frame = decode_trackpad_frame(&bytes).expect("decode");
            assert_eq!(frame.delta_x, 0);
            assert_eq!(frame.delta_y, 0);
            assert_eq!(frame.gesture, kind);
        }
    }

    #[test]
    fn test_decode_trackpad_frame_rejects_wrong_length() {
        assert!(matches!(
            decode_trackpad_frame(&[0, 0]),
            Err(PadError::MalformedPayload(_))
        ));
        assert!(matches!(
            decode_trackpad_frame(&[0, 0, 0, 0]),
            Err(PadError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_trackpad_frame_rejects_unknown_gesture() {
        let result = decode_trackpad_frame(&[1, 2, 0xFF]);
        assert!(matches!(result, Err(PadError::MalformedPayload(_))));
    }

    // ── Chunk ack ─────────────────────────────────────────────────────────────

    #[test]
    fn test_chunk_ack_round_trips() {
        let ack = ChunkAck {
            stream_index: 7,
            chunk_index: 42,
        };
        assert_eq!(ChunkAck::from_bytes(&ack.to_bytes()).expect("decode"), ack);
    }

    #[test]
    fn test_chunk_ack_rejects_wrong_length() {
        assert!(ChunkAck::from_bytes(&[1]).is_err());
        assert!(ChunkAck::from_bytes(&[1, 2, 3]).is_err());
    }

    // ── App record ────────────────────────────────────────────────────────────

    #[test]
    fn test_decode_app_record_well_formed() {
        // Arrange: [0x00]["com.x" NUL]["X" NUL][icon]
        let mut bytes = vec![0x00];
        bytes.extend_from_slice(b"com.x\0X\0");
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        // Act
        let record = decode_app_record(&bytes).expect("decode");

        // Assert
        assert!(!record.removed);
        assert_eq!(record.bundle_identifier, "com.x");
        assert_eq!(record.display_name, "X");
        assert_eq!(record.icon, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_decode_app_record_removal_flag() {
        let record = decode_app_record(b"\x01com.apple.Safari\0Safari\0").expect("decode");
        assert!(record.removed);
        assert!(record.icon.is_empty());
    }

    #[test]
    fn test_decode_app_record_too_short() {
        assert!(matches!(
            decode_app_record(&[]),
            Err(PadError::MalformedPayload(_))
        ));
        assert!(matches!(
            decode_app_record(&[0x00]),
            Err(PadError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_app_record_missing_terminators() {
        // No NUL at all
        assert!(decode_app_record(b"\x00com.x").is_err());
        // Only one of the two terminators
        assert!(decode_app_record(b"\x00com.x\0Safari").is_err());
    }

    #[test]
    fn test_decode_app_record_rejects_invalid_utf8() {
        let bytes = [0x00, 0xFF, 0xFE, 0x00, b'X', 0x00];
        assert!(matches!(
            decode_app_record(&bytes),
            Err(PadError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_app_record_encode_decode_round_trip() {
        let record = AppRecord {
            bundle_identifier: "com.apple.Mail".to_string(),
            display_name: "Mail".to_string(),
            icon: (0u8..64).collect(),
            removed: false,
        };
        assert_eq!(
            decode_app_record(&encode_app_record(&record)).expect("decode"),
            record
        );
    }

    #[test]
    fn test_gesture_kind_try_from_rejects_unknown() {
        assert!(GestureKind::try_from(6).is_err());
        assert!(GestureKind::try_from(0xFF).is_err());
    }
}
