//! The byte-oriented framing link between host and device.
//!
//! Every message begins with a one-byte header encoding the destination
//! endpoint and the body length, followed by the body itself. This module is
//! the "external collaborator" named in the distilled spec's §6: the U2F
//! command dispatcher built on top of it never looks at header bits directly.
//!
//! Header byte layout (bit 7 reserved, must be zero):
//! `0 EE ttt LL` — `EE` selects the destination endpoint, `ttt` is an opaque
//! per-message tag the framing layer round-trips but does not interpret, and
//! `LL` selects the body length from the fixed class `{1, 4, 32, 128}` bytes.

use crate::{HalError, HalResult};

/// Destination endpoint of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The firmware/boot-loader layer — not this application.
    Fw,
    /// This application.
    Sw,
    /// Any other endpoint value; frames addressed here are silently discarded.
    Other(u8),
}

/// One of the four body lengths the framing link supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    /// 1-byte body
    One,
    /// 4-byte body
    Four,
    /// 32-byte body
    ThirtyTwo,
    /// 128-byte body
    OneTwentyEight,
}

impl LengthClass {
    /// The body length in bytes this class denotes.
    pub fn byte_len(self) -> usize {
        match self {
            LengthClass::One => 1,
            LengthClass::Four => 4,
            LengthClass::ThirtyTwo => 32,
            LengthClass::OneTwentyEight => 128,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => LengthClass::One,
            0b01 => LengthClass::Four,
            0b10 => LengthClass::ThirtyTwo,
            _ => LengthClass::OneTwentyEight,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            LengthClass::One => 0b00,
            LengthClass::Four => 0b01,
            LengthClass::ThirtyTwo => 0b10,
            LengthClass::OneTwentyEight => 0b11,
        }
    }
}

/// A parsed frame header: which endpoint it targets and how many body bytes
/// follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Destination endpoint.
    pub endpoint: Endpoint,
    /// Opaque per-message tag, round-tripped into the reply.
    pub tag: u8,
    /// Body length class.
    pub length: LengthClass,
}

const ENDPOINT_FW: u8 = 0b00;
const ENDPOINT_SW: u8 = 0b11;

/// Parse a single header byte. Fails only if the reserved top bit is set.
pub fn parse_frame(header_byte: u8) -> HalResult<FrameHeader> {
    if header_byte & 0b1000_0000 != 0 {
        return Err(HalError::MalformedFrame(header_byte));
    }

    let endpoint_bits = (header_byte >> 5) & 0b11;
    let tag = (header_byte >> 2) & 0b111;
    let length = LengthClass::from_bits(header_byte);

    let endpoint = match endpoint_bits {
        ENDPOINT_FW => Endpoint::Fw,
        ENDPOINT_SW => Endpoint::Sw,
        other => Endpoint::Other(other),
    };

    Ok(FrameHeader {
        endpoint,
        tag,
        length,
    })
}

/// Encode a header byte for a reply addressed back to the host (always `Sw`
/// from the device's point of view, carrying the request's tag).
pub fn encode_reply_header(tag: u8, length: LengthClass) -> u8 {
    (ENDPOINT_SW << 5) | ((tag & 0b111) << 2) | length.to_bits()
}

/// A fixed "not OK" reply used to answer frames misaddressed to the firmware
/// endpoint: a header-only reply class with no meaningful body.
pub fn nok_header(request: &FrameHeader) -> u8 {
    encode_reply_header(request.tag, LengthClass::One)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_reserved_top_bit() {
        assert_eq!(parse_frame(0b1000_0000), Err(HalError::MalformedFrame(0b1000_0000)));
    }

    #[test]
    fn test_parse_recovers_sw_endpoint_and_length() {
        let byte = encode_reply_header(5, LengthClass::OneTwentyEight);
        let hdr = parse_frame(byte).unwrap();
        assert_eq!(hdr.endpoint, Endpoint::Sw);
        assert_eq!(hdr.tag, 5);
        assert_eq!(hdr.length, LengthClass::OneTwentyEight);
        assert_eq!(hdr.length.byte_len(), 128);
    }

    #[test]
    fn test_parse_recovers_fw_endpoint() {
        let byte = (ENDPOINT_FW << 5) | LengthClass::One.to_bits();
        let hdr = parse_frame(byte).unwrap();
        assert_eq!(hdr.endpoint, Endpoint::Fw);
    }

    #[test]
    fn test_other_endpoint_is_preserved() {
        let byte = (0b01u8 << 5) | LengthClass::Four.to_bits();
        let hdr = parse_frame(byte).unwrap();
        assert_eq!(hdr.endpoint, Endpoint::Other(0b01));
    }

    #[test]
    fn test_all_four_length_classes_roundtrip() {
        for class in [
            LengthClass::One,
            LengthClass::Four,
            LengthClass::ThirtyTwo,
            LengthClass::OneTwentyEight,
        ] {
            let byte = encode_reply_header(0, class);
            assert_eq!(parse_frame(byte).unwrap().length, class);
        }
    }
}
