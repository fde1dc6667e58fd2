//! Command opcodes and status bytes for the application protocol.
//!
//! Grounded on `enum appcmd` in the original `app_proto.h`: one request opcode
//! per operation, a matching response opcode, and a catch-all unknown-command
//! response. Kept as plain `u8` constants rather than a `#[repr(u8)]` enum for
//! the request side, since an unrecognized byte on the wire must be handled
//! (dispatched to [`crate::dispatcher::DispatchOutcome`]'s unknown-command
//! path) rather than refused at the type level.

/// `GET_NAMEVERSION` request: no body.
pub const GET_NAMEVERSION_CMD: u8 = 0x01;
/// `GET_NAMEVERSION` response: name0 ‖ name1 ‖ version.
pub const GET_NAMEVERSION_RSP: u8 = 0x02;
/// `U2F_REGISTER` request: app_param ‖ padding.
pub const U2F_REGISTER_CMD: u8 = 0x03;
/// `U2F_REGISTER` response, sent as two frames (see [`crate::dispatcher`]).
pub const U2F_REGISTER_RSP: u8 = 0x04;
/// `U2F_CHECKONLY` request: app_param ‖ key_handle.
pub const U2F_CHECKONLY_CMD: u8 = 0x05;
/// `U2F_CHECKONLY` response: status ‖ valid.
pub const U2F_CHECKONLY_RSP: u8 = 0x06;
/// `U2F_AUTH_SET` request: app_param ‖ chall_param. Arms the dispatcher for
/// a following `U2F_AUTH_GO`.
pub const U2F_AUTH_SET_CMD: u8 = 0x07;
/// `U2F_AUTH_GO` request: key_handle ‖ check_user ‖ counter. Must follow an
/// `U2F_AUTH_SET` in the same session.
pub const U2F_AUTH_GO_CMD: u8 = 0x08;
/// Response to both `U2F_AUTH_SET` (ack) and `U2F_AUTH_GO` (result).
pub const U2F_AUTH_RSP: u8 = 0x09;
/// Sent in place of any other response when the request opcode is not
/// recognized.
pub const UNKNOWN_CMD_RSP: u8 = 0xFF;

/// Request succeeded (or, for the short-circuit payloads of §4.3, the
/// operation ran without a protocol-level error).
pub const STATUS_OK: u8 = 0;
/// Malformed length, unrecognized opcode, or a cryptographic primitive
/// rejected its input. A primitive-defined code byte may follow.
pub const STATUS_BAD: u8 = 1;

/// "tk1 " — first half of the device name reported by `GET_NAMEVERSION`.
pub const APP_NAME0: [u8; 4] = *b"tk1 ";
/// "fido" — second half of the device name reported by `GET_NAMEVERSION`.
pub const APP_NAME1: [u8; 4] = *b"fido";
/// This firmware's protocol version, reported little-endian in
/// `GET_NAMEVERSION`.
pub const APP_VERSION: u32 = 1;
