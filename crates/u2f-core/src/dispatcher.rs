//! The command dispatcher: a two-state state machine sitting between the
//! framing link and the three U2F operations.
//!
//! Grounded on the `for (;;)` command switch in the original `main.c`, and on
//! SPEC_FULL.md §4.3's mandated fix: the original realizes the `AUTH_SET`/
//! `AUTH_GO` pair with an implicit staging buffer and an acknowledged-but-
//! unenforced ordering requirement ("GO without a SET first is also an
//! error" — a comment, not code). This promotes that to an explicit
//! [`DispatcherState`] enum carrying the staged fields directly, the way the
//! teacher turns a protocol round into a type (`SigningRound1` ->
//! `SigningRound2`) instead of a boolean flag plus a side buffer.

use crate::authenticate::{self, AuthenticateOutcome};
use crate::checkonly;
use crate::error::CoreError;
use crate::keyhandle::KeyHandle;
use crate::opcodes::{self, STATUS_BAD, STATUS_OK};
use crate::register::{self, RegisterOutcome};
use device_hal::framing::{Endpoint, FrameHeader};
use device_hal::DeviceHal;

/// A fixed-size reply: the tag to address it back to the host with, the
/// opcode it carries (see [`crate::dispatcher`] module docs on why this is
/// tracked separately from `body`), and a 128-byte body, zero-padded beyond
/// whatever prefix is meaningful for that response — matching the original's
/// single `rsp[CMDLEN_MAXBYTES]` buffer, `memset` to zero before each use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyFrame {
    /// Per-message tag to echo back, round-tripped from the request header.
    pub tag: u8,
    /// Response opcode (`opcodes::*_RSP`).
    pub opcode: u8,
    /// The 128-byte response body.
    pub body: [u8; 128],
}

impl ReplyFrame {
    fn new(tag: u8, opcode: u8, body: [u8; 128]) -> Self {
        ReplyFrame { tag, opcode, body }
    }
}

/// What the dispatcher wants done with an incoming frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Frame addressed to an endpoint other than this application or the
    /// firmware; no reply is sent.
    Discard,
    /// Frame addressed to the firmware endpoint; reply with a fixed NOK
    /// frame and do not dispatch.
    Nok,
    /// One reply frame.
    Reply(ReplyFrame),
    /// Two reply frames, emitted back-to-back with no other command
    /// interleaved — the `U2F_REGISTER` workaround for a >128-byte payload.
    /// Order is fixed: presence+key-handle first, public key second.
    RegisterReplies(ReplyFrame, ReplyFrame),
}

/// The dispatcher's state between frames: either idle, or armed by a prior
/// `U2F_AUTH_SET` and holding the fields it staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Waiting for the next command. `U2F_AUTH_GO` is rejected from here.
    Idle,
    /// A `U2F_AUTH_SET` has been received; only `U2F_AUTH_GO` advances this
    /// state, consuming the staged fields and returning to `Idle`.
    AuthArmed {
        /// Staged from `U2F_AUTH_SET`.
        app_param: [u8; 32],
        /// Staged from `U2F_AUTH_SET`.
        chall_param: [u8; 32],
    },
}

/// The command dispatcher, wrapping a [`DeviceHal`] and the two-state machine
/// that arbitrates `U2F_AUTH_SET`/`U2F_AUTH_GO`.
pub struct Dispatcher<H: DeviceHal> {
    hal: H,
    state: DispatcherState,
}

impl<H: DeviceHal> Dispatcher<H> {
    /// Build a dispatcher around a device HAL, starting in [`DispatcherState::Idle`].
    pub fn new(hal: H) -> Self {
        Dispatcher {
            hal,
            state: DispatcherState::Idle,
        }
    }

    /// The dispatcher's current state, for tests and diagnostics.
    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// Borrow the underlying HAL, e.g. so a caller can drive its LED to the
    /// idle "ready" color while blocked reading the next frame.
    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Handle one parsed frame. `body` must be exactly `header.length.byte_len()`
    /// bytes, as read by the framing link.
    pub fn dispatch(&mut self, header: &FrameHeader, body: &[u8]) -> DispatchOutcome {
        match header.endpoint {
            Endpoint::Fw => return DispatchOutcome::Nok,
            Endpoint::Other(_) => return DispatchOutcome::Discard,
            Endpoint::Sw => {}
        }

        let Some(&opcode) = body.first() else {
            return DispatchOutcome::Discard;
        };

        match opcode {
            opcodes::GET_NAMEVERSION_CMD => self.handle_nameversion(header.tag, body),
            opcodes::U2F_REGISTER_CMD => self.handle_register(header.tag, body),
            opcodes::U2F_CHECKONLY_CMD => self.handle_checkonly(header.tag, body),
            opcodes::U2F_AUTH_SET_CMD => self.handle_auth_set(header.tag, body),
            opcodes::U2F_AUTH_GO_CMD => self.handle_auth_go(header.tag, body),
            other => {
                log::debug!("received unknown command: {other:#04x}");
                DispatchOutcome::Reply(ReplyFrame::new(header.tag, opcodes::UNKNOWN_CMD_RSP, [0u8; 128]))
            }
        }
    }

    fn handle_nameversion(&mut self, tag: u8, body: &[u8]) -> DispatchOutcome {
        log::debug!("GET_NAMEVERSION");
        let mut rsp = [0u8; 128];
        // The original only fills the name/version fields for the expected
        // 1-byte body; any other length replies with an all-zero body
        // rather than a `STATUS_BAD` (there is no status byte in this
        // response at all).
        if body.len() == 1 {
            rsp[0..4].copy_from_slice(&opcodes::APP_NAME0);
            rsp[4..8].copy_from_slice(&opcodes::APP_NAME1);
            rsp[8..12].copy_from_slice(&opcodes::APP_VERSION.to_le_bytes());
        }
        DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::GET_NAMEVERSION_RSP, rsp))
    }

    fn handle_register(&mut self, tag: u8, body: &[u8]) -> DispatchOutcome {
        log::debug!("U2F_REGISTER");
        let mut rsp = [0u8; 128];
        if body.len() != 128 {
            log::debug!("U2F_REGISTER: bad length {}", body.len());
            self.state = DispatcherState::Idle;
            rsp[0] = STATUS_BAD;
            return DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::U2F_REGISTER_RSP, rsp));
        }

        let mut app_param = [0u8; 32];
        app_param.copy_from_slice(&body[1..33]);

        match register::register(&mut self.hal, &app_param) {
            Ok(RegisterOutcome::UserAbsent) => {
                // §9: the status byte doubles as the presence byte here —
                // both are 0, and no key handle or public key follows.
                rsp[0] = STATUS_OK;
                rsp[1] = 0;
                DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::U2F_REGISTER_RSP, rsp))
            }
            Ok(RegisterOutcome::Registered {
                key_handle,
                public_key,
            }) => {
                let mut frame_a = [0u8; 128];
                frame_a[0] = STATUS_OK;
                frame_a[1] = 1; // presence
                frame_a[2..66].copy_from_slice(&key_handle.to_bytes());

                let mut frame_b = [0u8; 128];
                frame_b[0] = STATUS_OK;
                frame_b[1..65].copy_from_slice(&public_key);

                DispatchOutcome::RegisterReplies(
                    ReplyFrame::new(tag, opcodes::U2F_REGISTER_RSP, frame_a),
                    ReplyFrame::new(tag, opcodes::U2F_REGISTER_RSP, frame_b),
                )
            }
            Err(CoreError::CryptoPrimitiveFailure(code)) => {
                rsp[0] = STATUS_BAD;
                rsp[1] = code;
                DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::U2F_REGISTER_RSP, rsp))
            }
        }
    }

    fn handle_checkonly(&mut self, tag: u8, body: &[u8]) -> DispatchOutcome {
        log::debug!("U2F_CHECKONLY");
        let mut rsp = [0u8; 128];
        if body.len() != 128 {
            log::debug!("U2F_CHECKONLY: bad length {}", body.len());
            self.state = DispatcherState::Idle;
            rsp[0] = STATUS_BAD;
            return DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::U2F_CHECKONLY_RSP, rsp));
        }

        let mut app_param = [0u8; 32];
        app_param.copy_from_slice(&body[1..33]);
        let mut kh_bytes = [0u8; 64];
        kh_bytes.copy_from_slice(&body[33..97]);
        let handle = KeyHandle::from_bytes(&kh_bytes);

        let valid = checkonly::check_only(self.hal.device_secret(), &app_param, &handle);
        rsp[0] = STATUS_OK;
        rsp[1] = valid as u8;
        DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::U2F_CHECKONLY_RSP, rsp))
    }

    fn handle_auth_set(&mut self, tag: u8, body: &[u8]) -> DispatchOutcome {
        log::debug!("U2F_AUTH_SET");
        let mut rsp = [0u8; 128];
        if body.len() != 128 {
            self.state = DispatcherState::Idle;
            rsp[0] = STATUS_BAD;
            return DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::U2F_AUTH_RSP, rsp));
        }

        let mut app_param = [0u8; 32];
        app_param.copy_from_slice(&body[1..33]);
        let mut chall_param = [0u8; 32];
        chall_param.copy_from_slice(&body[33..65]);

        self.state = DispatcherState::AuthArmed {
            app_param,
            chall_param,
        };
        rsp[0] = STATUS_OK;
        DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::U2F_AUTH_RSP, rsp))
    }

    fn handle_auth_go(&mut self, tag: u8, body: &[u8]) -> DispatchOutcome {
        log::debug!("U2F_AUTH_GO");
        let mut rsp = [0u8; 128];
        if body.len() != 128 {
            self.state = DispatcherState::Idle;
            rsp[0] = STATUS_BAD;
            return DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::U2F_AUTH_RSP, rsp));
        }

        // Consuming the state here is the mandated guard: a lone AUTH_GO
        // finds `Idle` and is rejected, matching property 7 (state-machine
        // closure) without ever touching the key handle or the sensor.
        let staged = core::mem::replace(&mut self.state, DispatcherState::Idle);
        let (app_param, chall_param) = match staged {
            DispatcherState::AuthArmed {
                app_param,
                chall_param,
            } => (app_param, chall_param),
            DispatcherState::Idle => {
                rsp[0] = STATUS_BAD;
                return DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::U2F_AUTH_RSP, rsp));
            }
        };

        let mut kh_bytes = [0u8; 64];
        kh_bytes.copy_from_slice(&body[1..65]);
        let handle = KeyHandle::from_bytes(&kh_bytes);
        let check_user = body[65] != 0;
        let mut counter = [0u8; 4];
        counter.copy_from_slice(&body[66..70]);

        match authenticate::authenticate(
            &mut self.hal,
            &app_param,
            &chall_param,
            &handle,
            check_user,
            counter,
        ) {
            Ok(AuthenticateOutcome::InvalidHandle) => {
                rsp[0] = STATUS_OK;
                rsp[1] = 0;
            }
            Ok(AuthenticateOutcome::UserAbsent) => {
                rsp[0] = STATUS_OK;
                rsp[1] = 1;
                rsp[2] = 0;
            }
            Ok(AuthenticateOutcome::Signed { presence, signature }) => {
                rsp[0] = STATUS_OK;
                rsp[1] = 1;
                rsp[2] = presence as u8;
                rsp[3..67].copy_from_slice(&signature);
            }
            Err(CoreError::CryptoPrimitiveFailure(code)) => {
                rsp[0] = STATUS_BAD;
                rsp[1] = code;
            }
        }

        DispatchOutcome::Reply(ReplyFrame::new(tag, opcodes::U2F_AUTH_RSP, rsp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_hal::framing::LengthClass;
    use device_hal::{DeviceConfig, DeviceSecret, SimulatedHal, SimulatedPresence, SimulatedTrng};

    fn dispatcher_with(
        presence: SimulatedPresence,
    ) -> Dispatcher<SimulatedHal<SimulatedTrng, SimulatedPresence>> {
        Dispatcher::new(SimulatedHal::new(
            DeviceSecret::from_bytes([4u8; 32]),
            SimulatedTrng::from_seed(3),
            presence,
            DeviceConfig::default(),
        ))
    }

    fn sw_header() -> FrameHeader {
        FrameHeader {
            endpoint: Endpoint::Sw,
            tag: 0,
            length: LengthClass::OneTwentyEight,
        }
    }

    fn reply_body(outcome: DispatchOutcome) -> [u8; 128] {
        match outcome {
            DispatchOutcome::Reply(r) => r.body,
            other => panic!("expected a single reply, got {other:?}"),
        }
    }

    #[test]
    fn test_nameversion_reports_name_and_version() {
        let mut d = dispatcher_with(SimulatedPresence::always_touches());
        let hdr = FrameHeader {
            length: LengthClass::One,
            ..sw_header()
        };
        let body = reply_body(d.dispatch(&hdr, &[opcodes::GET_NAMEVERSION_CMD]));
        assert_eq!(&body[0..4], b"tk1 ");
        assert_eq!(&body[4..8], b"fido");
        assert_eq!(&body[8..12], &1u32.to_le_bytes());
    }

    #[test]
    fn test_firmware_endpoint_gets_nok() {
        let mut d = dispatcher_with(SimulatedPresence::always_touches());
        let hdr = FrameHeader {
            endpoint: Endpoint::Fw,
            tag: 0,
            length: LengthClass::One,
        };
        let outcome = d.dispatch(&hdr, &[0x00]);
        assert_eq!(outcome, DispatchOutcome::Nok);
    }

    #[test]
    fn test_other_endpoint_is_discarded() {
        let mut d = dispatcher_with(SimulatedPresence::always_touches());
        let hdr = FrameHeader {
            endpoint: Endpoint::Other(0b01),
            tag: 0,
            length: LengthClass::One,
        };
        let outcome = d.dispatch(&hdr, &[0x00]);
        assert_eq!(outcome, DispatchOutcome::Discard);
    }

    #[test]
    fn test_unknown_opcode_gets_unknown_cmd_reply() {
        let mut d = dispatcher_with(SimulatedPresence::always_touches());
        let hdr = sw_header();
        let mut body = [0u8; 128];
        body[0] = 0x77;
        match d.dispatch(&hdr, &body) {
            DispatchOutcome::Reply(r) => assert_eq!(r.opcode, opcodes::UNKNOWN_CMD_RSP),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_register_happy_path_emits_two_frames() {
        let mut d = dispatcher_with(SimulatedPresence::always_touches());
        let hdr = sw_header();
        let mut body = [0u8; 128];
        body[0] = opcodes::U2F_REGISTER_CMD;
        match d.dispatch(&hdr, &body) {
            DispatchOutcome::RegisterReplies(a, b) => {
                assert_eq!(a.body[0], STATUS_OK);
                assert_eq!(a.body[1], 1);
                assert_ne!(&a.body[2..34], &[0u8; 32][..]); // nonce
                assert_eq!(b.body[0], STATUS_OK);
            }
            other => panic!("expected two register replies, got {other:?}"),
        }
    }

    #[test]
    fn test_register_timeout_emits_single_frame() {
        let mut d = dispatcher_with(SimulatedPresence::never_touches());
        let hdr = sw_header();
        let mut body = [0u8; 128];
        body[0] = opcodes::U2F_REGISTER_CMD;
        match d.dispatch(&hdr, &body) {
            DispatchOutcome::Reply(r) => {
                assert_eq!(r.body[0], STATUS_OK);
                assert_eq!(r.body[1], 0);
            }
            other => panic!("expected a single reply, got {other:?}"),
        }
    }

    #[test]
    fn test_register_bad_length_is_status_bad() {
        let mut d = dispatcher_with(SimulatedPresence::always_touches());
        let hdr = sw_header();
        let body = [opcodes::U2F_REGISTER_CMD; 4];
        let rsp = reply_body(d.dispatch(&hdr, &body));
        assert_eq!(rsp[0], STATUS_BAD);
    }

    #[test]
    fn test_malformed_checkonly_while_armed_falls_back_to_idle() {
        let mut d = dispatcher_with(SimulatedPresence::always_touches());
        let hdr = sw_header();

        let mut set_body = [0u8; 128];
        set_body[0] = opcodes::U2F_AUTH_SET_CMD;
        d.dispatch(&hdr, &set_body);
        assert!(matches!(d.state(), DispatcherState::AuthArmed { .. }));

        let short_body = [opcodes::U2F_CHECKONLY_CMD; 4];
        d.dispatch(&hdr, &short_body);
        assert_eq!(d.state(), DispatcherState::Idle);
    }

    #[test]
    fn test_auth_go_without_set_is_bad_status_and_idle() {
        let mut d = dispatcher_with(SimulatedPresence::always_touches());
        let hdr = sw_header();
        let mut body = [0u8; 128];
        body[0] = opcodes::U2F_AUTH_GO_CMD;
        let rsp = reply_body(d.dispatch(&hdr, &body));
        assert_eq!(rsp[0], STATUS_BAD);
        assert_eq!(d.state(), DispatcherState::Idle);
    }

    #[test]
    fn test_full_register_then_authenticate_round_trip() {
        let mut d = dispatcher_with(SimulatedPresence::always_touches());
        let hdr = sw_header();

        let mut reg_body = [0u8; 128];
        reg_body[0] = opcodes::U2F_REGISTER_CMD;
        let app_param = [0x00u8; 32];
        reg_body[1..33].copy_from_slice(&app_param);
        let key_handle = match d.dispatch(&hdr, &reg_body) {
            DispatchOutcome::RegisterReplies(a, _) => {
                let mut kh = [0u8; 64];
                kh.copy_from_slice(&a.body[2..66]);
                kh
            }
            other => panic!("expected two register replies, got {other:?}"),
        };

        let mut set_body = [0u8; 128];
        set_body[0] = opcodes::U2F_AUTH_SET_CMD;
        set_body[1..33].copy_from_slice(&app_param);
        let chall_param = [0x11u8; 32];
        set_body[33..65].copy_from_slice(&chall_param);
        let set_rsp = reply_body(d.dispatch(&hdr, &set_body));
        assert_eq!(set_rsp[0], STATUS_OK);
        assert_eq!(
            d.state(),
            DispatcherState::AuthArmed {
                app_param,
                chall_param
            }
        );

        let mut go_body = [0u8; 128];
        go_body[0] = opcodes::U2F_AUTH_GO_CMD;
        go_body[1..65].copy_from_slice(&key_handle);
        go_body[65] = 1; // check_user
        go_body[66..70].copy_from_slice(&1u32.to_be_bytes());
        let go_rsp = reply_body(d.dispatch(&hdr, &go_body));
        assert_eq!(go_rsp[0], STATUS_OK);
        assert_eq!(go_rsp[1], 1); // valid
        assert_eq!(go_rsp[2], 1); // presence
        assert_ne!(&go_rsp[3..67], &[0u8; 64][..]);
        assert_eq!(d.state(), DispatcherState::Idle);
    }

    #[test]
    fn test_authenticate_with_forged_handle_does_not_solicit_touch() {
        let mut d = dispatcher_with(SimulatedPresence::never_touches());
        let hdr = sw_header();
        let app_param = [0x00u8; 32];

        let mut set_body = [0u8; 128];
        set_body[0] = opcodes::U2F_AUTH_SET_CMD;
        set_body[1..33].copy_from_slice(&app_param);
        set_body[33..65].copy_from_slice(&[0x11u8; 32]);
        d.dispatch(&hdr, &set_body);

        let mut go_body = [0u8; 128];
        go_body[0] = opcodes::U2F_AUTH_GO_CMD;
        go_body[65] = 1; // check_user, but handle is all zero and forged
        let go_rsp = reply_body(d.dispatch(&hdr, &go_body));
        assert_eq!(go_rsp[0], STATUS_OK);
        assert_eq!(go_rsp[1], 0); // invalid handle, no touch solicited
    }
}
