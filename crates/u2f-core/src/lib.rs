//! The stateless FIDO U2F credential scheme (C5): key derivation, key-handle
//! authentication, ECDSA signing, and the command dispatcher.
//!
//! - [`keyhandle`]: the derivation function and the authenticated key-handle
//!   format — the core of the stateless credential scheme.
//! - [`ecdsa`]: the two P-256 primitives the scheme needs, wrapped from
//!   RustCrypto's `p256`.
//! - [`register`], [`checkonly`], [`authenticate`]: the three U2F operations.
//! - [`opcodes`]: the wire opcode and status constants.
//! - [`dispatcher`]: the request/response state machine built on top of all
//!   of the above.
//!
//! Everything here is generic over [`device_hal::DeviceHal`]; this crate has
//! no knowledge of real hardware, only of the trait the hardware abstraction
//! layer exposes.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

pub mod authenticate;
pub mod checkonly;
pub mod dispatcher;
pub mod ecdsa;
pub mod error;
pub mod keyhandle;
pub mod opcodes;
pub mod register;

pub use authenticate::AuthenticateOutcome;
pub use checkonly::check_only;
pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherState, ReplyFrame};
pub use error::{CoreError, CoreResult};
pub use keyhandle::KeyHandle;
pub use register::RegisterOutcome;
