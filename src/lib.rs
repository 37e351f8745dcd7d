//! JDWP debugger client core: attaches to a remote Java/Dalvik VM over the
//! Java Debug Wire Protocol, negotiates identifier widths, installs
//! breakpoints, single-steps, and dispatches asynchronous VM events.
//!
//! This crate is the hard, interesting core of a larger APK
//! reverse-engineering tool; everything else (APK unpacking, DEX
//! disassembly, manifest/certificate parsing, the interactive shell) is an
//! external collaborator that calls into [`Debugger`] and is out of scope
//! here.
//!
//! Start with [`Debugger::new`], then [`Debugger::attach`].

pub mod codec;
pub mod commands;
pub mod debugger;
pub mod enums;
pub mod error;
pub mod ids;
pub mod interrupt;
pub mod packet;
pub mod session;
pub mod types;

pub use debugger::{Breakpoint, Debugger};
pub use error::{JdwpError, Result};
pub use session::{AttachOptions, CancelHandle};
