//! One module per JDWP command set, each holding the request/reply pairs
//! this client actually speaks. Every command set in the Oracle spec has
//! dozens of commands; only the ones [`crate::debugger::Debugger`] needs to
//! reach a breakpoint and step are modeled here.

use std::io::Write;

use crate::{
    codec::{JdwpReadable, JdwpWriter},
    packet::CommandId,
};

/// A JDWP request: its opcode, its reply shape, and how to serialize its own
/// body. `Session::send` is the only thing that calls `write_body`; command
/// structs never touch a socket directly.
pub trait Command {
    const ID: CommandId;
    type Output: JdwpReadable;

    fn write_body<W: Write>(&self, write: &mut JdwpWriter<W>) -> std::io::Result<()>;
}

pub mod event;
pub mod event_request;
pub mod reference_type;
pub mod thread_reference;
pub mod virtual_machine;
