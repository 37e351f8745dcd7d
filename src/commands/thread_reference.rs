//! ThreadReference command set (11).
//!
//! `SuspendCount` is opcode 12 here, not the `CMD_THREAD_RESUME` constant
//! the original tool's source reused for both Resume and SuspendCount —
//! see `DESIGN.md` for why that reuse was a bug and not a design choice to
//! preserve.

use std::io::{self, Write};

use super::Command;
use crate::{
    codec::{JdwpWritable, JdwpWriter},
    ids::ThreadId,
    packet::CommandId,
};

/// Decrements the thread's suspend count by one; a no-op below zero.
#[derive(Debug, Clone, Copy)]
pub struct Resume {
    pub thread: ThreadId,
}

impl Command for Resume {
    const ID: CommandId = CommandId::new(11, 3);
    type Output = ();

    fn write_body<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.thread.write(write)
    }
}

/// Returns the number of pending suspends on the thread — one per
/// `VM.Suspend`/event-triggered suspend not yet matched by a `Resume`.
#[derive(Debug, Clone, Copy)]
pub struct SuspendCount {
    pub thread: ThreadId,
}

impl Command for SuspendCount {
    const ID: CommandId = CommandId::new(11, 12);
    type Output = u32;

    fn write_body<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.thread.write(write)
    }
}
