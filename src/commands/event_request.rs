//! EventRequest command set (15).
//!
//! Only the two modifiers this client ever installs are modeled:
//! `LocationOnly` (breakpoints) and `Step` (single-stepping). The full JDWP
//! modifier list is much larger; anything else would need its own
//! [`Modifier`] variant before it could be sent.

use std::io::{self, Write};

use super::Command;
use crate::{
    codec::{JdwpWritable, JdwpWriter},
    enums::{EventKind, ModKind, StepDepth, StepSize, SuspendPolicy},
    ids::ThreadId,
    packet::CommandId,
    types::Location,
};

/// One `EventRequest.Set` modifier, tagged by [`ModKind`] on the wire.
#[derive(Debug, Clone, Copy)]
pub enum Modifier {
    /// Restricts a breakpoint event to a single location.
    LocationOnly(Location),
    /// Restricts a step event to a thread, granularity and call-stack
    /// relation.
    Step {
        thread: ThreadId,
        size: StepSize,
        depth: StepDepth,
    },
}

impl JdwpWritable for Modifier {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        match self {
            Modifier::LocationOnly(location) => {
                ModKind::LocationOnly.write(write)?;
                location.write(write)
            }
            Modifier::Step {
                thread,
                size,
                depth,
            } => {
                ModKind::Step.write(write)?;
                thread.write(write)?;
                size.write(write)?;
                depth.write(write)
            }
        }
    }
}

/// Installs an event request; the target VM replies with the `request_id`
/// used later to clear it or to recognize it in a composite event.
#[derive(Debug, Clone)]
pub struct Set {
    pub event_kind: EventKind,
    pub suspend_policy: SuspendPolicy,
    pub modifiers: Vec<Modifier>,
}

impl Set {
    /// `SUSPEND_ALL` breakpoint at `location`, matching `§4.4`'s
    /// Breakpoint encoding (one `LocationOnly` modifier).
    pub fn breakpoint(location: Location) -> Self {
        Set {
            event_kind: EventKind::Breakpoint,
            suspend_policy: SuspendPolicy::All,
            modifiers: vec![Modifier::LocationOnly(location)],
        }
    }

    /// `EVENT_THREAD` single-instruction step-over on `thread`, matching
    /// `§4.4`'s SingleStep encoding (one `Step` modifier, size=Min,
    /// depth=Over).
    pub fn single_step(thread: ThreadId) -> Self {
        Set {
            event_kind: EventKind::SingleStep,
            suspend_policy: SuspendPolicy::EventThread,
            modifiers: vec![Modifier::Step {
                thread,
                size: StepSize::Min,
                depth: StepDepth::Over,
            }],
        }
    }
}

impl Command for Set {
    const ID: CommandId = CommandId::new(15, 1);
    type Output = u32;

    fn write_body<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.event_kind.write(write)?;
        self.suspend_policy.write(write)?;
        self.modifiers.as_slice().write(write)
    }
}

/// Clears a previously installed event request. A no-op, not an error, if
/// no such request exists — the VM side of this command never fails.
#[derive(Debug, Clone, Copy)]
pub struct Clear {
    pub event_kind: EventKind,
    pub request_id: u32,
}

impl Command for Clear {
    const ID: CommandId = CommandId::new(15, 2);
    type Output = ();

    fn write_body<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.event_kind.write(write)?;
        self.request_id.write(write)
    }
}
