//! Event command set (64) — decoding the one packet shape the VM ever
//! pushes unsolicited: `Composite` (cmd 100).
//!
//! This is not a [`Command`](super::Command): a composite event never has
//! a matching outgoing request, so there's no `write_body` to give it.
//! Decoding lives here instead, called directly by
//! [`crate::session::Session::wait_for_event`].

use std::io::Read;

use crate::{
    codec::{JdwpReadable, JdwpReader},
    enums::{EventKind, SuspendPolicy},
    error::{JdwpError, Result},
    ids::ThreadId,
    types::Location,
};

/// The fields shared by every event kind this client recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventData {
    pub request_id: u32,
    pub thread_id: ThreadId,
    pub location: Location,
}

impl JdwpReadable for EventData {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> std::io::Result<Self> {
        Ok(EventData {
            request_id: u32::read(read)?,
            thread_id: ThreadId::read(read)?,
            location: Location::read(read)?,
        })
    }
}

/// One event inside a composite packet. Only the two kinds this client
/// ever requests are represented; any other discriminant aborts decoding
/// of the whole packet with [`JdwpError::UnsupportedEventKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    SingleStep(EventData),
    Breakpoint(EventData),
}

impl Event {
    pub fn data(&self) -> &EventData {
        match self {
            Event::SingleStep(data) | Event::Breakpoint(data) => data,
        }
    }
}

/// A fully decoded `Event.Composite` packet body.
#[derive(Debug, Clone)]
pub struct Composite {
    pub suspend_policy: SuspendPolicy,
    pub events: Vec<Event>,
}

/// Parses `suspendPolicy(u8) eventCount(u32)` followed by that many
/// `eventKind(u8) ...` records.
///
/// Stops at the first unrecognized `eventKind` and reports it rather than
/// skipping it — there is no length prefix on an individual event, so an
/// unknown kind's body can't be safely skipped over.
pub fn decode<R: Read>(read: &mut JdwpReader<R>) -> Result<Composite> {
    let suspend_policy = SuspendPolicy::read(read)?;
    let count = u32::read(read)?;
    let mut events = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let raw_kind = u8::read(read)?;
        let event = match EventKind::from_raw(raw_kind) {
            Some(EventKind::SingleStep) => Event::SingleStep(EventData::read(read)?),
            Some(EventKind::Breakpoint) => Event::Breakpoint(EventData::read(read)?),
            None => return Err(JdwpError::UnsupportedEventKind(raw_kind)),
        };
        events.push(event);
    }
    Ok(Composite {
        suspend_policy,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{codec::IdSizes, enums::RefTypeTag, ids::ReferenceTypeId, ids::MethodId};

    fn widths() -> IdSizes {
        IdSizes {
            field_id_size: 8,
            method_id_size: 4,
            object_id_size: 8,
            reference_type_id_size: 8,
            frame_id_size: 8,
        }
    }

    #[test]
    fn decodes_a_single_breakpoint_event() {
        let mut buf = Vec::new();
        {
            use crate::codec::{JdwpWritable, JdwpWriter};
            let mut w = JdwpWriter::new(&mut buf, widths());
            SuspendPolicy::All.write(&mut w).unwrap();
            1u32.write(&mut w).unwrap(); // eventCount
            2u8.write(&mut w).unwrap(); // eventKind = Breakpoint
            0xAAu32.write(&mut w).unwrap(); // requestID
            ThreadId(0x07).write(&mut w).unwrap();
            Location {
                type_tag: RefTypeTag::Class,
                class_id: ReferenceTypeId(0x42),
                method_id: MethodId(0x11),
                index: 0xF0,
            }
            .write(&mut w)
            .unwrap();
        }

        let mut reader = JdwpReader::new(&buf[..], widths());
        let composite = decode(&mut reader).unwrap();
        assert_eq!(composite.suspend_policy, SuspendPolicy::All);
        assert_eq!(composite.events.len(), 1);
        match composite.events[0] {
            Event::Breakpoint(data) => {
                assert_eq!(data.request_id, 0xAA);
                assert_eq!(data.thread_id, ThreadId(0x07));
            }
            _ => panic!("expected a breakpoint event"),
        }
    }

    #[test]
    fn unknown_event_kind_aborts_the_whole_packet() {
        let mut buf = Vec::new();
        {
            use crate::codec::{JdwpWritable, JdwpWriter};
            let mut w = JdwpWriter::new(&mut buf, widths());
            SuspendPolicy::All.write(&mut w).unwrap();
            1u32.write(&mut w).unwrap();
            99u8.write(&mut w).unwrap(); // unrecognized kind
        }
        let mut reader = JdwpReader::new(&buf[..], widths());
        match decode(&mut reader) {
            Err(JdwpError::UnsupportedEventKind(99)) => {}
            other => panic!("expected UnsupportedEventKind(99), got {other:?}"),
        }
    }
}
