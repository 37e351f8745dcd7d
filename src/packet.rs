//! Packet framing: turning a command body into the 11-byte-header wire
//! format on the way out, and splitting an inbound stream back into
//! reply-or-event packets on the way in.
//!
//! This is deliberately decoupled from request/reply *correlation* (that's
//! [`crate::session::Session`]'s job): a packet is tagged reply-or-event
//! purely from its `flags` byte, with no notion yet of which request (if
//! any) it answers.

use std::io::Read;

use crate::{
    enums::ErrorCode,
    error::{JdwpError, Result},
};

pub const HEADER_LEN: u32 = 11;
pub const HANDSHAKE: &[u8; 14] = b"JDWP-Handshake";

/// `(command set, command)` — the two opcode bytes identifying what a
/// request packet asks the VM to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CommandId {
    pub command_set: u8,
    pub command: u8,
}

impl CommandId {
    pub const fn new(command_set: u8, command: u8) -> CommandId {
        CommandId {
            command_set,
            command,
        }
    }
}

/// Event command set/command: the one asynchronous packet shape the VM
/// ever pushes unsolicited.
pub const EVENT_COMPOSITE: CommandId = CommandId::new(64, 100);

const FLAGS_COMMAND: u8 = 0x00;
const FLAGS_REPLY: u8 = 0x80;

/// An inbound packet, already split from its header but with its body still
/// raw bytes — decoding the body needs the session's negotiated
/// [`IdSizes`](crate::codec::IdSizes), which this module has no business
/// knowing about.
#[derive(Debug)]
pub enum Packet {
    Reply {
        id: u32,
        error_code: ErrorCode,
        body: Vec<u8>,
    },
    Event {
        id: u32,
        body: Vec<u8>,
    },
}

impl Packet {
    pub fn id(&self) -> u32 {
        match self {
            Packet::Reply { id, .. } => *id,
            Packet::Event { id, .. } => *id,
        }
    }
}

/// Serializes an outbound request: 11-byte header (`length`, `id`,
/// `flags=0`, `command_set`, `command`) followed by `body` verbatim.
pub fn encode_request(id: u32, command: CommandId, body: &[u8]) -> Vec<u8> {
    let length = HEADER_LEN + body.len() as u32;
    let mut out = Vec::with_capacity(length as usize);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&id.to_be_bytes());
    out.push(FLAGS_COMMAND);
    out.push(command.command_set);
    out.push(command.command);
    out.extend_from_slice(body);
    out
}

/// Reads exactly one packet: the 11-byte header, then exactly
/// `length - 11` body bytes. Never reads past the packet's own length.
///
/// Short reads surface as [`JdwpError::Io`]; anything about the header
/// that doesn't parse into a known reply-or-event shape — a length
/// shorter than the header itself, an unrecognized flags byte, or an
/// asynchronous command other than `Event.Composite` — surfaces as
/// [`JdwpError::BadFraming`], never as a generic I/O error. A reply's
/// `errcode` is never one of these: any 16-bit value parses into
/// [`ErrorCode`], falling back to [`ErrorCode::Other`], so an
/// unrecognized-but-valid error code can't turn a successful exchange
/// into a framing failure either.
pub fn read_packet<R: Read>(read: &mut R) -> Result<Packet> {
    let mut header = [0u8; HEADER_LEN as usize];
    read.read_exact(&mut header)?;

    let length = u32::from_be_bytes(header[0..4].try_into().unwrap());
    if length < HEADER_LEN {
        return Err(JdwpError::BadFraming(format!(
            "packet length {length} shorter than the header itself"
        )));
    }
    let id = u32::from_be_bytes(header[4..8].try_into().unwrap());
    let flags = header[8];

    let mut body = vec![0u8; (length - HEADER_LEN) as usize];
    read.read_exact(&mut body)?;

    match flags {
        FLAGS_REPLY => {
            let raw = u16::from_be_bytes([header[9], header[10]]);
            Ok(Packet::Reply {
                id,
                error_code: ErrorCode::from_raw(raw),
                body,
            })
        }
        FLAGS_COMMAND => {
            let command = CommandId::new(header[9], header[10]);
            if command != EVENT_COMPOSITE {
                return Err(JdwpError::BadFraming(format!(
                    "unexpected asynchronous command {}.{}, only Event.Composite is handled",
                    command.command_set, command.command
                )));
            }
            Ok(Packet::Event { id, body })
        }
        other => Err(JdwpError::BadFraming(format!(
            "unrecognized packet flags byte: {other:#x}"
        ))),
    }
}
