//! VirtualMachine command set (1).

use std::io::{self, Read, Write};

use super::Command;
use crate::{
    codec::{IdSizes, JdwpReadable, JdwpReader, JdwpWritable, JdwpWriter},
    packet::CommandId,
    types::Version as VersionReply,
};

/// Returns the JDWP version implemented by the target VM.
#[derive(Debug, Clone, Copy)]
pub struct Version;

impl Command for Version {
    const ID: CommandId = CommandId::new(1, 1);
    type Output = VersionReply;

    fn write_body<W: Write>(&self, _write: &mut JdwpWriter<W>) -> io::Result<()> {
        Ok(())
    }
}

/// Returns reference types for all loaded classes matching `signature`
/// (a JNI type signature, e.g. `Lcom/example/App;`).
///
/// Multiple reference types come back if more than one class loader has
/// loaded a class of that name.
#[derive(Debug, Clone)]
pub struct ClassesBySignature {
    pub signature: String,
}

impl ClassesBySignature {
    pub fn new(signature: impl Into<String>) -> Self {
        ClassesBySignature {
            signature: signature.into(),
        }
    }
}

impl Command for ClassesBySignature {
    const ID: CommandId = CommandId::new(1, 2);
    type Output = Vec<crate::types::ClassRef>;

    fn write_body<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.signature.write(write)
    }
}

/// Negotiates the byte widths of every identifier kind for the rest of the
/// session. Issued once, immediately after the handshake.
#[derive(Debug, Clone, Copy)]
pub struct IdSizesRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSizesReply {
    pub field_id_size: u32,
    pub method_id_size: u32,
    pub object_id_size: u32,
    pub reference_type_id_size: u32,
    pub frame_id_size: u32,
}

impl From<IdSizesReply> for IdSizes {
    fn from(r: IdSizesReply) -> Self {
        IdSizes {
            field_id_size: r.field_id_size,
            method_id_size: r.method_id_size,
            object_id_size: r.object_id_size,
            reference_type_id_size: r.reference_type_id_size,
            frame_id_size: r.frame_id_size,
        }
    }
}

impl JdwpReadable for IdSizesReply {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok(IdSizesReply {
            field_id_size: u32::read(read)?,
            method_id_size: u32::read(read)?,
            object_id_size: u32::read(read)?,
            reference_type_id_size: u32::read(read)?,
            frame_id_size: u32::read(read)?,
        })
    }
}

impl Command for IdSizesRequest {
    const ID: CommandId = CommandId::new(1, 7);
    type Output = IdSizesReply;

    fn write_body<W: Write>(&self, _write: &mut JdwpWriter<W>) -> io::Result<()> {
        Ok(())
    }
}

/// Suspends every thread in the target VM.
#[derive(Debug, Clone, Copy)]
pub struct Suspend;

impl Command for Suspend {
    const ID: CommandId = CommandId::new(1, 8);
    type Output = ();

    fn write_body<W: Write>(&self, _write: &mut JdwpWriter<W>) -> io::Result<()> {
        Ok(())
    }
}

/// Resumes execution of the target VM. Has no effect if not currently
/// suspended.
#[derive(Debug, Clone, Copy)]
pub struct Resume;

impl Command for Resume {
    const ID: CommandId = CommandId::new(1, 9);
    type Output = ();

    fn write_body<W: Write>(&self, _write: &mut JdwpWriter<W>) -> io::Result<()> {
        Ok(())
    }
}
