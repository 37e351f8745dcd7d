//! ReferenceType command set (2).

use std::io::{self, Write};

use super::Command;
use crate::{
    codec::{JdwpWritable, JdwpWriter},
    ids::ReferenceTypeId,
    packet::CommandId,
    types::MethodRef,
};

/// Returns the JNI signature of a reference type.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub ref_type: ReferenceTypeId,
}

impl Command for Signature {
    const ID: CommandId = CommandId::new(2, 1);
    type Output = String;

    fn write_body<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.ref_type.write(write)
    }
}

/// Returns information for each method in a reference type, in the order
/// they occur in the class file.
#[derive(Debug, Clone, Copy)]
pub struct Methods {
    pub ref_type: ReferenceTypeId,
}

impl Command for Methods {
    const ID: CommandId = CommandId::new(2, 5);
    type Output = Vec<MethodRef>;

    fn write_body<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.ref_type.write(write)
    }
}
