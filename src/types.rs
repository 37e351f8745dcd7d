//! Composite wire structures built out of the primitives in
//! [`codec`](crate::codec) and the identifiers in [`ids`](crate::ids).

use std::io::{self, Read, Write};

use crate::{
    codec::{JdwpReadable, JdwpReader, JdwpWritable, JdwpWriter},
    enums::{ClassStatus, RefTypeTag},
    ids::{MethodId, ReferenceTypeId},
};

/// A `(class, method, bytecode-index)` triple addressing one instruction in
/// the target VM. Used both to specify where a breakpoint goes and to
/// report where an event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub type_tag: RefTypeTag,
    pub class_id: ReferenceTypeId,
    pub method_id: MethodId,
    pub index: u64,
}

impl JdwpReadable for Location {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok(Location {
            type_tag: RefTypeTag::read(read)?,
            class_id: ReferenceTypeId::read(read)?,
            method_id: MethodId::read(read)?,
            index: u64::read(read)?,
        })
    }
}

impl JdwpWritable for Location {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.type_tag.write(write)?;
        self.class_id.write(write)?;
        self.method_id.write(write)?;
        self.index.write(write)
    }
}

/// One element of a `VM.ClassesBySignature` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassRef {
    pub ref_type_tag: RefTypeTag,
    pub type_id: ReferenceTypeId,
    pub status: ClassStatus,
}

impl JdwpReadable for ClassRef {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok(ClassRef {
            ref_type_tag: RefTypeTag::read(read)?,
            type_id: ReferenceTypeId::read(read)?,
            status: ClassStatus::read(read)?,
        })
    }
}

/// One element of a `ReferenceType.Methods` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    pub method_id: MethodId,
    pub name: String,
    pub signature: String,
    pub mod_bits: u32,
}

impl JdwpReadable for MethodRef {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok(MethodRef {
            method_id: MethodId::read(read)?,
            name: String::read(read)?,
            signature: String::read(read)?,
            mod_bits: u32::read(read)?,
        })
    }
}

/// `VM.Version` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub description: String,
    pub jdwp_major: u32,
    pub jdwp_minor: u32,
    pub vm_version: String,
    pub vm_name: String,
}

impl JdwpReadable for Version {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok(Version {
            description: String::read(read)?,
            jdwp_major: u32::read(read)?,
            jdwp_minor: u32::read(read)?,
            vm_version: String::read(read)?,
            vm_name: String::read(read)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::IdSizes;

    fn round_trip_location(widths: IdSizes) -> Location {
        let loc = Location {
            type_tag: RefTypeTag::Class,
            class_id: ReferenceTypeId(0x42),
            method_id: MethodId(0x11),
            index: 0xF0,
        };
        let mut buf = Vec::new();
        let mut w = JdwpWriter::new(&mut buf, widths);
        loc.write(&mut w).unwrap();

        let mut r = JdwpReader::new(&buf[..], widths);
        Location::read(&mut r).unwrap()
    }

    #[test]
    fn location_round_trips_at_narrow_and_wide_ids() {
        for width in [4u32, 8] {
            let widths = IdSizes {
                field_id_size: width,
                method_id_size: width,
                object_id_size: width,
                reference_type_id_size: width,
                frame_id_size: width,
            };
            let loc = round_trip_location(widths);
            assert_eq!(loc.class_id, ReferenceTypeId(0x42));
            assert_eq!(loc.method_id, MethodId(0x11));
            assert_eq!(loc.index, 0xF0);
        }
    }
}
