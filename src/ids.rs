//! Opaque VM-issued handles, each decoded at the width negotiated for its
//! kind in [`IdSizes`](crate::codec::IdSizes).
//!
//! These are thin `u64` newtypes: whatever width the wire used, the value
//! is zero-extended to `u64` in memory, and re-truncated to that same
//! width on the way back out. Nothing prevents constructing one from an
//! arbitrary number or reusing an id from a different VM; validity is the
//! target VM's problem, not this crate's.

use std::{
    fmt,
    io::{self, Read, Write},
};

use crate::codec::{read_id, write_id, JdwpReadable, JdwpReader, JdwpWritable, JdwpWriter};

macro_rules! identifier {
    ($name:ident, $width:ident) => {
        #[derive(Copy, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub u64);

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl JdwpReadable for $name {
            fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
                let width = read.id_sizes().$width;
                read_id(read, width).map($name)
            }
        }

        impl JdwpWritable for $name {
            fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
                let width = write.id_sizes().$width;
                write_id(write, width, self.0)
            }
        }
    };
}

identifier!(ObjectId, object_id_size);
identifier!(ThreadId, object_id_size);
identifier!(MethodId, method_id_size);
identifier!(FieldId, field_id_size);
identifier!(FrameId, frame_id_size);
identifier!(ReferenceTypeId, reference_type_id_size);
