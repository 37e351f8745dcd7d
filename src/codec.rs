//! Byte-level (de)serialization primitives.
//!
//! Every multi-byte field in the protocol is big-endian; every identifier
//! field is a variable-width integer whose width is negotiated once per
//! session via `VM.IDSizes` (see [`IdSizes`]). Rather than threading the
//! negotiated widths through every call site, reads and writes go through
//! [`JdwpReader`]/[`JdwpWriter`], small wrappers around any `Read`/`Write`
//! that carry the session's [`IdSizes`] as context. No command or type ever
//! calls `byteorder` directly; they all go through [`JdwpReadable`] and
//! [`JdwpWritable`].

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// Byte widths of the five identifier kinds, negotiated once via
/// `VM.IDSizes` immediately after the handshake and held fixed for the rest
/// of the session.
///
/// The default (all 8) is only used before the real sizes are known, or in
/// tests that don't care about width variation; a real session always
/// overwrites it with the VM's answer before decoding any identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSizes {
    pub field_id_size: u32,
    pub method_id_size: u32,
    pub object_id_size: u32,
    pub reference_type_id_size: u32,
    pub frame_id_size: u32,
}

impl Default for IdSizes {
    fn default() -> Self {
        IdSizes {
            field_id_size: 8,
            method_id_size: 8,
            object_id_size: 8,
            reference_type_id_size: 8,
            frame_id_size: 8,
        }
    }
}

impl IdSizes {
    /// All five widths are one of the values JDWP actually allows.
    pub fn is_valid(&self) -> bool {
        [
            self.field_id_size,
            self.method_id_size,
            self.object_id_size,
            self.reference_type_id_size,
            self.frame_id_size,
        ]
        .into_iter()
        .all(|w| matches!(w, 1 | 2 | 4 | 8))
    }
}

/// Reads an identifier of the given byte width (1/2/4/8) as a `u64`,
/// zero-extended. This is the one place width-dispatch happens; every
/// identifier newtype in [`crate::ids`] calls through here with the width
/// out of its own [`IdSizes`] field.
pub fn read_id<R: Read>(read: &mut R, width: u32) -> io::Result<u64> {
    match width {
        1 => read.read_u8().map(u64::from),
        2 => read.read_u16::<BigEndian>().map(u64::from),
        4 => read.read_u32::<BigEndian>().map(u64::from),
        8 => read.read_u64::<BigEndian>(),
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported identifier width: {other}"),
        )),
    }
}

/// Writes an identifier truncated to the given byte width (1/2/4/8).
pub fn write_id<W: Write>(write: &mut W, width: u32, value: u64) -> io::Result<()> {
    match width {
        1 => write.write_u8(value as u8),
        2 => write.write_u16::<BigEndian>(value as u16),
        4 => write.write_u32::<BigEndian>(value as u32),
        8 => write.write_u64::<BigEndian>(value),
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported identifier width: {other}"),
        )),
    }
}

/// A [`Read`] wrapper carrying the session's negotiated [`IdSizes`].
pub struct JdwpReader<R> {
    inner: R,
    id_sizes: IdSizes,
}

impl<R: Read> JdwpReader<R> {
    pub fn new(inner: R, id_sizes: IdSizes) -> Self {
        JdwpReader { inner, id_sizes }
    }

    pub fn id_sizes(&self) -> IdSizes {
        self.id_sizes
    }
}

impl<R: Read> Read for JdwpReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// A [`Write`] wrapper carrying the session's negotiated [`IdSizes`].
pub struct JdwpWriter<W> {
    inner: W,
    id_sizes: IdSizes,
}

impl<W: Write> JdwpWriter<W> {
    pub fn new(inner: W, id_sizes: IdSizes) -> Self {
        JdwpWriter { inner, id_sizes }
    }

    pub fn id_sizes(&self) -> IdSizes {
        self.id_sizes
    }
}

impl<W: Write> Write for JdwpWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

pub trait JdwpReadable: Sized {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self>;
}

pub trait JdwpWritable {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()>;
}

impl JdwpReadable for () {
    #[inline]
    fn read<R: Read>(_: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok(())
    }
}

impl JdwpWritable for () {
    #[inline]
    fn write<W: Write>(&self, _: &mut JdwpWriter<W>) -> io::Result<()> {
        Ok(())
    }
}

impl JdwpReadable for bool {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u8().map(|n| n != 0)
    }
}

impl JdwpWritable for bool {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u8(u8::from(*self))
    }
}

impl JdwpReadable for u8 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u8()
    }
}

impl JdwpWritable for u8 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u8(*self)
    }
}

impl JdwpReadable for u16 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u16::<BigEndian>()
    }
}

impl JdwpWritable for u16 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u16::<BigEndian>(*self)
    }
}

impl JdwpReadable for u32 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u32::<BigEndian>()
    }
}

impl JdwpWritable for u32 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u32::<BigEndian>(*self)
    }
}

impl JdwpReadable for i32 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_i32::<BigEndian>()
    }
}

impl JdwpWritable for i32 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_i32::<BigEndian>(*self)
    }
}

impl JdwpReadable for u64 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u64::<BigEndian>()
    }
}

impl JdwpWritable for u64 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u64::<BigEndian>(*self)
    }
}

/// Length-prefixed UTF-8 string: a big-endian `u32` byte length followed by
/// that many bytes, never NUL-terminated.
impl JdwpReadable for String {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        let len = u32::read(read)? as usize;
        let mut bytes = vec![0; len];
        read.read_exact(&mut bytes)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl JdwpWritable for String {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        (self.len() as u32).write(write)?;
        write.write_all(self.as_bytes())
    }
}

impl JdwpWritable for str {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        (self.len() as u32).write(write)?;
        write.write_all(self.as_bytes())
    }
}

impl<T: JdwpReadable> JdwpReadable for Vec<T> {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        let len = u32::read(read)?;
        let mut res = Vec::with_capacity(len as usize);
        for _ in 0..len {
            res.push(T::read(read)?);
        }
        Ok(res)
    }
}

impl<T: JdwpWritable> JdwpWritable for [T] {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        (self.len() as u32).write(write)?;
        for item in self {
            item.write(write)?;
        }
        Ok(())
    }
}
