//! Small closed sets of values that appear literally in the wire protocol.
//!
//! Each one round-trips through the [`codec`](crate::codec) traits the same
//! way the fixed-width integers do; `readable_enum!` below keeps the
//! read/write/Display impls for a C-like enum in one place instead of
//! hand-rolling each match three times.

use std::{
    fmt::{Display, Formatter},
    io::{self, Read, Write},
};

use bitflags::bitflags;

use crate::codec::{JdwpReadable, JdwpReader, JdwpWritable, JdwpWriter};

macro_rules! readable_enum {
    ($(#[$meta:meta])* $e:ident: $repr:ident, $($name:ident = $id:literal | $doc:literal),* $(,)?) => {
        $(#[$meta])*
        #[repr($repr)]
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $e {
            $(
                #[doc = $doc]
                $name = $id,
            )*
        }

        impl $e {
            pub fn from_raw(n: $repr) -> Option<Self> {
                match n {
                    $($id => Some($e::$name),)*
                    _ => None,
                }
            }
        }

        impl JdwpReadable for $e {
            fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
                let raw = $repr::read(read)?;
                $e::from_raw(raw)
                    .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, format!(
                        concat!(stringify!($e), ": unknown discriminant {}"), raw)))
            }
        }

        impl JdwpWritable for $e {
            fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
                (*self as $repr).write(write)
            }
        }

        impl Display for $e {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($e::$name => write!(f, $doc),)*
                }
            }
        }
    };
}

readable_enum! {
    /// Tag byte distinguishing whether a reference type is a class,
    /// interface or array, used in [`Location`](crate::types::Location) and
    /// in `VM.ClassesBySignature` replies.
    RefTypeTag: u8,
    Class = 1 | "class",
    Interface = 2 | "interface",
    Array = 3 | "array",
}

readable_enum! {
    /// Which threads are suspended when an event this policy is attached to
    /// fires.
    SuspendPolicy: u8,
    None = 0 | "none",
    EventThread = 1 | "event thread",
    All = 2 | "all threads",
}

readable_enum! {
    /// Event kinds this client recognizes in a composite event packet.
    ///
    /// The full JDWP event-kind space is much larger; everything else is
    /// reported as [`crate::error::JdwpError::UnsupportedEventKind`] rather
    /// than given a variant here, since this client never requests those
    /// other kinds.
    EventKind: u8,
    SingleStep = 1 | "single step",
    Breakpoint = 2 | "breakpoint",
}

readable_enum! {
    /// `EventRequest.Set` modifier-kind tag. Only the two modifiers this
    /// client ever installs (`LocationOnly` for breakpoints, `Step` for
    /// single-stepping) are represented.
    ModKind: u8,
    LocationOnly = 7 | "location only",
    Step = 10 | "step",
}

readable_enum! {
    /// Granularity of a step request. This client always steps by
    /// instruction (`Min`), never by source line.
    StepSize: u8,
    Min = 0 | "minimal step size",
}

readable_enum! {
    /// Call-stack relation of a step request. This client always steps
    /// `Over`, matching the original tool's `ni` (next-instruction) command.
    StepDepth: u8,
    Into = 0 | "step into",
    Over = 1 | "step over",
    Out = 2 | "step out",
}

bitflags! {
    /// Bit flags returned alongside a reference type's id from
    /// `VM.ClassesBySignature`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ClassStatus: u32 {
        const VERIFIED = 1;
        const PREPARED = 2;
        const INITIALIZED = 4;
        const ERROR = 8;
    }
}

impl JdwpReadable for ClassStatus {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        let bits = i32::read(read)?;
        Ok(ClassStatus::from_bits_truncate(bits as u32))
    }
}

impl JdwpWritable for ClassStatus {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        (self.bits() as i32).write(write)
    }
}

/// The subset of standard JDWP error codes this client's reply decoder
/// knows a name for, plus `Other` for any other value a compliant VM is
/// free to return. Unlike the enums built on `readable_enum!` above, this
/// one can never fail to parse a valid `u16` — a reply's `errcode` field
/// is never allowed to turn an otherwise-successful exchange into a fatal
/// transport error just because this client doesn't recognize the code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    None,
    InvalidThread,
    InvalidThreadGroup,
    ThreadNotSuspended,
    ThreadNotAlive,
    InvalidObject,
    InvalidClass,
    ClassNotPrepared,
    InvalidMethodid,
    InvalidLocation,
    InvalidFieldid,
    InvalidFrameid,
    NotImplemented,
    NullPointer,
    AbsentInformation,
    InvalidEventType,
    IllegalArgument,
    OutOfMemory,
    AccessDenied,
    VmDead,
    Internal,
    UnattachedThread,
    InvalidTag,
    InvalidIndex,
    InvalidLength,
    InvalidString,
    InvalidClassLoader,
    InvalidArray,
    TransportLoad,
    TransportInit,
    /// Any JDWP error code this client has no name for.
    Other(u16),
}

impl ErrorCode {
    pub fn from_raw(n: u16) -> Self {
        match n {
            0 => ErrorCode::None,
            10 => ErrorCode::InvalidThread,
            11 => ErrorCode::InvalidThreadGroup,
            13 => ErrorCode::ThreadNotSuspended,
            15 => ErrorCode::ThreadNotAlive,
            20 => ErrorCode::InvalidObject,
            21 => ErrorCode::InvalidClass,
            22 => ErrorCode::ClassNotPrepared,
            23 => ErrorCode::InvalidMethodid,
            24 => ErrorCode::InvalidLocation,
            25 => ErrorCode::InvalidFieldid,
            30 => ErrorCode::InvalidFrameid,
            99 => ErrorCode::NotImplemented,
            100 => ErrorCode::NullPointer,
            101 => ErrorCode::AbsentInformation,
            102 => ErrorCode::InvalidEventType,
            103 => ErrorCode::IllegalArgument,
            110 => ErrorCode::OutOfMemory,
            111 => ErrorCode::AccessDenied,
            112 => ErrorCode::VmDead,
            113 => ErrorCode::Internal,
            115 => ErrorCode::UnattachedThread,
            500 => ErrorCode::InvalidTag,
            503 => ErrorCode::InvalidIndex,
            504 => ErrorCode::InvalidLength,
            506 => ErrorCode::InvalidString,
            507 => ErrorCode::InvalidClassLoader,
            508 => ErrorCode::InvalidArray,
            509 => ErrorCode::TransportLoad,
            510 => ErrorCode::TransportInit,
            other => ErrorCode::Other(other),
        }
    }

    pub fn raw(&self) -> u16 {
        match *self {
            ErrorCode::None => 0,
            ErrorCode::InvalidThread => 10,
            ErrorCode::InvalidThreadGroup => 11,
            ErrorCode::ThreadNotSuspended => 13,
            ErrorCode::ThreadNotAlive => 15,
            ErrorCode::InvalidObject => 20,
            ErrorCode::InvalidClass => 21,
            ErrorCode::ClassNotPrepared => 22,
            ErrorCode::InvalidMethodid => 23,
            ErrorCode::InvalidLocation => 24,
            ErrorCode::InvalidFieldid => 25,
            ErrorCode::InvalidFrameid => 30,
            ErrorCode::NotImplemented => 99,
            ErrorCode::NullPointer => 100,
            ErrorCode::AbsentInformation => 101,
            ErrorCode::InvalidEventType => 102,
            ErrorCode::IllegalArgument => 103,
            ErrorCode::OutOfMemory => 110,
            ErrorCode::AccessDenied => 111,
            ErrorCode::VmDead => 112,
            ErrorCode::Internal => 113,
            ErrorCode::UnattachedThread => 115,
            ErrorCode::InvalidTag => 500,
            ErrorCode::InvalidIndex => 503,
            ErrorCode::InvalidLength => 504,
            ErrorCode::InvalidString => 506,
            ErrorCode::InvalidClassLoader => 507,
            ErrorCode::InvalidArray => 508,
            ErrorCode::TransportLoad => 509,
            ErrorCode::TransportInit => 510,
            ErrorCode::Other(n) => n,
        }
    }
}

impl JdwpReadable for ErrorCode {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok(ErrorCode::from_raw(u16::read(read)?))
    }
}

impl JdwpWritable for ErrorCode {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.raw().write(write)
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::None => write!(f, "no error"),
            ErrorCode::InvalidThread => write!(f, "invalid thread"),
            ErrorCode::InvalidThreadGroup => write!(f, "invalid thread group"),
            ErrorCode::ThreadNotSuspended => write!(f, "thread not suspended"),
            ErrorCode::ThreadNotAlive => write!(f, "thread not alive"),
            ErrorCode::InvalidObject => write!(f, "invalid object"),
            ErrorCode::InvalidClass => write!(f, "invalid class"),
            ErrorCode::ClassNotPrepared => write!(f, "class not prepared"),
            ErrorCode::InvalidMethodid => write!(f, "invalid method id"),
            ErrorCode::InvalidLocation => write!(f, "invalid location"),
            ErrorCode::InvalidFieldid => write!(f, "invalid field id"),
            ErrorCode::InvalidFrameid => write!(f, "invalid frame id"),
            ErrorCode::NotImplemented => write!(f, "not implemented"),
            ErrorCode::NullPointer => write!(f, "null pointer"),
            ErrorCode::AbsentInformation => write!(f, "absent information"),
            ErrorCode::InvalidEventType => write!(f, "invalid event type"),
            ErrorCode::IllegalArgument => write!(f, "illegal argument"),
            ErrorCode::OutOfMemory => write!(f, "out of memory"),
            ErrorCode::AccessDenied => write!(f, "access denied"),
            ErrorCode::VmDead => write!(f, "VM is not running"),
            ErrorCode::Internal => write!(f, "internal error"),
            ErrorCode::UnattachedThread => write!(f, "unattached thread"),
            ErrorCode::InvalidTag => write!(f, "invalid tag"),
            ErrorCode::InvalidIndex => write!(f, "invalid index"),
            ErrorCode::InvalidLength => write!(f, "invalid length"),
            ErrorCode::InvalidString => write!(f, "invalid string"),
            ErrorCode::InvalidClassLoader => write!(f, "invalid class loader"),
            ErrorCode::InvalidArray => write!(f, "invalid array"),
            ErrorCode::TransportLoad => write!(f, "unable to load transport"),
            ErrorCode::TransportInit => write!(f, "unable to init transport"),
            ErrorCode::Other(n) => write!(f, "unrecognized JDWP error code {n}"),
        }
    }
}
