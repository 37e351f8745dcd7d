//! A scripted mock JDWP server: a real `TcpListener` on `localhost:0`
//! driven from a background thread that reads exactly the packets a
//! scenario expects and writes back exactly the bytes it scripts, byte by
//! byte, independent of the crate's own codec so the tests aren't just
//! checking the implementation against itself.

use std::{
    io::{Read, Write},
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
};

pub type Result<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Binds an ephemeral local port and runs `script` against the first
/// connection it accepts, on a background thread.
pub fn spawn_mock<F>(script: F) -> (u16, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();

    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind mock listener");
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept mock connection");
        script(stream);
    });
    (port, handle)
}

/// Reads the 14-byte handshake and echoes it back verbatim.
pub fn handshake_ok(stream: &mut TcpStream) {
    let mut buf = [0u8; 14];
    stream.read_exact(&mut buf).expect("read handshake");
    assert_eq!(&buf, b"JDWP-Handshake");
    stream.write_all(b"JDWP-Handshake").expect("write handshake");
}

/// Reads the 14-byte handshake and echoes back something else, to drive
/// the `HandshakeFailed` scenario.
pub fn handshake_mismatch(stream: &mut TcpStream) {
    let mut buf = [0u8; 14];
    stream.read_exact(&mut buf).expect("read handshake");
    stream
        .write_all(b"JDWP-Mismatch!")
        .expect("write mismatched handshake");
}

/// One inbound command packet, header fields split out and body left raw.
pub struct InboundRequest {
    pub id: u32,
    pub command_set: u8,
    pub command: u8,
    pub body: Vec<u8>,
}

/// Reads exactly one request packet (flags must be 0).
pub fn read_request(stream: &mut TcpStream) -> InboundRequest {
    let mut header = [0u8; 11];
    stream.read_exact(&mut header).expect("read request header");
    let length = u32::from_be_bytes(header[0..4].try_into().unwrap());
    let id = u32::from_be_bytes(header[4..8].try_into().unwrap());
    assert_eq!(header[8], 0, "expected a command packet (flags=0)");
    let command_set = header[9];
    let command = header[10];
    let mut body = vec![0u8; length as usize - 11];
    stream.read_exact(&mut body).expect("read request body");
    InboundRequest {
        id,
        command_set,
        command,
        body,
    }
}

/// Writes a reply packet (flags=0x80) for `id` with the given `error_code`
/// and raw `body`.
pub fn write_reply(stream: &mut TcpStream, id: u32, error_code: u16, body: &[u8]) {
    let length = 11 + body.len() as u32;
    let mut out = Vec::with_capacity(length as usize);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&id.to_be_bytes());
    out.push(0x80);
    out.extend_from_slice(&error_code.to_be_bytes());
    out.extend_from_slice(body);
    stream.write_all(&out).expect("write reply");
}

/// Writes an unsolicited `Event.Composite` packet (flags=0, cmdSet=64,
/// cmd=100). The `id` field of an event packet is never correlated to
/// anything by the client, so any value works; `0` matches real VMs.
pub fn write_event(stream: &mut TcpStream, body: &[u8]) {
    let length = 11 + body.len() as u32;
    let mut out = Vec::with_capacity(length as usize);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.push(0x00);
    out.push(64);
    out.push(100);
    out.extend_from_slice(body);
    stream.write_all(&out).expect("write event");
}

/// Appends a big-endian length-prefixed UTF-8 string, as every JDWP string
/// field is encoded.
pub fn push_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Appends an identifier truncated to `width` bytes (1/2/4/8), independent
/// of the crate's own `codec::write_id`.
pub fn push_id(buf: &mut Vec<u8>, width: u32, value: u64) {
    match width {
        1 => buf.push(value as u8),
        2 => buf.extend_from_slice(&(value as u16).to_be_bytes()),
        4 => buf.extend_from_slice(&(value as u32).to_be_bytes()),
        8 => buf.extend_from_slice(&value.to_be_bytes()),
        other => panic!("unsupported id width in test fixture: {other}"),
    }
}
