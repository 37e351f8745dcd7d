//! Owns the socket, the handshake, request-id bookkeeping and the
//! synchronous request/reply exchange. Everything above this layer
//! ([`crate::debugger::Debugger`]) only ever calls [`Session::request`] and
//! [`Session::wait_for_event`]; nothing else touches the stream directly.

use std::{
    collections::VecDeque,
    io::{self, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use log::{debug, trace, warn};

use crate::{
    codec::{IdSizes, JdwpReadable, JdwpReader, JdwpWriter},
    commands::{event, virtual_machine, Command},
    enums::ErrorCode,
    error::{JdwpError, Result},
    packet::{encode_request, read_packet, Packet, HANDSHAKE},
    types::Version,
};

/// Session-level configuration set once at [`Session::attach`] and held for
/// the lifetime of the connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachOptions {
    /// Deadline applied to the connect attempt and to every subsequent
    /// socket read/write. `None` means block forever.
    pub timeout: Option<Duration>,
}

/// A handle that can abort an in-flight, possibly indefinitely blocked
/// [`Session::request`]/[`Session::wait_for_event`] call from outside the
/// [`Session`] — including while another thread holds it locked, which is
/// exactly the situation a blocked call leaves it in. `cancel()` never
/// takes the session's own lock: it only flips an `AtomicBool` and shuts
/// down a cloned handle to the socket, which unblocks a concurrent
/// blocking read on most platforms the way closing a pipe would.
///
/// Obtain one via [`Session::cancel_handle`] (or
/// [`crate::debugger::Debugger::cancel_handle`]) before the call you want
/// to be able to cancel starts, not from inside it.
#[derive(Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    shutdown_sock: Arc<Mutex<Option<TcpStream>>>,
}

impl CancelHandle {
    /// Requests cancellation of whatever call on this session is, or next
    /// becomes, blocked on the socket. Idempotent; safe to call whether or
    /// not a call is currently in flight.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(stream) = self.shutdown_sock.lock().unwrap().as_ref() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// The protocol-level state machine of `§4.6`: `Disconnected` is
/// `stream.is_none()`; every other state is folded into `connected` plus
/// the debugger-level suspended/step bookkeeping in
/// [`crate::debugger::Debugger`], which is the only thing that actually
/// cares about running-vs-suspended.
pub struct Session {
    stream: Option<TcpStream>,
    next_request_id: u32,
    id_sizes: IdSizes,
    version: Option<Version>,
    connected: bool,
    pending_events: VecDeque<Vec<u8>>,
    cancelled: Arc<AtomicBool>,
    shutdown_sock: Arc<Mutex<Option<TcpStream>>>,
}

impl Session {
    pub fn new() -> Session {
        Session {
            stream: None,
            next_request_id: 1,
            id_sizes: IdSizes::default(),
            version: None,
            connected: false,
            pending_events: VecDeque::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
            shutdown_sock: Arc::new(Mutex::new(None)),
        }
    }

    /// A handle that can cancel whichever call on this session is next
    /// blocked on the socket, from any thread, without taking the lock a
    /// caller normally holds this `Session` behind.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
            shutdown_sock: Arc::clone(&self.shutdown_sock),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn id_sizes(&self) -> IdSizes {
        self.id_sizes
    }

    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Opens the TCP connection, performs the handshake, and negotiates
    /// `VM.IDSizes`/`VM.Version`. Fails with [`JdwpError::AlreadyAttached`]
    /// if this session is already connected.
    pub fn attach(&mut self, host: &str, port: u16, options: AttachOptions) -> Result<()> {
        if self.connected {
            return Err(JdwpError::AlreadyAttached);
        }

        debug!("connecting to {host}:{port}");
        let mut stream = connect(host, port, options.timeout)?;
        stream.set_read_timeout(options.timeout)?;
        stream.set_write_timeout(options.timeout)?;

        if let Err(err) = handshake(&mut stream) {
            warn!("handshake with {host}:{port} failed: {err}");
            return Err(err);
        }

        self.cancelled.store(false, Ordering::SeqCst);
        *self.shutdown_sock.lock().unwrap() = Some(stream.try_clone()?);
        self.stream = Some(stream);
        self.next_request_id = 1;
        self.pending_events.clear();

        let id_sizes = self.request(virtual_machine::IdSizesRequest)?;
        self.id_sizes = id_sizes.into();
        trace!("negotiated id sizes: {:?}", self.id_sizes);

        let version = self.request(virtual_machine::Version)?;
        debug!("attached to {} ({})", version.description, version.vm_name);
        self.version = Some(version);

        self.connected = true;
        Ok(())
    }

    /// Closes the socket and resets all per-connection state. Safe to call
    /// from any state; idempotent.
    pub fn detach(&mut self) {
        self.stream = None;
        self.connected = false;
        self.pending_events.clear();
        *self.shutdown_sock.lock().unwrap() = None;
    }

    /// Encodes and sends `command`, then reads packets until the matching
    /// reply arrives. Any event packet read along the way is buffered for
    /// [`Session::wait_for_event`], never discarded.
    pub fn request<C: Command>(&mut self, command: C) -> Result<C::Output> {
        let id = self.next_request_id;
        self.next_request_id += 2;

        let mut body = Vec::new();
        {
            let mut writer = JdwpWriter::new(&mut body, self.id_sizes);
            command.write_body(&mut writer)?;
        }
        let packet = encode_request(id, C::ID, &body);

        let result = self.send_and_await_reply::<C>(id, &packet);
        if let Err(ref err) = result {
            if err.is_fatal() {
                self.detach();
            }
        }
        result
    }

    fn send_and_await_reply<C: Command>(&mut self, id: u32, packet: &[u8]) -> Result<C::Output> {
        let cancelled = Arc::clone(&self.cancelled);
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| JdwpError::InvalidArgument("session is not attached".into()))?;
        if let Err(err) = stream.write_all(packet) {
            return Err(cancelled_or(&cancelled, err.into()));
        }

        loop {
            let packet = match read_packet(stream) {
                Ok(packet) => packet,
                Err(err) => return Err(cancelled_or(&cancelled, err)),
            };
            match packet {
                Packet::Event { body, .. } => {
                    trace!("buffering event packet received while awaiting reply {id}");
                    self.pending_events.push_back(body);
                }
                Packet::Reply {
                    id: reply_id,
                    error_code,
                    body,
                } => {
                    if reply_id != id {
                        return Err(JdwpError::BadFraming(format!(
                            "reply id {reply_id} does not match outstanding request {id}"
                        )));
                    }
                    if error_code != ErrorCode::None {
                        return Err(JdwpError::Protocol(error_code));
                    }
                    let mut reader = JdwpReader::new(&body[..], self.id_sizes);
                    return Ok(C::Output::read(&mut reader)?);
                }
            }
        }
    }

    /// Drains the buffered-event queue first; if it's empty, blocks reading
    /// packets until an event arrives. A stray reply with no outstanding
    /// request is a framing error.
    pub fn wait_for_event(&mut self) -> Result<event::Composite> {
        let result = self.wait_for_event_inner();
        if let Err(ref err) = result {
            if err.is_fatal() {
                self.detach();
            }
        }
        result
    }

    fn wait_for_event_inner(&mut self) -> Result<event::Composite> {
        let body = match self.pending_events.pop_front() {
            Some(body) => body,
            None => {
                let cancelled = Arc::clone(&self.cancelled);
                let stream = self
                    .stream
                    .as_mut()
                    .ok_or_else(|| JdwpError::InvalidArgument("session is not attached".into()))?;
                loop {
                    let packet = match read_packet(stream) {
                        Ok(packet) => packet,
                        Err(err) => return Err(cancelled_or(&cancelled, err)),
                    };
                    match packet {
                        Packet::Event { body, .. } => break body,
                        Packet::Reply { id, .. } => {
                            return Err(JdwpError::BadFraming(format!(
                                "unexpected reply {id} with no outstanding request"
                            )));
                        }
                    }
                }
            }
        };
        let mut reader = JdwpReader::new(&body[..], self.id_sizes);
        event::decode(&mut reader)
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

/// Turns `err` into [`JdwpError::Cancelled`] if `cancel()` was called
/// since this flag was last consumed, regardless of what `err` actually
/// was — a cancelled socket shutdown surfaces to the blocked read as an
/// ordinary I/O error, and the only way to tell it apart from a genuine
/// transport failure is the flag [`CancelHandle::cancel`] set first.
fn cancelled_or(cancelled: &AtomicBool, err: JdwpError) -> JdwpError {
    if cancelled.swap(false, Ordering::SeqCst) {
        JdwpError::Cancelled
    } else {
        err
    }
}

/// Resolves `host:port` and connects, applying `timeout` to the connect
/// attempt itself (not just the subsequent reads/writes) when one is set.
/// Tries every resolved address in turn, matching `TcpStream::connect`'s
/// own fallback behavior for hostnames with multiple records.
fn connect(host: &str, port: u16, timeout: Option<Duration>) -> Result<TcpStream> {
    let Some(timeout) = timeout else {
        return Ok(TcpStream::connect((host, port))?);
    };

    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses to connect to"))
        .into())
}

/// Sends and reads back the fixed 14-byte `JDWP-Handshake` magic. Any
/// mismatch is fatal to the (not-yet-established) session.
fn handshake(stream: &mut TcpStream) -> Result<()> {
    stream.write_all(HANDSHAKE)?;
    let mut echoed = [0u8; 14];
    std::io::Read::read_exact(stream, &mut echoed)?;
    if &echoed != HANDSHAKE {
        return Err(JdwpError::HandshakeFailed);
    }
    Ok(())
}
