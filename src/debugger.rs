//! High-level operations: attach, install breakpoints by class+method
//! name, resume-and-wait, single-step, suspend. This is the one type the
//! out-of-scope CLI/shell layer is meant to hold onto; everything below it
//! ([`crate::session::Session`] and the command codecs) is an
//! implementation detail.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use log::{debug, info, warn};

use crate::{
    commands::{event::Event, event_request, reference_type, thread_reference, virtual_machine},
    enums::EventKind,
    error::{JdwpError, Result},
    ids::ThreadId,
    interrupt::{self, InterruptFlag, SessionId},
    session::{AttachOptions, CancelHandle, Session},
    types::Location,
};

/// A breakpoint installed via [`Debugger::set_breakpoint`], keyed by its
/// `request_id` in [`Debugger::breakpoints`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub request_id: u32,
    pub class_name: String,
    pub method_name: String,
}

/// The single step request active on a suspended thread, if any. Cleared
/// by [`Debugger::resume`].
#[derive(Debug, Clone, Copy)]
struct StepRequest {
    request_id: u32,
    thread_id: ThreadId,
}

/// Owns a [`Session`] behind `Arc<Mutex<_>>` so `suspend_vm` can be called
/// from the interrupt-check path without reaching past the mutex into
/// socket I/O, and tracks the bookkeeping `§4.5`/`§4.6` assign to the
/// facade rather than the session: installed breakpoints, the currently
/// suspended thread, and the active step request.
pub struct Debugger {
    session: Arc<Mutex<Session>>,
    session_id: Option<SessionId>,
    interrupt: Option<InterruptFlag>,
    cancel_handle: Option<CancelHandle>,
    breakpoints: HashMap<u32, Breakpoint>,
    suspended_thread: Option<ThreadId>,
    step_request: Option<StepRequest>,
}

impl Debugger {
    /// A `Debugger` with no session yet; call [`Debugger::attach`] before
    /// anything else.
    pub fn new() -> Debugger {
        Debugger {
            session: Arc::new(Mutex::new(Session::new())),
            session_id: None,
            interrupt: None,
            cancel_handle: None,
            breakpoints: HashMap::new(),
            suspended_thread: None,
            step_request: None,
        }
    }

    /// Parses `host:port`, connects, and negotiates id sizes and version.
    /// Registers the session with the interrupt registry on success, and
    /// caches a [`CancelHandle`] for it — cached rather than derived lazily
    /// by [`Debugger::cancel_handle`], since deriving it would need the
    /// same lock a blocked call the caller wants to cancel is holding.
    pub fn attach(&mut self, host_port: &str, options: AttachOptions) -> Result<()> {
        let (host, port) = parse_host_port(host_port)?;
        let mut session = self.session.lock().unwrap();
        session.attach(&host, port, options)?;
        self.cancel_handle = Some(session.cancel_handle());
        drop(session);
        self.session_id = Some(interrupt::register(&self.session));
        info!("attached to {host_port}");
        Ok(())
    }

    /// A handle that can cancel whichever call on this debugger's session
    /// is currently blocked on the socket (`§5`/`§7`'s cooperative
    /// cancellation), from any thread. `None` before the first successful
    /// `attach`. Cloning and calling it never blocks, even while a
    /// `request`/`wait_for_event` call is in flight.
    pub fn cancel_handle(&self) -> Option<CancelHandle> {
        self.cancel_handle.clone()
    }

    /// Equips this debugger with an OS-signal-driven `suspend_vm` trigger.
    /// Optional: without it, `suspend_vm` can still be called directly.
    pub fn install_interrupt_handler(&mut self) -> std::io::Result<()> {
        self.interrupt = Some(InterruptFlag::install()?);
        Ok(())
    }

    /// Unregisters the session and closes the socket. Safe from any state.
    pub fn detach(&mut self) {
        if let Some(id) = self.session_id.take() {
            interrupt::unregister(id);
        }
        self.session.lock().unwrap().detach();
        self.breakpoints.clear();
        self.suspended_thread = None;
        self.step_request = None;
    }

    /// Canonicalizes `class_name` (`.` -> `/`, wrapped as `Lname;`),
    /// resolves every loaded class of that name, and installs a
    /// `Breakpoint` event request on every method named `method_name`.
    /// Overloads install one breakpoint each. Returns the number
    /// installed.
    pub fn set_breakpoint(&mut self, class_name: &str, method_name: &str) -> Result<usize> {
        let signature = canonicalize_class_name(class_name)?;

        let mut session = self.session.lock().unwrap();
        let classes = session.request(virtual_machine::ClassesBySignature::new(signature))?;

        let mut installed = 0;
        for class in classes {
            let methods = session.request(reference_type::Methods {
                ref_type: class.type_id,
            })?;
            for method in methods {
                if method.name != method_name {
                    continue;
                }
                let location = Location {
                    type_tag: class.ref_type_tag,
                    class_id: class.type_id,
                    method_id: method.method_id,
                    index: 0,
                };
                let request_id =
                    session.request(event_request::Set::breakpoint(location))?;
                self.breakpoints.insert(
                    request_id,
                    Breakpoint {
                        request_id,
                        class_name: class_name.to_string(),
                        method_name: method_name.to_string(),
                    },
                );
                installed += 1;
            }
        }
        debug!("installed {installed} breakpoint(s) on {class_name}.{method_name}");
        Ok(installed)
    }

    /// Clears any active step request, resumes the VM, and clears the
    /// suspended-thread bookkeeping.
    pub fn resume(&mut self) -> Result<()> {
        let mut session = self.session.lock().unwrap();
        if let Some(step) = self.step_request.take() {
            session.request(event_request::Clear {
                event_kind: EventKind::SingleStep,
                request_id: step.request_id,
            })?;
        }
        session.request(virtual_machine::Resume)?;
        self.suspended_thread = None;
        drop(session);
        self.check_interrupt()?;
        Ok(())
    }

    /// Blocks for the next composite event. Breakpoint sub-events whose
    /// `request_id` is a known breakpoint are candidates for the returned
    /// value; step sub-events never are. `suspended_thread` is left
    /// pointing at the thread of whichever sub-event produced the
    /// returned breakpoint (first match wins, matching `hit`), falling
    /// back to the last sub-event's thread when nothing matched — a
    /// composite under `suspend_policy=All` can carry sub-events for
    /// several threads, and the two must agree on which one fired.
    /// Returns `None` if the packet held no recognized breakpoint.
    pub fn wait_for_breakpoint(&mut self) -> Result<Option<Breakpoint>> {
        let composite = self.session.lock().unwrap().wait_for_event()?;
        let mut hit: Option<(Breakpoint, ThreadId)> = None;
        let mut last_thread = None;
        for event in composite.events {
            match event {
                Event::Breakpoint(data) => {
                    last_thread = Some(data.thread_id);
                    if let Some(breakpoint) = self.breakpoints.get(&data.request_id) {
                        hit.get_or_insert_with(|| (breakpoint.clone(), data.thread_id));
                    } else {
                        warn!(
                            "breakpoint event for unknown request {}",
                            data.request_id
                        );
                    }
                }
                Event::SingleStep(data) => {
                    last_thread = Some(data.thread_id);
                }
            }
        }
        self.suspended_thread = hit.as_ref().map(|(_, thread)| *thread).or(last_thread);
        self.check_interrupt()?;
        Ok(hit.map(|(breakpoint, _)| breakpoint))
    }

    /// Requires a suspended thread. Installs a single-step request if one
    /// isn't already active, unwinds the thread's suspend count with
    /// repeated `ThreadReference.Resume` calls (JDWP suspend counts are
    /// per-thread; a lone `Resume` only decrements by one), then blocks
    /// until the matching `SingleStep` event arrives.
    pub fn step_instruction(&mut self) -> Result<()> {
        let thread = self
            .suspended_thread
            .ok_or_else(|| JdwpError::InvalidArgument("no suspended thread to step".into()))?;

        let step_request_id = match self.step_request {
            Some(step) => step.request_id,
            None => {
                let mut session = self.session.lock().unwrap();
                let request_id = session.request(event_request::Set::single_step(thread))?;
                self.step_request = Some(StepRequest {
                    request_id,
                    thread_id: thread,
                });
                request_id
            }
        };

        let suspend_count = {
            let mut session = self.session.lock().unwrap();
            session.request(thread_reference::SuspendCount { thread })?
        };
        for _ in 0..suspend_count {
            let mut session = self.session.lock().unwrap();
            session.request(thread_reference::Resume { thread })?;
        }

        loop {
            let composite = self.session.lock().unwrap().wait_for_event()?;
            let mut matched = false;
            for event in composite.events {
                match event {
                    Event::SingleStep(data) if data.request_id == step_request_id => {
                        self.suspended_thread = Some(data.thread_id);
                        matched = true;
                    }
                    Event::SingleStep(data) | Event::Breakpoint(data) => {
                        self.suspended_thread = Some(data.thread_id);
                    }
                }
            }
            self.check_interrupt()?;
            if matched {
                return Ok(());
            }
        }
    }

    /// Fires `VM.Suspend`. Safe to call from the interrupt-check path
    /// concurrently with any other in-flight operation: it just takes the
    /// same mutex every other call does, rather than racing the socket.
    pub fn suspend_vm(&self) -> Result<()> {
        self.session.lock().unwrap().request(virtual_machine::Suspend)?;
        Ok(())
    }

    /// The safe point the interrupt path is observed at: after every
    /// `wait_for_event` and once per `resume`/`step_instruction`. If the
    /// signal handler set the flag since the last check, suspends the VM.
    fn check_interrupt(&self) -> Result<()> {
        if let Some(interrupt) = &self.interrupt {
            if interrupt.take() {
                info!("interrupt received, suspending the VM");
                self.suspend_vm()?;
            }
        }
        Ok(())
    }

    pub fn suspended_thread(&self) -> Option<ThreadId> {
        self.suspended_thread
    }

    pub fn id_sizes(&self) -> crate::codec::IdSizes {
        self.session.lock().unwrap().id_sizes()
    }

    pub fn version(&self) -> Option<crate::types::Version> {
        self.session.lock().unwrap().version().cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.session.lock().unwrap().is_connected()
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values()
    }
}

impl Default for Debugger {
    fn default() -> Self {
        Debugger::new()
    }
}

impl Drop for Debugger {
    fn drop(&mut self) {
        if let Some(id) = self.session_id.take() {
            interrupt::unregister(id);
        }
    }
}

/// `com.example.App` -> `Lcom/example/App;`. Rejects names already in JNI
/// form (`;`-terminated): this facade's `class_name` parameter is always
/// the unqualified, dotted form per `§6`'s API surface.
fn canonicalize_class_name(class_name: &str) -> Result<String> {
    if class_name.ends_with(';') {
        return Err(JdwpError::InvalidArgument(format!(
            "expected a dotted class name, got JNI-form {class_name:?}"
        )));
    }
    Ok(format!("L{};", class_name.replace('.', "/")))
}

fn parse_host_port(addr: &str) -> Result<(String, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| JdwpError::InvalidArgument(format!("expected host:port, got {addr:?}")))?;
    let port: u16 = port
        .parse()
        .map_err(|_| JdwpError::InvalidArgument(format!("invalid port in {addr:?}")))?;
    Ok((host.to_string(), port))
}
