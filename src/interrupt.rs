//! Interrupt-driven suspend, redesigned away from the original tool's
//! signal-handler-calls-`SuspendVM`-directly pattern (unsound: signal
//! handlers run in an arbitrary context and must not reenter socket I/O).
//!
//! Instead, a `signal-hook` flag registration sets an `AtomicBool`; the
//! main flow checks it at safe points ([`crate::debugger::Debugger`]'s
//! `check_interrupt`, called after every `wait_for_event` and once per
//! `step_instruction`/`resume`) and, if set, calls `suspend_vm()` itself.
//! `suspend_vm()` in turn just acquires the same session mutex every other
//! call does — there is nothing signal-unsafe about it.

use std::{
    collections::HashMap,
    io,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, Weak,
    },
};

use once_cell::sync::Lazy;

use crate::session::Session;

pub type SessionId = u64;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide table of attached sessions, keyed by the id handed out at
/// registration. Holding only `Weak` references means the registry never
/// keeps a session alive past its last strong holder (the `Debugger` that
/// registered it) — the "longest holder" discipline from the design notes.
static REGISTRY: Lazy<Mutex<HashMap<SessionId, Weak<Mutex<Session>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Registers `session` and returns the id to look it up (or unregister it)
/// by later.
pub fn register(session: &Arc<Mutex<Session>>) -> SessionId {
    let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
    REGISTRY.lock().unwrap().insert(id, Arc::downgrade(session));
    id
}

/// Removes `id` from the registry. Idempotent; a missing id is not an
/// error (the session may already be gone).
pub fn unregister(id: SessionId) {
    REGISTRY.lock().unwrap().remove(&id);
}

/// Looks `id` up and upgrades the `Weak` reference, if the session is
/// still alive.
pub fn lookup(id: SessionId) -> Option<Arc<Mutex<Session>>> {
    REGISTRY.lock().unwrap().get(&id).and_then(Weak::upgrade)
}

/// A flag a signal handler can set without touching anything but an
/// atomic — safe to register for `SIGINT` and check from the main flow at
/// its own pace.
#[derive(Clone)]
pub struct InterruptFlag {
    flag: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// Registers `signal-hook`'s flag-setting handler for `SIGINT`. The
    /// underlying crate uses a self-pipe internally, so this is strategy
    /// (a)/(c) from the design notes combined, not a raw `sigaction`.
    pub fn install() -> io::Result<InterruptFlag> {
        let flag = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&flag))?;
        Ok(InterruptFlag { flag })
    }

    /// Atomically reads and clears the flag. Called at the safe points the
    /// main flow chooses, never from the signal handler itself.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_session_is_reachable_by_id() {
        let session = Arc::new(Mutex::new(Session::new()));
        let id = register(&session);
        assert!(lookup(id).is_some());
        unregister(id);
        assert!(lookup(id).is_none());
    }

    #[test]
    fn dropping_the_last_strong_reference_clears_the_weak_entry() {
        let session = Arc::new(Mutex::new(Session::new()));
        let id = register(&session);
        drop(session);
        assert!(lookup(id).is_none());
    }

    #[test]
    fn interrupt_flag_take_clears_itself() {
        let flag = Arc::new(AtomicBool::new(true));
        let interrupt = InterruptFlag { flag };
        assert!(interrupt.take());
        assert!(!interrupt.take());
    }
}
