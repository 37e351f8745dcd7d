//! End-to-end scenarios against a scripted mock VM, mirroring the six
//! scenarios used to validate the handshake, breakpoint, event-dispatch
//! and stepping behavior of [`jdwp_core::Debugger`].

mod common;

use common::{
    handshake_mismatch, handshake_ok, push_id, push_str, read_request, spawn_mock, write_event,
    write_reply,
};
use jdwp_core::{debugger::Debugger, session::AttachOptions};

const WIDTHS: (u32, u32, u32, u32, u32) = (8, 4, 8, 8, 8); // field, method, object, refType, frame

fn id_sizes_reply_body() -> Vec<u8> {
    let mut body = Vec::new();
    for width in [WIDTHS.0, WIDTHS.1, WIDTHS.2, WIDTHS.3, WIDTHS.4] {
        body.extend_from_slice(&width.to_be_bytes());
    }
    body
}

fn version_reply_body() -> Vec<u8> {
    let mut body = Vec::new();
    push_str(&mut body, "Dalvik");
    body.extend_from_slice(&1u32.to_be_bytes());
    body.extend_from_slice(&8u32.to_be_bytes());
    push_str(&mut body, "2.1.0");
    push_str(&mut body, "Dalvik");
    body
}

fn do_handshake_and_negotiate(stream: &mut std::net::TcpStream) {
    handshake_ok(stream);
    let req = read_request(stream);
    assert_eq!((req.command_set, req.command), (1, 7)); // VM.IDSizes
    write_reply(stream, req.id, 0, &id_sizes_reply_body());

    let req = read_request(stream);
    assert_eq!((req.command_set, req.command), (1, 1)); // VM.Version
    write_reply(stream, req.id, 0, &version_reply_body());
}

#[test]
fn attach_negotiates_id_sizes_and_version() {
    let (port, handle) = spawn_mock(|mut stream| {
        do_handshake_and_negotiate(&mut stream);
    });

    let mut debugger = Debugger::new();
    debugger
        .attach(&format!("127.0.0.1:{port}"), AttachOptions::default())
        .expect("attach should succeed");

    assert!(debugger.is_connected());
    assert_eq!(debugger.id_sizes().method_id_size, 4);
    let version = debugger.version().unwrap();
    assert_eq!(version.description, "Dalvik");
    assert!(!version.description.is_empty());

    handle.join().unwrap();
}

#[test]
fn mismatched_handshake_fails_attach() {
    let (port, handle) = spawn_mock(|mut stream| {
        handshake_mismatch(&mut stream);
    });

    let mut debugger = Debugger::new();
    let result = debugger.attach(&format!("127.0.0.1:{port}"), AttachOptions::default());
    assert!(result.is_err());
    assert!(!debugger.is_connected());

    handle.join().unwrap();
}

#[test]
fn full_breakpoint_hit_and_step_cycle() {
    let (port, handle) = spawn_mock(|mut stream| {
        do_handshake_and_negotiate(&mut stream);

        // --- scenario 3: set_breakpoint ---
        let req = read_request(&mut stream);
        assert_eq!((req.command_set, req.command), (1, 2)); // VM.ClassesBySignature
        let mut expected_sig = Vec::new();
        push_str(&mut expected_sig, "Lcom/example/App;");
        assert_eq!(req.body, expected_sig);

        let mut reply = Vec::new();
        reply.extend_from_slice(&1u32.to_be_bytes()); // count
        reply.push(1); // refTypeTag = CLASS
        push_id(&mut reply, WIDTHS.3, 0x42); // typeID
        reply.extend_from_slice(&7i32.to_be_bytes()); // status
        write_reply(&mut stream, req.id, 0, &reply);

        let req = read_request(&mut stream);
        assert_eq!((req.command_set, req.command), (2, 5)); // ReferenceType.Methods
        let mut expected_body = Vec::new();
        push_id(&mut expected_body, WIDTHS.3, 0x42);
        assert_eq!(req.body, expected_body);

        let mut reply = Vec::new();
        reply.extend_from_slice(&2u32.to_be_bytes()); // count
        push_id(&mut reply, WIDTHS.1, 0x11);
        push_str(&mut reply, "onCreate");
        push_str(&mut reply, "(Landroid/os/Bundle;)V");
        reply.extend_from_slice(&1u32.to_be_bytes());
        push_id(&mut reply, WIDTHS.1, 0x22);
        push_str(&mut reply, "onDestroy");
        push_str(&mut reply, "()V");
        reply.extend_from_slice(&0u32.to_be_bytes());
        write_reply(&mut stream, req.id, 0, &reply);

        let req = read_request(&mut stream);
        assert_eq!((req.command_set, req.command), (15, 1)); // EventRequest.Set
        let mut expected_body = Vec::new();
        expected_body.push(2); // eventKind = Breakpoint
        expected_body.push(2); // suspendPolicy = All
        expected_body.extend_from_slice(&1u32.to_be_bytes()); // modCount
        expected_body.push(7); // modKind = LocationOnly
        expected_body.push(1); // location typeTag = CLASS
        push_id(&mut expected_body, WIDTHS.3, 0x42); // classID
        push_id(&mut expected_body, WIDTHS.1, 0x11); // methodID
        expected_body.extend_from_slice(&0u64.to_be_bytes()); // index
        assert_eq!(req.body, expected_body);

        let mut reply = Vec::new();
        reply.extend_from_slice(&0xAAu32.to_be_bytes());
        write_reply(&mut stream, req.id, 0, &reply);

        // --- scenario 4: resume() then wait_for_breakpoint() ---
        let req = read_request(&mut stream);
        assert_eq!((req.command_set, req.command), (1, 9)); // VM.Resume
        write_reply(&mut stream, req.id, 0, &[]);

        let mut event_body = Vec::new();
        event_body.push(2); // suspendPolicy = All
        event_body.extend_from_slice(&1u32.to_be_bytes()); // eventCount
        event_body.push(2); // eventKind = Breakpoint
        event_body.extend_from_slice(&0xAAu32.to_be_bytes()); // requestID
        push_id(&mut event_body, WIDTHS.2, 0x07); // threadID
        event_body.push(1); // location typeTag
        push_id(&mut event_body, WIDTHS.3, 0x42);
        push_id(&mut event_body, WIDTHS.1, 0x11);
        event_body.extend_from_slice(&0x00000000000000F0u64.to_be_bytes());
        write_event(&mut stream, &event_body);

        // --- scenario 5: step_instruction() ---
        let req = read_request(&mut stream);
        assert_eq!((req.command_set, req.command), (15, 1)); // EventRequest.Set (SingleStep)
        let mut expected_body = Vec::new();
        expected_body.push(1); // eventKind = SingleStep
        expected_body.push(1); // suspendPolicy = EventThread
        expected_body.extend_from_slice(&1u32.to_be_bytes());
        expected_body.push(10); // modKind = Step
        push_id(&mut expected_body, WIDTHS.2, 0x07); // threadID
        expected_body.push(0); // size = Min
        expected_body.push(1); // depth = Over
        assert_eq!(req.body, expected_body);

        let mut reply = Vec::new();
        reply.extend_from_slice(&0xBBu32.to_be_bytes());
        write_reply(&mut stream, req.id, 0, &reply);

        let req = read_request(&mut stream);
        assert_eq!((req.command_set, req.command), (11, 12)); // ThreadReference.SuspendCount
        let mut reply = Vec::new();
        reply.extend_from_slice(&1u32.to_be_bytes());
        write_reply(&mut stream, req.id, 0, &reply);

        let req = read_request(&mut stream);
        assert_eq!((req.command_set, req.command), (11, 3)); // ThreadReference.Resume
        write_reply(&mut stream, req.id, 0, &[]);

        let mut event_body = Vec::new();
        event_body.push(1); // suspendPolicy = EventThread
        event_body.extend_from_slice(&1u32.to_be_bytes());
        event_body.push(1); // eventKind = SingleStep
        event_body.extend_from_slice(&0xBBu32.to_be_bytes());
        push_id(&mut event_body, WIDTHS.2, 0x07);
        event_body.push(1);
        push_id(&mut event_body, WIDTHS.3, 0x42);
        push_id(&mut event_body, WIDTHS.1, 0x11);
        event_body.extend_from_slice(&0x00000000000000F8u64.to_be_bytes());
        write_event(&mut stream, &event_body);

        // --- scenario 6: resume() clears the active step ---
        let req = read_request(&mut stream);
        assert_eq!((req.command_set, req.command), (15, 2)); // EventRequest.Clear
        let mut expected_body = Vec::new();
        expected_body.push(1); // eventKind = SingleStep
        expected_body.extend_from_slice(&0xBBu32.to_be_bytes());
        assert_eq!(req.body, expected_body);
        write_reply(&mut stream, req.id, 0, &[]);

        let req = read_request(&mut stream);
        assert_eq!((req.command_set, req.command), (1, 9)); // VM.Resume
        write_reply(&mut stream, req.id, 0, &[]);
    });

    let mut debugger = Debugger::new();
    debugger
        .attach(&format!("127.0.0.1:{port}"), AttachOptions::default())
        .expect("attach should succeed");

    let installed = debugger
        .set_breakpoint("com.example.App", "onCreate")
        .expect("set_breakpoint should succeed");
    assert_eq!(installed, 1);
    assert_eq!(debugger.breakpoints().count(), 1);

    debugger.resume().expect("resume should succeed");
    let breakpoint = debugger
        .wait_for_breakpoint()
        .expect("wait_for_breakpoint should succeed")
        .expect("a breakpoint should have fired");
    assert_eq!(breakpoint.class_name, "com.example.App");
    assert_eq!(breakpoint.method_name, "onCreate");
    assert_eq!(
        debugger.suspended_thread(),
        Some(jdwp_core::ids::ThreadId(0x07))
    );

    debugger
        .step_instruction()
        .expect("step_instruction should succeed");
    assert_eq!(
        debugger.suspended_thread(),
        Some(jdwp_core::ids::ThreadId(0x07))
    );

    debugger.resume().expect("resume should clear the step and succeed");

    handle.join().unwrap();
}
