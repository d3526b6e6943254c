// ---------------------------------------------------------------------------
// Echo loop over a real socket session
// ---------------------------------------------------------------------------
//
// A connected UDP socket stands in for the raw ICMP socket so no privileges
// are needed; the peer decides which requests get an answer.

use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::thread;
use std::time::Duration;

use rustping_core::{
    CancellationBridge, CancellationToken, EchoConfig, EchoLoop, IcmpSession, ReplyFraming,
    ShutdownHandle,
};
use rustping_packet::{EchoPacket, ICMP_ECHO_REPLY, checksum};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

fn loopback_pair() -> (Socket, UdpSocket) {
    let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
    peer.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).unwrap();
    socket
        .bind(&SockAddr::from(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)))
        .unwrap();
    socket
        .connect(&SockAddr::from(peer.local_addr().unwrap()))
        .unwrap();
    (socket, peer)
}

fn quick_config() -> EchoConfig {
    EchoConfig {
        read_timeout: Duration::from_millis(50),
        interval: Duration::from_millis(10),
        strict_replies: false,
    }
}

fn open_session(socket: Socket, shutdown: ShutdownHandle) -> IcmpSession {
    IcmpSession::from_socket(
        socket,
        Ipv4Addr::LOCALHOST,
        &quick_config(),
        ReplyFraming::Bare,
        shutdown,
    )
    .unwrap()
}

fn echo_reply_bytes(sequence_number: u16) -> [u8; 8] {
    let mut reply = EchoPacket {
        icmp_type: ICMP_ECHO_REPLY,
        code: 0,
        checksum: 0,
        identifier: 0,
        sequence_number,
    };
    reply.checksum = checksum(&reply.to_bytes());
    reply.to_bytes()
}

#[tokio::test]
async fn session_shutdown_without_cancel_ends_loop() {
    let (socket, _peer) = loopback_pair();
    let session = open_session(socket, ShutdownHandle::new());
    let cancel = CancellationToken::new();

    let echo_loop = EchoLoop::new(session, quick_config(), cancel.clone());
    echo_loop.shutdown_handle().shutdown();

    let mut out = Vec::new();
    let sent = tokio::time::timeout(Duration::from_secs(2), echo_loop.run(&mut out))
        .await
        .expect("loop must return once its session is closed")
        .unwrap();

    assert_eq!(sent, 0);
    assert!(out.is_empty());
    assert!(!cancel.is_cancelled());
}

#[tokio::test]
async fn session_shutdown_mid_run_ends_loop() {
    let (socket, _peer) = loopback_pair();
    let shutdown = ShutdownHandle::new();
    let session = open_session(socket, shutdown.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        shutdown.shutdown();
    });

    let sent = tokio::time::timeout(
        Duration::from_secs(2),
        EchoLoop::new(session, quick_config(), CancellationToken::new()).run(&mut Vec::new()),
    )
    .await
    .expect("loop must return once its session is closed")
    .unwrap();

    assert!(sent >= 1, "sent {sent}");
}

#[tokio::test]
async fn timed_out_request_is_skipped_and_next_reply_printed() {
    let (socket, peer) = loopback_pair();
    let bridge = CancellationBridge::default();
    let session = open_session(socket, bridge.session_shutdown());

    // Ignore seq 0, answer seq 1, stop the run once seq 2 arrives
    let stopper = bridge.clone();
    let responder = thread::spawn(move || {
        let mut buf = [0u8; 64];
        loop {
            let (n, from) = peer.recv_from(&mut buf).unwrap();
            let request = EchoPacket::from_bytes(&buf[..n]).unwrap();
            match request.sequence_number {
                0 => {}
                1 => {
                    peer.send_to(&echo_reply_bytes(1), from).unwrap();
                }
                _ => {
                    stopper.request_stop();
                    return;
                }
            }
        }
    });

    let mut out = Vec::new();
    let sent = tokio::time::timeout(
        Duration::from_secs(5),
        EchoLoop::new(session, quick_config(), bridge.token()).run(&mut out),
    )
    .await
    .expect("loop must stop after the bridge fires")
    .unwrap();
    responder.join().unwrap();

    assert_eq!(sent, 2);
    let output = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 1, "output: {output}");
    assert!(lines[0].starts_with("8 bytes from 127.0.0.1: seq=1 time="));
    assert!(lines[0].ends_with("ms"));
}
