mod common;

use common::*;
use nat_probe::error::ProbeError;
use nat_probe::probe::find_mapped_address;
use nat_probe::transport::{send_request, RetryPolicy};
use std::io;
use std::time::Duration;
use stun_nat::attrs::software::Software;
use stun_nat::attrs::RawAttr;
use stun_nat::message::Message;
use stun_nat::util::new_trans_id;

fn request() -> Message {
    Message::binding_request(new_trans_id(), "StunClient", None)
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn test_retry_schedule() {
    let timeouts: Vec<Duration> = RetryPolicy::default().timeouts().collect();
    assert_eq!(
        timeouts,
        vec![
            ms(100),
            ms(200),
            ms(400),
            ms(800),
            ms(1600),
            ms(1600),
            ms(1600),
            ms(1600),
            ms(1600)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_response_after_nine_attempts() {
    let sock = FakeSocket::new(vec![]);
    let req = request();

    let received = send_request(&sock, &req, sock.peer, &RetryPolicy::default())
        .await
        .unwrap();

    assert!(received.is_none());
    assert_eq!(sock.sent_count(), 9);
    assert_eq!(
        sock.waits(),
        vec![
            ms(100),
            ms(200),
            ms(400),
            ms(800),
            ms(1600),
            ms(1600),
            ms(1600),
            ms(1600),
            ms(1600)
        ]
    );

    let expected = req.pack();
    for (data, dest) in sock.sent.lock().unwrap().iter() {
        assert_eq!(&data[..], &expected[..]);
        assert_eq!(*dest, sock.peer);
    }
}

#[tokio::test(start_paused = true)]
async fn test_response_on_third_attempt() {
    let mapped = host("5.5.5.5:6000");
    let sock = FakeSocket::new(vec![
        Reply::Timeout,
        Reply::Timeout,
        Reply::Datagram(answer(mapped, None)),
    ]);
    let req = request();

    let received = send_request(&sock, &req, sock.peer, &RetryPolicy::default())
        .await
        .unwrap()
        .expect("no response");

    assert_eq!(received.message.trans_id(), req.trans_id());
    assert_eq!(received.from, sock.peer);
    assert_eq!(sock.sent_count(), 3);
    assert_eq!(sock.waits(), vec![ms(100), ms(200), ms(400)]);
}

#[tokio::test(start_paused = true)]
async fn test_foreign_trans_id_is_skipped() {
    let mapped = host("5.5.5.5:6000");
    let sock = FakeSocket::new(vec![
        Reply::Datagram(answer_with_foreign_id()),
        Reply::Datagram(answer(mapped, None)),
    ]);
    let req = request();

    let received = send_request(&sock, &req, sock.peer, &RetryPolicy::default())
        .await
        .unwrap()
        .expect("no response");

    assert_eq!(received.message.trans_id(), req.trans_id());
    // 同一次发送里继续等待
    assert_eq!(sock.sent_count(), 1);
    assert_eq!(sock.waits(), vec![ms(100), ms(100)]);
}

#[tokio::test(start_paused = true)]
async fn test_only_foreign_responses_is_no_response() {
    let sock = FakeSocket::new(vec![
        Reply::Datagram(answer_with_foreign_id()),
        Reply::Datagram(answer_with_foreign_id()),
    ]);

    let received = send_request(&sock, &request(), sock.peer, &RetryPolicy::default())
        .await
        .unwrap();

    assert!(received.is_none());
    assert_eq!(sock.sent_count(), 9);
}

#[tokio::test(start_paused = true)]
async fn test_garbage_and_bad_fingerprint_are_skipped() {
    let mapped = host("5.5.5.5:6000");
    let bad_fingerprint: Responder = Box::new(|req: &Message| {
        let mut res = binding_response(req.header.trans_id, vec![Software::new("srv").into()]);
        res.add_fingerprint();
        let mut data = res.pack().to_vec();
        let last = data.len() - 1;
        data[last] ^= 0x01;
        data
    });

    let sock = FakeSocket::new(vec![
        Reply::Datagram(Box::new(|_: &Message| vec![1, 2, 3])),
        Reply::Datagram(bad_fingerprint),
        Reply::Datagram(answer(mapped, None)),
    ]);

    let received = send_request(&sock, &request(), sock.peer, &RetryPolicy::default())
        .await
        .unwrap();

    assert!(received.is_some());
    assert_eq!(sock.sent_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_good_fingerprint_is_accepted() {
    let good: Responder = Box::new(|req: &Message| {
        let mut res = binding_response(
            req.header.trans_id,
            vec![RawAttr::new(0xc000, b"opaque")],
        );
        res.add_fingerprint();
        res.pack().to_vec()
    });
    let sock = FakeSocket::new(vec![Reply::Datagram(good)]);

    let received = send_request(&sock, &request(), sock.peer, &RetryPolicy::default())
        .await
        .unwrap()
        .expect("no response");

    assert_eq!(received.message.verify_fingerprint(), Some(true));
}

#[tokio::test(start_paused = true)]
async fn test_unpadded_software_with_fingerprint_is_accepted() {
    let sock = FakeSocket::new(vec![Reply::Datagram(answer_rfc5769())]);
    let req = request();

    let received = send_request(&sock, &req, sock.peer, &RetryPolicy::default())
        .await
        .unwrap()
        .expect("no response");

    assert_eq!(received.message.trans_id(), req.trans_id());
    assert_eq!(received.message.verify_fingerprint(), Some(true));
    assert_eq!(
        find_mapped_address(&received.message),
        Some(host("192.0.2.1:32853"))
    );
    assert_eq!(sock.sent_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_io_error_aborts() {
    let sock = FakeSocket::new(vec![
        Reply::Timeout,
        Reply::Error(io::ErrorKind::ConnectionRefused),
    ]);

    let err = send_request(&sock, &request(), sock.peer, &RetryPolicy::default())
        .await
        .unwrap_err();

    match err {
        ProbeError::Transport(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionRefused),
        e => panic!("unexpected error: {:?}", e),
    }
    assert_eq!(sock.sent_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_short_write_is_error() {
    let mut sock = FakeSocket::new(vec![]);
    sock.short_write = true;
    let req = request();

    let err = send_request(&sock, &req, sock.peer, &RetryPolicy::default())
        .await
        .unwrap_err();

    match err {
        ProbeError::ShortWrite { sent, expected } => {
            assert_eq!(expected, req.pack().len());
            assert_eq!(sent, expected - 1);
        }
        e => panic!("unexpected error: {:?}", e),
    }
    assert_eq!(sock.sent_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_custom_policy() {
    let sock = FakeSocket::new(vec![]);
    let policy = RetryPolicy {
        max_attempts: 3,
        initial_timeout: ms(50),
        max_timeout: ms(120),
    };

    let received = send_request(&sock, &request(), sock.peer, &policy)
        .await
        .unwrap();

    assert!(received.is_none());
    assert_eq!(sock.waits(), vec![ms(50), ms(100), ms(120)]);
}
