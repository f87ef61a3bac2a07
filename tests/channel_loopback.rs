//! Loopback tests for the transcription channel.
//!
//! An in-process WebSocket server stands in for the transcription backend so
//! the wire contract can be verified end to end: binary frames arrive
//! verbatim and in order, transcript events replace the observed transcript,
//! and malformed messages never take the channel down.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use livenotes::controller::FrameSink;
use livenotes::streaming::{ChannelNotice, TranscribeEndpoint, TranscriptionChannel};
use livenotes::transcript::TranscriptState;

const WAIT: Duration = Duration::from_secs(5);

/// Handle to a fake one-connection backend: observed binary frames come out
/// of `binary_rx`, scripted text replies go in through `reply_tx`.
struct Backend {
    endpoint: TranscribeEndpoint,
    binary_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    reply_tx: mpsc::UnboundedSender<String>,
}

async fn spawn_backend() -> Backend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (binary_tx, binary_rx) = mpsc::unbounded_channel();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (mut write, mut read) = ws.split();

        loop {
            tokio::select! {
                reply = reply_rx.recv() => match reply {
                    Some(text) => {
                        if write.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Test dropped the script sender: hang up on the client.
                    None => break,
                },
                inbound = read.next() => match inbound {
                    Some(Ok(Message::Binary(bytes))) => {
                        let _ = binary_tx.send(bytes);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                },
            }
        }
    });

    Backend {
        endpoint: TranscribeEndpoint::from_origin(&format!("http://{}", addr)).unwrap(),
        binary_rx,
        reply_tx,
    }
}

async fn wait_until_open(channel: &TranscriptionChannel) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !channel.is_open() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "channel never became open"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn next_notice(rx: &mut mpsc::Receiver<ChannelNotice>) -> ChannelNotice {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for a channel notice")
        .expect("notice stream ended unexpectedly")
}

async fn next_binary(rx: &mut mpsc::UnboundedReceiver<Vec<u8>>) -> Vec<u8> {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for a frame")
        .expect("backend task ended unexpectedly")
}

#[tokio::test]
async fn frames_arrive_verbatim_and_in_order() {
    let mut backend = spawn_backend().await;
    let (notice_tx, mut notices) = mpsc::channel(32);
    let channel = TranscriptionChannel::open(backend.endpoint.clone(), notice_tx);

    wait_until_open(&channel).await;
    assert!(matches!(next_notice(&mut notices).await, ChannelNotice::Opened));

    let frames = [vec![1u8, 2, 3], vec![4, 5], vec![6, 7, 8, 9]];
    for frame in &frames {
        channel.send(frame.clone());
    }

    for expected in &frames {
        assert_eq!(&next_binary(&mut backend.binary_rx).await, expected);
    }

    channel.close();
}

#[tokio::test]
async fn transcript_events_replace_the_observed_transcript() {
    let backend = spawn_backend().await;
    let (notice_tx, mut notices) = mpsc::channel(32);
    let channel = TranscriptionChannel::open(backend.endpoint.clone(), notice_tx);

    wait_until_open(&channel).await;
    assert!(matches!(next_notice(&mut notices).await, ChannelNotice::Opened));

    let mut observed = TranscriptState::new();

    backend
        .reply_tx
        .send(r#"{"type":"transcript","text":"hello"}"#.to_string())
        .unwrap();
    match next_notice(&mut notices).await {
        ChannelNotice::Transcript { text } => {
            observed.replace(&text);
        }
        other => panic!("expected a transcript notice, got {:?}", other),
    }
    assert_eq!(observed.current_text(), "hello");

    // Unknown event shapes and unparseable messages produce no notice and
    // must not kill the channel.
    backend
        .reply_tx
        .send(r#"{"type":"unknown"}"#.to_string())
        .unwrap();
    backend.reply_tx.send("not json at all".to_string()).unwrap();

    backend
        .reply_tx
        .send(r#"{"type":"transcript","text":"hello world"}"#.to_string())
        .unwrap();
    match next_notice(&mut notices).await {
        ChannelNotice::Transcript { text } => {
            observed.replace(&text);
        }
        other => panic!("expected a transcript notice, got {:?}", other),
    }

    // Full replacement, not an append.
    assert_eq!(observed.current_text(), "hello world");
    assert_eq!(observed.updates(), 2);

    channel.close();
}

#[tokio::test]
async fn server_hangup_reports_closed_and_disables_sends() {
    let backend = spawn_backend().await;
    let (notice_tx, mut notices) = mpsc::channel(32);
    let channel = TranscriptionChannel::open(backend.endpoint.clone(), notice_tx);

    wait_until_open(&channel).await;
    assert!(matches!(next_notice(&mut notices).await, ChannelNotice::Opened));

    // Backend hangs up.
    drop(backend.reply_tx);

    loop {
        match next_notice(&mut notices).await {
            ChannelNotice::Closed | ChannelNotice::Error(_) => break,
            ChannelNotice::Transcript { .. } | ChannelNotice::Opened => {}
        }
    }

    // Subsequent sends are silent no-ops.
    assert!(!channel.is_open());
    channel.send(vec![0u8; 4]);
}

#[tokio::test]
async fn close_is_idempotent() {
    let backend = spawn_backend().await;
    let (notice_tx, mut notices) = mpsc::channel(32);
    let channel = TranscriptionChannel::open(backend.endpoint.clone(), notice_tx);

    wait_until_open(&channel).await;
    assert!(matches!(next_notice(&mut notices).await, ChannelNotice::Opened));

    channel.close();
    channel.close();

    loop {
        match next_notice(&mut notices).await {
            ChannelNotice::Closed => break,
            _ => {}
        }
    }
    assert!(!channel.is_open());
}
