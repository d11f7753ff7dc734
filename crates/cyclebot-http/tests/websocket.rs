//! End-to-end tests of the `/ws` relay over a real socket.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cyclebot_core::producer::{AgentMessage, ContentBlock, MessageStream, ProducerError, PromptOptions, ResultSummary};
use cyclebot_core::Producer;
use cyclebot_http::{start, HttpServerHandle, ServerConfig, SharedState};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Answers every prompt with one assistant reply and a result.
#[derive(Default)]
struct EchoProducer {
    opened: AtomicUsize,
}

impl Producer for EchoProducer {
    fn open(&self, prompt: &str, _options: &PromptOptions) -> Result<MessageStream, ProducerError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let messages = vec![
            Ok(AgentMessage::Assistant {
                content: vec![ContentBlock::Text {
                    text: format!("echo: {}", prompt),
                }],
            }),
            Ok(AgentMessage::Result(ResultSummary {
                num_turns: 1,
                ..ResultSummary::default()
            })),
        ];
        Ok(futures::stream::iter(messages).boxed())
    }
}

async fn serve(producer: Arc<EchoProducer>) -> HttpServerHandle {
    let state = Arc::new(SharedState::new(producer, None));
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        static_dir: None,
    };
    start(state, &config).await.unwrap()
}

async fn connect(handle: &HttpServerHandle) -> Client {
    let url = format!("ws://{}/ws", handle.local_addr());
    let (client, _response) = connect_async(url).await.unwrap();
    client
}

/// Next text frame as JSON, skipping control frames.
async fn next_json(client: &mut Client) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection ended")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn prompt_streams_notifications_then_response() {
    let producer = Arc::new(EchoProducer::default());
    let mut handle = serve(Arc::clone(&producer)).await;
    let mut client = connect(&handle).await;

    client
        .send(Message::text(
            r#"{"jsonrpc":"2.0","method":"prompt","params":{"content":"hi"},"id":1}"#,
        ))
        .await
        .unwrap();

    let first = next_json(&mut client).await;
    assert_eq!(first["method"], "message");
    assert_eq!(first["params"]["type"], "assistant");
    assert_eq!(first["params"]["data"]["turn"], 1);
    assert_eq!(first["params"]["data"]["content"][0]["text"], "echo: hi");

    let second = next_json(&mut client).await;
    assert_eq!(second["params"]["type"], "result");

    let response = next_json(&mut client).await;
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["turn_count"], 2);
    assert_eq!(response["result"]["status"], "completed");

    handle.stop().await;
}

#[tokio::test]
async fn non_text_frames_are_ignored() {
    let producer = Arc::new(EchoProducer::default());
    let mut handle = serve(Arc::clone(&producer)).await;
    let mut client = connect(&handle).await;

    client.send(Message::binary(vec![1u8, 2, 3])).await.unwrap();
    client.send(Message::Ping(vec![9u8].into())).await.unwrap();
    client
        .send(Message::text(r#"{"method":"status","id":"s"}"#))
        .await
        .unwrap();

    // The first text frame answers the text request; nothing answered the others.
    let response = next_json(&mut client).await;
    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(response["id"], "s");
    assert_eq!(producer.opened.load(Ordering::SeqCst), 0);

    handle.stop().await;
}

#[tokio::test]
async fn close_frame_ends_session() {
    let producer = Arc::new(EchoProducer::default());
    let mut handle = serve(Arc::clone(&producer)).await;
    let mut client = connect(&handle).await;

    client.send(Message::Close(None)).await.unwrap();

    // Drain until the server finishes the closing handshake and drops the socket.
    let drained = timeout(Duration::from_secs(5), async {
        while let Some(frame) = client.next().await {
            match frame {
                Ok(Message::Text(text)) => panic!("Unexpected frame after close: {}", text),
                Ok(_) => {}
                Err(_) => break,
            }
        }
    })
    .await;
    assert!(drained.is_ok(), "session did not end after close");
    assert_eq!(producer.opened.load(Ordering::SeqCst), 0);

    // The server keeps accepting new connections.
    let mut again = connect(&handle).await;
    again
        .send(Message::text(r#"{"method":"prompt","params":{"content":"again"},"id":2}"#))
        .await
        .unwrap();
    assert_eq!(next_json(&mut again).await["params"]["type"], "assistant");

    handle.stop().await;
}
