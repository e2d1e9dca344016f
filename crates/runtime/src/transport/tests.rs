use futures_util::{SinkExt, StreamExt};
use tokio::io::DuplexStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::protocol::Role;

use super::*;

/// Client transport plus the raw server end of an in-memory socket.
async fn socket_pair() -> (
	WebSocketTransport<DuplexStream>,
	mpsc::UnboundedReceiver<Value>,
	WebSocketStream<DuplexStream>,
) {
	let (client_io, server_io) = tokio::io::duplex(64 * 1024);
	let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
	let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
	let (transport, rx) = WebSocketTransport::new(client);
	(transport, rx, server)
}

#[tokio::test]
async fn test_send_message_as_text_frame() {
	let (transport, _rx, mut server) = socket_pair().await;
	let (mut sender, _receiver) = transport.into_parts();

	let message = serde_json::json!({"id": 1, "method": "Debugger.enable", "params": {}});
	sender.send(message.clone()).await.unwrap();

	match server.next().await.unwrap().unwrap() {
		WsMessage::Text(text) => {
			let received: Value = serde_json::from_str(&text).unwrap();
			assert_eq!(received, message);
		}
		other => panic!("Expected text frame, got {other:?}"),
	}
}

#[tokio::test]
async fn test_multiple_messages_in_sequence() {
	let (transport, mut rx, mut server) = socket_pair().await;
	let (_sender, receiver) = transport.into_parts();
	let read_task = tokio::spawn(receiver.run());

	let messages = vec![
		serde_json::json!({"id": 1, "result": {}}),
		serde_json::json!({"method": "Page.domContentEventFired", "params": {"timestamp": 1.5}}),
		serde_json::json!({"id": 2, "result": {"nodes": []}}),
	];
	for msg in &messages {
		server.send(WsMessage::Text(msg.to_string())).await.unwrap();
	}

	for expected in &messages {
		let received = rx.recv().await.unwrap();
		assert_eq!(&received, expected);
	}

	server.close(None).await.unwrap();
	assert!(read_task.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_binary_frames_are_decoded() {
	let (transport, mut rx, mut server) = socket_pair().await;
	let (_sender, receiver) = transport.into_parts();
	let read_task = tokio::spawn(receiver.run());

	let message = serde_json::json!({"id": 9, "result": {"value": true}});
	server
		.send(WsMessage::Binary(serde_json::to_vec(&message).unwrap()))
		.await
		.unwrap();

	assert_eq!(rx.recv().await.unwrap(), message);

	server.close(None).await.unwrap();
	let _ = read_task.await;
}

#[tokio::test]
async fn test_malformed_frame_is_skipped() {
	let (transport, mut rx, mut server) = socket_pair().await;
	let (_sender, receiver) = transport.into_parts();
	let read_task = tokio::spawn(receiver.run());

	server.send(WsMessage::Text("not json {".to_string())).await.unwrap();
	let good = serde_json::json!({"id": 3, "result": {}});
	server.send(WsMessage::Text(good.to_string())).await.unwrap();

	assert_eq!(rx.recv().await.unwrap(), good);

	server.close(None).await.unwrap();
	let _ = read_task.await;
}

#[tokio::test]
async fn test_large_message() {
	let (transport, mut rx, mut server) = socket_pair().await;
	let (_sender, receiver) = transport.into_parts();
	let read_task = tokio::spawn(receiver.run());

	let html = "x".repeat(200_000);
	let message = serde_json::json!({"id": 1, "result": {"outerHTML": html}});
	server.send(WsMessage::Text(message.to_string())).await.unwrap();

	assert_eq!(rx.recv().await.unwrap(), message);

	server.close(None).await.unwrap();
	let _ = read_task.await;
}

#[tokio::test]
async fn test_reader_stops_when_consumer_hangs_up() {
	let (transport, rx, mut server) = socket_pair().await;
	let (_sender, receiver) = transport.into_parts();
	drop(rx);

	let read_task = tokio::spawn(receiver.run());
	server
		.send(WsMessage::Text(serde_json::json!({"id": 1}).to_string()))
		.await
		.unwrap();

	assert!(read_task.await.unwrap().is_ok());
}
