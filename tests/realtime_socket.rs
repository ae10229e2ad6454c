//! Websocket end-to-end tests
//!
//! Serves the real router on an ephemeral port with a fast broadcast loop
//! and connects with tokio-tungstenite.

#[macro_use]
mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use standup::backend::routes::create_router;
use standup::backend::server::{build_state, AppState};
use standup::backend::session::SessionResolver;
use standup::backend::store::MemoryStore;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use common::{auth_header, create_group, login, test_config};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve() -> (AppState, SocketAddr) {
    let state = build_state(test_config(), Arc::new(MemoryStore::new()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (state, addr)
}

async fn session_for(state: &AppState, members: &[&str]) -> i64 {
    let group = create_group(state.store.as_ref(), "live", "", members).await;
    let resolver: SessionResolver = state.resolver.clone();
    assert_ok!(resolver.resolve_for_group(&group, chrono::Utc::now()).await).id
}

async fn connect(
    addr: SocketAddr,
    session_id: i64,
    token: &str,
) -> Result<Client, tokio_tungstenite::tungstenite::Error> {
    let mut request = format!("ws://{}/ws/session/{}", addr, session_id)
        .into_client_request()
        .unwrap();
    request
        .headers_mut()
        .insert("Authorization", auth_header(token).parse().unwrap());
    connect_async(request).await.map(|(ws, _)| ws)
}

/// Read text frames until one satisfies `pred`
async fn next_text_matching(client: &mut Client, pred: impl Fn(&Value) -> bool) -> Value {
    let read = async {
        while let Some(frame) = client.next().await {
            if let Message::Text(text) = frame.unwrap() {
                let value: Value = serde_json::from_str(text.as_str()).unwrap();
                if pred(&value) {
                    return value;
                }
            }
        }
        panic!("socket closed before a matching frame arrived");
    };
    tokio::time::timeout(Duration::from_secs(3), read)
        .await
        .expect("no matching frame in time")
}

#[tokio::test]
async fn test_member_receives_periodic_aggregate() {
    let (state, addr) = serve().await;
    let ada = login(&state, "ada@acme.io").await;
    let session_id = session_for(&state, &["ada@acme.io"]).await;

    let mut client = assert_ok!(connect(addr, session_id, &ada.access_token).await);
    let first = next_text_matching(&mut client, Value::is_array).await;
    assert_eq!(first, Value::Array(vec![]));

    // Pushes keep coming
    next_text_matching(&mut client, Value::is_array).await;
    assert_eq!(state.rooms.connection_count(session_id).await, 1);
}

#[tokio::test]
async fn test_user_change_is_relayed_to_peers() {
    let (state, addr) = serve().await;
    let ada = login(&state, "ada@acme.io").await;
    let bob = login(&state, "bob@acme.io").await;
    let session_id = session_for(&state, &["ada@acme.io", "bob@acme.io"]).await;

    let mut sender = assert_ok!(connect(addr, session_id, &ada.access_token).await);
    let mut peer = assert_ok!(connect(addr, session_id, &bob.access_token).await);

    // Both attached once each has seen a push
    next_text_matching(&mut sender, Value::is_array).await;
    next_text_matching(&mut peer, Value::is_array).await;

    let change = format!(r#"{{"user_id":{}}}"#, ada.user.id);
    sender.send(Message::Text(change.into())).await.unwrap();

    let relayed = next_text_matching(&mut peer, Value::is_object).await;
    assert_eq!(relayed["user_id"], ada.user.id);

    // Garbage frames are ignored and the connection stays up
    sender.send(Message::Text("hello".into())).await.unwrap();
    next_text_matching(&mut sender, Value::is_array).await;
}

#[tokio::test]
async fn test_non_member_is_refused() {
    let (state, addr) = serve().await;
    let eve = login(&state, "eve@evil.io").await;
    let session_id = session_for(&state, &["ada@acme.io"]).await;

    assert!(connect(addr, session_id, &eve.access_token).await.is_err());
    assert!(connect(addr, session_id, "invalid").await.is_err());
    assert!(connect(addr, session_id + 100, &eve.access_token).await.is_err());
    assert_eq!(state.rooms.connection_count(session_id).await, 0);
}

#[tokio::test]
async fn test_disconnect_detaches_connection() {
    let (state, addr) = serve().await;
    let ada = login(&state, "ada@acme.io").await;
    let session_id = session_for(&state, &["ada@acme.io"]).await;

    let mut client = assert_ok!(connect(addr, session_id, &ada.access_token).await);
    next_text_matching(&mut client, Value::is_array).await;
    client.close(None).await.unwrap();
    drop(client);

    let detached = tokio::time::timeout(Duration::from_secs(3), async {
        while state.rooms.connection_count(session_id).await > 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(detached.is_ok(), "connection still attached after close");
}
