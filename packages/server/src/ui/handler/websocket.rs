//! WebSocket connection handlers.
//!
//! 1 つのソケットにつき、受信ループ（このタスク）と送信ループ（`pusher_loop`）を動かす。
//! 受信イベントの処理中に起きたエラーは、そのイベントを送った接続にだけ
//! `error` イベントとして返す。

use std::{panic::AssertUnwindSafe, sync::Arc};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{FutureExt, sink::SinkExt, stream::StreamExt};
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{ConnectionId, DisplayName, MeetingEvent, MeetingId, MeetingTitle, Role, UserId},
    infrastructure::dto::websocket::{ClientMessage, ServerMessage},
    ui::state::AppState,
    usecase::{JoinMeetingInput, MeetingError, ParticipantProfile},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives encoded events from the rx channel and writes them to the socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // 送信チャンネルはイベントを処理する前に登録する
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state.connect_client_usecase.execute(tx.clone()).await;
    let mut send_task = pusher_loop(rx, sender);

    // 受信ループは処理中のイベントを中断せず、次のフレームを待つ間だけ止められる
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                msg = receiver.next() => msg,
                _ = &mut stop_rx => break,
            };
            let msg = match msg {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
                None => break,
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&state_clone, &connection_id_clone, &tx, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // 送信側が先に終わった場合は、受信ループが次のフレームの前で止まるのを待つ
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            let _ = stop_tx.send(());
            if let Err(e) = (&mut recv_task).await {
                tracing::warn!("Receive loop for '{}' ended abnormally: {}", connection_id, e);
            }
        }
    };

    state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await;
}

/// 1 フレームを処理する。失敗とパニックはこのフレームの送信者にだけ報告する
async fn handle_text(
    state: &AppState,
    connection_id: &ConnectionId,
    tx: &mpsc::UnboundedSender<String>,
    text: &str,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Undecodable frame from '{}': {}", connection_id, e);
            report_error(tx, "Invalid message format".to_string());
            return;
        }
    };

    let result = AssertUnwindSafe(dispatch(state, connection_id, message))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            Err(MeetingError::Internal(
                "panic while handling event".to_string(),
            ))
        });

    if let Err(e) = result {
        tracing::warn!(
            "Event from '{}' failed ({}): {}",
            connection_id,
            e.kind(),
            e
        );
        report_error(tx, e.client_message());
    }
}

/// エラーは MessagePusher を経由せず、この接続の送信チャンネルに直接積む
fn report_error(tx: &mpsc::UnboundedSender<String>, message: String) {
    let event = MeetingEvent::Error { message };
    match serde_json::to_string(&ServerMessage::from(&event)) {
        Ok(json) => {
            let _ = tx.send(json);
        }
        Err(e) => tracing::error!("Failed to encode error event: {}", e),
    }
}

async fn dispatch(
    state: &AppState,
    connection_id: &ConnectionId,
    message: ClientMessage,
) -> Result<(), MeetingError> {
    match message {
        ClientMessage::Join {
            meeting_id,
            title,
            user_info,
        } => {
            let user_info = user_info.unwrap_or_default();
            let input = JoinMeetingInput {
                meeting_id: MeetingId::try_from(meeting_id.unwrap_or_default())?,
                title: title.map(MeetingTitle::try_from).transpose()?,
                profile: ParticipantProfile {
                    role: Role::try_from(user_info.role.unwrap_or_default())?,
                    display_name: DisplayName::try_from(user_info.name.unwrap_or_default())?,
                    user_id: user_info.user_id.map(UserId::try_from).transpose()?,
                },
            };
            state
                .join_meeting_usecase
                .execute(connection_id, input)
                .await?;
        }
        ClientMessage::SendMessage { content } => {
            // 本文の検証はバインディングの確認の後（use case 内）
            state
                .send_message_usecase
                .execute(connection_id, content.unwrap_or_default())
                .await?;
        }
        ClientMessage::TypingStart => {
            state.typing_indicator_usecase.start(connection_id).await;
        }
        ClientMessage::TypingStop => {
            state.typing_indicator_usecase.stop(connection_id).await;
        }
        ClientMessage::GetMeetingInfo { meeting_id } => {
            let meeting_id = MeetingId::try_from(meeting_id.unwrap_or_default())?;
            state
                .get_meeting_info_usecase
                .execute(connection_id, meeting_id)
                .await;
        }
        ClientMessage::Leave => {
            state
                .disconnect_participant_usecase
                .leave(connection_id)
                .await?;
        }
    }
    Ok(())
}
