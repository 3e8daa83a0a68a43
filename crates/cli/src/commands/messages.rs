//! Direct messages.

use fairway_client::AppContext;
use fairway_client::views::ChatView;
use fairway_core::{Message, Principal};

use super::{CommandError, ready};

fn log_message(message: &Message, me: Option<&Principal>) {
    let from = if me.is_some_and(|me| message.is_from(me)) {
        "you".to_string()
    } else {
        message.sender.to_string()
    };
    tracing::info!("[{}] {}: {}", message.timestamp, from, message.content);
}

pub async fn show(
    app: &AppContext,
    me: Option<&Principal>,
    with_user: &Principal,
) -> Result<(), CommandError> {
    let thread = ready(app.access().messages(Some(with_user)).await?)?;
    if thread.is_empty() {
        tracing::info!("No messages with {with_user} yet");
    }
    for message in &thread {
        log_message(message, me);
    }
    Ok(())
}

pub async fn send(app: &AppContext, recipient: &Principal, text: &str) -> Result<(), CommandError> {
    app.access().send_message(recipient, text).await?;
    tracing::info!("Message sent to {recipient}");
    Ok(())
}

/// Follow a conversation, logging new messages as they arrive.
///
/// Incoming messages are marked read once shown.
pub async fn watch(
    app: &AppContext,
    me: Principal,
    with_user: Principal,
    refreshes: Option<usize>,
) -> Result<(), CommandError> {
    let every = app.config().message_poll_interval;
    tracing::info!("Watching conversation with {with_user} (Ctrl+C to stop)");
    let mut chat = ChatView::open(app.access(), me.clone(), with_user, every);

    let mut shown = 0;
    let mut remaining = refreshes;
    while remaining != Some(0) {
        let thread = tokio::select! {
            thread = chat.refreshed() => thread,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(thread) = thread else { break };

        for message in thread.iter().skip(shown) {
            log_message(message, Some(&me));
        }
        shown = thread.len();
        chat.mark_all_read().await?;
        remaining = remaining.map(|n| n.saturating_sub(1));
    }

    chat.close();
    Ok(())
}
