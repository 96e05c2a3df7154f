//! Update listener — the single-consumer dispatch loop.
//!
//! Events are taken one at a time from the shared inbound stream and
//! handled start-to-finish before the next is taken, so storage
//! read-modify-write cycles on edit-state need no locking. Handler
//! errors are logged and discarded: one user's failure must not stop
//! processing for others.

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{error, info};

use crate::channels::{EventStream, TelegramEvent};
use crate::dispatch::{CallbackDispatcher, MessageDispatcher};
use crate::error::Result;

pub struct UpdateListener {
    messages: MessageDispatcher,
    callbacks: CallbackDispatcher,
}

impl UpdateListener {
    pub fn new(messages: MessageDispatcher, callbacks: CallbackDispatcher) -> Self {
        Self {
            messages,
            callbacks,
        }
    }

    /// Consume events until the stream ends or shutdown fires. The
    /// in-flight event always completes; shutdown only stops intake.
    pub async fn run(&self, mut events: EventStream, mut shutdown: watch::Receiver<bool>) {
        loop {
            let event = tokio::select! {
                _ = shutdown.changed() => {
                    info!("Shutdown signal received, stopping update intake");
                    return;
                }
                event = events.next() => match event {
                    Some(event) => event,
                    None => {
                        info!("Update stream closed");
                        return;
                    }
                },
            };

            if let Err(e) = self.dispatch(&event).await {
                error!(error = %e, "Update handler failed");
            }
        }
    }

    async fn dispatch(&self, event: &TelegramEvent) -> Result<()> {
        match event {
            TelegramEvent::Message(msg) => self.messages.handle(msg).await,
            TelegramEvent::Callback(data) => self.callbacks.handle(data).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::channels::{CallbackData, IncomingMessage};
    use crate::dispatch::callback::actions;
    use crate::dispatch::test_support::{RecordingResponder, SentAction};
    use crate::store::LibSqlBackend;

    async fn listener() -> (UpdateListener, Arc<RecordingResponder>, Arc<LibSqlBackend>) {
        let responder = Arc::new(RecordingResponder::default());
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let listener = UpdateListener::new(
            MessageDispatcher::new(responder.clone(), db.clone(), db.clone()),
            CallbackDispatcher::new(responder.clone(), db.clone(), db.clone()),
        );
        (listener, responder, db)
    }

    fn stream_of(events: Vec<TelegramEvent>) -> EventStream {
        Box::pin(futures::stream::iter(events))
    }

    #[tokio::test]
    async fn drains_stream_then_returns() {
        let (listener, responder, _db) = listener().await;
        let (_tx, rx) = watch::channel(false);

        let events = vec![
            TelegramEvent::Message(IncomingMessage {
                user_id: 1,
                text: "/start".into(),
                message_id: 5,
            }),
            TelegramEvent::Message(IncomingMessage {
                user_id: 2,
                text: "/start".into(),
                message_id: 6,
            }),
        ];
        listener.run(stream_of(events), rx).await;

        assert_eq!(responder.actions().len(), 2);
    }

    #[tokio::test]
    async fn handler_error_does_not_stop_the_loop() {
        let (listener, responder, _db) = listener().await;
        let (_tx, rx) = watch::channel(false);

        let events = vec![
            // Unknown action fails the handler.
            TelegramEvent::Callback(CallbackData {
                from_id: 1,
                message_id: 5,
                action: "Bogus".into(),
                callback_id: "cb-1".into(),
            }),
            // The next user's event is still processed.
            TelegramEvent::Callback(CallbackData {
                from_id: 2,
                message_id: 6,
                action: actions::CHANGE_CONTACT_DONE.into(),
                callback_id: "cb-2".into(),
            }),
        ];
        listener.run(stream_of(events), rx).await;

        let actions = responder.actions();
        assert!(actions.contains(&SentAction::Answered {
            callback_id: "cb-2".into(),
            text: "Saved".into(),
        }));
    }

    #[tokio::test]
    async fn shutdown_stops_intake() {
        let (listener, responder, _db) = listener().await;
        let (tx, rx) = watch::channel(false);

        // A stream that never ends on its own.
        let events: EventStream = Box::pin(futures::stream::pending());

        tx.send(true).unwrap();
        listener.run(events, rx).await;

        assert!(responder.actions().is_empty());
    }
}
