//! Long-polling command intake.
//!
//! Repeatedly calls `getUpdates`, advances the offset past every update seen
//! and hands recognized commands to a [`CommandHandler`], one at a time.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::Result;
use crate::types::Update;

/// Default server-side long-poll timeout.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause after a failed poll before trying again.
const ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Consecutive failures logged before the poller goes quiet until recovery.
const MAX_LOGGED_ERRORS: u32 = 3;

/// Something that yields bot updates.
pub trait UpdateSource: Send + Sync {
    /// Returns updates with id >= `offset`, waiting up to `timeout` for one.
    ///
    /// # Errors
    ///
    /// Returns an error if the updates cannot be fetched.
    fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Update>>> + Send + '_>>;
}

/// Receives commands dispatched by the [`Poller`].
pub trait CommandHandler: Send + Sync {
    /// Handles `command` sent from `chat_id`.
    fn handle(
        &self,
        command: Command,
        chat_id: i64,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Long-polling loop over an [`UpdateSource`].
#[derive(Debug)]
pub struct Poller<S> {
    source: S,
    timeout: Duration,
    backoff: Duration,
    bot_username: Option<String>,
}

impl<S: UpdateSource> Poller<S> {
    /// Creates a poller with the default timeout and backoff.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: DEFAULT_POLL_TIMEOUT,
            backoff: ERROR_BACKOFF,
            bot_username: None,
        }
    }

    /// Sets the long-poll timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the pause after a failed poll.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Only accept `/command@name` forms addressed to this bot.
    #[must_use]
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Runs until `cancel` fires.
    ///
    /// A command that is already being handled is allowed to finish.
    pub async fn run<H>(&self, handler: &H, cancel: CancellationToken)
    where
        H: CommandHandler + ?Sized,
    {
        info!(timeout_secs = self.timeout.as_secs(), "command poller started");

        let mut offset: Option<i64> = None;
        let mut consecutive_errors: u32 = 0;

        loop {
            let polled = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                polled = self.source.get_updates(offset, self.timeout) => polled,
            };

            match polled {
                Ok(updates) => {
                    if consecutive_errors > 0 {
                        info!(errors = consecutive_errors, "command poller recovered");
                        consecutive_errors = 0;
                    }
                    for update in updates {
                        offset = next_offset(offset, update.update_id);
                        self.dispatch(handler, &update).await;
                    }
                }
                Err(e) => {
                    consecutive_errors = consecutive_errors.saturating_add(1);
                    if consecutive_errors <= MAX_LOGGED_ERRORS {
                        warn!(error = %e, "failed to poll for updates");
                    } else if consecutive_errors == MAX_LOGGED_ERRORS + 1 {
                        warn!("poll errors continuing; suppressing logs until recovery");
                    }

                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(self.backoff) => {}
                    }
                }
            }
        }

        info!("command poller stopped");
    }

    async fn dispatch<H>(&self, handler: &H, update: &Update)
    where
        H: CommandHandler + ?Sized,
    {
        let Some(message) = &update.message else {
            return;
        };
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let Some(command) = Command::parse(text, self.bot_username.as_deref()) else {
            return;
        };

        debug!(command = %command, chat_id = message.chat.id, "dispatching command");
        handler.handle(command, message.chat.id).await;
    }
}

fn next_offset(current: Option<i64>, update_id: i64) -> Option<i64> {
    let next = update_id.saturating_add(1);
    Some(current.map_or(next, |current| current.max(next)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use crate::error::TransportError;
    use crate::types::{Chat, Message};

    /// Replays scripted poll results, then cancels the poller.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<Vec<Update>>>>,
        offsets: Mutex<Vec<Option<i64>>>,
        cancel: CancellationToken,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Vec<Update>>>, cancel: CancellationToken) -> Self {
            Self {
                script: Mutex::new(script.into()),
                offsets: Mutex::new(Vec::new()),
                cancel,
            }
        }
    }

    impl UpdateSource for ScriptedSource {
        fn get_updates(
            &self,
            offset: Option<i64>,
            _timeout: Duration,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<Update>>> + Send + '_>> {
            self.offsets.lock().push(offset);
            let next = self.script.lock().pop_front();
            match next {
                Some(result) => Box::pin(async move { result }),
                None => {
                    self.cancel.cancel();
                    Box::pin(std::future::pending())
                }
            }
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<(Command, i64)>>,
    }

    impl CommandHandler for RecordingHandler {
        fn handle(
            &self,
            command: Command,
            chat_id: i64,
        ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            self.seen.lock().push((command, chat_id));
            Box::pin(async {})
        }
    }

    fn text_update(update_id: i64, chat_id: i64, text: &str) -> Update {
        Update {
            update_id,
            message: Some(Message {
                message_id: update_id,
                chat: Chat { id: chat_id, kind: None },
                from: None,
                text: Some(text.to_string()),
            }),
        }
    }

    #[test]
    fn next_offset_moves_past_highest_update() {
        assert_eq!(next_offset(None, 5), Some(6));
        assert_eq!(next_offset(Some(6), 9), Some(10));
        assert_eq!(next_offset(Some(10), 3), Some(10));
        assert_eq!(next_offset(None, i64::MAX), Some(i64::MAX));
    }

    #[tokio::test]
    async fn dispatches_commands_in_order() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource::new(
            vec![Ok(vec![
                text_update(1, 42, "/start"),
                text_update(2, 42, "just chatting"),
                text_update(3, -100, "/rotate@fluxcdbot"),
                text_update(4, 7, "/rotate@someoneelse"),
                Update { update_id: 5, message: None },
            ])],
            cancel.clone(),
        );
        let poller = Poller::new(source).with_bot_username("fluxcdbot");
        let handler = RecordingHandler::default();

        poller.run(&handler, cancel).await;

        assert_eq!(
            *handler.seen.lock(),
            vec![(Command::Start, 42), (Command::Rotate, -100)]
        );
    }

    #[tokio::test]
    async fn advances_offset_between_polls() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource::new(
            vec![
                Ok(vec![text_update(10, 1, "/start"), text_update(11, 2, "/start")]),
                Ok(vec![]),
            ],
            cancel.clone(),
        );
        let poller = Poller::new(source);
        let handler = RecordingHandler::default();

        poller.run(&handler, cancel).await;

        assert_eq!(*poller.source.offsets.lock(), vec![None, Some(12), Some(12)]);
    }

    #[tokio::test]
    async fn keeps_polling_after_errors() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource::new(
            vec![
                Err(TransportError::Request("connection error".to_string())),
                Err(TransportError::Api {
                    code: 502,
                    description: "Bad Gateway".to_string(),
                }),
                Ok(vec![text_update(1, 42, "/rotate")]),
            ],
            cancel.clone(),
        );
        let poller = Poller::new(source).with_backoff(Duration::from_millis(1));
        let handler = RecordingHandler::default();

        poller.run(&handler, cancel).await;

        assert_eq!(*handler.seen.lock(), vec![(Command::Rotate, 42)]);
        assert_eq!(poller.source.offsets.lock().len(), 4);
    }

    #[tokio::test]
    async fn stops_immediately_when_already_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let updates = vec![Ok(vec![text_update(1, 1, "/start")])];
        let source = ScriptedSource::new(updates, cancel.clone());
        let poller = Poller::new(source);
        let handler = RecordingHandler::default();

        poller.run(&handler, cancel).await;

        assert!(handler.seen.lock().is_empty());
    }
}
