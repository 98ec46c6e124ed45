//! Command loop and reminder polling.

use crate::command::{Command, CommandParser};
use crate::io::{Heard, SpeechInput, SpeechOutput};
use crate::task::{Task, TaskStore};
use chrono::{Local, NaiveDateTime, TimeDelta};
use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Default period between reminder checks.
pub const DEFAULT_REMINDER_INTERVAL: Duration = Duration::from_secs(30);

const GREETING: &str =
    "Ready. Say 'note' to store a task, 'remind me to ... in ... minutes', or 'quit' to exit.";
const FAREWELL: &str = "Goodbye!";
const ASK_NOTE: &str = "What should I note?";
const NOT_UNDERSTOOD: &str = "Sorry, I did not understand.";
const NOT_CAUGHT: &str = "Sorry, I didn't catch that.";
const SERVICE_DOWN: &str = "Speech service is unavailable.";

/// Chat model consulted for utterances that match no command.
pub struct ChatBackend {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl ChatBackend {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

/// Voice-driven task and reminder agent.
pub struct VoiceAgent {
    store: Arc<Mutex<TaskStore>>,
    output: Arc<dyn SpeechOutput>,
    parser: CommandParser,
    chat: Option<ChatBackend>,
    reminder_interval: Duration,
}

impl VoiceAgent {
    pub fn new(store: TaskStore, output: Arc<dyn SpeechOutput>) -> AppResult<Self> {
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            output,
            parser: CommandParser::new()?,
            chat: None,
            reminder_interval: DEFAULT_REMINDER_INTERVAL,
        })
    }

    pub fn with_chat(mut self, chat: ChatBackend) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn with_reminder_interval(mut self, interval: Duration) -> AppResult<Self> {
        if interval.is_zero() {
            return Err(AppError::Config(
                "Reminder interval must be greater than zero".to_string(),
            ));
        }
        self.reminder_interval = interval;
        Ok(self)
    }

    /// Shared task list, also held by the reminder task while it runs.
    pub fn store(&self) -> Arc<Mutex<TaskStore>> {
        Arc::clone(&self.store)
    }

    /// Run the command loop until "quit" or end of input.
    ///
    /// Reminders are checked in a background task for as long as the loop runs.
    pub async fn run(&self, input: &mut dyn SpeechInput) -> AppResult<()> {
        let reminders = self.spawn_reminders();
        let result = self.command_loop(input).await;
        reminders.abort();
        result
    }

    async fn command_loop(&self, input: &mut dyn SpeechInput) -> AppResult<()> {
        self.say(GREETING).await?;

        loop {
            let utterance = match self.hear(input).await? {
                Some(Heard::Text(text)) => text,
                Some(_) => continue,
                None => break,
            };

            match self.parser.parse(&utterance) {
                Command::Quit => {
                    self.say(FAREWELL).await?;
                    break;
                }
                Command::Remind {
                    description,
                    minutes,
                } => match reminder_time(Local::now().naive_local(), minutes) {
                    Some(remind_at) => self.add_task(Task::new(description, Some(remind_at))).await?,
                    None => self.say(NOT_UNDERSTOOD).await?,
                },
                Command::Note => {
                    self.say(ASK_NOTE).await?;
                    match self.hear(input).await? {
                        Some(Heard::Text(note)) => self.add_task(Task::new(note, None)).await?,
                        Some(_) => {}
                        None => break,
                    }
                }
                Command::Other(text) => self.fallback(&text).await?,
            }
        }

        tracing::info!("Voice agent stopped");
        Ok(())
    }

    /// Listen once, speaking the failure phrase for recognition errors.
    ///
    /// Returns `None` once input is closed.
    async fn hear(&self, input: &mut dyn SpeechInput) -> AppResult<Option<Heard>> {
        let heard = input.listen().await;
        match &heard {
            Heard::Text(text) => tracing::debug!("Heard: {}", text),
            Heard::Unrecognized => self.say(NOT_CAUGHT).await?,
            Heard::ServiceUnavailable(reason) => {
                tracing::warn!("Speech recognition failed: {}", reason);
                self.say(SERVICE_DOWN).await?;
            }
            Heard::Closed => return Ok(None),
        }
        Ok(Some(heard))
    }

    async fn add_task(&self, task: Task) -> AppResult<()> {
        let reply = format!("Noted: {}", task.description);
        self.store.lock().await.add(task)?;
        self.say(&reply).await
    }

    async fn fallback(&self, utterance: &str) -> AppResult<()> {
        let Some(chat) = &self.chat else {
            return self.say(NOT_UNDERSTOOD).await;
        };

        let request = LlmRequest::new(utterance, &chat.model);
        match chat.client.complete(&request).await {
            Ok(response) => self.say(response.content.trim()).await,
            Err(e) => {
                tracing::warn!("Chat backend failed: {}", e);
                self.say(NOT_UNDERSTOOD).await
            }
        }
    }

    async fn say(&self, text: &str) -> AppResult<()> {
        self.output.say(text).await
    }

    fn spawn_reminders(&self) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let output = Arc::clone(&self.output);
        let period = self.reminder_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let now = Local::now().naive_local();
                if let Err(e) = announce_due(&store, output.as_ref(), now).await {
                    tracing::warn!("Reminder check failed: {}", e);
                }
            }
        })
    }
}

/// `now + minutes`, or `None` when out of range.
fn reminder_time(now: NaiveDateTime, minutes: i64) -> Option<NaiveDateTime> {
    TimeDelta::try_minutes(minutes).and_then(|delta| now.checked_add_signed(delta))
}

/// Speak every due reminder and persist the list if any fired.
///
/// Holds the task-list lock for the whole pass. A task is marked notified only
/// once its reminder has been spoken; the first speech failure ends the pass,
/// leaving the remaining reminders due. Returns the number announced.
pub async fn announce_due(
    store: &Mutex<TaskStore>,
    output: &dyn SpeechOutput,
    now: NaiveDateTime,
) -> AppResult<usize> {
    let mut store = store.lock().await;

    let mut announced = 0;
    let mut failure = None;
    for (slot, description) in store.due(now) {
        tracing::info!("Reminder due: {}", description);
        if let Err(e) = output.say(&format!("Reminder: {}", description)).await {
            failure = Some(e);
            break;
        }
        store.mark_notified(slot);
        announced += 1;
    }

    if announced > 0 {
        store.save()?;
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(announced),
    }
}
