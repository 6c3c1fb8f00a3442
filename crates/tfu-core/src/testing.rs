//! Hand-rolled fakes shared by the unit tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{MessagingCapabilities, Reply},
    },
    ports::{LanguageDetector, Translator},
    Result,
};

/// Translator answering from a table, or `"[<target>] <text>"` for unknown pairs.
#[derive(Default)]
pub struct FakeTranslator {
    table: HashMap<(String, String), String>,
    fail: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, target: &str, text: &str, out: &str) -> Self {
        self.table
            .insert((target.to_string(), text.to_string()), out.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, source: &str, target: &str, text: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((source.to_string(), target.to_string(), text.to_string()));
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.fail {
            return Err(Error::External("quota exceeded".to_string()));
        }
        Ok(self
            .table
            .get(&(target.to_string(), text.to_string()))
            .cloned()
            .unwrap_or_else(|| format!("[{target}] {text}")))
    }
}

/// Detector returning a fixed code, or failing.
pub struct FakeDetector {
    answer: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeDetector {
    pub fn answering(code: &str) -> Self {
        Self {
            answer: Some(code.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageDetector for FakeDetector {
    async fn detect(&self, _text: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.answer
            .clone()
            .ok_or_else(|| Error::External("detector offline".to_string()))
    }
}

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    fail_chats: HashSet<i64>,
    fail_edits: bool,
    sends: Mutex<Vec<(ChatId, Reply)>>,
    edits: Mutex<Vec<(MessageRef, String)>>,
    answers: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends to these chats fail (e.g. the user blocked the bot).
    pub fn failing_for(chats: &[i64]) -> Self {
        Self {
            fail_chats: chats.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Every edit fails (e.g. the message is too old to edit).
    pub fn with_failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        }
    }

    fn record(&self, chat_id: ChatId, reply: Reply) -> Result<MessageRef> {
        if self.fail_chats.contains(&chat_id.0) {
            return Err(Error::External(format!(
                "telegram error: Forbidden: bot was blocked by user {}",
                chat_id.0
            )));
        }
        self.sends.lock().unwrap().push((chat_id, reply));
        Ok(self.alloc(chat_id))
    }

    pub fn sends(&self) -> Vec<(ChatId, Reply)> {
        self.sends.lock().unwrap().clone()
    }

    pub fn sent_html(&self) -> Vec<String> {
        self.sends().into_iter().map(|(_, r)| r.html).collect()
    }

    pub fn sends_to(&self, chat_id: ChatId) -> Vec<Reply> {
        self.sends()
            .into_iter()
            .filter(|(c, _)| *c == chat_id)
            .map(|(_, r)| r)
            .collect()
    }

    pub fn edits(&self) -> Vec<(MessageRef, String)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn answers(&self) -> Vec<(String, Option<String>)> {
        self.answers.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
        }
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.record(chat_id, Reply::html(html))
    }

    async fn send_reply(&self, chat_id: ChatId, reply: &Reply) -> Result<MessageRef> {
        self.record(chat_id, reply.clone())
    }

    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()> {
        if self.fail_edits {
            return Err(Error::External(
                "telegram error: Bad Request: message can't be edited".to_string(),
            ));
        }
        self.edits.lock().unwrap().push((msg, html.to_string()));
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.answers
            .lock()
            .unwrap()
            .push((callback_id.to_string(), text.map(str::to_string)));
        Ok(())
    }
}
