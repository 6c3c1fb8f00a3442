//! Per-event orchestration: parse, resolve, translate (or act), reply.
//!
//! Every inbound event produces exactly one reply. Failures anywhere in the chain are
//! turned into that reply here; nothing escapes `handle`.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    broadcast::{Broadcaster, KnownUsers},
    config::Config,
    domain::{ChatId, UserId},
    errors::Error,
    formatting::{
        broadcast_report_html, error_html, help_html, language_set_html, languages_html,
        preferred_output_html, reset_html, translation_html, truncate_chars, welcome_html,
        EMPTY_PROMPT,
    },
    gateway::TranslationGateway,
    intent::{CallbackPayload, CommandParser, Intent},
    languages::LanguageRegistry,
    messaging::{
        port::MessagingPort,
        types::{
            CallbackQuery, IncomingMessage, IncomingUpdate, InlineKeyboard, Reply, ReplyKeyboard,
            ReplyMarkup,
        },
    },
    ports::{LanguageDetector, Translator},
    resolver::LanguageResolver,
    session::SessionStore,
    Result,
};

/// Room left for the translation header and HTML escaping.
const REPLY_HEADROOM: usize = 96;

pub struct Router {
    registry: Arc<LanguageRegistry>,
    parser: CommandParser,
    resolver: LanguageResolver,
    gateway: TranslationGateway,
    sessions: Arc<dyn SessionStore>,
    broadcaster: Broadcaster,
    known_users: Arc<KnownUsers>,
    messenger: Arc<dyn MessagingPort>,
}

impl Router {
    pub fn new(
        cfg: &Config,
        translator: Arc<dyn Translator>,
        detector: Arc<dyn LanguageDetector>,
        sessions: Arc<dyn SessionStore>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        let registry = cfg.languages.clone();
        Self {
            parser: CommandParser::new(registry.clone()),
            resolver: LanguageResolver::new(
                registry.clone(),
                sessions.clone(),
                detector,
                cfg.resolver_config(),
            ),
            gateway: TranslationGateway::new(translator, cfg.translate_timeout),
            broadcaster: Broadcaster::new(cfg.admins.clone(), messenger.clone()),
            known_users: Arc::new(KnownUsers::new()),
            registry,
            sessions,
            messenger,
        }
    }

    pub fn known_users(&self) -> Arc<KnownUsers> {
        self.known_users.clone()
    }

    /// Handle one inbound event end to end.
    pub async fn handle(&self, update: IncomingUpdate) {
        if self.known_users.insert(update.user_id()).await {
            info!(user_id = update.user_id().0, "new user");
        }
        match update {
            IncomingUpdate::Message(msg) => self.handle_message(msg).await,
            IncomingUpdate::Callback(q) => self.handle_callback(q).await,
        }
    }

    async fn handle_message(&self, msg: IncomingMessage) {
        let intent = self
            .parser
            .parse(msg.text.as_deref(), msg.caption.as_deref());
        info!(
            user_id = msg.user_id.0,
            username = msg.username.as_deref().unwrap_or("unknown"),
            intent = intent.kind(),
            "message received"
        );

        let reply = match self.dispatch(msg.user_id, intent).await {
            Ok(reply) => reply,
            Err(e) => self.error_reply(msg.user_id, &e),
        };
        self.emit(msg.chat_id, &reply).await;
    }

    async fn dispatch(&self, user: UserId, intent: Intent) -> Result<Reply> {
        match intent {
            Intent::Empty => Ok(Reply::html(EMPTY_PROMPT)),
            Intent::MalformedCommand { usage_hint } => Err(Error::MalformedCommand { usage_hint }),
            Intent::ShowWelcome => Ok(Reply::html(welcome_html(
                &self.registry,
                self.resolver.default_lang(),
            ))
            .with_markup(ReplyMarkup::Keyboard(ReplyKeyboard::language_picker(
                &self.registry,
            )))),
            Intent::ShowHelp => Ok(Reply::html(help_html())),
            Intent::ShowLanguages => Ok(Reply::html(languages_html(&self.registry))
                .with_markup(ReplyMarkup::Inline(InlineKeyboard::languages(&self.registry)))),
            Intent::SetLanguage { code } => {
                let lang = self.resolver.set_language(user, &code).await?;
                info!(user_id = user.0, lang = %lang, "target language set");
                Ok(Reply::html(language_set_html(&self.registry.name_of(&lang))))
            }
            Intent::Reset => {
                self.resolver.reset(user).await;
                let default_name = self.registry.name_of(self.resolver.default_lang());
                Ok(Reply::html(reset_html(&default_name)))
            }
            Intent::Broadcast { body } => {
                let report = self
                    .broadcaster
                    .broadcast(user, &body, &self.known_users)
                    .await?;
                Ok(Reply::html(broadcast_report_html(&report)))
            }
            intent @ (Intent::PlainText { .. } | Intent::ExplicitTranslate { .. }) => {
                self.translate(user, &intent).await
            }
        }
    }

    async fn translate(&self, user: UserId, intent: &Intent) -> Result<Reply> {
        let session = self.sessions.get(user).await;
        let resolution = self.resolver.resolve(intent, &session).await?;
        let translated = self
            .gateway
            .translate(&resolution.target, &resolution.text)
            .await?;

        info!(
            user_id = user.0,
            target = %resolution.target,
            reversed = resolution.reversed,
            chars = resolution.text.chars().count(),
            "translated"
        );

        let limit = self
            .messenger
            .capabilities()
            .max_message_len
            .saturating_sub(REPLY_HEADROOM);
        let translated = truncate_chars(&translated, limit);
        Ok(Reply::html(translation_html(&resolution.target, &translated)))
    }

    async fn handle_callback(&self, q: CallbackQuery) {
        let outcome = match CallbackPayload::parse(&q.data, &self.registry) {
            Ok(CallbackPayload::SetLanguage(code)) => {
                self.resolver.set_language(q.user_id, code.as_str()).await
            }
            Err(e) => Err(e),
        };

        let lang = match outcome {
            Ok(lang) => lang,
            Err(e) => {
                self.ack(&q.callback_id, None).await;
                let reply = self.error_reply(q.user_id, &e);
                self.emit(q.chat_id, &reply).await;
                return;
            }
        };

        info!(user_id = q.user_id.0, lang = %lang, "target language set from picker");
        let name = self.registry.name_of(&lang);
        self.ack(&q.callback_id, Some(&format!("Language set to {name}")))
            .await;

        let html = preferred_output_html(&name);
        if let Some(msg) = q.message {
            match self.messenger.edit_html(msg, &html).await {
                Ok(()) => return,
                Err(e) => warn!(error = %e, "could not edit picker message; sending instead"),
            }
        }
        self.emit(q.chat_id, &Reply::html(html)).await;
    }

    fn error_reply(&self, user: UserId, err: &Error) -> Reply {
        match err {
            e if e.is_user_correctable() => {
                info!(user_id = user.0, error = %e, "rejected request")
            }
            Error::TranslationUnavailable(detail) => {
                warn!(user_id = user.0, detail = %detail, "translation unavailable")
            }
            e => error!(user_id = user.0, error = %e, "event handling failed"),
        }
        Reply::html(error_html(err, &self.registry))
    }

    async fn emit(&self, chat_id: ChatId, reply: &Reply) {
        if let Err(e) = self.messenger.send_reply(chat_id, reply).await {
            warn!(chat_id = chat_id.0, error = %e, "failed to send reply");
        }
    }

    async fn ack(&self, callback_id: &str, text: Option<&str>) {
        if let Err(e) = self.messenger.answer_callback_query(callback_id, text).await {
            warn!(error = %e, "failed to answer callback query");
        }
    }
}
