//! Reply texts (Telegram HTML parse mode).
//!
//! Anything that came from a user or a provider goes through [`escape_html`].

use crate::{
    broadcast::DeliveryReport,
    errors::Error,
    intent::{USAGE_SETLANG, USAGE_TR, USAGE_TRANSLATE},
    languages::{LanguageCode, LanguageRegistry, BACK_LABEL},
};

pub const GENERIC_FAILURE: &str = "⚠️ Service temporarily unavailable. Please try again later.";
pub const EMPTY_PROMPT: &str =
    "✏️ Send me some text (or a photo with a caption) and I'll translate it.";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    format!("{}...", text.chars().take(keep).collect::<String>())
}

pub fn welcome_html(registry: &LanguageRegistry, default_lang: &LanguageCode) -> String {
    format!(
        "🤖🌍 <b>Welcome to Translate For U!</b>\n\n\
Send any text and I'll auto-detect it and translate it to {}.\n\
Pick another output language below, or tap {} to go back to the default.\n\n\
/help lists every command.",
        escape_html(&registry.name_of(default_lang)),
        escape_html(BACK_LABEL),
    )
}

pub fn help_html() -> String {
    format!(
        "<b>📋 Commands</b>\n\
/start - Welcome message and language picker\n\
/help - This help message\n\
{} - Translate into a specific language\n\
{} - Translate into your preferred language\n\
/languages - List supported languages\n\
{} - Set preferred output language\n\n\
Or just send any text (or a captioned photo) for instant translation!",
        escape_html(USAGE_TR),
        escape_html(USAGE_TRANSLATE),
        escape_html(USAGE_SETLANG),
    )
}

pub fn languages_html(registry: &LanguageRegistry) -> String {
    let lines: Vec<String> = registry
        .iter()
        .map(|l| {
            let flag = l.flag.as_deref().map(|f| format!("{f} ")).unwrap_or_default();
            format!("{flag}<code>{}</code> — {}", l.code, escape_html(&l.name))
        })
        .collect();
    format!("<b>Supported languages</b>\n{}", lines.join("\n"))
}

pub fn translation_html(target: &LanguageCode, translated: &str) -> String {
    format!(
        "🔤 Translation ({}):\n{}",
        target.as_str().to_uppercase(),
        escape_html(translated)
    )
}

pub fn language_set_html(name: &str) -> String {
    format!("✅ Output language set to {}", escape_html(name))
}

pub fn preferred_output_html(name: &str) -> String {
    format!("✅ Preferred output: {}", escape_html(name))
}

pub fn reset_html(default_name: &str) -> String {
    format!(
        "↩️ Preference cleared. Translating to {} again.",
        escape_html(default_name)
    )
}

pub fn broadcast_message_html(body: &str) -> String {
    format!("📢 <b>Broadcast:</b>\n\n{}", escape_html(body))
}

pub fn broadcast_report_html(report: &DeliveryReport) -> String {
    if report.failed == 0 {
        return format!(
            "✅ Broadcast sent to {} user{}.",
            report.delivered,
            if report.delivered == 1 { "" } else { "s" }
        );
    }
    format!(
        "✅ Broadcast sent to {} of {} users ({} failed).",
        report.delivered, report.attempted, report.failed
    )
}

/// User-facing text for a failed event. Infrastructure failures share one generic notice.
pub fn error_html(err: &Error, registry: &LanguageRegistry) -> String {
    match err {
        Error::MalformedCommand { usage_hint } => {
            format!("⚠️ Format: <code>{}</code>", escape_html(usage_hint))
        }
        Error::UnknownLanguageCode(code) => format!(
            "❌ Unknown language code <code>{}</code>.\nValid codes: {}\nUse /languages to view them.",
            escape_html(&truncate_chars(code, 16)),
            escape_html(&registry.codes_csv())
        ),
        Error::Unauthorized => "🚫 Unauthorized.".to_string(),
        Error::TranslationUnavailable(_) => {
            "⚠️ Translation failed. Please try again in a moment.".to_string()
        }
        _ => GENERIC_FAILURE.to_string(),
    }
}
