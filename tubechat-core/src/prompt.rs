//! Prompt construction from transcript and metadata
//!
//! Caption events are flattened into one line of text, scrubbed of invisible
//! characters and whitespace runs, then placed either in the chat system
//! message or in the completion user message.

use crate::protocol::{Message, MessageRole, Segment, TranscriptEvent};

const SYSTEM_PREAMBLE: &str = "You are a helpful assistant, Given the metadata and transcript of a YouTube video. Your primary task is to provide accurate and relevant answers to any questions based on this information. Use the available details effectively to assist users with their inquiries about the video's content, context, or any other related aspects.";

/// Longest prompt excerpt written to debug logs
const MAX_PREVIEW_CHARS: usize = 100;

/// Zero-width space, non-joiner, joiner and the byte order mark
fn is_invisible(ch: char) -> bool {
    matches!(ch, '\u{200B}'..='\u{200D}' | '\u{FEFF}')
}

/// The `\s` class of browser regular expressions. Unlike
/// [`char::is_whitespace`] it excludes U+0085 (NEL).
fn is_collapsible_space(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n'
            | '\u{000B}'
            | '\u{000C}'
            | '\r'
            | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Drop invisible characters and collapse every whitespace run to one space.
///
/// Runs at the edges collapse too; the text is not trimmed.
pub fn sanitize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_was_space = false;

    for ch in raw.chars() {
        if is_invisible(ch) {
            continue;
        }
        if is_collapsible_space(ch) {
            if !prev_was_space {
                out.push(' ');
                prev_was_space = true;
            }
        } else {
            out.push(ch);
            prev_was_space = false;
        }
    }

    out
}

/// Flatten caption events into a single sanitized line.
///
/// Events without segments are skipped. Segment texts are joined by one space
/// within an event and events are joined by one space.
pub fn build_transcript_text(events: &[TranscriptEvent]) -> String {
    let joined = events
        .iter()
        .filter_map(|event| event.segs.as_deref())
        .map(|segs| segs.iter().map(Segment::text).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(" ");

    sanitize_text(&joined)
}

/// Fill the chat instruction template
pub fn build_system_prompt(title: &str, transcript: &str) -> String {
    format!(
        "\n{SYSTEM_PREAMBLE}\n\n\
         START OF METADATA\n\
         Video Title: {title}\n\
         END OF METADATA\n\n\
         START OF TRANSCRIPT\n\
         {transcript}\n\
         END OF TRANSCRIPT\n"
    )
}

/// Prepend the filled system message to the conversation, in place.
///
/// Any system messages the caller sent are kept after it, in order; the
/// injected message is always the only one at index 0.
pub fn inject_system_message(messages: &mut Vec<Message>, title: &str, transcript: &str) {
    messages.insert(0, Message::system(build_system_prompt(title, transcript)));
}

/// Build the single user message of the completion port
pub fn build_completion_prompt(prompt: &str, title: &str, transcript: &str) -> Message {
    Message {
        role: MessageRole::User,
        content: format!("{prompt}\n\nVideo Title: {title}\nVideo Transcript: {transcript}"),
    }
}

/// Short single-line excerpt of a prompt for debug logs
pub fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    let total = trimmed.chars().count();
    if total > MAX_PREVIEW_CHARS {
        let head: String = trimmed.chars().take(MAX_PREVIEW_CHARS).collect();
        format!("{}... ({} chars total)", sanitize_text(&head), total)
    } else {
        sanitize_text(trimmed)
    }
}
