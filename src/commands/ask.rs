//! Ask and voice commands

use crate::app::App;
use crate::chat::{ask, ChatReply, Mode};
use crate::error::Result;
use crate::voice::{ask_with_voice, VoiceReply};
use std::path::Path;

pub async fn cmd_ask(
    app: &App,
    question: &str,
    job_id: Option<&str>,
    mode: Mode,
) -> Result<ChatReply> {
    ask(app, question, job_id, mode).await
}

pub async fn cmd_voice(
    app: &App,
    audio_path: &Path,
    job_id: Option<&str>,
    mode: Mode,
) -> Result<VoiceReply> {
    ask_with_voice(app, audio_path, job_id, mode).await
}

pub fn print_chat_reply(reply: &ChatReply, mode: Mode) {
    let label = match mode {
        Mode::Mirror => "🪞 Twin",
        Mode::Devil => "😈 Devil's advocate",
    };
    println!("\n{}: {}", label, reply.avatar_response);

    if !reply.context_used.is_empty() {
        println!("\nDrawn from:");
        for item in &reply.context_used {
            println!(
                "  • '{}' by {} ({}) [{:.3}]",
                item.metadata.title, item.metadata.channel, item.metadata.date, item.score
            );
        }
    }

    if let Some(url) = &reply.audio_url {
        println!("\n🔊 Audio: {}", url);
    }
}

pub fn print_voice_reply(reply: &VoiceReply, mode: Mode) {
    println!("\n🎙  You said: {}", reply.user_text);
    print_chat_reply(&reply.reply, mode);
}
