//! Voice round trip: speech-to-text, chat, text-to-speech

use crate::app::App;
use crate::chat::{self, ChatReply, Mode};
use crate::config::SpeechConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SPEECH_TIMEOUT_SECS: u64 = 60;

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into text
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Speak `text`, returning a reference to the produced audio
    async fn synthesize(&self, text: &str) -> Result<String>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

#[derive(Deserialize)]
struct SpeechResponse {
    audio_url: String,
}

fn speech_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(SPEECH_TIMEOUT_SECS))
        .build()?)
}

fn with_auth(request: reqwest::RequestBuilder, api_key: &Option<String>) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) => request.bearer_auth(key),
        None => request,
    }
}

/// Whisper-style transcription endpoint
pub struct HttpTranscriber {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpTranscriber {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: speech_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        let mime = mime_guess::from_path(audio_path).first_or_octet_stream();
        debug!("Transcribing {} ({}, {} bytes)", file_name, mime, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())?;
        let form = Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        let response = with_auth(self.client.post(&url), &self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Speech(format!(
                "Transcription returned {}: {}",
                status, text
            )));
        }

        let parsed: TranscriptionResponse = response.json().await?;
        Ok(parsed.text.trim().to_string())
    }
}

/// Text-to-speech endpoint that stores audio and hands back its URL
pub struct HttpSynthesizer {
    client: Client,
    base_url: String,
    voice: String,
    api_key: Option<String>,
}

impl HttpSynthesizer {
    pub fn new(base_url: &str, voice: &str, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: speech_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            voice: voice.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<String> {
        let url = format!("{}/v1/speech", self.base_url);
        let response = with_auth(self.client.post(&url), &self.api_key)
            .json(&SpeechRequest {
                text,
                voice: &self.voice,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Speech(format!("Synthesis returned {}: {}", status, body)));
        }

        let parsed: SpeechResponse = response.json().await?;
        Ok(parsed.audio_url)
    }
}

pub fn create_transcriber(
    config: &SpeechConfig,
    api_key: Option<String>,
) -> Result<Option<Arc<dyn Transcriber>>> {
    match &config.stt_url {
        Some(url) => Ok(Some(Arc::new(HttpTranscriber::new(
            url,
            &config.stt_model,
            api_key,
        )?))),
        None => Ok(None),
    }
}

pub fn create_synthesizer(
    config: &SpeechConfig,
    api_key: Option<String>,
) -> Result<Option<Arc<dyn Synthesizer>>> {
    match &config.tts_url {
        Some(url) => Ok(Some(Arc::new(HttpSynthesizer::new(
            url,
            &config.tts_voice,
            api_key,
        )?))),
        None => Ok(None),
    }
}

/// Reply to a spoken question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceReply {
    pub user_text: String,
    #[serde(flatten)]
    pub reply: ChatReply,
}

/// Transcribe, answer through [`chat::ask`], then speak the answer
pub async fn ask_with_voice(
    app: &App,
    audio_path: &Path,
    job_id: Option<&str>,
    mode: Mode,
) -> Result<VoiceReply> {
    let transcriber = app
        .transcriber
        .as_ref()
        .ok_or_else(|| Error::Speech("Speech-to-text is not configured".to_string()))?;

    let user_text = transcriber.transcribe(audio_path).await?;
    if user_text.is_empty() {
        return Err(Error::Validation("Could not transcribe audio".to_string()));
    }
    info!("Transcribed question: {}", user_text);

    let mut reply = chat::ask(app, &user_text, job_id, mode).await?;

    reply.audio_url = match &app.synthesizer {
        Some(synth) => match synth.synthesize(&reply.avatar_response).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Speech synthesis failed: {}", e);
                None
            }
        },
        None => None,
    };

    Ok(VoiceReply { user_text, reply })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_app_with, ScriptedChatModel};
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn audio_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("question.webm");
        std::fs::write(&path, b"fake-audio").unwrap();
        path
    }

    #[tokio::test]
    async fn test_transcriber_posts_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": " hello there "})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let transcriber =
            HttpTranscriber::new(&server.uri(), "whisper-large-v3", Some("secret".into())).unwrap();
        let text = transcriber.transcribe(&audio_file(&dir)).await.unwrap();
        assert_eq!(text, "hello there");
    }

    #[tokio::test]
    async fn test_synthesizer_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/speech"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let synth = HttpSynthesizer::new(&server.uri(), "default", None).unwrap();
        let err = synth.synthesize("hi").await.unwrap_err();
        assert!(matches!(err, Error::Speech(_)));
    }

    #[tokio::test]
    async fn test_voice_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "who am I?"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/speech"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"audio_url": "/audio/reply.mp3"})),
            )
            .mount(&server)
            .await;

        let uri = server.uri();
        let model = Arc::new(ScriptedChatModel::new(["A curious learner."]));
        let h = test_app_with(Some(model), |app| {
            app.transcriber = Some(Arc::new(HttpTranscriber::new(&uri, "m", None).unwrap()));
            app.synthesizer = Some(Arc::new(HttpSynthesizer::new(&uri, "v", None).unwrap()));
        })
        .await;
        h.app.db.create_job().await.unwrap();

        let dir = TempDir::new().unwrap();
        let reply = ask_with_voice(&h.app, &audio_file(&dir), None, Mode::Mirror)
            .await
            .unwrap();
        assert_eq!(reply.user_text, "who am I?");
        assert_eq!(reply.reply.avatar_response, "A curious learner.");
        assert_eq!(reply.reply.audio_url.as_deref(), Some("/audio/reply.mp3"));
    }

    #[tokio::test]
    async fn test_empty_transcript_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "  "})))
            .mount(&server)
            .await;

        let uri = server.uri();
        let h = test_app_with(None, |app| {
            app.transcriber = Some(Arc::new(HttpTranscriber::new(&uri, "m", None).unwrap()));
        })
        .await;
        h.app.db.create_job().await.unwrap();

        let dir = TempDir::new().unwrap();
        let err = ask_with_voice(&h.app, &audio_file(&dir), None, Mode::Mirror)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(h.app.db.get_global_stats().await.unwrap().conversation_count, 0);
    }

    #[tokio::test]
    async fn test_missing_synthesizer_leaves_audio_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "hi"})))
            .mount(&server)
            .await;

        let uri = server.uri();
        let h = test_app_with(None, |app| {
            app.transcriber = Some(Arc::new(HttpTranscriber::new(&uri, "m", None).unwrap()));
        })
        .await;
        h.app.db.create_job().await.unwrap();

        let dir = TempDir::new().unwrap();
        let reply = ask_with_voice(&h.app, &audio_file(&dir), None, Mode::Devil)
            .await
            .unwrap();
        assert!(reply.reply.audio_url.is_none());
    }
}
