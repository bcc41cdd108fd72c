//! Модуль для интеграции с Gemini TTS API
//!
//! Отправляет текст в модель `generateContent` с модальностью AUDIO и
//! декодирует встроенные аудиоданные ответа (base64) в PCM семплы.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AudioBuffer, SpeechSynthesizer};
use crate::config::{TimelineConfig, VoiceName};
use crate::error::{Result, TimelineError};
use crate::media;

/// Частота дискретизации сырого PCM, если в MIME типе не указана
const DEFAULT_PCM_RATE: u32 = 24000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Клиент синтеза речи Gemini
#[derive(Debug, Clone)]
pub struct GeminiSynthesizer {
    client: Client,
    api_key: String,
    api_base_url: String,
    model: String,
}

impl GeminiSynthesizer {
    /// Создать клиента по конфигурации; API ключ обязателен
    pub fn new(config: &TimelineConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            error!("Gemini API key is empty");
            return Err(TimelineError::Configuration(
                "API key is required for speech synthesis".to_string(),
            ));
        }

        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base_url, self.model)
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiSynthesizer {
    async fn synthesize(&self, text: &str, voice: VoiceName) -> Result<AudioBuffer> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![TextPart { text }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.as_str(),
                        },
                    },
                },
            },
        };

        debug!("Sending TTS request ({} chars, voice {})", text.chars().count(), voice);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = match response.text().await {
                Ok(text) => text,
                Err(e) => format!("Failed to read error response: {}", e),
            };
            return Err(TimelineError::Synthesis(format!(
                "API error (status {}): {}",
                status, error_text
            )));
        }

        let body: GenerateContentResponse = response.json().await?;
        let buffer = decode_response(body)?;
        info!(
            "Received {:.2}s of speech at {} Hz",
            buffer.duration_seconds(),
            buffer.sample_rate
        );
        Ok(buffer)
    }
}

/// Извлечь первую аудиочасть ответа и декодировать ее
fn decode_response(response: GenerateContentResponse) -> Result<AudioBuffer> {
    let inline = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.inline_data))
        .filter(|inline| !inline.data.is_empty())
        .ok_or_else(|| TimelineError::Synthesis("no audio data in model response".to_string()))?;

    let bytes = BASE64.decode(inline.data.as_bytes())?;
    decode_inline_audio(&inline.mime_type, &bytes)
}

/// Декодировать аудио по MIME типу: сырой PCM напрямую, контейнеры через Symphonia
fn decode_inline_audio(mime_type: &str, bytes: &[u8]) -> Result<AudioBuffer> {
    let mime = mime_type.to_ascii_lowercase();
    let essence = mime.split(';').next().unwrap_or("").trim();

    match essence {
        "audio/l16" | "audio/pcm" | "" => {
            let rate = mime_parameter(&mime, "rate")
                .and_then(|rate| rate.parse().ok())
                .unwrap_or(DEFAULT_PCM_RATE);
            let channels = mime_parameter(&mime, "channels")
                .and_then(|channels| channels.parse().ok())
                .unwrap_or(1);
            media::decode_pcm16le(bytes, rate, channels)
        }
        _ => {
            let extension = match essence {
                "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
                "audio/mpeg" | "audio/mp3" => Some("mp3"),
                "audio/aac" => Some("aac"),
                _ => None,
            };
            media::decode_audio_bytes(bytes, extension)
        }
    }
}

fn mime_parameter<'a>(mime: &'a str, name: &str) -> Option<&'a str> {
    mime.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}
