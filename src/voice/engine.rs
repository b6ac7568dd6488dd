//! Canned speech engines. No audio is decoded or produced.

use serde::Serialize;

const STT_ENGINE: &str = "faster-whisper";
const TTS_ENGINE: &str = "xtts";
/// Base64 of `FAKE_WAV`.
const PLACEHOLDER_AUDIO: &str = "RkFLRV9XQVY=";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcription {
    pub text: String,
    pub engine: &'static str,
    pub simulated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Synthesis {
    pub audio_base64: String,
    pub engine: &'static str,
    pub simulated: bool,
}

pub fn transcribe_audio(_audio_base64: &str) -> Transcription {
    Transcription {
        text: "(simulated transcription)".to_string(),
        engine: STT_ENGINE,
        simulated: true,
    }
}

pub fn synthesize_speech(_text: &str) -> Synthesis {
    Synthesis {
        audio_base64: PLACEHOLDER_AUDIO.to_string(),
        engine: TTS_ENGINE,
        simulated: true,
    }
}
