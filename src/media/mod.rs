//! Модуль для работы с аудиоданными: декодирование ответов синтеза и экспорт в WAV

pub mod decode;
pub mod wav;

pub use decode::{decode_audio_bytes, decode_pcm16le};
pub use wav::{encode_wav, wav_bytes};
