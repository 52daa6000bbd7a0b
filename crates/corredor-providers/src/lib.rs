//! # corredor-providers
//!
//! Text-completion backends. Gemini is the primary provider; OpenAI is a
//! drop-in alternative. Both are plain REST clients behind the
//! `Provider` trait — prompt in, raw text out.

pub mod gemini;
pub mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
