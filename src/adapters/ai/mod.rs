//! AI adapter module. Implements SummarizerPort for Gemini.

pub mod gemini_adapter;

pub use gemini_adapter::GeminiAdapter;
