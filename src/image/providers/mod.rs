//! Image transformer implementations.

mod gemini;

pub use gemini::{wrap_prompt, GeminiTransformer, GeminiTransformerBuilder};
