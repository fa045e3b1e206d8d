// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Maximum characters per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Characters carried over between neighbouring chunks
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Chunks handed to the language model per question
pub const DEFAULT_TOP_K: usize = 4;
/// Width of the hashed embedding vectors
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;

pub const DEFAULT_LLM_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_LLM_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
/// Seconds before a language model call is abandoned
pub const DEFAULT_LLM_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.95;
pub const DEFAULT_LLM_TOP_K: u32 = 50;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 500;

/// Environment variable consulted when `llm.api_key` is left empty
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
