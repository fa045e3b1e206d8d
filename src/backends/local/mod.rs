// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod document_parser;
pub mod embedder;
pub mod minilm;
pub mod office;
pub mod text_splitter;
pub mod vector_store;

pub use document_parser::FileDocumentParser;
pub use embedder::HashingEmbedder;
pub use minilm::MiniLmEmbedder;
pub use text_splitter::TextSplitter;
pub use vector_store::InMemoryVectorStore;
