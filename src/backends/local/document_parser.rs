// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::office;
use crate::errors::ParseError;
use crate::traits::DocumentParser;

/// Reads documents from the local filesystem, dispatching on extension.
///
/// | extension        | handling                                   |
/// |------------------|--------------------------------------------|
/// | `.txt`, `.md`    | read as UTF-8                              |
/// | `.csv`           | rendered as aligned rows, header first     |
/// | `.pdf`           | text of every page                         |
/// | `.docx`          | body paragraphs, one per line              |
/// | `.pptx`          | slide paragraphs in slide order            |
/// | anything else    | `ParseError::UnsupportedFormat`            |
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDocumentParser;

impl FileDocumentParser {
    pub fn new() -> Self {
        Self
    }
}

/// Lower-cased extension with its leading dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>, ParseError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ParseError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
}

async fn read_utf8(path: &Path) -> Result<String, ParseError> {
    let bytes = read_bytes(path).await?;
    String::from_utf8(bytes).map_err(|e| ParseError::Malformed {
        path: path.to_path_buf(),
        reason: format!("not valid UTF-8: {}", e),
    })
}

/// Run a binary extractor off the async workers. A panicking extractor is
/// reported as a malformed document.
async fn extract_binary(
    path: &Path,
    extract: fn(Vec<u8>) -> Result<String, String>,
) -> Result<String, ParseError> {
    let bytes = read_bytes(path).await?;
    let malformed = |reason: String| ParseError::Malformed {
        path: PathBuf::from(path),
        reason,
    };

    tokio::task::spawn_blocking(move || extract(bytes))
        .await
        .map_err(|e| malformed(format!("extractor aborted: {}", e)))?
        .map_err(malformed)
}

fn pdf_text(bytes: Vec<u8>) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| format!("unreadable PDF: {}", e))
}

#[async_trait]
impl DocumentParser for FileDocumentParser {
    async fn parse(&self, path: &Path) -> Result<String, ParseError> {
        let extension = extension_of(path);
        match extension.as_str() {
            ".txt" | ".md" => read_utf8(path).await,
            ".csv" => {
                let raw = read_utf8(path).await?;
                render_csv(&raw).map_err(|reason| ParseError::Malformed {
                    path: PathBuf::from(path),
                    reason,
                })
            }
            ".pdf" => extract_binary(path, pdf_text).await,
            ".docx" => extract_binary(path, office::docx_text).await,
            ".pptx" => extract_binary(path, office::pptx_text).await,
            _ => Err(ParseError::UnsupportedFormat { extension }),
        }
    }
}

/// Lay a CSV document out as right-aligned columns, one record per line.
///
/// Line breaks inside quoted fields are folded to spaces so every record
/// stays on one line.
fn render_csv(raw: &str) -> Result<String, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(raw.as_bytes());

    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|record| {
            record.map(|record| {
                record
                    .iter()
                    .map(|field| field.lines().collect::<Vec<_>>().join(" "))
                    .collect()
            })
        })
        .collect::<Result<_, csv::Error>>()
        .map_err(|e| e.to_string())?;

    let Some(header) = rows.first() else {
        return Err("no header row".to_string());
    };
    let columns = header.len();

    let widths: Vec<usize> = (0..columns)
        .map(|col| rows.iter().map(|row| row[col].chars().count()).max().unwrap_or(0))
        .collect();

    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(field, width)| format!("{:>width$}", field, width = *width))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    Ok(lines.join("\n"))
}
