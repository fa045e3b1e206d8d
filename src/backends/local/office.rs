// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Text extraction for Office Open XML packages (DOCX, PPTX).
//!
//! Both formats are zip archives of XML parts. Paragraphs are `<w:p>` in
//! WordprocessingML and `<a:p>` in DrawingML; runs of text are `<w:t>` /
//! `<a:t>`. Matching on local names covers both.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

const DOCX_BODY: &str = "word/document.xml";
const PPTX_SLIDE_PREFIX: &str = "ppt/slides/slide";

type Archive = ZipArchive<Cursor<Vec<u8>>>;

fn open(bytes: Vec<u8>, format: &str) -> Result<Archive, String> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("not a {} package: {}", format, e))
}

fn read_part(archive: &mut Archive, name: &str) -> Result<String, String> {
    let mut part = archive
        .by_name(name)
        .map_err(|e| format!("missing part {}: {}", name, e))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| format!("unreadable part {}: {}", name, e))?;
    Ok(xml)
}

/// Paragraph texts of one XML part, in document order.
pub fn paragraphs(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(text)) if in_text => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs)
}

/// Body paragraphs of a DOCX document, one per line.
pub fn docx_text(bytes: Vec<u8>) -> Result<String, String> {
    let mut archive = open(bytes, "DOCX")?;
    let xml = read_part(&mut archive, DOCX_BODY)?;
    Ok(paragraphs(&xml)?.join("\n"))
}

/// Slide numbers and part names, in slide order.
fn slide_parts(archive: &Archive) -> Vec<(u32, String)> {
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix(PPTX_SLIDE_PREFIX)?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort();
    slides
}

/// Text of every slide, in slide order, one paragraph per line.
pub fn pptx_text(bytes: Vec<u8>) -> Result<String, String> {
    let mut archive = open(bytes, "PPTX")?;
    let mut lines = Vec::new();
    for (_, name) in slide_parts(&archive) {
        let xml = read_part(&mut archive, &name)?;
        lines.extend(paragraphs(&xml)?);
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// A zip archive holding `parts` as (name, contents).
    pub fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in parts {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub fn docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{}</w:body></w:document>",
            body
        );
        package(&[("[Content_Types].xml", "<Types/>"), ("word/document.xml", &xml)])
    }

    pub fn slide(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!(
            "<p:sld xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\" \
             xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\">\
             <p:cSld><p:spTree><p:sp><p:txBody>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>",
            body
        )
    }
}
