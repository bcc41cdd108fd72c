//! Модуль для парсинга субтитров
//!
//! Этот модуль содержит функции для парсинга SRT файлов. Разделитель
//! миллисекунд может быть как запятой, так и точкой.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use super::Segment;
use crate::error::{Result, TimelineError};

lazy_static! {
    static ref BLOCK_SEPARATOR: Regex = Regex::new(r"\n\s*\n").unwrap();
    static ref HAS_TIMESTAMP: Regex = Regex::new(r"\d{2}:\d{2}:\d{2}").unwrap();
    static ref TIMING_LINE: Regex =
        Regex::new(r"(\d{2}:\d{2}:\d{2}[,.]\d{3})\s-->\s(\d{2}:\d{2}:\d{2}[,.]\d{3})").unwrap();
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref STYLE_TAG: Regex = Regex::new(r"\{[^}]*\}").unwrap();
}

/// Перевести метку времени `HH:MM:SS,mmm` (или `HH:MM:SS.mmm`) в секунды.
///
/// Строка, в которой меньше трех компонентов, дает 0.
pub fn time_to_seconds(time_str: &str) -> f64 {
    let standardized = time_str.trim().replacen(',', ".", 1);
    let parts: Vec<&str> = standardized.split(':').collect();
    if parts.len() < 3 {
        return 0.0;
    }

    let component = |s: &str| s.trim().parse::<f64>().unwrap_or(0.0);
    component(parts[0]) * 3600.0 + component(parts[1]) * 60.0 + component(parts[2])
}

/// Проверить, похож ли текст на SRT (есть хотя бы одна строка таймингов)
pub fn is_srt_format(text: &str) -> bool {
    TIMING_LINE.is_match(text)
}

/// Парсинг содержимого SRT в список сегментов.
///
/// Блоки без строки таймингов и блоки с пустым текстом пропускаются.
pub fn parse_srt_segments(content: &str) -> Vec<Segment> {
    let normalized = content.replace("\r\n", "\n");
    let mut segments = Vec::new();

    for block in BLOCK_SEPARATOR.split(&normalized) {
        let lines: Vec<&str> = block.trim().split('\n').collect();
        if lines.len() < 2 {
            continue;
        }

        // Номер блока иногда отсутствует, тогда тайминги идут первой строкой
        let (id, timing_index) = if HAS_TIMESTAMP.is_match(lines[0]) {
            (format!("segment-{}", segments.len() + 1), 0)
        } else if HAS_TIMESTAMP.is_match(lines[1]) {
            (lines[0].trim().to_string(), 1)
        } else {
            continue;
        };

        let Some(captures) = TIMING_LINE.captures(lines[timing_index]) else {
            continue;
        };
        let start_time = time_to_seconds(&captures[1]);
        let end_time = time_to_seconds(&captures[2]);

        let text = clean_text(&lines[timing_index + 1..].join(" "));
        if text.is_empty() {
            continue;
        }

        segments.push(Segment::new(id, start_time, end_time, text));
    }

    log::debug!("Parsed {} SRT segments", segments.len());
    segments
}

/// Извлечь из SRT только текст, без таймингов
pub fn parse_srt_text(content: &str) -> String {
    parse_srt_segments(content)
        .into_iter()
        .map(|segment| segment.text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Парсинг SRT файла
pub fn parse_srt_file<P: AsRef<Path>>(path: P) -> Result<Vec<Segment>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        TimelineError::SubtitleParsing(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(parse_srt_segments(&content))
}

/// Удалить HTML теги и теги стилей ASS/SSA
fn clean_text(text: &str) -> String {
    let text = HTML_TAG.replace_all(text, "");
    let text = STYLE_TAG.replace_all(&text, "");
    text.trim().to_string()
}
