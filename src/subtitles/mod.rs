//! SubRip (.srt) subtitle serialization and parsing
//!
//! The writer and the parser are kept together so a track written by the
//! transcriber reads back with the same timings, truncated to milliseconds.

use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::model::TranscriptSegment;
use crate::utils::time::{format_srt_timestamp, parse_srt_timestamp};

fn timing_line() -> &'static Regex {
    static TIMING: OnceLock<Regex> = OnceLock::new();
    TIMING.get_or_init(|| {
        Regex::new(r"(\d{2,}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2,}:\d{2}:\d{2},\d{3})")
            .expect("timing pattern is valid")
    })
}

fn block_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("separator pattern is valid"))
}

/// Serialize segments as numbered SRT blocks.
///
/// Each cue is written on a single line: any run of whitespace in the text,
/// including line breaks, becomes one space. A cue with no words is written
/// as a block without a text line.
pub fn format_srt(segments: &[TranscriptSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n",
            i + 1,
            format_srt_timestamp(segment.start),
            format_srt_timestamp(segment.end),
        ));
        let text = segment.text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            out.push_str(&text);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Parse SRT content into segments.
///
/// Blocks without a valid timing line on their second line are skipped. A
/// block with no text line yields an empty cue. Multi-line text is joined
/// with single spaces.
pub fn parse_srt(content: &str) -> Vec<TranscriptSegment> {
    let normalized = content.replace("\r\n", "\n");
    let mut segments = Vec::new();

    for block in block_separator().split(normalized.trim()) {
        let lines: Vec<&str> = block.lines().collect();
        if lines.len() < 2 {
            continue;
        }

        let Some(caps) = timing_line().captures(lines[1]) else {
            continue;
        };
        let (Some(start), Some(end)) = (parse_srt_timestamp(&caps[1]), parse_srt_timestamp(&caps[2]))
        else {
            continue;
        };
        let text = lines[2..].join(" ").trim().to_string();

        segments.push(TranscriptSegment { start, end, text });
    }

    segments
}

/// Read and parse an SRT file
pub async fn read_srt(path: &Path) -> std::io::Result<Vec<TranscriptSegment>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_srt(&content))
}

/// Write segments to an SRT file.
///
/// The track is written to a temporary file in the same directory and renamed
/// into place, so readers never see a partial file.
pub async fn write_srt(path: &Path, segments: &[TranscriptSegment]) -> std::io::Result<()> {
    let content = format_srt(segments);
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
}
