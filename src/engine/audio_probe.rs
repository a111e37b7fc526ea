//! Audio presence detection through the media inspector

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::ProbeError;
use crate::domain::model::AudioPresence;
use crate::ports::MediaToolPort;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    duration: Option<Value>,
    bit_rate: Option<Value>,
}

/// ffprobe reports most numbers as strings; accept either form
fn numeric(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Decide whether probe JSON describes a usable audio stream
pub fn classify_probe_output(json: &str) -> Result<AudioPresence, ProbeError> {
    let output: ProbeOutput =
        serde_json::from_str(json).map_err(|e| ProbeError::Malformed(e.to_string()))?;

    let present = output.streams.first().is_some_and(|stream| {
        stream.codec_type.as_deref() == Some("audio")
            && (numeric(stream.duration.as_ref()) > 0.0 || numeric(stream.bit_rate.as_ref()) > 0.0)
    });

    Ok(if present {
        AudioPresence::Present
    } else {
        AudioPresence::Absent
    })
}

/// Audio prober
pub struct AudioProber {
    tool: Arc<dyn MediaToolPort>,
}

impl AudioProber {
    pub fn new(tool: Arc<dyn MediaToolPort>) -> Self {
        Self { tool }
    }

    /// Inspector arguments for the first audio stream of `path`
    pub fn probe_args(path: &Path) -> Vec<String> {
        [
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=codec_type,duration,bit_rate",
            "-of",
            "json",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(path.to_string_lossy().into_owned()))
        .collect()
    }

    /// Inspect `path` for a non-empty audio stream
    pub async fn has_audio(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<AudioPresence, ProbeError> {
        let output = self.tool.inspect(&Self::probe_args(path), cancel).await?;
        classify_probe_output(&output.stdout)
    }
}
