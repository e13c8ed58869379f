#![forbid(unsafe_code)]

//! JSONL gesture traces.
//!
//! One JSON object per line, tagged by `record`. The first record is the
//! header; everything after it is replayed in order:
//!
//! ```text
//! {"record":"header","viewport":{"width":390.0,"height":844.0},"anchor":{...},"candidates":[{"id":"1","label":"2-leg parlay"}]}
//! {"record":"input","event":{"kind":"touch","phase":"start","touches":[{"id":0,"x":350.0,"y":800.0}],"ts_ms":0}}
//! {"record":"tick","ts_ms":300}
//! {"record":"input","event":{"kind":"touch","phase":"end","ts_ms":420}}
//! ```
//!
//! Blank lines are skipped.

use std::fs;
use std::path::Path;

use holdpick_composer::Identified;
use holdpick_core::{GestureConfig, InputEvent, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// A candidate offered by the picker in a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceItem {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

impl TraceItem {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl Identified for TraceItem {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Initial state of a replayed session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceHeader {
    #[serde(default)]
    pub viewport: Option<Size>,
    #[serde(default)]
    pub anchor: Option<Rect>,
    /// Recent items, oldest first.
    #[serde(default)]
    pub candidates: Vec<TraceItem>,
    #[serde(default)]
    pub config: GestureConfig,
}

/// One line of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum TraceRecord {
    Header(TraceHeader),
    Input { event: InputEvent },
    /// Host time advanced to `ts_ms`.
    Tick { ts_ms: u64 },
    /// The anchor moved or was unmounted.
    Anchor { rect: Option<Rect> },
    Viewport { size: Option<Size> },
    Draft { text: String },
    Send,
    ClearAttachment,
    Dispose,
}

/// A parsed trace: header plus replay steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub header: TraceHeader,
    pub steps: Vec<TraceRecord>,
}

impl Trace {
    #[must_use]
    pub fn new(header: TraceHeader) -> Self {
        Self {
            header,
            steps: Vec::new(),
        }
    }

    /// Append a step.
    #[must_use]
    pub fn with(mut self, record: TraceRecord) -> Self {
        self.steps.push(record);
        self
    }

    /// Parse JSONL text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut header = None;
        let mut steps = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(raw)
                .map_err(|source| HarnessError::ParseRecord { line, source })?;
            match (record, header.is_some()) {
                (TraceRecord::Header(h), false) => header = Some(h),
                (TraceRecord::Header(_), true) => {
                    return Err(HarnessError::UnexpectedHeader { line });
                }
                (_, false) => return Err(HarnessError::MissingHeader { line: Some(line) }),
                (record, true) => steps.push(record),
            }
        }
        let header = header.ok_or(HarnessError::MissingHeader { line: None })?;
        Ok(Self { header, steps })
    }

    /// Read and parse a trace file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| HarnessError::ReadTrace {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Encode as JSONL, header first.
    pub fn to_jsonl(&self) -> Result<String> {
        let mut out = serde_json::to_string(&TraceRecord::Header(self.header.clone()))?;
        out.push('\n');
        for step in &self.steps {
            out.push_str(&serde_json::to_string(step)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdpick_core::TouchPhase;
    use pretty_assertions::assert_eq;

    const HEADER: &str = r#"{"record":"header","viewport":{"width":390.0,"height":844.0},"candidates":[{"id":"1","label":"a"}]}"#;

    #[test]
    fn parses_header_and_steps() {
        let text = format!(
            "{HEADER}\n\n{}\n{}\n",
            r#"{"record":"tick","ts_ms":300}"#, r#"{"record":"send"}"#
        );
        let trace = Trace::parse(&text).expect("parse");
        assert_eq!(trace.header.viewport, Some(Size::new(390.0, 844.0)));
        assert_eq!(trace.header.anchor, None);
        assert_eq!(trace.header.candidates, vec![TraceItem::new("1", "a")]);
        assert_eq!(trace.header.config, GestureConfig::default());
        assert_eq!(
            trace.steps,
            vec![TraceRecord::Tick { ts_ms: 300 }, TraceRecord::Send]
        );
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let text = r#"{"record":"header","config":{"long_press_ms":500,"picker":{"item_height":48.0}}}"#;
        let trace = Trace::parse(text).expect("parse");
        assert_eq!(trace.header.config.long_press_ms, 500);
        assert_eq!(trace.header.config.picker.item_height, 48.0);
        assert_eq!(trace.header.config.picker.menu_width, 320.0);
    }

    #[test]
    fn header_must_come_first() {
        let err = Trace::parse("\n{\"record\":\"tick\",\"ts_ms\":1}").unwrap_err();
        assert!(matches!(err, HarnessError::MissingHeader { line: Some(2) }));

        let err = Trace::parse(&format!("{HEADER}\n{HEADER}")).unwrap_err();
        assert!(matches!(err, HarnessError::UnexpectedHeader { line: 2 }));

        assert!(matches!(
            Trace::parse(""),
            Err(HarnessError::MissingHeader { line: None })
        ));
    }

    #[test]
    fn bad_line_reports_line_number() {
        let err = Trace::parse(&format!("{HEADER}\n{{\"record\":\"warp\"}}")).unwrap_err();
        assert!(matches!(err, HarnessError::ParseRecord { line: 2, .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn jsonl_round_trip() {
        let trace = Trace::new(TraceHeader::default())
            .with(TraceRecord::Input {
                event: InputEvent::touch(TouchPhase::Start, 1.0, 2.0, 3),
            })
            .with(TraceRecord::Anchor { rect: None })
            .with(TraceRecord::Draft {
                text: "hi".to_owned(),
            });
        let text = trace.to_jsonl().expect("encode");
        assert_eq!(text.lines().count(), 4);
        assert_eq!(Trace::parse(&text).expect("parse"), trace);
    }
}
