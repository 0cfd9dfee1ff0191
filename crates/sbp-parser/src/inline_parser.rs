use sbp_core::{BlueprintError, BlueprintStep, Edge};

use crate::normalize::{compatibility_normalize, role_from_prefix, unify_inline_separators};
use crate::step_builder::StepBuilder;

/// Separator found between two inline segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Separator {
    /// `/`: continue to the next segment.
    Slash,
    /// `//`: continue, and also branch to the segment after next.
    DoubleSlash,
    /// `|`: adjacent, no flow link.
    Pipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Accumulating,
    /// One `/` seen; the next character decides between `/` and `//`.
    AfterSlash,
    /// `//` seen; closed as a double slash on the next character or at the end.
    AfterDoubleSlash,
}

#[derive(Debug, Default)]
struct Segments {
    texts: Vec<String>,
    separators: Vec<Separator>,
    buf: String,
}

impl Segments {
    fn close(&mut self, separator: Separator) -> Result<(), BlueprintError> {
        let text = self.buf.trim();
        if text.is_empty() {
            return Err(BlueprintError::EmptySegment {
                index: self.texts.len(),
            });
        }
        self.texts.push(text.to_string());
        self.separators.push(separator);
        self.buf.clear();
        Ok(())
    }

    fn finish(mut self) -> Result<(Vec<String>, Vec<Separator>), BlueprintError> {
        let tail = self.buf.trim();
        if tail.is_empty() {
            return Err(BlueprintError::MissingTrailingSegment);
        }
        self.texts.push(tail.to_string());
        Ok((self.texts, self.separators))
    }
}

/// Parse a `Step:C Action/F Action//B Action|P Action` line.
pub fn parse_inline(line: &str) -> Result<BlueprintStep, BlueprintError> {
    let normalized = compatibility_normalize(line);
    let (step, body) = split_step(&normalized)?;
    let body = unify_inline_separators(body);
    let (texts, separators) = scan_segments(&body)?;

    let mut builder = StepBuilder::new(step);
    for text in &texts {
        let mut chars = text.chars();
        let role = chars
            .next()
            .and_then(role_from_prefix)
            .ok_or_else(|| BlueprintError::InvalidRolePrefix {
                segment: text.clone(),
            })?;
        builder.push_segment(role, chars.as_str());
    }

    let count = builder.segment_count();
    for (index, separator) in separators.into_iter().enumerate() {
        match separator {
            Separator::Slash => builder.push_edge(Edge::linear(index, index + 1)),
            Separator::Pipe => {}
            Separator::DoubleSlash => {
                builder.push_edge(Edge::linear(index, index + 1));
                if index + 2 >= count {
                    return Err(BlueprintError::MissingBranchTarget { index });
                }
                builder.push_edge(Edge::branch(index, index + 2));
            }
        }
    }

    Ok(builder.finish())
}

/// Split on the first colon, or else on the first whitespace run.
fn split_step(line: &str) -> Result<(&str, &str), BlueprintError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(BlueprintError::EmptyLine);
    }
    if let Some((step, body)) = trimmed.split_once(':') {
        return Ok((step.trim(), body.trim()));
    }
    trimmed
        .split_once(char::is_whitespace)
        .map(|(step, body)| (step, body.trim_start()))
        .ok_or(BlueprintError::MissingStep)
}

pub(crate) fn scan_segments(body: &str) -> Result<(Vec<String>, Vec<Separator>), BlueprintError> {
    let mut segments = Segments::default();
    let mut state = ScanState::Accumulating;

    for ch in body.chars() {
        match state {
            ScanState::AfterSlash if ch == '/' => {
                state = ScanState::AfterDoubleSlash;
                continue;
            }
            ScanState::AfterSlash => segments.close(Separator::Slash)?,
            ScanState::AfterDoubleSlash => segments.close(Separator::DoubleSlash)?,
            ScanState::Accumulating => {}
        }
        state = ScanState::Accumulating;
        match ch {
            '/' => state = ScanState::AfterSlash,
            '|' => segments.close(Separator::Pipe)?,
            other => segments.buf.push(other),
        }
    }
    match state {
        ScanState::AfterSlash => segments.close(Separator::Slash)?,
        ScanState::AfterDoubleSlash => segments.close(Separator::DoubleSlash)?,
        ScanState::Accumulating => {}
    }

    segments.finish()
}
