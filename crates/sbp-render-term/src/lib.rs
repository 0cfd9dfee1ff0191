#![forbid(unsafe_code)]

//! Plain-text lane view of a parsed blueprint step.
//!
//! Each lane is one row; each segment is one column with a marker on the
//! lane of its role. Segment labels and edges are listed underneath.

mod config;
mod glyphs;

pub use config::{GlyphMode, LaneRenderConfig};
pub use glyphs::LaneGlyphs;

use sbp_core::{BlueprintStep, EdgeKind, Role};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

#[must_use]
pub fn render_lanes(step: &BlueprintStep) -> String {
    render_lanes_with_config(step, &LaneRenderConfig::default())
}

#[must_use]
pub fn render_lanes_with_config(step: &BlueprintStep, config: &LaneRenderConfig) -> String {
    let glyphs = LaneGlyphs::for_mode(config.glyph_mode);
    let spacing = config.effective_column_width();
    let label_width = Role::ALL
        .iter()
        .map(|role| role.lane_label().width())
        .max()
        .unwrap_or_default();

    let mut lines = vec![format!("Step: {}", step.step)];
    if config.show_recap {
        lines.push(step.recap());
    }
    lines.push(String::new());

    if !step.is_empty() {
        let mut ruler = " ".repeat(label_width + 3);
        for index in 0..step.len() {
            ruler.push(index_digit(index));
            if index + 1 < step.len() {
                ruler.push_str(&" ".repeat(spacing - 1));
            }
        }
        lines.push(ruler);
    }

    for role in Role::ALL {
        let mut row = format!("{:<label_width$} {}", role.lane_label(), glyphs.divider);
        if !step.is_empty() {
            row.push(' ');
        }
        for (index, segment) in step.segments.iter().enumerate() {
            row.push(if segment.role == Some(role) {
                glyphs.node
            } else {
                glyphs.rule
            });
            if index + 1 < step.len() {
                row.extend(std::iter::repeat_n(glyphs.rule, spacing - 1));
            }
        }
        lines.push(row);
    }

    if config.show_actions && !step.is_empty() {
        lines.push(String::new());
        for (index, segment) in step.segments.iter().enumerate() {
            let code = segment.role.map_or('?', Role::code);
            let action = truncate_label(&segment.action, config.max_label_chars, glyphs.ellipsis);
            lines.push(format!("  [{index}] {code} {action}").trim_end().to_string());
        }
    }

    if config.show_edges && !step.edges.is_empty() {
        lines.push(String::new());
        for edge in &step.edges {
            lines.push(match edge.kind {
                EdgeKind::Linear => format!("  {} {} {}", edge.from, glyphs.arrow, edge.to),
                EdgeKind::Branch => format!(
                    "  {} {} {} (branch)",
                    edge.from, glyphs.branch_arrow, edge.to
                ),
            });
        }
    }

    lines.join("\n")
}

/// Shorten `text` to at most `max_width` display columns, by grapheme.
///
/// When even the ellipsis does not fit, the ellipsis itself is cut.
#[must_use]
pub fn truncate_label(text: &str, max_width: usize, ellipsis: &str) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let ellipsis_width = ellipsis.width();
    if max_width < ellipsis_width {
        return take_width(ellipsis, max_width);
    }
    let mut out = take_width(text, max_width - ellipsis_width);
    out.push_str(ellipsis);
    out
}

/// Leading graphemes of `text` that fit in `budget` display columns.
fn take_width(text: &str, budget: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let width = grapheme.width();
        if used + width > budget {
            break;
        }
        out.push_str(grapheme);
        used += width;
    }
    out
}

fn index_digit(index: usize) -> char {
    char::from(b'0' + (index % 10) as u8)
}
