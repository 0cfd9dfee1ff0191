//! Unicode and ASCII glyph sets for lane output.

use crate::config::GlyphMode;

#[derive(Debug, Clone, Copy)]
pub struct LaneGlyphs {
    pub rule: char,
    pub divider: char,
    pub node: char,
    pub arrow: &'static str,
    pub branch_arrow: &'static str,
    pub ellipsis: &'static str,
}

impl LaneGlyphs {
    pub const UNICODE: Self = Self {
        rule: '─',
        divider: '│',
        node: '●',
        arrow: "→",
        branch_arrow: "⇢",
        ellipsis: "…",
    };

    pub const ASCII: Self = Self {
        rule: '-',
        divider: '|',
        node: 'o',
        arrow: "->",
        branch_arrow: "~>",
        ellipsis: "...",
    };

    #[must_use]
    pub const fn for_mode(mode: GlyphMode) -> Self {
        match mode {
            GlyphMode::Unicode => Self::UNICODE,
            GlyphMode::Ascii => Self::ASCII,
        }
    }
}
