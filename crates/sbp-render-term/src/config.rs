//! Lane renderer configuration types.

/// Glyph family used for lane rules, markers and arrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphMode {
    #[default]
    Unicode,
    Ascii,
}

/// Configuration for terminal lane rendering.
#[derive(Debug, Clone)]
pub struct LaneRenderConfig {
    /// Unicode box-drawing vs ASCII fallback.
    pub glyph_mode: GlyphMode,
    /// Cells between two adjacent segment columns (minimum 1).
    pub column_width: usize,
    /// Display columns an action label may use before truncation.
    pub max_label_chars: usize,
    /// Print the inline-style recap under the title.
    pub show_recap: bool,
    /// List each segment with its index below the lanes.
    pub show_actions: bool,
    /// List edges below the lanes.
    pub show_edges: bool,
}

impl Default for LaneRenderConfig {
    fn default() -> Self {
        Self {
            glyph_mode: GlyphMode::Unicode,
            column_width: 4,
            max_label_chars: 24,
            show_recap: true,
            show_actions: true,
            show_edges: true,
        }
    }
}

impl LaneRenderConfig {
    /// Create a compact configuration for narrow terminals.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            column_width: 2,
            max_label_chars: 12,
            show_recap: false,
            ..Self::default()
        }
    }

    /// Create a rich configuration for wide terminals.
    #[must_use]
    pub fn rich() -> Self {
        Self {
            column_width: 6,
            max_label_chars: 48,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_glyph_mode(mut self, glyph_mode: GlyphMode) -> Self {
        self.glyph_mode = glyph_mode;
        self
    }

    /// Column spacing with the lower bound applied.
    #[must_use]
    pub fn effective_column_width(&self) -> usize {
        self.column_width.max(1)
    }
}
