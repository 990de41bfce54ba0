//! Static glyph-width tables for the built-in PDF fonts, used to word-wrap
//! text before it is painted.
//!
//! Widths are in em units (fraction of the font size), covering ASCII
//! 0x20..=0x7E. Index = (char as usize) - 32. Anything outside that range
//! falls back to `average_char_width`.

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
}

pub struct FontMetricTable {
    widths: [f32; 95],
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of `s` in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of `s` in millimetres at `size_pt`.
    pub fn measure_mm(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * size_pt / PT_PER_MM
    }

    /// Greedy word-wrap of `text` into lines no wider than `max_width_mm`.
    ///
    /// A single word wider than the line is kept whole on its own line.
    /// Empty or whitespace-only input yields no lines.
    pub fn wrap(&self, text: &str, size_pt: f32, max_width_mm: f32) -> Vec<String> {
        let max_em = max_width_mm * PT_PER_MM / size_pt;
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in text.split_whitespace() {
            let word_w = self.measure_str(word);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + self.space_width + word_w > max_em {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += self.space_width + word_w;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// Helvetica.
static HELVETICA: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.28, 0.28, 0.36, 0.56, 0.56, 0.89, 0.67, 0.19, 0.33, 0.33, 0.39, 0.58, 0.28, 0.33, 0.28, 0.28,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.58, 0.58, 0.58, 0.56, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.67, 0.72, 0.72, 0.67, 0.61, 0.78, 0.72, 0.28, 0.50, 0.67, 0.56, 0.83,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.72, 0.78, 0.67, 0.78, 0.72, 0.67, 0.61, 0.72, 0.67, 0.94, 0.67, 0.67, 0.61,
        // [     \     ]     ^     _     `
        0.28, 0.28, 0.28, 0.47, 0.56, 0.33,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.28, 0.56, 0.56, 0.22, 0.22, 0.50, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.50, 0.28, 0.56, 0.50, 0.72, 0.50, 0.50, 0.50,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.58,
    ],
    average_char_width: 0.55,
    space_width: 0.28,
};

/// Helvetica-Bold.
static HELVETICA_BOLD: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.28, 0.33, 0.47, 0.56, 0.56, 0.89, 0.72, 0.24, 0.33, 0.33, 0.39, 0.58, 0.28, 0.33, 0.28, 0.28,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.33, 0.33, 0.58, 0.58, 0.58, 0.61, 0.98,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.72, 0.72, 0.72, 0.72, 0.67, 0.61, 0.78, 0.72, 0.28, 0.56, 0.72, 0.61, 0.83,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.72, 0.78, 0.67, 0.78, 0.72, 0.67, 0.61, 0.72, 0.67, 0.94, 0.67, 0.67, 0.61,
        // [     \     ]     ^     _     `
        0.33, 0.28, 0.33, 0.58, 0.56, 0.33,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.61, 0.56, 0.61, 0.56, 0.33, 0.61, 0.61, 0.28, 0.28, 0.56, 0.28, 0.89,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.61, 0.61, 0.61, 0.61, 0.39, 0.56, 0.33, 0.61, 0.56, 0.78, 0.56, 0.56, 0.50,
        // {     |     }     ~
        0.39, 0.28, 0.39, 0.58,
    ],
    average_char_width: 0.59,
    space_width: 0.28,
};

/// Returns the metric table for a face. Oblique shares the upright widths.
pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Regular | FontFace::Oblique => &HELVETICA,
        FontFace::Bold => &HELVETICA_BOLD,
    }
}
