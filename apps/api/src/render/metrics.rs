//! Static glyph-width tables for the two standard PDF fonts the renderer uses.
//!
//! Widths are in em units (AFM width / 1000) and cover ASCII 0x20..=0x7E.
//! Index = (char as usize) - 32. Anything else falls back to `average_char_width`.

/// The standard Type1 fonts embedded by name in every generated PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// Resource name used in page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    /// PostScript name of the standard font.
    pub fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(self) -> &'static FontMetricTable {
        match self {
            Font::Helvetica => &HELVETICA_TABLE,
            Font::HelveticaBold => &HELVETICA_BOLD_TABLE,
        }
    }
}

/// Static character-width table for one font.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
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

    /// Width in points at the given font size.
    pub fn width_pt(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * size_pt
    }

    /// Greedy word-wrap into lines no wider than `max_width_em`.
    ///
    /// A single word wider than the line is split at character boundaries.
    /// Whitespace-only input yields no lines.
    pub fn wrap(&self, s: &str, max_width_em: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in s.split_whitespace() {
            let word_w = self.measure_str(word);

            if word_w > max_width_em {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let mut pieces = self.split_long_word(word, max_width_em);
                // The tail of a split word can share its line with what follows.
                if let Some(last) = pieces.pop() {
                    lines.extend(pieces);
                    current_width = self.measure_str(&last);
                    current = last;
                }
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + self.space_width + word_w > max_width_em {
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

    fn split_long_word(&self, word: &str, max_width_em: f32) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut width = 0.0_f32;
        for c in word.chars() {
            let mut buf = [0u8; 4];
            let cw = self.measure_str(c.encode_utf8(&mut buf));
            if !piece.is_empty() && width + cw > max_width_em {
                pieces.push(std::mem::take(&mut piece));
                width = 0.0;
            }
            piece.push(c);
            width += cw;
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0     1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :     ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A     B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N     O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [     \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a     b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n     o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {     |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0     1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :     ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A     B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N     O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [     \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a     b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n     o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {     |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(Font::Helvetica.metrics().measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = Font::Helvetica.metrics().measure_str("Rust");
        assert!((width - 2.056).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let metrics = Font::Helvetica.metrics();
        assert!((metrics.measure_str("é") - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = "Professional Experience";
        assert!(
            Font::HelveticaBold.metrics().measure_str(text)
                > Font::Helvetica.metrics().measure_str(text)
        );
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let lines = Font::Helvetica.metrics().wrap("Hello world", 40.0);
        assert_eq!(lines, vec!["Hello world"]);
    }

    #[test]
    fn test_wrap_breaks_between_words_and_keeps_all_words() {
        let text = "word ".repeat(40);
        let metrics = Font::Helvetica.metrics();
        let lines = metrics.wrap(&text, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics.measure_str(line) <= 10.0 + 1e-4, "overfull: {line}");
        }
        assert_eq!(lines.join(" ").split(' ').count(), 40);
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let metrics = Font::Helvetica.metrics();
        let lines = metrics.wrap(&"x".repeat(50), 5.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "x".repeat(50));
    }

    #[test]
    fn test_wrap_whitespace_only_is_empty() {
        assert!(Font::Helvetica.metrics().wrap("   \n\t", 10.0).is_empty());
    }

    #[test]
    fn test_resource_names_are_distinct() {
        assert_ne!(
            Font::Helvetica.resource_name(),
            Font::HelveticaBold.resource_name()
        );
    }
}
