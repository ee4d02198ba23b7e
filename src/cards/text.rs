//! Text measurement and word wrapping for the built-in Helvetica faces.

const PT_TO_MM: f32 = 25.4 / 72.0;

// Advance widths of printable ASCII (0x20..=0x7E) in 1/1000 em, Helvetica AFM
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

// Helvetica-Bold AFM, same range
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

// Used for anything outside printable ASCII
const FALLBACK_WIDTH: u16 = 556;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

fn glyph_width(face: Face, c: char) -> u16 {
    let table = match face {
        Face::Regular => &HELVETICA_WIDTHS,
        Face::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    u32::from(c)
        .checked_sub(0x20)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or(FALLBACK_WIDTH)
}

/// Width of `text` in millimetres at `font_size` points.
pub fn text_width(text: &str, face: Face, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(face, c))).sum();
    units as f32 / 1000.0 * font_size * PT_TO_MM
}

/// Greedy word wrap to `max_width` millimetres. Words wider than a line are
/// broken between characters. Always returns at least one line.
pub fn wrap(text: &str, face: Face, font_size: f32, max_width: f32) -> Vec<String> {
    let fits = |s: &str| text_width(s, face, font_size) <= max_width;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for c in word.chars() {
            current.push(c);
            if !fits(&current) && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_known_glyphs() {
        // "A" is 667/1000 em; at 72pt one em is 25.4mm
        let w = text_width("A", Face::Regular, 72.0);
        assert!((w - 0.667 * 25.4).abs() < 1e-3);
        assert!(text_width("Bold", Face::Bold, 10.0) > text_width("Bold", Face::Regular, 10.0));
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap("Take On Me", Face::Regular, 10.0, 40.0), vec!["Take On Me"]);
    }

    #[test]
    fn long_text_wraps_on_words() {
        let text = "I Wanna Dance with Somebody (Who Loves Me)";
        let lines = wrap(text, Face::Regular, 10.0, 35.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width(l, Face::Regular, 10.0) <= 35.0));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn overlong_word_is_split() {
        let lines = wrap("Supercalifragilisticexpialidocious", Face::Bold, 10.0, 20.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "Supercalifragilisticexpialidocious");
    }

    #[test]
    fn empty_text_gives_one_empty_line() {
        assert_eq!(wrap("   ", Face::Regular, 10.0, 20.0), vec![String::new()]);
    }
}
