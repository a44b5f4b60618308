//! Page geometry and the text metrics heuristic used in place of real font
//! metrics.

/// ISO A4 in points.
pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;
pub const MARGIN: f64 = 50.0;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

/// Advance of every Courier glyph as a fraction of the font size.
pub const MONOSPACE_FACTOR: f64 = 0.6;

pub const LOGO_SCALE: f64 = 0.75;
pub const LOGO_MIN_WIDTH: f64 = 90.0;
pub const LOGO_MAX_WIDTH: f64 = 220.0;
pub const LOGO_MAX_HEIGHT: f64 = 120.0;

/// Approximate advance of `c` as a fraction of the font size.
pub fn char_width_factor(c: char) -> f64 {
    match c {
        ' ' => 0.32,
        'i' | 'l' | '1' | '.' | ',' | ':' | '\'' | '`' => 0.36,
        'm' | 'w' | 'M' | 'W' | '@' | '#' | '%' | '&' => 0.72,
        '0'..='9' => 0.72,
        c if c.is_uppercase() => 0.64,
        _ => 0.55,
    }
}

pub fn estimate_text_width(text: &str, size: f64) -> f64 {
    text.chars().map(char_width_factor).sum::<f64>() * size
}

pub fn monospace_char_width(size: f64) -> f64 {
    size * MONOSPACE_FACTOR
}

/// Greedy word wrap against the width heuristic. Explicit newlines start a
/// new line; words wider than a line are split character by character.
pub fn wrap_text(text: &str, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;
        let space = char_width_factor(' ') * size;

        for word in paragraph.split_whitespace() {
            let word_width = estimate_text_width(word, size);
            let needed = if current.is_empty() {
                word_width
            } else {
                current_width + space + word_width
            };

            if needed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                    current_width += space;
                }
                current.push_str(word);
                current_width += word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            for c in word.chars() {
                let char_width = char_width_factor(c) * size;
                if !current.is_empty() && current_width + char_width > max_width {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(c);
                current_width += char_width;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Splits `budget` character cells across columns in proportion to
/// `weights` using largest-remainder rounding, so the parts always sum to
/// `budget`. Non-positive weights count as equal shares.
pub fn distribute_columns(budget: usize, weights: &[f64]) -> Vec<usize> {
    if weights.is_empty() {
        return Vec::new();
    }

    let usable: Vec<f64> = weights
        .iter()
        .map(|weight| if weight.is_finite() && *weight > 0.0 { *weight } else { 0.0 })
        .collect();
    let total: f64 = usable.iter().sum();
    let shares: Vec<f64> = if total > 0.0 {
        usable.iter().map(|weight| weight / total * budget as f64).collect()
    } else {
        vec![budget as f64 / weights.len() as f64; weights.len()]
    };

    let mut widths: Vec<usize> = shares.iter().map(|share| share.floor() as usize).collect();
    let assigned: usize = widths.iter().sum();

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|a, b| {
        let rem_a = shares[*a] - shares[*a].floor();
        let rem_b = shares[*b] - shares[*b].floor();
        rem_b.total_cmp(&rem_a).then(a.cmp(b))
    });
    for index in order.into_iter().take(budget.saturating_sub(assigned)) {
        widths[index] += 1;
    }

    widths
}

/// Display size in points of a header logo with the given pixel size.
///
/// The width stays within the logo bounds and the height under its cap,
/// except that a very tall logo keeps the minimum width and may exceed the
/// height cap.
pub fn logo_display_size(pixel_width: u32, pixel_height: u32) -> Option<(f64, f64)> {
    if pixel_width == 0 || pixel_height == 0 {
        return None;
    }

    let aspect = pixel_height as f64 / pixel_width as f64;
    let mut width = pixel_width as f64 * LOGO_SCALE;

    if width > LOGO_MAX_WIDTH {
        width = LOGO_MAX_WIDTH;
    }
    if width < LOGO_MIN_WIDTH {
        width = LOGO_MIN_WIDTH;
    }
    if width * aspect > LOGO_MAX_HEIGHT {
        width = (LOGO_MAX_HEIGHT / aspect).max(LOGO_MIN_WIDTH);
    }

    Some((width, width * aspect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_classes_have_distinct_widths() {
        assert_eq!(char_width_factor(' '), 0.32);
        assert_eq!(char_width_factor('i'), 0.36);
        assert_eq!(char_width_factor('7'), 0.72);
        assert_eq!(char_width_factor('W'), 0.72);
        assert_eq!(char_width_factor('Q'), 0.64);
        assert_eq!(char_width_factor('q'), 0.55);
        assert!((estimate_text_width("Hi 1", 10.0) - (6.4 + 3.6 + 3.2 + 3.6)).abs() < 1e-9);
    }

    #[test]
    fn wrapping_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let lines = wrap_text(text, 10.0, 100.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(estimate_text_width(line, 10.0) <= 100.0, "{line} too wide");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn long_words_are_hard_split() {
        let word = "x".repeat(60);
        let lines = wrap_text(&word, 10.0, 56.0);
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|line| line.chars().count() == 10));
    }

    #[test]
    fn newlines_force_breaks_and_empty_text_has_no_lines() {
        assert_eq!(wrap_text("one\ntwo", 10.0, 500.0), vec!["one", "two"]);
        assert!(wrap_text("", 10.0, 500.0).is_empty());
    }

    #[test]
    fn columns_sum_to_budget() {
        assert_eq!(distribute_columns(10, &[1.0, 1.0, 1.0]), vec![4, 3, 3]);
        assert_eq!(distribute_columns(91, &[3.0, 1.0, 1.0]), vec![55, 18, 18]);
        assert_eq!(distribute_columns(7, &[0.0, -2.0]), vec![4, 3]);
        assert!(distribute_columns(10, &[]).is_empty());
        let widths = distribute_columns(83, &[2.5, 1.0, 1.0, 1.2, 0.8]);
        assert_eq!(widths.iter().sum::<usize>(), 83);
    }

    #[test]
    fn logo_sizes_clamp_to_bounds() {
        assert_eq!(logo_display_size(200, 100), Some((150.0, 75.0)));
        assert_eq!(logo_display_size(800, 200), Some((220.0, 55.0)));
        assert_eq!(logo_display_size(60, 30), Some((90.0, 45.0)));
        assert_eq!(logo_display_size(240, 240), Some((120.0, 120.0)));
        assert_eq!(logo_display_size(100, 400), Some((90.0, 360.0)));
        assert_eq!(logo_display_size(0, 10), None);
    }
}
