use super::canvas::AVG_GLYPH_WIDTH;

/// Characters per line for a box of `width` with `padding` on both sides.
pub fn char_budget(width: f32, padding: f32, font_size: f32) -> usize {
    let usable = width - 2.0 * padding;
    if usable <= 0.0 || font_size <= 0.0 {
        return 1;
    }
    ((usable / (font_size * AVG_GLYPH_WIDTH)).floor() as usize).max(1)
}

/// Greedy word wrap to at most `max_chars` characters per line.
///
/// Text that already fits on one line comes back unchanged. Words longer than
/// the budget are split. Blank text yields no lines.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.trim().is_empty() {
        return Vec::new();
    }
    if !text.contains('\n') && text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_len = 0;

        for word in paragraph.split_whitespace() {
            for piece in split_long(word, max_chars) {
                let piece_len = piece.chars().count();
                if line_len > 0 && line_len + 1 + piece_len > max_chars {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.push_str(piece);
                line_len += piece_len;
            }
        }

        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

fn split_long(word: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = word;
    while rest.chars().count() > max_chars {
        let cut = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(i, _)| i);
        let (head, tail) = rest.split_at(cut);
        pieces.push(head);
        rest = tail;
    }
    pieces.push(rest);
    pieces
}
