#![forbid(unsafe_code)]

//! Text fitting.

use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;

use crate::canvas::Canvas;

/// Ellipsis appended to truncated names.
pub const ELLIPSIS: &str = "…";

/// Truncate `text` at the end, on grapheme boundaries, so that it plus an
/// ellipsis fits in `max_width` pixels. Text that already fits is borrowed.
///
/// Returns an empty string when not even the ellipsis fits.
pub fn fit_text<'a>(canvas: &dyn Canvas, text: &'a str, max_width: f32) -> Cow<'a, str> {
    if canvas.measure_text(text) <= max_width {
        return Cow::Borrowed(text);
    }
    let budget = max_width - canvas.measure_text(ELLIPSIS);
    if budget < 0.0 {
        return Cow::Borrowed("");
    }

    let mut used = 0.0;
    let mut end = 0;
    for (idx, g) in text.grapheme_indices(true) {
        let w = canvas.measure_text(g);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + g.len();
    }
    let mut out = String::with_capacity(end + ELLIPSIS.len());
    out.push_str(&text[..end]);
    out.push_str(ELLIPSIS);
    Cow::Owned(out)
}
