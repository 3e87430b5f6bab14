//! ASCII table layout: per-column width balancing from cell content and
//! optional explicit percentage hints, then bordered grid rendering.

use crate::diag::Diagnostics;
use crate::error::Error;
use crate::text::wrap::{TextWrapper, WrapOpts, center_str};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableStyle {
    None,
    Headers,
    Full,
    All,
}

impl TableStyle {
    pub(crate) fn from_attr(attr: Option<&str>) -> Self {
        match attr {
            Some("none") => TableStyle::None,
            Some("headers") => TableStyle::Headers,
            Some("all") => TableStyle::All,
            _ => TableStyle::Full,
        }
    }

    fn borderless(self) -> bool {
        matches!(self, TableStyle::None | TableStyle::Headers)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellAlign {
    Left,
    Center,
    Right,
}

impl CellAlign {
    pub(crate) fn from_attr(attr: Option<&str>) -> Self {
        match attr {
            Some("center") => CellAlign::Center,
            Some("right") => CellAlign::Right,
            _ => CellAlign::Left,
        }
    }
}

/// A table ready for layout: first matrix row is the header row.
pub struct TableData {
    pub matrix: Vec<Vec<String>>,
    pub aligns: Vec<CellAlign>,
    /// Explicit column width hints as fractions (from 0-99 percent attrs).
    pub width_hints: Vec<Option<f64>>,
    pub style: TableStyle,
}

/// Compute final column widths. When the natural (longest-line) widths fit,
/// they are used as-is; otherwise weights are derived from explicit hints or
/// content proportions and the widths are made to sum exactly to
/// `max_width`, each at least 1.
pub(crate) fn layout_columns(
    longest_lines: &[usize],
    longest_words: &[usize],
    width_hints: &[Option<f64>],
    max_width: usize,
    diag: &Diagnostics,
) -> Vec<usize> {
    let num_columns = longest_lines.len();
    let natural: usize = longest_lines.iter().sum();
    let mut widths: Vec<usize> = if natural > max_width {
        let mut weights: Vec<f64> = width_hints
            .iter()
            .map(|h| h.unwrap_or(0.0))
            .collect();
        let hinted_count = width_hints.iter().filter(|h| h.is_some()).count();
        if hinted_count > 0 && hinted_count < num_columns {
            // explicit weights where given, remaining share split equally
            let hinted_sum: f64 = weights.iter().sum();
            let share = ((1.0 - hinted_sum) / (num_columns - hinted_count) as f64).max(0.0);
            for (i, hint) in width_hints.iter().enumerate() {
                if hint.is_none() {
                    weights[i] = share;
                }
            }
        } else if hinted_count == 0 {
            // content cannot shrink below its longest word
            let lwtot: usize = longest_words.iter().sum();
            if lwtot > max_width {
                for (i, &lw) in longest_words.iter().enumerate() {
                    weights[i] = lw as f64 / lwtot as f64;
                }
            } else {
                let lltot: usize = longest_lines.iter().sum();
                for (i, &lw) in longest_words.iter().enumerate() {
                    weights[i] = lw as f64 / max_width as f64;
                }
                let remainder = 1.0 - weights.iter().sum::<f64>();
                for (i, &ll) in longest_lines.iter().enumerate() {
                    weights[i] += remainder * ll as f64 / lltot as f64;
                }
            }
        }

        let mut widths: Vec<usize> = weights
            .iter()
            .map(|w| (w * max_width as f64) as usize)
            .collect();
        // floor rounding leaves a shortfall; hand the spare columns out,
        // odd (width - longest word) parity first, narrowest otherwise
        while widths.iter().sum::<usize>() < max_width {
            let odd = (0..num_columns).find(|&i| {
                (widths[i] as i64 - longest_words[i] as i64).rem_euclid(2) == 1
            });
            match odd {
                Some(i) => widths[i] += 1,
                None => {
                    let min = (0..num_columns)
                        .min_by_key(|&i| widths[i])
                        .expect("at least one column");
                    widths[min] += 1;
                }
            }
        }
        widths
    } else {
        longest_lines.to_vec()
    };

    for w in widths.iter_mut() {
        if *w < 1 {
            *w = 1;
            diag.warn("Table column width was forced to 1 from 0, it may exceed the page width.");
        }
    }
    widths
}

/// Lay out and render a table to unindented output lines.
pub(crate) fn render_table(
    data: &TableData,
    page_width: usize,
    compact: bool,
    diag: &Diagnostics,
) -> Result<Vec<String>, Error> {
    let num_columns = data.aligns.len();
    if num_columns == 0 {
        return Err(Error::Layout(
            "table has no columns (no ttcol elements) defined".into(),
        ));
    }

    let mut matrix = data.matrix.clone();
    if !compact && matrix.len() > 1 {
        // separator row between header and body
        matrix.insert(1, vec![String::new(); num_columns]);
    }

    // usable width per style: borderless styles reclaim border characters
    let table_max_chars = match data.style {
        TableStyle::None => page_width.saturating_sub(3),
        TableStyle::Headers => page_width.saturating_sub(3 + num_columns - 1),
        TableStyle::Full | TableStyle::All => {
            page_width.saturating_sub(3 + 3 * num_columns + 1)
        }
    };

    let mut longest_lines = vec![0usize; num_columns];
    let mut longest_words = vec![0usize; num_columns];
    for row in &matrix {
        for (col, cell) in row.iter().enumerate().take(num_columns) {
            let len = cell.chars().count();
            if len > longest_lines[col] {
                longest_lines[col] = len;
            }
            if let Some(word) = cell.split_whitespace().max_by_key(|w| w.chars().count()) {
                let wlen = word.chars().count();
                if wlen > longest_words[col] {
                    longest_words[col] = wlen;
                }
            }
        }
    }

    let column_widths = layout_columns(
        &longest_lines,
        &longest_words,
        &data.width_hints,
        table_max_chars,
        diag,
    );

    // re-wrap every cell against its final column width
    let cell_lines: Vec<Vec<Vec<String>>> = matrix
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .take(num_columns)
                .map(|(col, cell)| {
                    let wrapper = TextWrapper::new(column_widths[col]);
                    let opts = WrapOpts {
                        fix_doublespace: false,
                        fix_sentence_endings: false,
                        ..WrapOpts::default()
                    };
                    let lines = wrapper.wrap(cell, &opts);
                    if lines.is_empty() {
                        vec![String::new()]
                    } else {
                        lines
                    }
                })
                .collect()
        })
        .collect();

    let mut output: Vec<String> = Vec::new();
    let borderstring: String = if data.style == TableStyle::Headers {
        column_widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        let mut s = String::from("+");
        for w in &column_widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s
    };
    if !data.style.borderless() {
        output.push(borderstring.clone());
    }

    let row_count = cell_lines.len();
    for (i, row) in cell_lines.iter().enumerate() {
        if i == 0 && row.iter().all(|cell| cell.len() == 1 && cell[0].is_empty()) {
            continue;
        }
        let height = row.iter().map(|cell| cell.len()).max().unwrap_or(1);
        for line_no in 0..height {
            let mut line = if data.style.borderless() {
                String::new()
            } else {
                String::from("|")
            };
            for (col, cell) in row.iter().enumerate().take(num_columns) {
                let width = column_widths[col];
                if let Some(text) = cell.get(line_no) {
                    let aligned = match data.aligns[col] {
                        CellAlign::Center => center_str(text, width),
                        CellAlign::Right => format!("{text:>width$}"),
                        CellAlign::Left => format!("{text:<width$}"),
                    };
                    if data.style.borderless() {
                        line.push_str(&aligned);
                        line.push(' ');
                    } else {
                        line.push(' ');
                        line.push_str(&aligned);
                        line.push_str(" |");
                    }
                } else if data.style.borderless() {
                    line.push_str(&" ".repeat(width + 1));
                } else {
                    line.push_str(&" ".repeat(width + 2));
                    line.push('|');
                }
            }
            output.push(line);
        }
        if i == 0 && matches!(data.style, TableStyle::Headers | TableStyle::Full) {
            output.push(borderstring.clone());
        }
        if i == row_count - 1 && data.style == TableStyle::Full {
            output.push(borderstring.clone());
        }
        if data.style == TableStyle::All {
            output.push(borderstring.clone());
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_widths_when_content_fits() {
        let diag = Diagnostics::new();
        let widths = layout_columns(&[10, 20], &[5, 8], &[None, None], 60, &diag);
        assert_eq!(widths, vec![10, 20]);
    }

    #[test]
    fn compression_conserves_total_width() {
        let diag = Diagnostics::new();
        let widths = layout_columns(&[50, 40], &[8, 6], &[None, None], 60, &diag);
        assert_eq!(widths.iter().sum::<usize>(), 60);
        assert!(widths[0] > widths[1], "{widths:?}");
        assert!(widths[0] >= 8 && widths[1] >= 6);
    }

    #[test]
    fn explicit_hints_take_precedence() {
        let diag = Diagnostics::new();
        let widths = layout_columns(&[50, 50], &[4, 4], &[Some(0.75), None], 40, &diag);
        assert_eq!(widths.iter().sum::<usize>(), 40);
        assert!(widths[0] >= 29, "{widths:?}");
    }

    #[test]
    fn zero_width_clamped_with_diagnostic() {
        let diag = Diagnostics::new();
        let widths = layout_columns(&[80, 1], &[40, 1], &[Some(0.99), Some(0.0)], 40, &diag);
        assert!(widths.iter().all(|&w| w >= 1));
        assert!(diag.warning_count() >= 1);
    }

    #[test]
    fn longest_words_dominate_when_over_budget() {
        let diag = Diagnostics::new();
        let widths = layout_columns(&[30, 30], &[20, 10], &[None, None], 24, &diag);
        assert_eq!(widths.iter().sum::<usize>(), 24);
        assert_eq!(widths[0], 16);
        assert_eq!(widths[1], 8);
    }
}
