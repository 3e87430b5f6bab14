//! Page assembly for the paginated strategy: walk the final buffer, assign
//! lines to 51-line pages, keep recorded blocks unsplit, insert footers,
//! form feeds and headers, and splice the real TOC and keyword index into
//! the space reserved for them during the walk.

use crate::text::wrap::justify_inline;
use crate::text::{BreakKind, MAX_PAGE_LINES, TextWriter};

struct Pager {
    output: Vec<String>,
    page_length: usize,
    page_num: u32,
}

impl Pager {
    fn emit(&mut self, line: &str) {
        // blank lines at the top of a page are dropped
        if self.page_length == 1 && line.trim().is_empty() {
            return;
        }
        self.output.push(line.to_string());
        self.page_length += 1;
    }

    fn emit_blanks(&mut self, count: usize) {
        for _ in 0..count {
            self.emit("");
        }
    }

    fn page_break(&mut self, w: &TextWriter, final_page: bool) {
        self.output.push(String::new());
        self.output.push(String::new());
        self.output.push(String::new());
        self.output.push(justify_inline(
            &w.left_footer,
            &w.center_footer,
            &format!("[Page {}]", self.page_num),
            w.width,
            w.diag,
        ));
        if !final_page {
            self.output.push("\u{c}".to_string());
            self.output.push(justify_inline(
                &w.left_header,
                &w.center_header,
                &w.right_header,
                w.width,
                w.diag,
            ));
            self.output.push(String::new());
            self.output.push(String::new());
        }
        self.page_length = 1;
        self.page_num += 1;
    }

    fn remaining(&self) -> usize {
        MAX_PAGE_LINES.saturating_sub(self.page_length + 2)
    }
}

pub(crate) fn paginate(w: &mut TextWriter) -> Vec<String> {
    let buf = w.ctx.buf.clone();
    let toc_marker = w.ctx.toc_marker;
    let iref_marker = w.ctx.iref_marker;
    let autobreaks = w.ctx.pis.autobreaks;

    let mut p = Pager {
        output: Vec::with_capacity(buf.len() + buf.len() / 8),
        page_length: 0,
        page_num: 1,
    };

    // (start, end) spans of the space reserved for the TOC and the index
    let mut toc_pointers: Vec<(usize, usize)> = Vec::new();
    let mut iref_pointers: Vec<(usize, usize)> = Vec::new();

    for (line_num, line) in buf.iter().enumerate() {
        if line_num == toc_marker && toc_marker > 0 {
            // don't start the TOC too close to the end of a page
            if p.page_length + 10 >= MAX_PAGE_LINES {
                p.emit_blanks(p.remaining());
                p.page_break(w, false);
            }
            let mut prev_start = p.output.len();
            for l in w.write_toc(true) {
                if p.page_length + 2 >= MAX_PAGE_LINES {
                    toc_pointers.push((prev_start, p.output.len()));
                    p.page_break(w, false);
                    prev_start = p.output.len();
                }
                p.emit(&l);
            }
            toc_pointers.push((prev_start, p.output.len()));
        }

        if line_num == iref_marker && iref_marker > 0 {
            w.set_page_by_auto_anchor("rfc.index", p.page_num);
            let mut prev_start = p.output.len();
            for _ in 0..w.write_iref_index().len() {
                if p.page_length + 2 >= MAX_PAGE_LINES {
                    iref_pointers.push((prev_start, p.output.len()));
                    p.page_break(w, false);
                    prev_start = p.output.len();
                }
                p.emit("");
            }
            iref_pointers.push((prev_start, p.output.len()));
        }

        if let Some(&(needed, kind)) = w.ctx.break_hints.get(&line_num) {
            let mut available = MAX_PAGE_LINES as i64 - (p.page_length as i64 + 2);
            let mut needed = needed as i64;
            if line.trim().is_empty() {
                // the block's leading blank line doesn't count against the
                // orphan/widow decision
                available -= 1;
                needed -= 1;
            }
            let over = needed > available && needed < MAX_PAGE_LINES as i64 - 2;
            let do_break = match kind {
                BreakKind::Raw => over,
                BreakKind::Text => {
                    autobreaks && over && (needed - available < 2 || available < 2)
                }
            };
            if do_break {
                p.emit_blanks(p.remaining());
            }
        }

        if p.page_length + 2 >= MAX_PAGE_LINES {
            p.page_break(w, false);
        }
        p.emit(line);

        if let Some(anchor) = w.ctx.heading_marks.get(&line_num).cloned() {
            let page = p.page_num;
            w.set_page_by_auto_anchor(&anchor, page);
        }
        if let Some(marks) = w.ctx.iref_marks.get(&line_num).cloned() {
            let page = p.page_num;
            for (item, subitem) in marks {
                let entry = w.iref_index.entry(item).or_default();
                match subitem {
                    Some(sub) => entry.subitems.entry(sub).or_default().push(page),
                    None => entry.pages.push(page),
                }
            }
        }
    }

    p.emit_blanks(p.remaining());
    p.page_break(w, true);

    // overwrite the reserved spans with the resolved sections
    if !toc_pointers.is_empty() {
        let tocbuf = w.write_toc(true);
        let (mut ptr, mut end) = toc_pointers.remove(0);
        for line in tocbuf {
            if ptr >= p.output.len() {
                break;
            }
            // page-break furniture inside the reserved span stays put
            if !p.output[ptr].is_empty() && line.is_empty() {
                continue;
            }
            p.output[ptr] = line;
            ptr += 1;
            if ptr >= end {
                if toc_pointers.is_empty() {
                    break;
                }
                (ptr, end) = toc_pointers.remove(0);
            }
        }
    }
    if !iref_pointers.is_empty() {
        let irefbuf = w.write_iref_index();
        let (mut ptr, mut end) = iref_pointers.remove(0);
        for line in irefbuf {
            if ptr >= p.output.len() {
                break;
            }
            p.output[ptr] = line;
            ptr += 1;
            if ptr >= end {
                if iref_pointers.is_empty() {
                    break;
                }
                (ptr, end) = iref_pointers.remove(0);
            }
        }
    }

    p.output
}
