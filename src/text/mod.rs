//! The text writer: renders a parsed RFC document tree into fixed-width
//! lines, in two passes. The first pass runs purely for its side effects
//! (section/figure/reference index, keyword index); the second pass produces
//! the line buffer, and the table of contents and keyword index are spliced
//! in at the recorded marker positions afterwards.

mod paginate;
pub mod table;
pub mod wrap;

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use roxmltree::{Document, Node, NodeType};

use crate::boilerplate;
use crate::diag::Diagnostics;
use crate::error::Error;
use crate::options::{OutputMode, Pis, RenderOptions};
use crate::xml;

use table::{CellAlign, TableData, TableStyle};
use wrap::{TextWrapper, WrapOpts, WJ};

/// Lines per page body in paginated output.
pub(crate) const MAX_PAGE_LINES: usize = 51;

const REF_INDENT: usize = 11;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn from_attr(attr: Option<&str>) -> Self {
        match attr {
            Some("center") => Align::Center,
            Some("right") => Align::Right,
            _ => Align::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BreakKind {
    Text,
    Raw,
}

/// One anchored element collected during the indexing pass: a section,
/// reference block, figure, table, paragraph or generated section.
#[derive(Clone, Debug)]
pub(crate) struct IndexItem {
    pub auto_name: String,
    pub auto_anchor: String,
    pub counter: String,
    pub title: String,
    pub anchor: Option<String>,
    pub toc: bool,
    pub level: usize,
    pub appendix: bool,
    pub page: u32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct IrefEntry {
    pub pages: Vec<u32>,
    pub subitems: BTreeMap<String, Vec<u32>>,
}

/// Everything that must restart from scratch for the render pass: the PI
/// state snapshot, the buffer, the markers and the per-pass counters. The
/// section/keyword indexes accumulated by the first pass live on the writer
/// and survive the reset.
pub(crate) struct RenderContext {
    pub pis: Pis,
    pub buf: Vec<String>,
    pub toc_marker: usize,
    pub iref_marker: usize,
    pub break_hints: BTreeMap<usize, (usize, BreakKind)>,
    pub heading_marks: HashMap<usize, String>,
    pub iref_marks: BTreeMap<usize, Vec<(String, Option<String>)>>,
    list_counters: HashMap<String, u32>,
    edit_counter: u32,
    eref_counter: u32,
    figure_count: u32,
    table_count: u32,
    ref_start: usize,
}

impl RenderContext {
    fn new(pis: Pis) -> Self {
        Self {
            pis,
            buf: Vec::new(),
            toc_marker: 0,
            iref_marker: 0,
            break_hints: BTreeMap::new(),
            heading_marks: HashMap::new(),
            iref_marks: BTreeMap::new(),
            list_counters: HashMap::new(),
            edit_counter: 0,
            eref_counter: 0,
            figure_count: 0,
            table_count: 0,
            ref_start: 1,
        }
    }

    /// Discard pass-one output state and restart from the PI snapshot.
    pub(crate) fn reset_for_render_pass(&mut self, pis: &Pis) {
        *self = RenderContext::new(pis.clone());
    }
}

/// Wrapping/placement parameters for one paragraph of text.
pub(crate) struct TextParams<'t> {
    indent: usize,
    sub_indent: usize,
    bullet: &'t str,
    align: Align,
    leading_blankline: bool,
    edit: bool,
    wrap_urls: bool,
    fix_sentence_endings: bool,
    strip: bool,
    source_line: Option<u32>,
}

impl Default for TextParams<'_> {
    fn default() -> Self {
        Self {
            indent: 0,
            sub_indent: 0,
            bullet: "",
            align: Align::Left,
            leading_blankline: false,
            edit: false,
            wrap_urls: true,
            fix_sentence_endings: true,
            strip: true,
            source_line: None,
        }
    }
}

pub struct TextWriter<'a, 'input> {
    doc: &'a Document<'input>,
    root: Node<'a, 'input>,
    pub(crate) width: usize,
    margin: usize,
    pub(crate) mode: OutputMode,
    pub(crate) diag: &'a Diagnostics,
    wrapper: TextWrapper,
    pub(crate) draft: bool,
    today: NaiveDate,
    pis_initial: Pis,
    pub(crate) ctx: RenderContext,
    pub(crate) index: Vec<IndexItem>,
    pub(crate) iref_index: BTreeMap<String, IrefEntry>,
    unknown_tags: HashSet<String>,
    index_mode: bool,
    expire_date: Option<String>,
    pub(crate) left_header: String,
    pub(crate) center_header: String,
    pub(crate) right_header: String,
    pub(crate) left_footer: String,
    pub(crate) center_footer: String,
}

impl<'a, 'input> TextWriter<'a, 'input> {
    pub fn new(
        doc: &'a Document<'input>,
        options: &RenderOptions,
        diag: &'a Diagnostics,
    ) -> Result<Self, Error> {
        Self::with_today(doc, options, diag, chrono::Local::now().date_naive())
    }

    /// Like [`TextWriter::new`] with an explicit "today", for reproducible
    /// output (the date is consulted for missing-date fallbacks and draft
    /// expiry).
    pub fn with_today(
        doc: &'a Document<'input>,
        options: &RenderOptions,
        diag: &'a Diagnostics,
        today: NaiveDate,
    ) -> Result<Self, Error> {
        let root = doc.root_element();
        if root.tag_name().name() != "rfc" {
            return Err(Error::InvalidXml(format!(
                "expected <rfc> root element, found <{}>",
                root.tag_name().name()
            )));
        }

        // Processing instructions before the root element set the initial
        // option state.
        let mut pis = Pis::default();
        for node in doc.root().children() {
            if node.is_element() {
                break;
            }
            if node.node_type() == NodeType::PI {
                xml::apply_pi(node, &mut pis, diag);
            }
        }

        let draft = xml::attr(root, "number").is_none();
        let mut writer = Self {
            doc,
            root,
            width: options.width,
            margin: options.margin,
            mode: options.mode,
            diag,
            wrapper: TextWrapper::new(options.width),
            draft,
            today,
            pis_initial: pis.clone(),
            ctx: RenderContext::new(pis),
            index: Vec::new(),
            iref_index: BTreeMap::new(),
            unknown_tags: HashSet::new(),
            index_mode: false,
            expire_date: None,
            left_header: String::new(),
            center_header: String::new(),
            right_header: String::new(),
            left_footer: String::new(),
            center_footer: String::new(),
        };
        writer.expire_date = writer.compute_expire_date();
        Ok(writer)
    }

    /// Run both passes and return the final output lines (without the
    /// top-of-document blank margin).
    pub fn render(&mut self) -> Result<Vec<String>, Error> {
        self.index_mode = true;
        self.ctx = RenderContext::new(self.pis_initial.clone());
        self.index.clear();
        self.iref_index.clear();
        self.build_document()?;

        self.index_mode = false;
        self.prepare_headers_footers();
        self.ctx.reset_for_render_pass(&self.pis_initial);
        self.build_document()?;

        match self.mode {
            OutputMode::Raw => Ok(self.splice_raw()),
            OutputMode::Paginated => Ok(paginate::paginate(self)),
        }
    }

    // ------------------------------------------------------------------
    // document assembly

    fn build_document(&mut self) -> Result<(), Error> {
        let front = xml::child(self.root, "front")
            .ok_or_else(|| Error::InvalidXml("missing <front> element".into()))?;

        if self.ctx.pis.topblock {
            let left = self.prepare_top_left(front);
            let right = self.prepare_top_right(front);
            self.write_top(&left, &right);
        }

        let title_node = xml::child(front, "title")
            .ok_or_else(|| Error::InvalidXml("missing <title> in <front>".into()))?;
        let title = xml::element_text(title_node);
        let doc_name = if self.draft {
            xml::attr(self.root, "docName").map(str::to_string)
        } else {
            None
        };
        self.write_title(&title, doc_name.as_deref(), Some(self.line_of(title_node)));

        if let Some(abstract_node) = xml::child(front, "abstract") {
            self.write_heading("Abstract", "", Some("rfc.abstract"), 1);
            for t in xml::children(abstract_node, "t") {
                self.write_t_rec(t, &TRecParams::default())?;
            }
        }

        for note in xml::children(front, "note") {
            let note_title = xml::attr(note, "title").unwrap_or("Note").to_string();
            self.write_heading(&note_title, "", None, 1);
            for t in xml::children(note, "t") {
                self.write_t_rec(t, &TRecParams::default())?;
            }
        }

        self.write_status(front)?;

        self.write_heading("Copyright Notice", "", Some("rfc.copyrightnotice"), 1);
        self.write_paragraph(boilerplate::DRAFT_COPYRIGHT);

        if self.ctx.pis.toc {
            self.ctx.toc_marker = self.ctx.buf.len();
        }

        let middle = xml::child(self.root, "middle")
            .ok_or_else(|| Error::InvalidXml("missing <middle> element".into()))?;
        let next_section = self.write_section_rec(middle, None, false, 0)?;

        let back = xml::child(self.root, "back");

        let references: Vec<Node> = back
            .map(|b| xml::children(b, "references"))
            .unwrap_or_default();
        if !references.is_empty() {
            self.write_references(&references, next_section)?;
        }

        if let Some(back) = back {
            self.write_section_rec(back, None, true, 0)?;
        }

        if !self.iref_index.is_empty() {
            if self.index_mode {
                self.index.push(IndexItem {
                    auto_name: "Index".into(),
                    auto_anchor: "rfc.index".into(),
                    counter: String::new(),
                    title: "Index".into(),
                    anchor: None,
                    toc: true,
                    level: 1,
                    appendix: false,
                    page: 0,
                });
            }
            self.ctx.iref_marker = self.ctx.buf.len();
        }

        let authors = xml::children(front, "author");
        let authors_title = if authors.len() > 1 {
            "Authors' Addresses"
        } else {
            "Author's Address"
        };
        if self.index_mode {
            self.index.push(IndexItem {
                auto_name: authors_title.into(),
                auto_anchor: "rfc.authors".into(),
                counter: String::new(),
                title: authors_title.into(),
                anchor: None,
                toc: true,
                level: 1,
                appendix: false,
                page: 0,
            });
        }
        self.write_heading(authors_title, "", Some("rfc.authors"), 1);
        for author in authors {
            self.write_address_card(author);
        }

        Ok(())
    }

    fn write_status(&mut self, front: Node) -> Result<(), Error> {
        self.write_heading("Status of this Memo", "", Some("rfc.status"), 1);
        if !self.draft {
            let category = xml::attr(self.root, "category").unwrap_or("none");
            match boilerplate::status_text(category) {
                Some(text) => self.write_paragraph(text),
                None => self.diag.warn_at(
                    Some(self.line_of(front)),
                    format!("unable to find a status boilerplate for category: {category}"),
                ),
            }
        } else {
            let ipr = xml::attr(self.root, "ipr").unwrap_or("trust200902");
            match boilerplate::ipr_paragraphs(ipr) {
                Some(pars) => {
                    for par in pars {
                        self.write_paragraph(par);
                    }
                }
                None => self.diag.warn(format!(
                    "unable to find a status boilerplate for ipr: {ipr}"
                )),
            }
        }
        Ok(())
    }

    /// Recursively write a section: its heading, body elements, then child
    /// sections. Returns the next available top-level section number.
    fn write_section_rec(
        &mut self,
        section: Node,
        count_str: Option<&str>,
        appendix: bool,
        level: usize,
    ) -> Result<usize, Error> {
        if let Some(count) = count_str {
            let anchor = xml::attr(section, "anchor").map(str::to_string);
            let title = xml::attr(section, "title").unwrap_or("").to_string();
            let include_toc = xml::attr(section, "toc").unwrap_or("include") != "exclude"
                && (!appendix || self.ctx.pis.tocappendix);
            let (auto_name, auto_anchor) = if appendix {
                (format!("Appendix {count}"), format!("rfc.appendix.{count}"))
            } else {
                (format!("Section {count}"), format!("rfc.section.{count}"))
            };
            if self.index_mode {
                self.index.push(IndexItem {
                    auto_name,
                    auto_anchor: auto_anchor.clone(),
                    counter: count.to_string(),
                    title: title.clone(),
                    anchor,
                    toc: include_toc,
                    level,
                    appendix,
                    page: 0,
                });
            }
            let bullet = if appendix && level == 1 {
                format!("Appendix {count}.")
            } else {
                format!("{count}.")
            };
            self.write_heading(&title, &bullet, Some(&auto_anchor), level);
        }

        let mut p_count = 1;
        for element in xml::content_children(section) {
            if element.node_type() == NodeType::PI {
                xml::apply_pi(element, &mut self.ctx.pis, self.diag);
                continue;
            }
            match element.tag_name().name() {
                "t" => {
                    if self.index_mode {
                        let count = count_str.unwrap_or("");
                        self.index.push(IndexItem {
                            auto_name: format!("Section {count}, Paragraph {p_count}"),
                            auto_anchor: format!("rfc.section.{count}.p.{p_count}"),
                            counter: String::new(),
                            title: String::new(),
                            anchor: xml::attr(element, "anchor").map(str::to_string),
                            toc: false,
                            level,
                            appendix,
                            page: 0,
                        });
                    }
                    self.write_t_rec(element, &TRecParams::default())?;
                    p_count += 1;
                }
                "figure" => self.write_figure(element)?,
                "texttable" => self.write_table(element)?,
                "section" => {}
                "iref" => self.handle_iref(element),
                _ => self.warn_unknown(element),
            }
        }

        let mut s_count = 1usize;
        for child in xml::children(section, "section") {
            let child_count = if appendix && level == 0 {
                wrap::int2letter(s_count as u32 - 1).to_uppercase()
            } else {
                match count_str {
                    Some(count) => format!("{count}.{s_count}"),
                    None => s_count.to_string(),
                }
            };
            self.write_section_rec(child, Some(&child_count), appendix, level + 1)?;
            s_count += 1;
        }
        Ok(s_count)
    }

    fn write_references(
        &mut self,
        references: &[Node],
        section_number: usize,
    ) -> Result<(), Error> {
        let ref_counter = section_number.to_string();
        let parent_title = self.ctx.pis.refparent.clone();
        let title = if references.len() == 1 {
            xml::attr(references[0], "title")
                .unwrap_or(&parent_title)
                .to_string()
        } else {
            parent_title.clone()
        };
        if self.index_mode {
            self.index.push(IndexItem {
                auto_name: "References".into(),
                auto_anchor: "rfc.references".into(),
                counter: ref_counter.clone(),
                title: title.clone(),
                anchor: None,
                toc: true,
                level: 1,
                appendix: false,
                page: 0,
            });
        }
        self.write_heading(&title, &format!("{ref_counter}."), Some("rfc.references"), 1);
        if references.len() > 1 {
            for (i, list) in references.iter().enumerate() {
                let sub_counter = format!("{ref_counter}.{}", i + 1);
                let sub_title = xml::attr(*list, "title").unwrap_or("References").to_string();
                let auto_anchor = format!("rfc.references.{}", i + 1);
                if self.index_mode {
                    self.index.push(IndexItem {
                        auto_name: format!("References {}", i + 1),
                        auto_anchor: auto_anchor.clone(),
                        counter: sub_counter.clone(),
                        title: sub_title.clone(),
                        anchor: None,
                        toc: true,
                        level: 2,
                        appendix: false,
                        page: 0,
                    });
                }
                self.write_heading(&sub_title, &format!("{sub_counter}."), Some(&auto_anchor), 2);
                self.write_reference_list(*list)?;
            }
        } else {
            self.write_reference_list(references[0])?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // low-level buffer operations

    fn lb(&mut self) {
        self.ctx.buf.push(String::new());
    }

    /// All paragraph-shaped output funnels through here: bullet handling,
    /// wrapping, alignment and the long-line check.
    fn write_text(&mut self, text: &str, p: &TextParams) {
        let begin = self.ctx.buf.len();
        self.write_text_inner(text, p);
        let end = self.ctx.buf.len();
        self.ctx.break_hints.insert(begin, (end - begin, BreakKind::Text));
        if !self.index_mode {
            self.check_long_lines(begin, p.source_line);
        }
    }

    fn write_text_inner(&mut self, text: &str, p: &TextParams) {
        if p.leading_blankline {
            if p.edit && self.ctx.pis.editing {
                self.ctx.edit_counter += 1;
                let mark = format!("<{}>", self.ctx.edit_counter);
                self.ctx.buf.push(mark);
            } else {
                self.lb();
            }
        }

        let mut subsequent = " ".repeat(p.indent + p.sub_indent);
        let initial: String;
        if !p.bullet.is_empty() {
            // the bullet is wrapped separately and its last line becomes the
            // initial indent of the body text
            let indent_str = " ".repeat(p.indent);
            let opts = WrapOpts {
                initial_indent: indent_str.clone(),
                subsequent_indent: indent_str,
                fix_doublespace: false,
                drop_whitespace: false,
                ..WrapOpts::default()
            };
            let mut parts = self.wrapper.wrap(p.bullet, &opts);
            if parts.is_empty() {
                parts.push(" ".repeat(p.indent));
            }
            if parts.len() > 1 {
                self.ctx.buf.extend_from_slice(&parts[..parts.len() - 1]);
            }
            initial = parts.last().expect("bullet line").clone();
            if p.sub_indent == 0 {
                subsequent = " ".repeat(initial.chars().count());
            }
        } else {
            initial = subsequent.clone();
        }

        if !text.is_empty() {
            let stripped;
            let mut text: &str = if p.strip {
                stripped = text.trim_start().to_string();
                &stripped
            } else {
                text
            };
            let kept;
            if !p.wrap_urls {
                kept = wrap::urlkeep(text);
                text = &kept;
            }
            let opts = WrapOpts {
                initial_indent: initial.clone(),
                subsequent_indent: subsequent,
                fix_sentence_endings: p.fix_sentence_endings,
                ..WrapOpts::default()
            };
            let par = self.wrapper.wrap(text, &opts);
            match p.align {
                Align::Left => self.ctx.buf.extend(par),
                Align::Center => {
                    let m = p.indent / 2 * 2;
                    let margin_str = " ".repeat(m);
                    for line in par {
                        let centered = if line.starts_with(&margin_str) {
                            let inner = wrap::center_str(&line[m..], self.width - m);
                            format!("{}{}", margin_str, inner.trim_end())
                        } else {
                            wrap::center_str(&line, self.width).trim_end().to_string()
                        };
                        self.ctx.buf.push(centered);
                    }
                }
                Align::Right => {
                    for line in par {
                        self.ctx.buf.push(format!("{line:>width$}", width = self.width));
                    }
                }
            }
        } else if !p.bullet.is_empty() {
            // an empty string with a declared bullet still emits the bullet
            self.ctx.buf.push(initial);
        }
    }

    /// A raw stream of characters, preserving internal whitespace and line
    /// breaks (artwork, tables, address cards, the top block).
    #[allow(clippy::too_many_arguments)]
    fn write_raw(
        &mut self,
        text: &str,
        indent: usize,
        align: Align,
        blanklines: usize,
        delimiter: Option<&str>,
        leading_blankline: bool,
        source_line: Option<u32>,
    ) {
        let begin_hint = self.ctx.buf.len();
        if !text.is_empty() {
            if leading_blankline {
                self.lb();
            }
            if let Some(d) = delimiter {
                self.ctx.buf.push(d.to_string());
            }
            for _ in 0..blanklines {
                self.lb();
            }
            let start_line = self.ctx.buf.len();
            let mut lines: Vec<String> = expand_tabs(text, 4)
                .split('\n')
                .map(|l| l.trim_end().to_string())
                .collect();
            if lines.len() > 1 {
                if lines.first().is_some_and(|l| l.is_empty()) {
                    lines.remove(0);
                }
                if lines.last().is_some_and(|l| l.is_empty()) {
                    lines.pop();
                }
            }
            match align {
                Align::Center => {
                    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
                    let center_indent =
                        indent as i64 + (self.width as i64 - indent as i64 - longest as i64) / 2;
                    let pad = if center_indent > indent as i64 {
                        center_indent as usize
                    } else {
                        indent
                    };
                    let indent_str = " ".repeat(pad);
                    for line in lines {
                        self.ctx.buf.push(format!("{indent_str}{line}"));
                    }
                }
                Align::Right => {
                    for line in lines {
                        self.ctx.buf.push(format!("{line:>width$}", width = self.width));
                    }
                }
                Align::Left => {
                    let min_lead = lines
                        .iter()
                        .map(|l| l.chars().count() - l.trim_start().chars().count())
                        .min()
                        .unwrap_or(0);
                    let extra = indent.saturating_sub(min_lead);
                    let indent_str = " ".repeat(extra);
                    for line in lines {
                        self.ctx.buf.push(format!("{indent_str}{line}"));
                    }
                }
            }
            for _ in 0..blanklines {
                self.lb();
            }
            if let Some(d) = delimiter {
                self.ctx.buf.push(d.to_string());
            }
            if !self.index_mode {
                self.check_long_lines(start_line, source_line);
            }
        }
        self.ctx
            .break_hints
            .insert(begin_hint, (self.ctx.buf.len() - begin_hint, BreakKind::Raw));
    }

    fn check_long_lines(&self, begin: usize, source_line: Option<u32>) {
        for (num, line) in self.ctx.buf[begin..].iter().enumerate() {
            let len = line.chars().count();
            if len > self.width {
                let excess: String = line.chars().skip(self.width).collect();
                let origin = source_line
                    .map(|l| l as usize + num)
                    .unwrap_or(begin + num);
                self.diag.warn(format!(
                    "Output line (from source around line {origin}) is {len} characters; \
                     longer than {}.  Excess characters: '{excess}':\n  '{line}'",
                    self.width
                ));
            }
        }
    }

    // ------------------------------------------------------------------
    // headings, paragraphs, titles

    fn write_heading(&mut self, text: &str, bullet: &str, auto_anchor: Option<&str>, _level: usize) {
        let begin = self.ctx.buf.len();
        if let Some(anchor) = auto_anchor {
            self.ctx.heading_marks.insert(begin, anchor.to_string());
        }
        let bullet = if bullet.is_empty() {
            String::new()
        } else {
            format!("{bullet}  ")
        };
        self.write_text(
            text,
            &TextParams {
                bullet: &bullet,
                indent: 0,
                leading_blankline: true,
                ..TextParams::default()
            },
        );
        // reserve room under the heading so it is not orphaned at a page end
        let end = self.ctx.buf.len() + self.ctx.pis.sectionorphan;
        self.ctx.break_hints.insert(begin, (end - begin, BreakKind::Text));
    }

    fn write_paragraph(&mut self, text: &str) {
        self.write_text(
            &wrap::urlkeep(text),
            &TextParams {
                indent: 3,
                leading_blankline: true,
                ..TextParams::default()
            },
        );
    }

    fn write_title(&mut self, title: &str, doc_name: Option<&str>, source_line: Option<u32>) {
        self.write_text(
            title,
            &TextParams {
                align: Align::Center,
                leading_blankline: true,
                source_line,
                ..TextParams::default()
            },
        );
        if let Some(name) = doc_name {
            self.write_text(
                name,
                &TextParams {
                    align: Align::Center,
                    ..TextParams::default()
                },
            );
        }
    }

    fn write_label(&mut self, text: &str, source_line: Option<u32>) {
        self.write_text(
            text,
            &TextParams {
                indent: 3,
                align: Align::Center,
                leading_blankline: true,
                source_line,
                ..TextParams::default()
            },
        );
    }

    // ------------------------------------------------------------------
    // block elements

    fn write_t_rec(&mut self, t: Node, p: &TRecParams) -> Result<(), Error> {
        let source_line = Some(self.line_of(t));
        let mut current_text = xml::element_text(t);
        let mut remainder = xml::content_children(t);
        let mut bullet = p.bullet.clone();
        let mut leading_blankline = p.leading_blankline;
        let mut first = true;

        while !remainder.is_empty() || !current_text.is_empty() || (first && !bullet.is_empty()) {
            first = false;
            let (inline_text, rest) = self.combine_inline(remainder);
            current_text.push_str(&inline_text);
            remainder = rest;
            if !current_text.trim().is_empty() || !bullet.is_empty() {
                self.write_text(
                    &current_text,
                    &TextParams {
                        indent: p.indent,
                        sub_indent: p.sub_indent,
                        bullet: &bullet,
                        align: p.align,
                        leading_blankline,
                        edit: true,
                        source_line,
                        ..TextParams::default()
                    },
                );
            }
            current_text.clear();

            if remainder.is_empty() {
                break;
            }
            let element = remainder.remove(0);
            match element.node_type() {
                NodeType::PI => {}
                _ => match element.tag_name().name() {
                    "list" => {
                        let new_indent = if p.sub_indent > 0 {
                            p.sub_indent + p.indent
                        } else {
                            bullet.chars().count() + p.indent
                        };
                        self.write_list(element, new_indent, p.level)?;
                        leading_blankline = true;
                        bullet.clear();
                    }
                    "figure" => {
                        self.write_figure(element)?;
                        leading_blankline = true;
                        bullet.clear();
                    }
                    "vspace" => {
                        let num = xml::attr(element, "blankLines")
                            .and_then(|v| v.parse::<usize>().ok())
                            .unwrap_or(0);
                        for _ in 0..num {
                            self.lb();
                        }
                        leading_blankline = false;
                        bullet = " ".repeat(p.sub_indent);
                    }
                    _ => self.warn_unknown(element),
                },
            }
            current_text = xml::tail_text(element);
        }
        Ok(())
    }

    fn write_list(&mut self, list: Node, indent: usize, level: usize) -> Result<(), Error> {
        let mut style = xml::attr(list, "style").unwrap_or("").to_string();
        if style.is_empty() {
            // inherit from the nearest ancestor list with a style
            let mut parent = list.parent();
            while let Some(node) = parent {
                if node.is_element() && node.tag_name().name() == "list" {
                    if let Some(s) = xml::attr(node, "style") {
                        if !s.is_empty() {
                            style = s.to_string();
                            break;
                        }
                    }
                }
                parent = node.parent();
            }
        }
        if style.is_empty() {
            style = "empty".to_string();
        }

        let items = xml::children(list, "t");
        let list_length = items.len();

        let mut hang_indent: Option<usize> = None;
        if style == "hanging" || style.starts_with("format") {
            hang_indent = Some(
                xml::attr(list, "hangIndent")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(3 + level * 3),
            );
        }

        let mut format_str = String::new();
        let mut counter_key = String::new();
        if style.starts_with("format") {
            format_str = style
                .splitn(2, "format ")
                .nth(1)
                .unwrap_or("")
                .to_string();
            if !wrap::ALLOWED_FORMATS.iter().any(|f| format_str.contains(f)) {
                self.diag.warn(format!(
                    "Invalid format specified: {style} (Must be one of {})",
                    wrap::ALLOWED_FORMATS.join(", ")
                ));
            }
            match xml::attr(list, "counter") {
                Some(name) => {
                    counter_key = name.to_string();
                    self.ctx.list_counters.entry(counter_key.clone()).or_insert(0);
                }
                None => {
                    counter_key = "temp".to_string();
                    self.ctx.list_counters.insert(counter_key.clone(), 0);
                }
            }
        }

        let mut t_count = 0usize;
        for element in xml::content_children(list) {
            if element.node_type() == NodeType::PI {
                xml::apply_pi(element, &mut self.ctx.pis, self.diag);
                continue;
            }
            if element.tag_name().name() != "t" {
                continue;
            }
            let mut leading_blankline = true;
            if t_count > 0 && self.ctx.pis.subcompact() {
                leading_blankline = false;
            }
            let mut item_indent = indent;
            let mut bullet = "   ".to_string();
            match style.as_str() {
                "symbols" => {
                    let symbols: Vec<char> = self.ctx.pis.text_list_symbols.chars().collect();
                    bullet = symbols[level % symbols.len()].to_string();
                    bullet.push_str("  ");
                }
                "numbers" => {
                    bullet = wrap::format_counter("%d.", t_count as u32 + 1, list_length);
                }
                "letters" => {
                    bullet = wrap::format_counter("%c.", t_count as u32 + 1, list_length);
                }
                "hanging" => {
                    let hang = hang_indent.unwrap_or(3);
                    bullet = xml::attr(element, "hangText").unwrap_or("").to_string();
                    if bullet.chars().count() < hang {
                        bullet = format!("{bullet:<hang$}");
                    } else {
                        bullet.push_str("  ");
                    }
                    if bullet.ends_with(':') && self.ctx.pis.colonspace {
                        bullet.push(' ');
                    }
                    let item_text = element.text().unwrap_or("");
                    if !item_text.trim().is_empty() && bullet.chars().count() > self.width / 2 {
                        // a very long label: if the first word of the body
                        // cannot share the line, the label stands alone and
                        // the body starts at the hang indent
                        let first_word_len = wrap::split(item_text.trim_start())
                            .first()
                            .map(|w| w.chars().count())
                            .unwrap_or(0);
                        if first_word_len
                            > self
                                .width
                                .saturating_sub(bullet.chars().count() + item_indent)
                        {
                            self.write_text(
                                "",
                                &TextParams {
                                    bullet: &bullet,
                                    indent: item_indent,
                                    leading_blankline,
                                    ..TextParams::default()
                                },
                            );
                            leading_blankline = false;
                            item_indent = hang;
                            bullet = String::new();
                        }
                    }
                }
                _ if style.starts_with("format") => {
                    let counter = self
                        .ctx
                        .list_counters
                        .entry(counter_key.clone())
                        .or_insert(0);
                    *counter += 1;
                    let count = *counter;
                    bullet = wrap::format_counter(&format_str, count, list_length);
                }
                _ => {}
            }
            let sub_indent = match hang_indent {
                Some(h) => h,
                None => bullet.chars().count(),
            };
            self.write_t_rec(
                element,
                &TRecParams {
                    indent: item_indent,
                    sub_indent,
                    bullet,
                    align: Align::Left,
                    level: level + 1,
                    leading_blankline,
                },
            )?;
            t_count += 1;
        }
        Ok(())
    }

    fn write_figure(&mut self, figure: Node) -> Result<(), Error> {
        let begin = self.ctx.buf.len();
        let align = Align::from_attr(xml::attr(figure, "align"));
        self.ctx.figure_count += 1;
        let figure_count = self.ctx.figure_count;
        let anchor = xml::attr(figure, "anchor").map(str::to_string);
        let title = xml::attr(figure, "title").unwrap_or("").to_string();

        if self.index_mode {
            self.index.push(IndexItem {
                auto_name: format!("Figure {figure_count}"),
                auto_anchor: format!("rfc.figure.{figure_count}"),
                counter: String::new(),
                title: title.clone(),
                anchor,
                toc: false,
                level: 0,
                appendix: false,
                page: 0,
            });
        }

        if let Some(preamble) = xml::child(figure, "preamble") {
            self.write_t_rec(
                preamble,
                &TRecParams {
                    align,
                    ..TRecParams::default()
                },
            )?;
        }

        let artwork = xml::child(figure, "artwork").ok_or_else(|| {
            Error::Layout(format!(
                "figure without artwork around input line {}",
                self.line_of(figure)
            ))
        })?;
        let artwork_align = xml::attr(artwork, "align")
            .map(|a| Align::from_attr(Some(a)))
            .unwrap_or(align);
        let delimiter = self.ctx.pis.artworkdelimiter.clone();
        let blanklines = self.ctx.pis.artworklines;
        self.write_raw(
            &xml::raw_text(artwork),
            3,
            artwork_align,
            blanklines,
            delimiter.as_deref(),
            true,
            Some(self.line_of(artwork)),
        );

        if let Some(postamble) = xml::child(figure, "postamble") {
            self.write_t_rec(
                postamble,
                &TRecParams {
                    align,
                    ..TRecParams::default()
                },
            )?;
        }

        if self.ctx.pis.figurecount {
            let label = if title.is_empty() {
                format!("Figure {figure_count}")
            } else {
                format!("Figure {figure_count}: {title}")
            };
            self.write_label(&label, Some(self.line_of(figure)));
        }

        let end = self.ctx.buf.len();
        // figures are kept whole by the paginator
        self.ctx.break_hints.insert(begin, (end - begin, BreakKind::Raw));
        Ok(())
    }

    fn write_table(&mut self, table: Node) -> Result<(), Error> {
        let begin = self.ctx.buf.len();
        let align = Align::from_attr(xml::attr(table, "align").or(Some("center")));
        self.ctx.table_count += 1;
        let table_count = self.ctx.table_count;
        let title = xml::attr(table, "title").unwrap_or("").to_string();

        if self.index_mode {
            self.index.push(IndexItem {
                auto_name: format!("Table {table_count}"),
                auto_anchor: format!("rfc.table.{table_count}"),
                counter: String::new(),
                title: title.clone(),
                anchor: xml::attr(table, "anchor").map(str::to_string),
                toc: false,
                level: 0,
                appendix: false,
                page: 0,
            });
        }

        if let Some(preamble) = xml::child(table, "preamble") {
            self.write_t_rec(
                preamble,
                &TRecParams {
                    align: Align::from_attr(xml::attr(table, "align")),
                    ..TRecParams::default()
                },
            )?;
        }

        let ttcols = xml::children(table, "ttcol");
        let mut aligns = Vec::new();
        let mut width_hints = Vec::new();
        let mut header: Vec<String> = Vec::new();
        for ttcol in &ttcols {
            aligns.push(CellAlign::from_attr(xml::attr(*ttcol, "align")));
            let hint = xml::attr(*ttcol, "width")
                .map(|w| w.trim_end_matches('%'))
                .and_then(|w| w.parse::<u32>().ok())
                .filter(|&w| 0 < w && w < 100)
                .map(|w| w as f64 / 100.0);
            width_hints.push(hint);
            header.push(wrap::replace_markers(&xml::element_text(*ttcol)));
        }
        let num_columns = header.len();
        if num_columns == 0 {
            return Err(Error::Layout(format!(
                "table has no columns (no ttcol elements) defined around input line {}",
                self.line_of(table)
            )));
        }

        let mut matrix: Vec<Vec<String>> = vec![header];
        for cell in xml::children(table, "c") {
            let mut text = xml::element_text(cell);
            let (inline_text, _) = self.combine_inline(xml::content_children(cell));
            text.push_str(&inline_text);
            let text = wrap::replace_markers(&text);
            if matrix.last().is_some_and(|row| row.len() >= num_columns) {
                matrix.push(Vec::new());
            }
            matrix.last_mut().expect("row").push(text);
        }

        let data = TableData {
            matrix,
            aligns,
            width_hints,
            style: TableStyle::from_attr(xml::attr(table, "style")),
        };
        let output = table::render_table(&data, self.width, self.ctx.pis.compact, self.diag)?;
        self.write_raw(
            &output.join("\n"),
            self.margin,
            align,
            0,
            None,
            true,
            Some(self.line_of(table)),
        );

        if let Some(postamble) = xml::child(table, "postamble") {
            self.write_t_rec(
                postamble,
                &TRecParams {
                    align: Align::from_attr(xml::attr(table, "align")),
                    ..TRecParams::default()
                },
            )?;
        }

        if self.ctx.pis.tablecount {
            let label = if title.is_empty() {
                format!("Table {table_count}")
            } else {
                format!("Table {table_count}: {title}")
            };
            self.write_label(&label, Some(self.line_of(table)));
        }

        let end = self.ctx.buf.len();
        // tables are kept whole by the paginator
        self.ctx.break_hints.insert(begin, (end - begin, BreakKind::Raw));
        Ok(())
    }

    // ------------------------------------------------------------------
    // inline elements

    /// Aggregate the text of leading inline elements (xref, eref, iref,
    /// cref, spanx) and their tails. Returns the rendered text plus the
    /// elements that were not consumed.
    fn combine_inline<'n, 'i>(
        &mut self,
        elements: Vec<Node<'n, 'i>>,
    ) -> (String, Vec<Node<'n, 'i>>) {
        let mut line = String::new();
        for (i, element) in elements.iter().enumerate() {
            if element.node_type() == NodeType::PI {
                xml::apply_pi(*element, &mut self.ctx.pis, self.diag);
                return (line, elements[i..].to_vec());
            }
            match element.tag_name().name() {
                "xref" => line.push_str(&self.expand_xref(*element)),
                "eref" => {
                    let text = xml::element_text(*element);
                    if !text.is_empty() {
                        line.push_str(&text);
                        line.push(' ');
                    }
                    self.ctx.eref_counter += 1;
                    line.push_str(&format!("[{}]", self.ctx.eref_counter));
                }
                "iref" => self.handle_iref(*element),
                "cref" => {
                    if self.ctx.pis.comments {
                        let text = xml::element_text(*element);
                        match xml::attr(*element, "anchor") {
                            Some(anchor) => line.push_str(&format!("[[{anchor}: {text}]]")),
                            None => line.push_str(&format!("[[{text}]]")),
                        }
                    }
                }
                "spanx" => {
                    let edge = match xml::attr(*element, "style").unwrap_or("emph") {
                        "strong" => '*',
                        "verb" => '"',
                        _ => '_',
                    };
                    let text = xml::element_text(*element);
                    line.push(edge);
                    line.push_str(&text);
                    line.push(edge);
                }
                _ => return (line, elements[i..].to_vec()),
            }
            line.push_str(&xml::tail_text(*element));
        }
        (line, Vec::new())
    }

    fn handle_iref(&mut self, element: Node) {
        let Some(item) = xml::attr(element, "item") else {
            return;
        };
        let subitem = xml::attr(element, "subitem").map(str::to_string);
        if self.index_mode {
            let entry = self.iref_index.entry(item.to_string()).or_default();
            if let Some(sub) = &subitem {
                entry.subitems.entry(sub.clone()).or_default();
            }
        } else {
            // remember where the term landed so the paginator can attach
            // page numbers
            let pos = self.ctx.buf.len();
            self.ctx
                .iref_marks
                .entry(pos)
                .or_default()
                .push((item.to_string(), subitem));
        }
    }

    fn expand_xref(&mut self, xref: Node) -> String {
        let target = xml::attr(xref, "target").unwrap_or("");
        let format = xml::attr(xref, "format").unwrap_or("default");
        let item = self.item_by_user_anchor(target);
        let mut target_text = match (item, format) {
            (None, _) | (_, "none") => format!("[{target}]"),
            (Some(item), "counter") => item.counter.clone(),
            (Some(item), "title") => item.title.clone(),
            (Some(item), _) => item.auto_name.clone(),
        };
        // word joiner after separators keeps "Section 1.2" style references
        // from breaking mid-token
        let mut protected = String::with_capacity(target_text.len());
        for c in target_text.chars() {
            protected.push(c);
            if matches!(c, '.' | '/' | '-') {
                protected.push(WJ);
            }
        }
        target_text = protected;
        let text = xml::element_text(xref);
        if !text.trim().is_empty() {
            if !target_text.starts_with('[') {
                target_text = format!("({target_text})");
            }
            format!("{} {}", text.trim_end(), target_text)
        } else {
            target_text
        }
    }

    // ------------------------------------------------------------------
    // references

    fn write_reference_list(&mut self, list: Node) -> Result<(), Error> {
        let refs = xml::children(list, "reference");
        let mut keys: Vec<String> = Vec::new();
        let mut texts: HashMap<String, String> = HashMap::new();
        let mut annotations: HashMap<String, String> = HashMap::new();
        let mut sources: HashMap<String, u32> = HashMap::new();

        for (i, reference) in refs.iter().enumerate() {
            let front = xml::child(*reference, "front");
            let mut refstring = String::new();

            let authors = front.map(|f| xml::children(f, "author")).unwrap_or_default();
            refstring.push_str(&self.format_author_string(&authors));
            refstring.push_str(", ");

            let title = front.and_then(|f| xml::child(f, "title")).map(xml::element_text);
            match title {
                Some(t) if !t.is_empty() => {
                    refstring.push_str(&format!("\"{t}\", "));
                }
                _ => self.diag.warn(format!(
                    "No title specified in reference {}",
                    xml::attr(*reference, "anchor").unwrap_or("")
                )),
            }

            for series in xml::children(*reference, "seriesInfo") {
                let name = xml::attr(series, "name").unwrap_or("");
                let value = xml::attr(series, "value").unwrap_or("");
                if name == "Internet-Draft" {
                    refstring.push_str(&format!("{value} (work in progress), "));
                } else {
                    refstring.push_str(&format!("{name} {value}, "));
                }
            }

            if let Some(date) = front.and_then(|f| xml::child(f, "date")) {
                let month = xml::attr(date, "month").unwrap_or("");
                let year = xml::attr(date, "year").unwrap_or("");
                if !month.is_empty() || !year.is_empty() {
                    if !month.is_empty() {
                        refstring.push_str(month);
                        refstring.push(' ');
                    }
                    refstring.push_str(year);
                }
            }

            if let Some(target) = xml::attr(*reference, "target") {
                if !refstring.ends_with(", ") {
                    refstring.push_str(", ");
                }
                refstring.push_str(&format!("<{target}>"));
            }
            refstring.push('.');

            let number = i + self.ctx.ref_start;
            let bullet = if self.ctx.pis.symrefs {
                format!(
                    "[{}]",
                    xml::attr(*reference, "anchor").map(str::to_string).unwrap_or_else(|| number.to_string())
                )
            } else {
                format!("[{number}]")
            };
            sources.insert(bullet.clone(), self.line_of(*reference));
            texts.insert(bullet.clone(), refstring);
            if let Some(annotation) = xml::child(*reference, "annotation") {
                let text = xml::element_text(annotation);
                if !text.is_empty() {
                    annotations.insert(bullet.clone(), text);
                }
            }
            keys.push(bullet);
        }
        self.ctx.ref_start += refs.len();

        // numeric references are already in numeric order; sorting them
        // alphabetically would scramble [10] before [1]
        if self.ctx.pis.sortrefs && self.ctx.pis.symrefs {
            keys.sort();
        }

        for key in keys {
            let text = texts.get(&key).cloned().unwrap_or_default();
            let source_line = sources.get(&key).copied();
            self.write_ref_element(&key, &text, REF_INDENT, source_line);
            if let Some(annotation) = annotations.get(&key).cloned() {
                self.write_text(
                    &annotation,
                    &TextParams {
                        indent: REF_INDENT + 3,
                        leading_blankline: true,
                        source_line,
                        ..TextParams::default()
                    },
                );
            }
        }
        Ok(())
    }

    fn write_ref_element(&mut self, key: &str, text: &str, sub_indent: usize, source_line: Option<u32>) {
        let min_spacing = 2;
        if key.chars().count() + min_spacing > sub_indent {
            // key too wide for the bibliography hang: own line
            self.write_text(
                key,
                &TextParams {
                    indent: 3,
                    leading_blankline: true,
                    wrap_urls: false,
                    fix_sentence_endings: false,
                    source_line,
                    ..TextParams::default()
                },
            );
            self.write_text(
                text,
                &TextParams {
                    indent: 3 + sub_indent,
                    wrap_urls: false,
                    fix_sentence_endings: false,
                    source_line,
                    ..TextParams::default()
                },
            );
        } else {
            let bullet = format!("{key:<sub_indent$}");
            self.write_text(
                text,
                &TextParams {
                    indent: 3,
                    bullet: &bullet,
                    sub_indent,
                    leading_blankline: true,
                    wrap_urls: false,
                    fix_sentence_endings: false,
                    source_line,
                    ..TextParams::default()
                },
            );
        }
    }

    /// "Last, F., Last, F., and F. Last" with organizations standing in for
    /// unnamed authors and an ", Ed." suffix for editors.
    fn format_author_string(&self, authors: &[Node]) -> String {
        let mut buf = String::new();
        let count = authors.len();
        for (i, author) in authors.iter().enumerate() {
            let surname = xml::attr(*author, "surname").unwrap_or("");
            let initials = xml::attr(*author, "initials").unwrap_or("");
            let organization = xml::child(*author, "organization").map(xml::element_text);
            if !surname.is_empty() {
                if i == count - 1 && count > 1 {
                    // last author reads given-name first
                    if initials.is_empty() {
                        buf.push_str(surname);
                    } else {
                        buf.push_str(&format!("{initials} {surname}"));
                    }
                } else if initials.is_empty() {
                    buf.push_str(surname);
                } else {
                    buf.push_str(&format!("{surname}, {initials}"));
                }
                if xml::attr(*author, "role") == Some("editor") {
                    buf.push_str(", Ed.");
                }
            } else if let Some(org) = organization {
                if org.trim().is_empty() {
                    continue;
                }
                buf.push_str(org.trim());
            } else {
                continue;
            }
            if count == 2 && i == 0 {
                buf.push_str(" and ");
            } else if i < count - 1 {
                buf.push_str(", ");
                if i == count - 2 {
                    buf.push_str("and ");
                }
            }
        }
        buf
    }

    // ------------------------------------------------------------------
    // address cards

    fn write_address_card(&mut self, author: Node) {
        let mut lines: Vec<String> = Vec::new();
        let fullname = xml::attr(author, "fullname").unwrap_or("");
        match xml::attr(author, "role") {
            Some(role) => lines.push(format!("{fullname} ({role})")),
            None => lines.push(fullname.to_string()),
        }
        if let Some(org) = xml::child(author, "organization") {
            let text = xml::element_text(org);
            if !text.is_empty() {
                lines.push(text);
            }
        }
        if let Some(address) = xml::child(author, "address") {
            if let Some(postal) = xml::child(address, "postal") {
                for street in xml::children(postal, "street") {
                    let text = xml::element_text(street);
                    if !text.is_empty() {
                        lines.push(text);
                    }
                }
                let mut cityline = String::new();
                if let Some(city) = xml::child(postal, "city") {
                    cityline.push_str(&xml::element_text(city));
                }
                if let Some(region) = xml::child(postal, "region") {
                    let text = xml::element_text(region);
                    if !text.is_empty() {
                        if !cityline.is_empty() {
                            cityline.push_str(", ");
                        }
                        cityline.push_str(&text);
                    }
                }
                if let Some(code) = xml::child(postal, "code") {
                    let text = xml::element_text(code);
                    if !text.is_empty() {
                        if !cityline.is_empty() {
                            cityline.push_str("  ");
                        }
                        cityline.push_str(&text);
                    }
                }
                if !cityline.is_empty() {
                    lines.push(cityline);
                }
                if let Some(country) = xml::child(postal, "country") {
                    let text = xml::element_text(country);
                    if !text.is_empty() {
                        lines.push(text);
                    }
                }
            }
            lines.push(String::new());
            if let Some(phone) = xml::child(address, "phone") {
                let text = xml::element_text(phone);
                if !text.is_empty() {
                    lines.push(format!("Phone: {text}"));
                }
            }
            if let Some(fax) = xml::child(address, "facsimile") {
                let text = xml::element_text(fax);
                if !text.is_empty() {
                    lines.push(format!("Fax:   {text}"));
                }
            }
            if let Some(email) = xml::child(address, "email") {
                let text = xml::element_text(email);
                if !text.is_empty() {
                    let label = if self.ctx.pis.rfcedstyle { "EMail" } else { "Email" };
                    lines.push(format!("{label}: {text}"));
                }
            }
            if let Some(uri) = xml::child(address, "uri") {
                let text = xml::element_text(uri);
                if !text.is_empty() {
                    lines.push(format!("URI:   {text}"));
                }
            }
        }
        let margin = self.margin;
        self.write_raw(&lines.join("\n"), margin, Align::Left, 0, None, true, None);
        self.lb();
    }

    // ------------------------------------------------------------------
    // top block

    fn write_top(&mut self, left: &[String], right: &[String]) {
        self.lb();
        let mut heading = Vec::new();
        for i in 0..left.len().max(right.len()) {
            let l = left.get(i).map(String::as_str).unwrap_or("");
            let r = right.get(i).map(String::as_str).unwrap_or("");
            heading.push(wrap::justify_inline(l, "", r, self.width, self.diag));
        }
        self.write_raw(&heading.join("\n"), 0, Align::Left, 0, None, false, None);
        self.lb();
    }

    fn prepare_top_left(&self, front: Node) -> Vec<String> {
        let mut lines = Vec::new();
        let workgroup = xml::child(front, "workgroup")
            .map(xml::element_text)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Network Working Group".to_string());
        lines.push(workgroup.trim().to_string());
        if self.draft {
            lines.push("Internet-Draft".to_string());
        } else {
            lines.push(format!(
                "Request for Comments: {}",
                xml::attr(self.root, "number").unwrap_or("")
            ));
        }
        if let Some(updates) = xml::attr(self.root, "updates") {
            if !updates.is_empty() {
                lines.push(format!("Updates: {updates}"));
            }
        }
        if let Some(obsoletes) = xml::attr(self.root, "obsoletes") {
            if !obsoletes.is_empty() {
                lines.push(format!("Obsoletes: {obsoletes}"));
            }
        }
        if let Some(category) = xml::attr(self.root, "category") {
            if let Some(name) = boilerplate::category_name(category) {
                if self.draft {
                    lines.push(format!("Intended status: {name}"));
                } else {
                    lines.push(format!("Category: {name}"));
                }
            }
        }
        if self.draft {
            if let Some(expire) = &self.expire_date {
                lines.push(format!("Expires: {expire}"));
            }
        }
        lines.iter().map(|l| l.trim().to_string()).collect()
    }

    fn prepare_top_right(&self, front: Node) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let mut last_org: Option<String> = None;
        for author in xml::children(front, "author") {
            let initials = xml::attr(author, "initials").unwrap_or("");
            let surname = xml::attr(author, "surname").unwrap_or("");
            if !surname.is_empty() {
                if initials.is_empty() {
                    lines.push(surname.to_string());
                } else {
                    lines.push(format!("{initials} {surname}"));
                }
            }
            if let Some(org_node) = xml::child(author, "organization") {
                let org = xml::attr(org_node, "abbrev")
                    .map(str::to_string)
                    .unwrap_or_else(|| xml::element_text(org_node));
                let org = org.trim().to_string();
                if !org.is_empty() {
                    if last_org.as_deref() == Some(&org) {
                        // consecutive authors from the same organization
                        // share one organization line
                        if let Some(pos) = lines.iter().position(|l| *l == org) {
                            lines.remove(pos);
                        }
                    }
                    last_org = Some(org.clone());
                    lines.push(org);
                }
            }
        }
        let (month, day, year) = self.resolve_date(front);
        let mut date_line = String::new();
        if !month.is_empty() {
            date_line.push_str(&month);
            date_line.push(' ');
        }
        if let Some(day) = day {
            date_line.push_str(&format!("{day}, "));
        }
        date_line.push_str(&year);
        lines.push(date_line.trim().to_string());
        lines.iter().map(|l| l.trim().to_string()).collect()
    }

    /// Month name, optional day and year of the document date, falling back
    /// to "today" (with a diagnostic) when absent or non-numeric.
    fn resolve_date(&self, front: Node) -> (String, Option<u32>, String) {
        let date = xml::child(front, "date");
        let month = date
            .and_then(|d| xml::attr(d, "month"))
            .unwrap_or("")
            .to_string();
        let year_attr = date.and_then(|d| xml::attr(d, "year"));
        let day_attr = date.and_then(|d| xml::attr(d, "day"));
        let day = day_attr.and_then(|v| v.parse::<u32>().ok());
        if day_attr.is_some() && day.is_none() {
            self.diag
                .warn("Non-numeric day in date element, ignoring it.");
        }
        match year_attr {
            Some(y) if y.parse::<i32>().is_ok() => (month, day, y.to_string()),
            other => {
                if other.is_some() {
                    self.diag
                        .warn("Non-numeric year in date element, using today's date.");
                }
                let month = if month.is_empty() {
                    month_name(self.today.month())
                } else {
                    month
                };
                (month, day, self.today.year().to_string())
            }
        }
    }

    /// Internet-Drafts expire six months (185 days, per the publication
    /// convention) after their date.
    fn compute_expire_date(&self) -> Option<String> {
        if !self.draft {
            return None;
        }
        let front = xml::child(self.root, "front")?;
        let (month, _, year) = self.resolve_date(front);
        let start = NaiveDate::parse_from_str(&format!("1 {month} {year}"), "%d %B %Y").ok()?;
        let expire = start + Duration::days(6 * 30 + 15);
        Some(format!("{} {}", month_name(expire.month()), expire.year()))
    }

    fn prepare_headers_footers(&mut self) {
        let front = xml::child(self.root, "front");
        self.left_header = if self.draft {
            "Internet-Draft".to_string()
        } else {
            format!("RFC {}", xml::attr(self.root, "number").unwrap_or(""))
        };
        if let Some(front) = front {
            if let Some(title) = xml::child(front, "title") {
                self.center_header = xml::attr(title, "abbrev")
                    .map(str::to_string)
                    .unwrap_or_else(|| xml::element_text(title));
            }
            let (month, _, year) = self.resolve_date(front);
            self.right_header = format!("{month} {year}").trim().to_string();
            let surnames: Vec<String> = xml::children(front, "author")
                .iter()
                .filter_map(|a| xml::attr(*a, "surname"))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            self.left_footer = match surnames.len() {
                0 => String::new(),
                1 => surnames[0].clone(),
                2 => format!("{} & {}", surnames[0], surnames[1]),
                _ => format!("{}, et al.", surnames[0]),
            };
        }
        self.center_footer = if self.draft {
            match &self.expire_date {
                Some(date) => format!("Expires {date}"),
                None => String::new(),
            }
        } else {
            boilerplate::category_name(xml::attr(self.root, "category").unwrap_or(""))
                .unwrap_or("")
                .to_string()
        };
        if let Some(footer) = &self.ctx.pis.footer {
            self.center_footer = footer.clone();
        }
        if let Some(header) = &self.ctx.pis.header {
            self.left_header = header.clone();
        }
    }

    // ------------------------------------------------------------------
    // table of contents and keyword index

    /// Render the table of contents to a detached buffer. With `paging`,
    /// each entry gets a dot fill and a right-justified page number.
    pub(crate) fn write_toc(&self, paging: bool) -> Vec<String> {
        if self.ctx.toc_marker < 1 {
            return Vec::new();
        }
        let mut tmpbuf = vec![String::new(), "Table of Contents".to_string(), String::new()];
        let tocdepth = self.ctx.pis.tocdepth;
        let indent_scale = if self.ctx.pis.tocnarrow { 2 } else { 3 };
        for item in self.index.iter().filter(|i| i.toc) {
            if item.level > tocdepth {
                continue;
            }
            let mut counter = String::new();
            if !item.counter.is_empty() {
                counter = format!("{}. ", item.counter);
                // extra space on single-digit counters for visual alignment
                if item.counter.rsplit('.').next().map_or(0, |c| c.chars().count()) == 1 {
                    counter.push(' ');
                }
            }
            let mut depth = item.level.saturating_sub(1);
            if !self.ctx.pis.tocindent {
                depth = 0;
            }
            if item.level == 1 && item.appendix {
                counter = format!("Appendix {counter}");
            }
            let bullet = format!("{}{}", " ".repeat(depth * indent_scale), counter);
            let indent = 3;
            let sub_indent = indent + bullet.chars().count();
            let page_str = format!("{:>4}", item.page);
            let wrapper = TextWrapper::new(self.width - page_str.chars().count());
            let opts = WrapOpts {
                initial_indent: " ".repeat(indent),
                subsequent_indent: " ".repeat(sub_indent),
                fix_sentence_endings: false,
                fix_doublespace: false,
                ..WrapOpts::default()
            };
            let mut lines = wrapper.wrap(&format!("{bullet}{}", item.title), &opts);
            if lines.is_empty() {
                continue;
            }
            if paging {
                let last = lines.pop().expect("toc line");
                let prefix = if last.chars().count() % 2 == 1 { " " } else { "" };
                let fill = (self.width as i64 - last.chars().count() as i64
                    - prefix.len() as i64
                    + 1)
                    .max(0) as usize
                    / 2;
                let mut dotted = format!("{last}{prefix}{}", " .".repeat(fill));
                let keep = dotted.chars().count().saturating_sub(page_str.chars().count());
                dotted = dotted.chars().take(keep).collect::<String>() + &page_str;
                lines.push(dotted);
            }
            tmpbuf.extend(lines);
        }
        tmpbuf
    }

    /// Render the keyword index to a detached buffer: terms grouped by
    /// first letter, each with its sorted, deduplicated page list.
    pub(crate) fn write_iref_index(&self) -> Vec<String> {
        if self.ctx.iref_marker < 1 {
            return Vec::new();
        }
        let mut tmpbuf = vec![String::new(), "Index".to_string()];
        let mut buckets: BTreeMap<char, Vec<&String>> = BTreeMap::new();
        for key in self.iref_index.keys() {
            let letter = key
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or(' ');
            buckets.entry(letter).or_default().push(key);
        }
        let item_opts = |indent: usize| WrapOpts {
            initial_indent: " ".repeat(indent),
            subsequent_indent: " ".repeat(indent),
            fix_sentence_endings: false,
            fix_doublespace: false,
            ..WrapOpts::default()
        };
        for (letter, keys) in buckets {
            tmpbuf.push(String::new());
            tmpbuf.push(format!("   {letter}"));
            for key in keys {
                let entry = &self.iref_index[key];
                let line = format!("{key}  {}", page_list(&entry.pages));
                tmpbuf.extend(self.wrapper.wrap(line.trim_end(), &item_opts(6)));
                for (subitem, pages) in &entry.subitems {
                    let line = format!("{subitem}  {}", page_list(pages));
                    tmpbuf.extend(self.wrapper.wrap(line.trim_end(), &item_opts(9)));
                }
            }
        }
        tmpbuf
    }

    /// Final output for the raw strategy: the buffer with the TOC and
    /// keyword index spliced in at the recorded markers.
    fn splice_raw(&self) -> Vec<String> {
        let buf = &self.ctx.buf;
        let toc = self.ctx.toc_marker;
        let iref = self.ctx.iref_marker;
        let mut out: Vec<String> = Vec::with_capacity(buf.len() + 64);
        if toc > 0 {
            out.extend_from_slice(&buf[..toc]);
            out.extend(self.write_toc(false));
            if iref > toc {
                out.extend_from_slice(&buf[toc..iref]);
                out.extend(self.write_iref_index());
                out.extend_from_slice(&buf[iref..]);
            } else {
                out.extend_from_slice(&buf[toc..]);
            }
        } else if iref > 0 {
            out.extend_from_slice(&buf[..iref]);
            out.extend(self.write_iref_index());
            out.extend_from_slice(&buf[iref..]);
        } else {
            out.extend_from_slice(buf);
        }
        out
    }

    // ------------------------------------------------------------------
    // index lookups

    pub(crate) fn item_by_user_anchor(&self, anchor: &str) -> Option<&IndexItem> {
        if anchor.is_empty() {
            return None;
        }
        self.index
            .iter()
            .find(|item| item.anchor.as_deref() == Some(anchor))
    }

    pub(crate) fn set_page_by_auto_anchor(&mut self, anchor: &str, page: u32) {
        if let Some(item) = self
            .index
            .iter_mut()
            .find(|item| item.auto_anchor == anchor)
        {
            item.page = page;
        }
    }

    fn warn_unknown(&mut self, node: Node) {
        let tag = node.tag_name().name().to_string();
        if tag.is_empty() || self.unknown_tags.contains(&tag) {
            return;
        }
        let line = self.line_of(node);
        self.unknown_tags.insert(tag.clone());
        self.diag
            .warn_at(Some(line), format!("Unknown element <{tag}> encountered, skipping"));
    }

    fn line_of(&self, node: Node) -> u32 {
        xml::source_line(self.doc, node)
    }
}

/// Parameters threaded through recursive `<t>` rendering.
struct TRecParams {
    indent: usize,
    sub_indent: usize,
    bullet: String,
    align: Align,
    level: usize,
    leading_blankline: bool,
}

impl Default for TRecParams {
    fn default() -> Self {
        Self {
            indent: 3,
            sub_indent: 0,
            bullet: String::new(),
            align: Align::Left,
            level: 0,
            leading_blankline: true,
        }
    }
}

fn page_list(pages: &[u32]) -> String {
    let mut sorted: Vec<u32> = pages.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn month_name(month: u32) -> String {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
    .to_string()
}

fn expand_tabs(text: &str, tabsize: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut col = 0usize;
    for c in text.chars() {
        match c {
            '\t' => {
                let spaces = tabsize - col % tabsize;
                out.push_str(&" ".repeat(spaces));
                col += spaces;
            }
            '\n' => {
                out.push('\n');
                col = 0;
            }
            _ => {
                out.push(c);
                col += 1;
            }
        }
    }
    out
}
