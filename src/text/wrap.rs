//! Width-constrained word wrapping with the publication format's quirks:
//! protected "Section N"-style tokens, slash/hyphen break points, the
//! two-space inter-sentence convention and an abbreviation exception list.

use std::sync::OnceLock;

use regex::Regex;

use crate::diag::Diagnostics;

/// Non-breaking space: glues "Section" / "Figure" etc. to their number.
pub const NBSP: char = '\u{00A0}';
/// Non-breaking hyphen: rendered as '-' but never offered as a break point.
pub const NBHY: char = '\u{2011}';
/// Word joiner: suppresses the break point it follows, removed on output.
pub const WJ: char = '\u{2060}';

fn sentence_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"[A-Za-z0-9>\])"'][.!?]["')\]]?$"#).expect("sentence-end pattern")
    })
}

fn not_sentence_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Initials ("J."), three-letter capitalized abbreviations ("Fig."),
    // and the explicit exception list.
    RE.get_or_init(|| {
        Regex::new(
            r#"(^|[^A-Za-z])([A-Za-z]\.[\])'"]*|([A-Z][a-z][a-z]|Eq|[Cc]f|vs|resp|viz|ibid|[JS]r|M[rs]|Messrs|Mmes|Dr|Profs?|St|Lt)\.)$"#,
        )
        .expect("abbreviation pattern")
    })
}

fn sentence_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^["'(\[]*[A-Z]"#).expect("sentence-start pattern"))
}

/// Per-call wrapping knobs; the indents are prepended to the produced lines.
#[derive(Clone, Debug)]
pub struct WrapOpts {
    pub initial_indent: String,
    pub subsequent_indent: String,
    pub fix_doublespace: bool,
    pub fix_sentence_endings: bool,
    pub drop_whitespace: bool,
}

impl Default for WrapOpts {
    fn default() -> Self {
        Self {
            initial_indent: String::new(),
            subsequent_indent: String::new(),
            fix_doublespace: true,
            fix_sentence_endings: true,
            drop_whitespace: true,
        }
    }
}

pub struct TextWrapper {
    pub width: usize,
}

impl TextWrapper {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Break `text` into lines of at most `self.width` characters, each
    /// already carrying its indent. A single token wider than the usable
    /// width is left overlong rather than truncated; the caller's long-line
    /// check reports it.
    pub fn wrap(&self, text: &str, opts: &WrapOpts) -> Vec<String> {
        let mut text = munge_whitespace(text);
        if opts.fix_doublespace {
            text = fix_doublespace(&text);
        }
        text = protect_keywords(&text);

        let parts: Vec<String> = split(&text).into_iter().map(|s| replace_markers(&s)).collect();

        // Tokens that cannot fit get one more pass through the splitter,
        // this time without their joiner protection.
        let max_word_len = self.width.saturating_sub(opts.subsequent_indent.chars().count());
        let mut chunks: Vec<String> = Vec::new();
        for chunk in parts {
            if chunk.chars().count() > max_word_len {
                chunks.extend(split(&chunk));
            } else {
                chunks.push(chunk);
            }
        }

        if opts.fix_sentence_endings {
            fix_sentence_endings(&mut chunks);
        }
        self.wrap_chunks(chunks, opts)
    }

    fn wrap_chunks(&self, chunks: Vec<String>, opts: &WrapOpts) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let mut rev: Vec<String> = chunks.into_iter().rev().collect();
        while !rev.is_empty() {
            let indent = if lines.is_empty() {
                &opts.initial_indent
            } else {
                &opts.subsequent_indent
            };
            let width = self.width.saturating_sub(indent.chars().count());

            if opts.drop_whitespace
                && !lines.is_empty()
                && rev.last().is_some_and(|c| c.trim().is_empty())
            {
                rev.pop();
            }

            let mut cur: Vec<String> = Vec::new();
            let mut cur_len = 0usize;
            while let Some(chunk) = rev.last() {
                let l = chunk.chars().count();
                if cur_len + l <= width {
                    cur_len += l;
                    cur.push(rev.pop().unwrap());
                } else {
                    break;
                }
            }

            // A token wider than the whole line goes on a line of its own.
            if cur.is_empty()
                && rev.last().is_some_and(|c| c.chars().count() > width)
            {
                cur.push(rev.pop().unwrap());
            }

            if opts.drop_whitespace && cur.last().is_some_and(|c| c.trim().is_empty()) {
                cur.pop();
            }

            if !cur.is_empty() {
                lines.push(format!("{}{}", indent, cur.concat()));
            }
        }
        lines
    }
}

/// Map literal tabs/newlines/carriage returns to spaces (tab stop 8).
fn munge_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut col = 0usize;
    for c in text.chars() {
        match c {
            '\t' => {
                let spaces = 8 - col % 8;
                for _ in 0..spaces {
                    out.push(' ');
                }
                col += spaces;
            }
            '\n' | '\r' | '\x0b' | '\x0c' => {
                out.push(' ');
                col += 1;
            }
            _ => {
                out.push(c);
                col += 1;
            }
        }
    }
    out
}

/// Collapse space runs: to a single space after ordinary characters, to two
/// after sentence-ending punctuation; runs after a closing bracket are kept
/// (citation labels carry their own spacing).
fn fix_doublespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut prev: Option<char> = None;
    while let Some(c) = chars.next() {
        if c != ' ' {
            out.push(c);
            prev = Some(c);
            continue;
        }
        let mut run = 1usize;
        while chars.peek() == Some(&' ') {
            run += 1;
            chars.next();
        }
        let keep = match prev {
            Some('.') | Some('!') | Some('?') => run.min(2),
            Some(']') | None => run,
            _ => 1,
        };
        out.push_str(&" ".repeat(keep));
        prev = Some(' ');
    }
    out
}

/// Glue "Section", "Appendix", "Figure" and "Table" to the token that
/// follows so the pair never breaks across lines.
fn protect_keywords(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(Section|Appendix|Figure|Table) ").expect("keyword pattern")
    });
    re.replace_all(text, format!("${{1}}{NBSP}").as_str()).into_owned()
}

/// Remove the private joiner characters once breaking decisions are done.
pub fn replace_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            NBSP => out.push(' '),
            NBHY => out.push('-'),
            WJ => {}
            _ => out.push(c),
        }
    }
    out
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_letterish(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_break_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Tokenize into alternating word and separator chunks. Break points are
/// whitespace runs, forward slashes, the hyphen of a hyphenated word (the
/// hyphen stays with the left part) and em-dash runs; a break point
/// immediately followed by a word joiner is suppressed.
pub fn split(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks: Vec<String> = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    let push = |chunks: &mut Vec<String>, from: usize, to: usize, chars: &[char]| {
        if to > from {
            chunks.push(chars[from..to].iter().collect());
        }
    };

    while i < chars.len() {
        let c = chars[i];
        if is_break_ws(c) {
            let mut j = i;
            while j < chars.len() && is_break_ws(chars[j]) {
                j += 1;
            }
            let mut end = j;
            if chars.get(j) == Some(&WJ) {
                // joiner right after the run: give back one space, or skip
                // the break entirely for a lone space
                if end - i > 1 {
                    end -= 1;
                } else {
                    i = j;
                    continue;
                }
            }
            push(&mut chunks, start, i, &chars);
            push(&mut chunks, i, end, &chars);
            start = end;
            i = j;
            continue;
        }
        if c == '/' {
            if chars.get(i + 1) != Some(&WJ) {
                push(&mut chunks, start, i, &chars);
                chunks.push("/".to_string());
                start = i + 1;
            }
            i += 1;
            continue;
        }
        if c == '-' {
            let mut j = i;
            while j < chars.len() && chars[j] == '-' {
                j += 1;
            }
            let run = j - i;
            if run >= 2 {
                // em-dash: separator between word-ish neighbours
                let prev_ok = i > 0
                    && (is_word(chars[i - 1]) || matches!(chars[i - 1], '!' | '"' | '\'' | '&' | '.' | ',' | '?'));
                let next_ok = j < chars.len() && is_word(chars[j]);
                if prev_ok && next_ok {
                    push(&mut chunks, start, i, &chars);
                    push(&mut chunks, i, j, &chars);
                    start = j;
                }
                i = j;
                continue;
            }
            // hyphenated word: offer a break after "word-" when both sides
            // look like words (letters, not digit runs)
            if chars.get(i + 1) == Some(&WJ) {
                i += 1;
                continue;
            }
            let prev_ok = i >= 2 && is_letterish(chars[i - 1]) && is_word(chars[i - 2]);
            let mut next_ok = false;
            let mut k = i + 1;
            let mut seen = 0usize;
            while k < chars.len() && is_word(chars[k]) {
                seen += 1;
                if seen >= 2 && is_letterish(chars[k]) {
                    next_ok = true;
                }
                k += 1;
            }
            if prev_ok && next_ok {
                push(&mut chunks, start, i + 1, &chars);
                start = i + 1;
            }
            i += 1;
            continue;
        }
        i += 1;
    }
    push(&mut chunks, start, chars.len(), &chars);
    chunks
}

/// Widen the single space between a sentence end and a capitalized next
/// chunk to two, skipping known abbreviations.
fn fix_sentence_endings(chunks: &mut [String]) {
    let mut i = 0;
    while i + 2 < chunks.len() {
        if chunks[i + 1] == " "
            && sentence_end_re().is_match(&chunks[i])
            && !not_sentence_end_re().is_match(&chunks[i])
            && sentence_start_re().is_match(&chunks[i + 2])
        {
            chunks[i + 1] = "  ".to_string();
            i += 2;
        } else {
            i += 1;
        }
    }
}

/// Insert word joiners after the slashes and hyphens of URLs so they are
/// kept on one line.
pub fn urlkeep(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"https?:\S*").expect("url pattern"));
    re.replace_all(text, |caps: &regex::Captures| {
        let mut out = String::new();
        for c in caps[0].chars() {
            out.push(c);
            if c == '/' || c == '-' {
                out.push(WJ);
            }
        }
        out
    })
    .into_owned()
}

/// Combine three strings into one line of exactly `width` characters with
/// the parts left-justified, centered and right-justified. Overflow
/// truncates the longest part with a diagnostic.
pub fn justify_inline(
    left: &str,
    center: &str,
    right: &str,
    width: usize,
    diag: &Diagnostics,
) -> String {
    let mut parts = [
        left.trim().to_string(),
        center.trim().to_string(),
        right.trim().to_string(),
    ];
    let sum: usize = parts.iter().map(|s| s.chars().count()).sum();
    if sum > width {
        let longest = (0..3)
            .max_by_key(|&i| (parts[i].chars().count(), std::cmp::Reverse(i)))
            .unwrap();
        diag.warn(format!(
            "The inline string was truncated because it was too long:\n  {}",
            parts[longest]
        ));
        let keep = parts[longest]
            .chars()
            .count()
            .saturating_sub(sum - width);
        parts[longest] = parts[longest].chars().take(keep).collect();
    }

    let center_field = if parts[1].chars().count() % 2 == 0 {
        center_str(&parts[1], width)
    } else {
        center_str(&parts[1], width + 1)
    };
    let right_field = format!("{:>width$}", parts[2], width = width);

    let mut out: Vec<char> = format!("{:<width$}", parts[0], width = width).chars().collect();
    let center_chars: Vec<char> = center_field.chars().collect();
    let right_chars: Vec<char> = right_field.chars().collect();
    for i in 0..width {
        if center_chars.get(i).copied().unwrap_or(' ') != ' ' {
            out[i] = center_chars[i];
        } else if right_chars[i] != ' ' {
            out[i] = right_chars[i];
        }
    }
    out.into_iter().collect()
}

/// Center with any odd padding placed on the right.
pub(crate) fn center_str(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

// ----------------------------------------------------------------------
// Counter glyphs for list numbering.

/// 0 -> "a", 25 -> "z", 26 -> "ba" (generic base-26 conversion).
pub fn int2letter(mut num: u32) -> String {
    const DIGITS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
    if num == 0 {
        return "a".to_string();
    }
    let mut s = Vec::new();
    while num > 0 {
        s.push(DIGITS[(num % 26) as usize]);
        num /= 26;
    }
    s.reverse();
    String::from_utf8(s).expect("ascii letters")
}

pub fn int2roman(mut number: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut result = String::new();
    for (value, numeral) in NUMERALS {
        while number >= value {
            result.push_str(numeral);
            number -= value;
        }
    }
    result
}

/// Expand a list `format` pattern (`%d`, `%c`, `%C`, `%i`, `%I`, `%o`,
/// `%x`, `%X`) for one counter value, padding numeric glyphs to the width
/// of the largest value in the list, and append the bullet gap.
pub(crate) fn format_counter(pattern: &str, count: u32, list_length: usize) -> String {
    let list_length = list_length.max(1) as u32;
    let dec_width = list_length.to_string().len();
    let roman_width = int2roman(list_length).len();
    let mut out = pattern.to_string();
    if out.contains("%d") {
        out = out.replace("%d", &format!("{:>dec_width$}", count));
    }
    if out.contains("%c") {
        out = out.replace("%c", &int2letter(count.saturating_sub(1)));
    }
    if out.contains("%C") {
        out = out.replace("%C", &int2letter(count.saturating_sub(1)).to_uppercase());
    }
    if out.contains("%i") {
        out = out.replace("%i", &format!("{:>roman_width$}", int2roman(count)));
    }
    if out.contains("%I") {
        out = out.replace(
            "%I",
            &format!("{:>roman_width$}", int2roman(count).to_uppercase()),
        );
    }
    if out.contains("%o") {
        out = out.replace("%o", &format!("{:o}", count));
    }
    if out.contains("%x") {
        out = out.replace("%x", &format!("{:x}", count));
    }
    if out.contains("%X") {
        out = out.replace("%X", &format!("{:X}", count));
    }
    out + "  "
}

pub(crate) const ALLOWED_FORMATS: [&str; 8] = ["%c", "%C", "%d", "%i", "%I", "%o", "%x", "%X"];

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str, width: usize) -> Vec<String> {
        TextWrapper::new(width).wrap(text, &WrapOpts::default())
    }

    #[test]
    fn lines_fit_width() {
        let lines = wrap(
            "The quick brown fox jumps over the lazy dog and keeps on running.",
            20,
        );
        assert!(lines.iter().all(|l| l.chars().count() <= 20), "{lines:?}");
    }

    #[test]
    fn empty_input_gives_no_lines() {
        assert!(wrap("", 20).is_empty());
    }

    #[test]
    fn rewrap_is_idempotent() {
        let text = "Sentence one ends here.  Sentence two follows it, with a hyphen-joined pair.";
        let first = wrap(text, 28);
        let rejoined = first.join(" ");
        let second = wrap(&rejoined, 28);
        assert_eq!(first, second);
    }

    #[test]
    fn overlong_token_is_not_truncated() {
        let lines = wrap("see this-is-one-extremely-long-token word", 12);
        assert!(lines.iter().any(|l| l.ends_with('-')));
        // pieces stay intact
        assert_eq!(lines.concat().replace(' ', ""), "seethis-is-one-extremely-long-tokenword");
    }

    #[test]
    fn section_number_stays_with_keyword() {
        let lines = wrap("For all the details refer to Section 4.2 of this memo", 32);
        for line in &lines {
            assert!(
                !line.trim_end().ends_with("Section"),
                "broke after keyword: {lines:?}"
            );
        }
    }

    #[test]
    fn sentence_ending_fix_skips_abbreviations() {
        let lines = wrap("See Fig. 1. Next sentence.", 72);
        assert_eq!(lines, vec!["See Fig. 1.  Next sentence.".to_string()]);
    }

    #[test]
    fn word_joiner_suppresses_slash_break() {
        let protected = format!("a/{WJ}b cd", WJ = WJ);
        let chunks = split(&protected);
        assert_eq!(chunks[0], format!("a/{WJ}b"));
    }

    #[test]
    fn hyphen_break_keeps_hyphen_left() {
        assert_eq!(split("well-known"), vec!["well-", "known"]);
        // digit runs are not hyphenation points
        assert_eq!(split("RFC-2119"), vec!["RFC-2119"]);
    }

    #[test]
    fn em_dash_is_own_chunk() {
        assert_eq!(split("yes--no"), vec!["yes", "--", "no"]);
    }

    #[test]
    fn justify_is_exact_width() {
        let diag = Diagnostics::new();
        let line = justify_inline("left", "center", "right", 40, &diag);
        assert_eq!(line.chars().count(), 40);
        assert!(line.starts_with("left"));
        assert!(line.ends_with("right"));
        assert_eq!(diag.warning_count(), 0);
    }

    #[test]
    fn justify_truncates_longest_with_warning() {
        let diag = Diagnostics::new();
        let line = justify_inline("aaaaaaaaaa", "bbbbbbbbbbbbbbbbbbbb", "cc", 20, &diag);
        assert_eq!(line.chars().count(), 20);
        assert_eq!(diag.warning_count(), 1);
    }

    #[test]
    fn counters() {
        assert_eq!(int2letter(0), "a");
        assert_eq!(int2letter(25), "z");
        assert_eq!(int2roman(4), "iv");
        assert_eq!(int2roman(1987), "mcmlxxxvii");
        assert_eq!(format_counter("%d.", 2, 12), " 2.  ");
        assert_eq!(format_counter("(%c)", 1, 3), "(a)  ");
        assert_eq!(format_counter("%X-", 255, 1), "FF-  ");
    }
}
