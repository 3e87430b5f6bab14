//! Read-only helpers over the roxmltree document.
//!
//! The writer never mutates the tree; newline munging, entity cleanup and
//! the ASCII fallback substitution all happen here, at extraction time.

use roxmltree::{Document, Node, NodeType};

use crate::diag::Diagnostics;
use crate::options::Pis;

pub(crate) fn child<'a, 'i>(node: Node<'a, 'i>, tag: &str) -> Option<Node<'a, 'i>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

pub(crate) fn children<'a, 'i>(node: Node<'a, 'i>, tag: &str) -> Vec<Node<'a, 'i>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().name() == tag)
        .collect()
}

/// Element, processing-instruction and comment children, in document order.
/// Comments are kept so the text following them is not lost.
pub(crate) fn content_children<'a, 'i>(node: Node<'a, 'i>) -> Vec<Node<'a, 'i>> {
    node.children()
        .filter(|n| {
            n.is_element()
                || matches!(n.node_type(), NodeType::PI | NodeType::Comment)
        })
        .collect()
}

pub(crate) fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
}

pub(crate) fn source_line(doc: &Document, node: Node) -> u32 {
    doc.text_pos_at(node.range().start).row
}

/// Collapse the newlines XML authoring leaves in text content: a newline run
/// after a period becomes the two-space sentence gap, any other newline run
/// becomes a single space. Artwork is never passed through here.
pub(crate) fn format_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if !c.is_whitespace() {
            out.push(c);
            continue;
        }
        let mut run = String::new();
        run.push(c);
        let mut saw_nl = c == '\n';
        while let Some(&n) = chars.peek() {
            if !n.is_whitespace() {
                break;
            }
            if n == '\n' {
                saw_nl = true;
            }
            run.push(n);
            chars.next();
        }
        if saw_nl {
            if out.ends_with('.') {
                out.push_str("  ");
            } else {
                out.push(' ');
            }
        } else {
            out.push_str(&run);
        }
    }
    out
}

/// Direct text content of an element, newline-munged and ASCII-substituted.
pub(crate) fn element_text(node: Node) -> String {
    match node.text() {
        Some(t) => to_ascii(&format_whitespace(t)),
        None => String::new(),
    }
}

/// Raw text content with whitespace preserved (artwork).
pub(crate) fn raw_text(node: Node) -> String {
    node.text().map(|t| to_ascii(t)).unwrap_or_default()
}

/// Text following an element (its "tail" in lxml terms): the run of text
/// siblings up to the next element.
pub(crate) fn tail_text(node: Node) -> String {
    let mut out = String::new();
    let mut sib = node.next_sibling();
    while let Some(n) = sib {
        if !n.is_text() {
            break;
        }
        if let Some(t) = n.text() {
            out.push_str(t);
        }
        sib = n.next_sibling();
    }
    if out.is_empty() {
        out
    } else {
        to_ascii(&format_whitespace(&out))
    }
}

/// Apply one `<?rfc key="value" ...?>` node to the PI state.
pub(crate) fn apply_pi(node: Node, pis: &mut Pis, diag: &Diagnostics) {
    let Some(pi) = node.pi() else { return };
    if pi.target != "rfc" {
        return;
    }
    let Some(value) = pi.value else { return };
    for (key, val) in parse_pi_pairs(value) {
        pis.set(&key, &val, diag);
    }
}

/// Split PI text of the form `key="val" key2='val2'` into pairs.
pub(crate) fn parse_pi_pairs(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let bytes: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < bytes.len() {
        while i < bytes.len() && !bytes[i].is_alphanumeric() && bytes[i] != '-' && bytes[i] != '_' {
            i += 1;
        }
        let key_start = i;
        while i < bytes.len() && bytes[i] != '=' && !bytes[i].is_whitespace() {
            i += 1;
        }
        let key: String = bytes[key_start..i].iter().collect();
        while i < bytes.len() && (bytes[i] == '=' || bytes[i].is_whitespace()) {
            if bytes[i] == '=' {
                i += 1;
                break;
            }
            i += 1;
        }
        if i >= bytes.len() || (bytes[i] != '"' && bytes[i] != '\'') {
            continue;
        }
        let quote = bytes[i];
        i += 1;
        let val_start = i;
        while i < bytes.len() && bytes[i] != quote {
            i += 1;
        }
        let val: String = bytes[val_start..i].iter().collect();
        i += 1;
        if !key.is_empty() {
            pairs.push((key, val));
        }
    }
    pairs
}

/// ASCII fallback substitution for text output, following the published
/// replacement table for rfc2629 entities. Unmapped non-ASCII characters
/// are emitted as numeric character references rather than dropped.
pub(crate) fn to_ascii(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        match ascii_replacement(c) {
            Some(rep) => out.push_str(rep),
            // wrapper control characters survive substitution; they are
            // resolved by the wrapping pass
            None if c == '\u{00A0}' || c == '\u{2011}' || c == '\u{2060}' => out.push(c),
            None => out.push_str(&format!("&#{};", c as u32)),
        }
    }
    out
}

fn ascii_replacement(c: char) -> Option<&'static str> {
    Some(match c {
        '\u{00A1}' => "!",
        '\u{00A2}' => "[cents]",
        '\u{00A3}' => "GBP",
        '\u{00A4}' => "[currency units]",
        '\u{00A5}' => "JPY",
        '\u{00A6}' => "|",
        '\u{00A7}' => "S.",
        '\u{00A9}' => "(C)",
        '\u{00AB}' => "<<",
        '\u{00AC}' => "[not]",
        '\u{00AE}' => "(R)",
        '\u{00AF}' => "_",
        '\u{00B0}' => "o",
        '\u{00B1}' => "+/-",
        '\u{00B2}' => "^2",
        '\u{00B3}' => "^3",
        '\u{00B4}' => "'",
        '\u{00B5}' => "[micro]",
        '\u{00B6}' => "P.",
        '\u{00B7}' => ".",
        '\u{00B9}' => "^1",
        '\u{00BB}' => ">>",
        '\u{00BC}' => "1/4",
        '\u{00BD}' => "1/2",
        '\u{00BE}' => "3/4",
        '\u{00BF}' => "?",
        '\u{00C0}'..='\u{00C3}' => "A",
        '\u{00C4}' | '\u{00C5}' => "Ae",
        '\u{00C6}' => "AE",
        '\u{00C7}' => "C",
        '\u{00C8}'..='\u{00CB}' => "E",
        '\u{00CC}'..='\u{00CF}' => "I",
        '\u{00D0}' => "[ETH]",
        '\u{00D1}' => "N",
        '\u{00D2}'..='\u{00D5}' => "O",
        '\u{00D6}' | '\u{00D8}' => "Oe",
        '\u{00D7}' => "x",
        '\u{00D9}'..='\u{00DB}' => "U",
        '\u{00DC}' => "Ue",
        '\u{00DD}' => "Y",
        '\u{00DE}' => "[THORN]",
        '\u{00DF}' => "ss",
        '\u{00E0}'..='\u{00E3}' => "a",
        '\u{00E4}'..='\u{00E6}' => "ae",
        '\u{00E7}' => "c",
        '\u{00E8}'..='\u{00EB}' => "e",
        '\u{00EC}'..='\u{00EF}' => "i",
        '\u{00F0}' => "[eth]",
        '\u{00F1}' => "n",
        '\u{00F2}'..='\u{00F5}' => "o",
        '\u{00F6}' | '\u{00F8}' => "oe",
        '\u{00F7}' => "/",
        '\u{00F9}'..='\u{00FB}' => "u",
        '\u{00FC}' => "ue",
        '\u{00FD}' | '\u{00FF}' => "y",
        '\u{00FE}' => "[thorn]",
        '\u{0152}' => "OE",
        '\u{0153}' => "oe",
        '\u{0160}' => "S",
        '\u{0161}' => "s",
        '\u{0178}' => "Y",
        '\u{017D}' => "Z",
        '\u{017E}' => "z",
        '\u{0192}' => "f",
        '\u{02DC}' => "~",
        '\u{2002}' | '\u{2003}' | '\u{2009}' => " ",
        '\u{2010}' | '\u{2013}' => "-",
        '\u{2014}' => "--",
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' => "\"",
        '\u{2020}' => "*!*",
        '\u{2021}' => "*!!*",
        '\u{2022}' => "o",
        '\u{2026}' => "...",
        '\u{2030}' => "[/1000]",
        '\u{2039}' | '\u{2329}' => "<",
        '\u{203A}' | '\u{232A}' => ">",
        '\u{2044}' => "/",
        '\u{20AC}' => "EUR",
        '\u{2122}' => "[TM]",
        '\u{2190}' => "<--",
        '\u{2192}' => "-->",
        '\u{2194}' => "<->",
        '\u{21D0}' => "<==",
        '\u{21D2}' => "==>",
        '\u{21D4}' => "<=>",
        '\u{2212}' => "-",
        '\u{2217}' => "*",
        '\u{2264}' => "<=",
        '\u{2265}' => ">=",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_munging_preserves_sentence_gap() {
        assert_eq!(
            format_whitespace("First sentence.\n   Second line"),
            "First sentence.  Second line"
        );
        assert_eq!(format_whitespace("one\ntwo"), "one two");
        assert_eq!(format_whitespace("no newlines  here"), "no newlines  here");
    }

    #[test]
    fn pi_pairs_parse_mixed_quotes() {
        let pairs = parse_pi_pairs("toc=\"yes\" tocdepth='2'");
        assert_eq!(
            pairs,
            vec![
                ("toc".to_string(), "yes".to_string()),
                ("tocdepth".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn ascii_substitution() {
        assert_eq!(to_ascii("na\u{00EF}ve"), "naive");
        assert_eq!(to_ascii("\u{2264}10"), "<=10");
        assert_eq!(to_ascii("\u{0489}"), "&#1161;");
    }
}
