mod common;

use common::{document, render_paginated};

fn long_middle(paragraphs: usize) -> String {
    let mut out = String::from(r#"<section title="Filler">"#);
    for i in 0..paragraphs {
        out.push_str(&format!(
            "<t>Paragraph number {i} contains enough words to occupy a couple of \
             rendered lines once it has been wrapped to the configured width.</t>"
        ));
    }
    out.push_str("</section>");
    out
}

#[test]
fn pages_are_separated_by_footer_formfeed_header() {
    let xml = document("", &long_middle(40), "");
    let (lines, _) = render_paginated(&xml);
    let ff = lines
        .iter()
        .position(|l| l == "\u{c}")
        .expect("form feed between pages");
    // footer line precedes the form feed
    assert!(
        lines[ff - 1].contains("[Page 1]"),
        "missing footer: {:?}",
        &lines[ff.saturating_sub(3)..ff]
    );
    assert!(lines[ff - 1].starts_with("Doe"), "{:?}", lines[ff - 1]);
    assert!(lines[ff - 1].contains("Expires September 2011"));
    // header line follows it
    assert!(
        lines[ff + 1].starts_with("Internet-Draft"),
        "missing header: {:?}",
        lines[ff + 1]
    );
    assert!(lines[ff + 1].contains("Test"));
    assert!(lines[ff + 1].ends_with("March 2011"));
    assert_eq!(lines[ff + 1].chars().count(), 72);
}

#[test]
fn every_page_footer_is_numbered_in_order() {
    let xml = document("", &long_middle(80), "");
    let (lines, _) = render_paginated(&xml);
    let pages: Vec<usize> = lines
        .iter()
        .filter(|l| l.contains("[Page "))
        .map(|l| {
            let start = l.find("[Page ").unwrap() + 6;
            l[start..l.len() - 1].trim().parse().unwrap()
        })
        .collect();
    assert!(pages.len() >= 3, "expected several pages, got {pages:?}");
    let expected: Vec<usize> = (1..=pages.len()).collect();
    assert_eq!(pages, expected);
}

#[test]
fn figures_are_not_split_across_pages() {
    let artwork: String = (0..12)
        .map(|i| format!("line {i} of the diagram\n"))
        .collect();
    let mut middle = long_middle(18);
    middle.push_str(&format!(
        r#"<section title="Art"><figure><artwork>{artwork}</artwork></figure></section>"#
    ));
    let xml = document("", &middle, "");
    let (lines, _) = render_paginated(&xml);

    let first_art = lines
        .iter()
        .position(|l| l.contains("line 0 of the diagram"))
        .expect("artwork start");
    let last_art = lines
        .iter()
        .position(|l| l.contains("line 11 of the diagram"))
        .expect("artwork end");
    assert!(
        !lines[first_art..last_art].iter().any(|l| l == "\u{c}"),
        "artwork was split across a page boundary"
    );
}

#[test]
fn paginated_toc_carries_page_numbers() {
    let mut middle = long_middle(30);
    middle.push_str(r#"<section title="Target Section"><t>Findable body.</t></section>"#);
    let xml = document("", &middle, "").replace("<rfc", "<?rfc toc=\"yes\"?>\n<rfc");
    let (lines, _) = render_paginated(&xml);
    let toc_line = lines
        .iter()
        .find(|l| l.contains("Target Section") && l.contains(" . "))
        .expect("dotted toc entry");
    // dot fill ends in a right-justified page number
    let page: String = toc_line
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    assert!(!page.is_empty(), "no page number in {toc_line:?}");
    assert_eq!(toc_line.chars().count(), 72);
}

#[test]
fn index_terms_carry_page_numbers_when_paginated() {
    let mut middle = long_middle(10);
    middle.push_str(r#"<section title="Terms"><t>A <iref item="widget"/>widget.</t></section>"#);
    let xml = document("", &middle, "");
    let (lines, _) = render_paginated(&xml);
    let entry = lines
        .iter()
        .find(|l| l.trim_start().starts_with("widget"))
        .expect("index entry");
    assert!(
        entry.trim_end().chars().last().unwrap().is_ascii_digit(),
        "index entry has no page number: {entry:?}"
    );
}
