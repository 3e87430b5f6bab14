mod common;

use common::{assert_has_line, assert_has_line_containing, document, render_raw};

#[test]
fn hanging_list_pads_label_to_hang_indent() {
    let xml = document(
        "",
        r#"<section title="Intro">
             <t><list style="hanging">
               <t hangText="Note:">See above.</t>
             </list></t>
           </section>"#,
        "",
    );
    let (lines, _) = render_raw(&xml);
    assert_has_line(&lines, "   Note:  See above.");
}

#[test]
fn hanging_list_honors_explicit_hang_indent() {
    let xml = document(
        "",
        r#"<section title="Intro">
             <t><list style="hanging" hangIndent="10">
               <t hangText="ab">body text that is long enough to wrap across the margin and onto a second line for sure</t>
             </list></t>
           </section>"#,
        "",
    );
    let (lines, _) = render_raw(&xml);
    // label shorter than the hang indent is padded out to it
    assert_has_line_containing(&lines, "   ab        body text");
    // continuation lines align at indent + hangIndent (13 spaces exactly)
    let cont = lines
        .iter()
        .find(|l| l.starts_with("             ") && !l.starts_with("              "))
        .expect("continuation line");
    assert!(!cont.trim().is_empty());
}

#[test]
fn symbol_bullets_rotate_with_depth() {
    let xml = document(
        "",
        r#"<section title="Intro">
             <t><list style="symbols">
               <t>outer item</t>
               <t>second outer<list>
                 <t>inner item</t>
               </list></t>
             </list></t>
           </section>"#,
        "",
    );
    let (lines, _) = render_raw(&xml);
    assert_has_line(&lines, "   o  outer item");
    assert_has_line_containing(&lines, "*  inner item");
}

#[test]
fn numbered_and_lettered_lists() {
    let xml = document(
        "",
        r#"<section title="Intro">
             <t><list style="numbers">
               <t>first</t>
               <t>second</t>
             </list></t>
             <t><list style="letters">
               <t>alpha</t>
               <t>beta</t>
             </list></t>
           </section>"#,
        "",
    );
    let (lines, _) = render_raw(&xml);
    assert_has_line(&lines, "   1.  first");
    assert_has_line(&lines, "   2.  second");
    assert_has_line(&lines, "   a.  alpha");
    assert_has_line(&lines, "   b.  beta");
}

#[test]
fn format_list_counter_persists_across_lists() {
    let xml = document(
        "",
        r#"<section title="Intro">
             <t><list style="format REQ-%d:" counter="reqs">
               <t>one</t>
               <t>two</t>
             </list></t>
             <t><list style="format REQ-%d:" counter="reqs">
               <t>three</t>
             </list></t>
           </section>"#,
        "",
    );
    let (lines, _) = render_raw(&xml);
    assert_has_line_containing(&lines, "REQ-1:  one");
    assert_has_line_containing(&lines, "REQ-2:  two");
    // the named counter carries on in the second list
    assert_has_line_containing(&lines, "REQ-3:  three");
}

#[test]
fn invalid_format_glyph_warns_but_renders() {
    let xml = document(
        "",
        r#"<section title="Intro">
             <t><list style="format %q">
               <t>body</t>
             </list></t>
           </section>"#,
        "",
    );
    let (lines, diag) = render_raw(&xml);
    assert!(
        diag.warnings().iter().any(|w| w.contains("Invalid format")),
        "expected a format warning, got {:?}",
        diag.warnings()
    );
    assert_has_line_containing(&lines, "%q  body");
}

#[test]
fn subcompact_suppresses_blank_lines_between_items() {
    let xml = document(
        "",
        r#"<section title="Intro">
             <t><list style="symbols">
               <t>first</t>
               <t>second</t>
             </list></t>
           </section>"#,
        "",
    );
    let (spaced, _) = render_raw(&xml);
    let first = spaced.iter().position(|l| l == "   o  first").unwrap();
    assert_eq!(spaced[first + 1], "");
    assert_eq!(spaced[first + 2], "   o  second");

    let xml = xml.replace("<middle>", "<middle>\n<?rfc subcompact=\"yes\"?>");
    let (tight, _) = render_raw(&xml);
    let first = tight.iter().position(|l| l == "   o  first").unwrap();
    assert_eq!(tight[first + 1], "   o  second");
}

#[test]
fn empty_style_list_uses_plain_indent() {
    let xml = document(
        "",
        r#"<section title="Intro">
             <t><list>
               <t>unadorned</t>
             </list></t>
           </section>"#,
        "",
    );
    let (lines, _) = render_raw(&xml);
    assert_has_line(&lines, "      unadorned");
}
