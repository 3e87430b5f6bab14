mod common;

use common::{assert_has_line, assert_has_line_containing, document, render_raw};

#[test]
fn toc_lists_sections_up_to_configured_depth() {
    let middle = r#"<section title="Top">
             <t>Body.</t>
             <section title="Second">
               <t>Body.</t>
               <section title="Third">
                 <t>Body.</t>
                 <section title="Fourth">
                   <t>Body.</t>
                 </section>
               </section>
             </section>
           </section>"#;
    let xml = document("", middle, "").replace("<rfc", "<?rfc toc=\"yes\"?>\n<rfc");
    let (lines, _) = render_raw(&xml);
    assert_has_line(&lines, "Table of Contents");
    let toc_at = lines
        .iter()
        .position(|l| l == "Table of Contents")
        .expect("toc heading");
    let body_at = lines
        .iter()
        .position(|l| l == "1.  Top")
        .expect("first section heading");
    let toc = &lines[toc_at..body_at];
    assert!(toc.iter().any(|l| l.contains("1.  Top")));
    assert!(toc.iter().any(|l| l.contains("1.1.  Second")));
    assert!(toc.iter().any(|l| l.contains("1.1.1.  Third")));
    // default tocdepth is 3: the fourth level never appears in the TOC
    assert!(
        !toc.iter().any(|l| l.contains("Fourth")),
        "tocdepth filter failed:\n{}",
        toc.join("\n")
    );
}

#[test]
fn tocdepth_pi_overrides_depth_and_bad_values_fall_back() {
    let middle = r#"<section title="Top">
             <section title="Second">
               <t>Body.</t>
             </section>
           </section>"#;
    let xml = document("", middle, "")
        .replace("<rfc", "<?rfc toc=\"yes\"?><?rfc tocdepth=\"1\"?>\n<rfc");
    let (lines, _) = render_raw(&xml);
    let toc_at = lines
        .iter()
        .position(|l| l == "Table of Contents")
        .expect("toc");
    let toc_region = &lines[toc_at..toc_at + 4];
    assert!(toc_region.iter().any(|l| l.contains("1.  Top")));
    assert!(!toc_region.iter().any(|l| l.contains("Second")));

    let bad = document("", middle, "")
        .replace("<rfc", "<?rfc toc=\"yes\"?><?rfc tocdepth=\"bogus\"?>\n<rfc");
    let diag = rfctext::Diagnostics::new();
    let options = rfctext::RenderOptions {
        mode: rfctext::OutputMode::Raw,
        ..rfctext::RenderOptions::default()
    };
    let lines = rfctext::render_lines(&bad, &options, &diag).expect("render");
    assert!(
        diag.warnings().iter().any(|w| w.contains("tocdepth")),
        "expected a tocdepth warning, got {:?}",
        diag.warnings()
    );
    // fallback depth of 3 still lists the nested section
    assert_has_line_containing(&lines, "1.1.  Second");
}

#[test]
fn appendix_entries_get_prefix_and_letters() {
    let xml = document(
        "",
        r#"<section title="Intro"><t>Body.</t></section>"#,
        r#"<section title="Acknowledgements"><t>Thanks.</t></section>
           <section title="Changes"><t>None.</t></section>"#,
    )
    .replace("<rfc", "<?rfc toc=\"yes\"?>\n<rfc");
    let (lines, _) = render_raw(&xml);
    assert_has_line_containing(&lines, "Appendix A.  Acknowledgements");
    assert_has_line_containing(&lines, "Appendix B.  Changes");
}

#[test]
fn iref_terms_build_a_keyword_index() {
    let xml = document(
        "",
        r#"<section title="Intro">
             <t>Some <iref item="widget"/>widget text.</t>
             <t>More <iref item="widget" subitem="blue"/>blue widget text.</t>
             <t>And <iref item="gadget"/>gadgets too.</t>
           </section>"#,
        "",
    );
    let (lines, _) = render_raw(&xml);
    let index_at = lines
        .iter()
        .position(|l| l == "Index")
        .expect("index heading");
    let tail = &lines[index_at..];
    assert!(tail.iter().any(|l| l == "   G"), "letter bucket G");
    assert!(tail.iter().any(|l| l == "   W"), "letter bucket W");
    assert!(tail.iter().any(|l| l.trim() == "widget"));
    assert!(tail.iter().any(|l| l.trim() == "blue"));
    assert!(tail.iter().any(|l| l.trim() == "gadget"));
}

#[test]
fn xref_resolves_to_section_auto_name() {
    let xml = document(
        "",
        r#"<section title="Intro" anchor="intro"><t>Body.</t></section>
           <section title="Detail">
             <t>As described in <xref target="intro"/>, this works.</t>
           </section>"#,
        "",
    );
    let (lines, _) = render_raw(&xml);
    assert_has_line_containing(&lines, "As described in Section 1, this works.");
}

#[test]
fn unknown_xref_target_falls_back_to_bracketed_anchor() {
    let xml = document(
        "",
        r#"<section title="Intro">
             <t>See <xref target="nowhere"/>.</t>
           </section>"#,
        "",
    );
    let (lines, _) = render_raw(&xml);
    assert_has_line_containing(&lines, "See [nowhere].");
}
