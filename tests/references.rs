mod common;

use common::{assert_has_line_containing, document, render_raw};

fn reference(anchor: &str, title: &str, series: &str) -> String {
    format!(
        r#"<reference anchor="{anchor}">
             <front>
               <title>{title}</title>
               <author initials="A." surname="Author"/>
               <date month="June" year="2010"/>
             </front>
             {series}
           </reference>"#
    )
}

#[test]
fn numeric_reference_numbering_continues_across_lists() {
    let back = format!(
        r#"<references title="Normative References">
             {}{}
           </references>
           <references title="Informative References">
             {}{}
           </references>"#,
        reference("REF.A", "First", ""),
        reference("REF.B", "Second", ""),
        reference("REF.C", "Third", ""),
        reference("REF.D", "Fourth", ""),
    );
    let xml = document("", r#"<section title="Intro"><t>Body.</t></section>"#, &back)
        .replace("<middle>", "<middle>\n<?rfc symrefs=\"no\"?>");
    let (lines, _) = render_raw(&xml);
    assert_has_line_containing(&lines, "[1]        Author, A., \"First\", June 2010.");
    assert_has_line_containing(&lines, "[2]        Author, A., \"Second\", June 2010.");
    // the second list continues the running counter instead of resetting
    assert_has_line_containing(&lines, "[3]        Author, A., \"Third\", June 2010.");
    assert_has_line_containing(&lines, "[4]        Author, A., \"Fourth\", June 2010.");
}

#[test]
fn symbolic_references_use_anchor_labels() {
    let back = format!(
        r#"<references title="Normative References">
             {}
           </references>"#,
        reference("RFC9999", "Some Protocol", ""),
    );
    let xml = document("", r#"<section title="Intro"><t>Body.</t></section>"#, &back);
    let (lines, _) = render_raw(&xml);
    assert_has_line_containing(&lines, "[RFC9999]  Author, A., \"Some Protocol\", June 2010.");
}

#[test]
fn sorted_only_with_both_sort_and_symbolic_options() {
    let back = format!(
        r#"<references title="References">
             {}{}
           </references>"#,
        reference("ZED", "Last Alphabetically", ""),
        reference("ACE", "First Alphabetically", ""),
    );
    let xml = document("", r#"<section title="Intro"><t>Body.</t></section>"#, &back)
        .replace("<middle>", "<middle>\n<?rfc sortrefs=\"yes\"?>");
    let (lines, _) = render_raw(&xml);
    let ace = lines
        .iter()
        .position(|l| l.contains("[ACE]"))
        .expect("[ACE] entry");
    let zed = lines
        .iter()
        .position(|l| l.contains("[ZED]"))
        .expect("[ZED] entry");
    assert!(ace < zed, "sortrefs + symrefs should order [ACE] before [ZED]");

    // numeric refs keep document order even with sortrefs enabled
    let unsorted = document("", r#"<section title="Intro"><t>Body.</t></section>"#, &back)
        .replace(
            "<middle>",
            "<middle>\n<?rfc sortrefs=\"yes\"?><?rfc symrefs=\"no\"?>",
        );
    let (lines, _) = render_raw(&unsorted);
    let last = lines
        .iter()
        .position(|l| l.contains("\"Last Alphabetically\""))
        .expect("first entry");
    let first = lines
        .iter()
        .position(|l| l.contains("\"First Alphabetically\""))
        .expect("second entry");
    assert!(last < first, "numeric references must stay in document order");
}

#[test]
fn internet_draft_series_gets_work_in_progress_suffix() {
    let back = format!(
        r#"<references title="Informative References">
             {}
           </references>"#,
        reference(
            "I-D.doe-example",
            "A Draft",
            r#"<seriesInfo name="Internet-Draft" value="draft-doe-example-01"/>"#
        ),
    );
    let xml = document("", r#"<section title="Intro"><t>Body.</t></section>"#, &back);
    let (lines, _) = render_raw(&xml);
    assert_has_line_containing(&lines, "draft-doe-example-01 (work in progress)");
}

#[test]
fn wide_symbolic_label_goes_on_its_own_line() {
    let back = format!(
        r#"<references title="References">
             {}
           </references>"#,
        reference("LONG-ANCHOR-NAME", "Wide Label", ""),
    );
    let xml = document("", r#"<section title="Intro"><t>Body.</t></section>"#, &back);
    let (lines, _) = render_raw(&xml);
    let label = lines
        .iter()
        .position(|l| l.trim() == "[LONG-ANCHOR-NAME]")
        .expect("label on its own line");
    assert!(lines[label + 1].contains("Author, A., \"Wide Label\""));
}

#[test]
fn missing_reference_title_warns() {
    let back = r#"<references title="References">
             <reference anchor="NOTITLE">
               <front>
                 <title></title>
                 <author initials="A." surname="Author"/>
                 <date year="2010"/>
               </front>
             </reference>
           </references>"#;
    let xml = document("", r#"<section title="Intro"><t>Body.</t></section>"#, back);
    let (_, diag) = render_raw(&xml);
    assert!(
        diag.warnings()
            .iter()
            .any(|w| w.contains("No title specified in reference")),
        "expected missing-title warning, got {:?}",
        diag.warnings()
    );
}

#[test]
fn multiple_reference_lists_get_numbered_subsections() {
    let back = format!(
        r#"<references title="Normative References">
             {}
           </references>
           <references title="Informative References">
             {}
           </references>"#,
        reference("N1", "Normative", ""),
        reference("I1", "Informative", ""),
    );
    let xml = document("", r#"<section title="Intro"><t>Body.</t></section>"#, &back);
    let (lines, _) = render_raw(&xml);
    assert_has_line_containing(&lines, "2.  References");
    assert_has_line_containing(&lines, "2.1.  Normative References");
    assert_has_line_containing(&lines, "2.2.  Informative References");
}
