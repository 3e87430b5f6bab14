mod common;

use common::{assert_has_line, document, render_raw};
use rfctext::{Diagnostics, OutputMode, RenderOptions};

fn table_doc(table: &str) -> String {
    document(
        "",
        &format!(r#"<section title="Data">{table}</section>"#),
        "",
    )
}

#[test]
fn full_style_table_draws_box_borders() {
    let xml = table_doc(
        r#"<texttable align="left">
             <ttcol>Name</ttcol>
             <ttcol>Value</ttcol>
             <c>a</c>
             <c>b</c>
           </texttable>"#,
    );
    let (lines, _) = render_raw(&xml);
    assert_has_line(&lines, "   +------+-------+");
    assert_has_line(&lines, "   | Name | Value |");
    assert_has_line(&lines, "   | a    | b     |");
}

#[test]
fn compact_option_removes_header_separator_row() {
    let table = r#"<texttable align="left">
             <ttcol>Name</ttcol>
             <ttcol>Value</ttcol>
             <c>a</c>
             <c>b</c>
           </texttable>"#;
    let (spaced, _) = render_raw(&table_doc(table));
    let header = spaced
        .iter()
        .position(|l| l == "   | Name | Value |")
        .unwrap();
    // default (compact=no) leaves a blank cell row between header and body
    assert_eq!(spaced[header + 1], "   +------+-------+");
    assert_eq!(spaced[header + 2], "   |      |       |");

    let xml = table_doc(table).replace("<middle>", "<middle>\n<?rfc compact=\"yes\"?>");
    let (tight, _) = render_raw(&xml);
    let header = tight
        .iter()
        .position(|l| l == "   | Name | Value |")
        .unwrap();
    assert_eq!(tight[header + 1], "   +------+-------+");
    assert_eq!(tight[header + 2], "   | a    | b     |");
}

#[test]
fn headers_style_has_no_vertical_bars() {
    let xml = table_doc(
        r#"<texttable align="left" style="headers">
             <ttcol>Name</ttcol>
             <ttcol>Value</ttcol>
             <c>a</c>
             <c>b</c>
           </texttable>"#,
    );
    let (lines, _) = render_raw(&xml);
    assert_has_line(&lines, "   Name Value");
    assert_has_line(&lines, "   ---- -----");
    assert!(
        !lines.iter().any(|l| l.contains('|')),
        "headers style must not draw vertical bars"
    );
}

#[test]
fn wide_content_is_compressed_to_page_width() {
    let wide_a = "left column with quite a lot of text that will not fit";
    let wide_b = "right column also carrying plenty of text to overflow";
    let xml = table_doc(&format!(
        r#"<texttable align="left">
             <ttcol>A</ttcol>
             <ttcol>B</ttcol>
             <c>{wide_a}</c>
             <c>{wide_b}</c>
           </texttable>"#
    ));
    let (lines, diag) = render_raw(&xml);
    let border = lines
        .iter()
        .find(|l| l.trim_start().starts_with('+'))
        .expect("table border");
    // indent (3) + borders fill the page width exactly once compression runs
    assert_eq!(border.chars().count(), 72);
    assert_eq!(diag.warning_count(), 0, "{:?}", diag.warnings());
}

#[test]
fn table_without_columns_is_fatal() {
    let xml = table_doc(
        r#"<texttable align="left">
             <c>orphan cell</c>
           </texttable>"#,
    );
    let diag = Diagnostics::new();
    let options = RenderOptions {
        mode: OutputMode::Raw,
        ..RenderOptions::default()
    };
    let err = rfctext::render_lines(&xml, &options, &diag).unwrap_err();
    assert!(
        err.to_string().contains("no columns"),
        "unexpected error: {err}"
    );
}

#[test]
fn centered_table_is_indented_past_the_margin() {
    let xml = table_doc(
        r#"<texttable>
             <ttcol>N</ttcol>
             <c>x</c>
           </texttable>"#,
    );
    let (lines, _) = render_raw(&xml);
    let border = lines
        .iter()
        .find(|l| l.trim_start().starts_with('+'))
        .expect("table border");
    let lead = border.chars().take_while(|c| *c == ' ').count();
    assert!(lead > 3, "default table alignment centers the block: {border:?}");
}
