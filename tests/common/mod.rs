#![allow(dead_code)]

use rfctext::{Diagnostics, OutputMode, RenderOptions};

/// Wrap body fragments in a minimal draft document skeleton.
pub fn document(front_extra: &str, middle: &str, back: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="US-ASCII"?>
<rfc category="info" docName="draft-doe-test-00" ipr="trust200902">
  <front>
    <title abbrev="Test">A Test Document</title>
    <author initials="J." surname="Doe" fullname="Jane Doe">
      <organization>Example Corp</organization>
      <address>
        <email>jane@example.com</email>
      </address>
    </author>
    <date month="March" year="2011"/>
    {front_extra}
  </front>
  <middle>
{middle}
  </middle>
  <back>
{back}
  </back>
</rfc>"#
    )
}

pub fn render_raw(source: &str) -> (Vec<String>, Diagnostics) {
    let diag = Diagnostics::new();
    let options = RenderOptions {
        mode: OutputMode::Raw,
        ..RenderOptions::default()
    };
    let lines = rfctext::render_lines(source, &options, &diag).expect("render");
    (lines, diag)
}

pub fn render_paginated(source: &str) -> (Vec<String>, Diagnostics) {
    let diag = Diagnostics::new();
    let options = RenderOptions::default();
    let lines = rfctext::render_lines(source, &options, &diag).expect("render");
    (lines, diag)
}

#[allow(dead_code)]
pub fn assert_has_line(lines: &[String], expected: &str) {
    assert!(
        lines.iter().any(|l| l == expected),
        "expected line {expected:?} not found in output:\n{}",
        lines.join("\n")
    );
}

#[allow(dead_code)]
pub fn assert_has_line_containing(lines: &[String], needle: &str) {
    assert!(
        lines.iter().any(|l| l.contains(needle)),
        "no line containing {needle:?} in output:\n{}",
        lines.join("\n")
    );
}
