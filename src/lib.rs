mod boilerplate;
mod diag;
mod error;
mod options;
mod text;
mod xml;

pub use diag::Diagnostics;
pub use error::Error;
pub use options::{Eol, OutputMode, Pis, RenderOptions};
pub use text::TextWriter;
pub use text::table;
pub use text::wrap;

use std::path::Path;
use std::time::Instant;

fn parse(source: &str) -> Result<roxmltree::Document<'_>, Error> {
    let parse_options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    roxmltree::Document::parse_with_options(source, parse_options)
        .map_err(|e| Error::InvalidXml(e.to_string()))
}

/// Render an RFC/Internet-Draft XML source string to the final text
/// document, including the top-of-document blank margin and line
/// terminators.
pub fn render_string(
    source: &str,
    options: &RenderOptions,
    diag: &Diagnostics,
) -> Result<String, Error> {
    let doc = parse(source)?;
    let draft = doc.root_element().attribute("number").is_none();
    let mut writer = TextWriter::new(&doc, options, diag)?;
    let lines = writer.render()?;
    Ok(assemble(&lines, options, draft))
}

/// Render to a plain line sequence (trailing whitespace stripped, no blank
/// top margin, no terminators). Useful for tests and tooling that
/// post-process the layout.
pub fn render_lines(
    source: &str,
    options: &RenderOptions,
    diag: &Diagnostics,
) -> Result<Vec<String>, Error> {
    let doc = parse(source)?;
    let mut writer = TextWriter::new(&doc, options, diag)?;
    let lines = writer.render()?;
    Ok(lines
        .iter()
        .map(|l| l.trim_end_matches([' ', '\t']).to_string())
        .collect())
}

pub fn convert_xml_to_text(
    input: &Path,
    output: &Path,
    options: &RenderOptions,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let source = std::fs::read_to_string(input).map_err(Error::Io)?;
    let t_read = t0.elapsed();

    let diag = Diagnostics::new();
    let text = render_string(&source, options, &diag)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &text).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: read={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms ({} warnings, output {} bytes)",
        t_read.as_secs_f64() * 1000.0,
        (t_render - t_read).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        diag.warning_count(),
        text.len(),
    );

    Ok(())
}

/// Strip trailing whitespace, prepend the draft/RFC top margin and join
/// with the configured line terminator.
fn assemble(lines: &[String], options: &RenderOptions, draft: bool) -> String {
    let eol = options.eol.as_str();
    let mut out = String::new();
    let top_margin = if draft { 3 } else { 6 };
    for _ in 0..top_margin {
        out.push_str(eol);
    }
    for line in lines {
        out.push_str(line.trim_end_matches([' ', '\t']));
        out.push_str(eol);
    }
    out
}
