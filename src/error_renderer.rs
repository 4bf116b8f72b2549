//! Error rendering using ariadne
//!
//! Sift errors carry byte offsets into the host's source text. This module
//! renders them with source code snippets and annotations; the caller passes
//! the source the tree was built from.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;
use std::ops::Range;

const SOURCE_ID: &str = "<expr>";

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use bumpalo::Bump;
/// use sift::ast::{BinaryOp, Tree, TreeBuilder};
/// use sift::{Engine, EngineOptions, render_error};
///
/// let arena = Bump::new();
/// let engine = Engine::new(&arena, EngineOptions::default(), |_| None);
///
/// let source = "1 + true";
/// let b = TreeBuilder::new(&arena);
/// let tree = Tree::new(b.binary(BinaryOp::Add, b.int(1).at(0), b.bool(true).at(4)).at(2));
/// if let Err(e) = engine.compile(&tree, &mut []) {
///     render_error(source, &e);
/// }
/// ```
pub fn render_error(source: &str, error: &Error) {
    render_error_to_writer(source, error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
///
/// This is useful when you want to control where the error is written,
/// such as to a file, a buffer, or a custom output stream.
pub fn render_error_to(
    source: &str,
    error: &Error,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_error_to_writer(source, error, writer, true)
}

/// Render an error to a String (useful for logs, web UIs, etc.)
pub fn render_error_to_string(source: &str, error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(source, error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
///
/// This is the same as `render_error_to_string` but without ANSI color codes,
/// making the output easier to compare in tests.
pub fn render_error_to_string_no_color(source: &str, error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(source, error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    source: &str,
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in error.diagnostics() {
        render_diagnostic(source, diag, writer, use_color)?;
    }
    Ok(())
}

/// Offsets come from the host's tree and may point past the end of `source`.
fn clamp(span: &Range<usize>, len: usize) -> Range<usize> {
    let start = span.start.min(len);
    start..span.end.clamp(start, len)
}

fn render_diagnostic(
    source: &str,
    diag: &Diagnostic,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };
    let span = clamp(&diag.span.0, source.len());

    let mut report = Report::build(kind, (SOURCE_ID, span.clone()))
        .with_message(&diag.message)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    let color = colors.next();
    report = report.with_label(
        Label::new((SOURCE_ID, span))
            .with_message(&diag.message)
            .with_color(color),
    );

    for related in &diag.related {
        let color = colors.next();
        report = report.with_label(
            Label::new((SOURCE_ID, clamp(&related.span.0, source.len())))
                .with_message(&related.message)
                .with_color(color),
        );
    }

    if let Some(help) = &diag.help {
        report = report.with_help(help);
    }

    report
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}
