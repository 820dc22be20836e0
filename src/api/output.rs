use std::io::{self, Write};

use crate::{
    api::verify::{InteractionFailure, VerificationReport},
    common::data::{ExpectedRequest, MismatchDetail, MismatchField, UnexpectedReason},
};

use similar::{ChangeTag, TextDiff};
use tabwriter::TabWriter;

#[cfg(feature = "color")]
use colored::Colorize;

pub(crate) fn render_report(report: &VerificationReport) -> io::Result<String> {
    let mut tw = TabWriter::new(vec![]);

    writeln!(
        tw,
        "Pact verification failed for consumer '{}' and provider '{}'.",
        report.consumer, report.provider
    )?;

    for failure in &report.failures {
        write_failure(&mut tw, failure)?;
    }

    if !report.unexpected.is_empty() {
        writeln!(tw)?;
        writeln!(tw, "{}", &"-".repeat(60))?;
        writeln!(tw, "Unexpected requests")?;
        writeln!(tw, "{}", &"-".repeat(60))?;

        for (idx, unexpected) in report.unexpected.iter().enumerate() {
            let reason = match unexpected.reason {
                UnexpectedReason::AlreadySatisfied { interaction } => {
                    format!("interaction #{} was already satisfied", interaction + 1)
                }
                UnexpectedReason::NoInteraction => "no interaction expects it".to_string(),
            };
            writeln!(tw, "\t{}.\t{}\t({})", idx + 1, unexpected.request, reason)?;
        }
    }

    tw.flush()?;
    let bytes = tw
        .into_inner()
        .map_err(|e| io::Error::new(e.error().kind(), e.error().to_string()))?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn write_failure(tw: &mut TabWriter<Vec<u8>>, failure: &InteractionFailure) -> io::Result<()> {
    writeln!(tw)?;
    writeln!(tw, "{}", &"-".repeat(60))?;
    match &failure.description {
        Some(description) => writeln!(tw, "Interaction #{}: {}", failure.index + 1, description)?,
        None => writeln!(tw, "Interaction #{}", failure.index + 1)?,
    }
    writeln!(tw, "{}", &"-".repeat(60))?;

    if let Some(state) = &failure.provider_state {
        writeln!(tw, "Provider state:\t{}", state)?;
    }
    writeln!(tw, "Request:\t{}", request_line(&failure.request))?;

    if !failure.matched && failure.mismatches.is_empty() {
        writeln!(tw, "Status:\tnever invoked")?;
        return Ok(());
    }

    let status = match failure.matched {
        true => "matched, but also received mismatching requests",
        false => "received only mismatching requests",
    };
    writeln!(tw, "Status:\t{}", status)?;

    for (idx, mismatch) in failure.mismatches.iter().enumerate() {
        write_mismatch(tw, idx, mismatch)?;
    }

    Ok(())
}

fn write_mismatch(tw: &mut TabWriter<Vec<u8>>, idx: usize, mismatch: &MismatchDetail) -> io::Result<()> {
    writeln!(tw)?;
    writeln!(tw, "{} : {} mismatch", idx + 1, title_case(&mismatch.field.to_string()))?;
    writeln!(tw, "\tExpected:\t{}", mismatch.expected)?;
    writeln!(tw, "\tReceived:\t{}", mismatch.actual)?;

    if let Some(detail) = &mismatch.detail {
        writeln!(tw, "\tDetails:\t{}", remove_linebreaks(detail))?;
    }

    if mismatch.field == MismatchField::Body {
        writeln!(tw)?;
        writeln!(tw, "{}", create_diff_output(&mismatch.expected, &mismatch.actual))?;
    }

    Ok(())
}

fn request_line(request: &ExpectedRequest) -> String {
    match &request.query {
        Some(query) => format!("{} {}?{}", request.method, request.path, query),
        None => format!("{} {}", request.method, request.path),
    }
}

/// A line diff of both bodies, pretty-printed first if they are valid JSON.
fn create_diff_output(expected: &str, actual: &str) -> String {
    let expected = pretty_json(expected);
    let actual = pretty_json(actual);
    let changes = TextDiff::from_lines(&expected, &actual);

    let mut output = String::from("Diff:\n");
    for change in changes.iter_all_changes() {
        let line = remove_trailing_linebreak(&change.to_string_lossy());
        match change.tag() {
            ChangeTag::Equal => output.push_str(&format!("   | {}", line)),
            ChangeTag::Insert => {
                #[cfg(feature = "color")]
                output.push_str(&format!("+++| {}", line).green().to_string());
                #[cfg(not(feature = "color"))]
                output.push_str(&format!("+++| {}", line));
            }
            ChangeTag::Delete => {
                #[cfg(feature = "color")]
                output.push_str(&format!("---| {}", line).red().to_string());
                #[cfg(not(feature = "color"))]
                output.push_str(&format!("---| {}", line));
            }
        }
        output.push('\n');
    }

    remove_trailing_linebreak(&output)
}

fn pretty_json(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn remove_linebreaks(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn remove_trailing_linebreak(s: &str) -> String {
    let mut result = s.to_string();
    if result.ends_with('\n') {
        result.pop();
        if result.ends_with('\r') {
            result.pop();
        }
    }
    result
}
