//! Operator-facing HTML pages
//!
//! Plain server-rendered markup: the form, the result and the error views.

use feature_engine::{schema, CycleRegularity, FieldKind, FieldSpec, YesNo};
use std::fmt::Write;

use crate::error::ApiError;
use crate::report::AssessmentReport;

/// Number of side-by-side form columns
pub const FORM_COLUMNS: usize = 3;

const TITLE: &str = "PCOS Diagnostic Tool";

const STYLE: &str = "body{font-family:sans-serif;margin:2rem}\
.columns{display:flex;gap:2rem}.column{flex:1}\
.field{margin-bottom:1rem}.field label{display:block;font-weight:bold}\
.positive{color:#b00020}.negative{color:#1b5e20}.error{color:#b00020}";

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{TITLE}</title>\
         <style>{STYLE}</style></head><body><h1>AI-Powered {TITLE}</h1>{body}</body></html>"
    )
}

/// Column a field is placed in, rotating through the columns
pub fn column_of(index: usize) -> usize {
    index % FORM_COLUMNS
}

fn radio_group(out: &mut String, spec: &FieldSpec, choices: [&str; 2]) {
    let name = escape(spec.name);
    for (i, choice) in choices.iter().enumerate() {
        let checked = if i == 0 { " checked" } else { "" };
        let _ = write!(
            out,
            "<input type=\"radio\" name=\"{name}\" value=\"{choice}\"{checked}> {choice} "
        );
    }
}

fn field_control(spec: &FieldSpec) -> String {
    let name = escape(spec.name);
    let mut out = format!("<div class=\"field\"><label>{name}</label>");

    match spec.kind {
        FieldKind::Binary => radio_group(&mut out, spec, YesNo::CHOICES),
        FieldKind::CategoricalOrdinal => radio_group(&mut out, spec, CycleRegularity::CHOICES),
        FieldKind::Numeric => {
            let _ = write!(
                out,
                "<input type=\"number\" name=\"{name}\" value=\"{}\" step=\"{}\">",
                spec.default_text(),
                spec.step
            );
        }
        FieldKind::NumericOrTextFallback => {
            let _ = write!(
                out,
                "<input type=\"text\" name=\"{name}\" value=\"{}\">",
                spec.default_text()
            );
        }
    }

    out.push_str("</div>");
    out
}

/// The assessment form, or the disabled notice when no model is loaded
pub fn render_form(model_reason: Option<&str>) -> String {
    if let Some(reason) = model_reason {
        return render_unavailable(reason);
    }

    let mut columns = vec![String::new(); FORM_COLUMNS];
    for (i, spec) in schema().iter().enumerate() {
        columns[column_of(i)].push_str(&field_control(spec));
    }

    let mut body = String::from(
        "<h2>Enter Patient Vitals &amp; History</h2>\
         <form method=\"post\" action=\"/assess\"><div class=\"columns\">",
    );
    for column in &columns {
        let _ = write!(body, "<div class=\"column\">{column}</div>");
    }
    body.push_str("</div><hr><button type=\"submit\">Analyze Risk Factor</button></form>");

    layout(&body)
}

/// Notice shown while the model is unavailable
pub fn render_unavailable(reason: &str) -> String {
    layout(&format!(
        "<p class=\"error\"><strong>Model unavailable.</strong> \
         Submissions are disabled until the model file can be loaded.</p>\
         <p>{}</p>",
        escape(reason)
    ))
}

/// Result view for a completed assessment
pub fn render_result(report: &AssessmentReport) -> String {
    let class = if report.label.is_positive() { "positive" } else { "negative" };

    let mut details = String::new();
    for line in report.recommendation.details {
        let _ = write!(details, "<li>{}</li>", escape(line));
    }

    layout(&format!(
        "<h2>Diagnostic Results</h2>\
         <p class=\"{class}\"><strong>{}</strong></p>\
         <p>Risk Probability: {}</p>\
         <p><strong>{}</strong></p><ul>{details}</ul>\
         <p><small>Submission {}</small></p>\
         <p><a href=\"/\">New assessment</a></p>",
        escape(&report.headline),
        escape(&report.probability_display),
        escape(report.recommendation.summary),
        report.submission_id,
    ))
}

/// Error view for a rejected submission
pub fn render_error(err: &ApiError) -> String {
    let mut fields = String::new();
    for line in err.field_errors() {
        let _ = write!(fields, "<li>{}</li>", escape(&line));
    }

    layout(&format!(
        "<p class=\"error\"><strong>{}</strong></p><ul>{fields}</ul>\
         <p><a href=\"/\">Back to the form</a></p>",
        escape(&err.message())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::BuildError;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"1&2\"</b>"), "&lt;b&gt;&quot;1&amp;2&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_form_renders_every_field() {
        let html = render_form(None);
        for spec in schema() {
            assert!(html.contains(&format!("name=\"{}\"", escape(spec.name))), "{}", spec.name);
        }
        assert_eq!(html.matches("class=\"column\"").count(), FORM_COLUMNS);
        assert!(html.contains("Analyze Risk Factor"));
        assert!(html.contains("value=\"1.99\" step=\"0.01\""));
        assert!(html.contains("type=\"text\" name=\"II    beta-HCG(mIU/mL)\" value=\"1.99\""));
    }

    #[test]
    fn test_columns_rotate() {
        assert_eq!(column_of(0), 0);
        assert_eq!(column_of(4), 1);
        assert_eq!(column_of(8), 2);
    }

    #[test]
    fn test_unavailable_form_has_no_inputs() {
        let html = render_form(Some("Model file not found: models/pcos_pipeline_v3.onnx"));
        assert!(html.contains("Model unavailable"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn test_error_page_escapes_input() {
        let err = ApiError::Build(BuildError::MalformedNumericField {
            field: "II    beta-HCG(mIU/mL)",
            text: "<script>".into(),
        });
        let html = render_error(&err);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
