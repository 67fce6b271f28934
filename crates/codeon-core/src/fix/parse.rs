//! Parsing of raw model responses into typed fix proposals.

use crate::error::{CodeonError, Result};
use crate::fix::model::FixProposal;

/// Parses the raw generation response for a fix request.
///
/// The response is expected to be a single JSON object, but models wrap it
/// in markdown fences or surround it with prose often enough that the
/// parser tolerates both: fences are stripped, then the outermost balanced
/// `{...}` span is located by brace-depth counting before decoding.
///
/// # Errors
///
/// - [`CodeonError::MalformedOutput`] when no complete JSON object can be
///   located or the located span is not valid JSON
/// - [`CodeonError::Validation`] when the JSON decodes but does not match
///   the expected proposal schema
pub fn parse_fix_proposal(raw: &str) -> Result<FixProposal> {
    let body = strip_code_fences(raw);
    let object = extract_json_object(body).ok_or_else(|| {
        CodeonError::malformed_output("no complete JSON object found in response", raw)
    })?;

    let proposal: FixProposal = serde_json::from_str(object).map_err(|err| {
        match err.classify() {
            serde_json::error::Category::Data => CodeonError::validation(format!(
                "fix proposal does not match the expected schema: {err}"
            )),
            _ => CodeonError::malformed_output(format!("response is not valid JSON: {err}"), raw),
        }
    })?;

    for (index, change) in proposal.changes.iter().enumerate() {
        if change.file_path.trim().is_empty() {
            return Err(CodeonError::validation(format!(
                "changes[{index}] has an empty file_path"
            )));
        }
    }

    Ok(proposal)
}

/// Strips a leading/trailing markdown code fence, tolerating a language tag
/// on the opening fence. Input without fences is returned trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the rest of the fence line (for example "json"), then the
    // closing fence.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Returns the outermost balanced `{...}` span of `text`.
///
/// Depth counting starts at the first `{` and ignores braces inside JSON
/// string literals (including escaped quotes), so brace characters within
/// a `fixed_code` payload never unbalance the scan. Searching backwards
/// for the last `}` instead would mis-extract whenever text follows the
/// object.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proposal_json() -> String {
        json!({
            "changes": [{
                "file_path": "/src/app.py",
                "summary_of_changes": [{
                    "line": 3,
                    "description": "Guarded the division.",
                    "reason": "Avoids a crash when the divisor is zero."
                }],
                "fixed_code": "def div(a, b):\n    return a / b if b else 0\n"
            }]
        })
        .to_string()
    }

    #[test]
    fn parses_bare_json_object() {
        let proposal = parse_fix_proposal(&proposal_json()).unwrap();
        assert_eq!(proposal.changes.len(), 1);
        assert_eq!(proposal.changes[0].file_path, "/src/app.py");
    }

    #[test]
    fn parse_is_idempotent_on_well_formed_input() {
        let raw = proposal_json();
        let first = parse_fix_proposal(&raw).unwrap();
        let second = parse_fix_proposal(&raw).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fenced_input_parses_same_as_unwrapped() {
        let raw = proposal_json();
        let fenced = format!("```json\n{raw}\n```");
        let bare_fence = format!("```\n{raw}\n```");

        let unwrapped = parse_fix_proposal(&raw).unwrap();
        assert_eq!(parse_fix_proposal(&fenced).unwrap(), unwrapped);
        assert_eq!(parse_fix_proposal(&bare_fence).unwrap(), unwrapped);
    }

    #[test]
    fn braces_inside_fixed_code_do_not_break_extraction() {
        let fixed_code = "int main() {\n    if (x) { return cfg{}; }\n}\n";
        let object = json!({
            "changes": [{
                "file_path": "/src/main.c",
                "summary_of_changes": [],
                "fixed_code": fixed_code
            }]
        })
        .to_string();
        // Trailing prose with a stray brace: searching backwards for the
        // last '}' would slice past the object and fail to decode.
        let raw = format!("{object}\nNote: the closing }} above is part of the fix.");

        let naive_end = raw.rfind('}').unwrap();
        let naive_start = raw.find('{').unwrap();
        assert!(serde_json::from_str::<FixProposal>(&raw[naive_start..=naive_end]).is_err());

        let proposal = parse_fix_proposal(&raw).unwrap();
        assert_eq!(proposal.changes[0].fixed_code, fixed_code);
    }

    #[test]
    fn prose_before_the_object_is_tolerated() {
        let raw = format!("Here is the fix you asked for:\n{}", proposal_json());
        assert!(parse_fix_proposal(&raw).is_ok());
    }

    #[test]
    fn missing_object_is_malformed_output() {
        let err = parse_fix_proposal("I could not produce a fix.").unwrap_err();
        assert!(err.is_malformed_output());
    }

    #[test]
    fn unbalanced_object_is_malformed_output() {
        let err = parse_fix_proposal(r#"{"changes": [{"file_path": "/a.py""#).unwrap_err();
        assert!(err.is_malformed_output());
    }

    #[test]
    fn schema_mismatch_is_validation_error() {
        let err = parse_fix_proposal(r#"{"changes": "not a list"}"#).unwrap_err();
        assert!(err.is_validation());

        let missing_code =
            r#"{"changes": [{"file_path": "/a.py", "summary_of_changes": []}]}"#;
        assert!(parse_fix_proposal(missing_code).unwrap_err().is_validation());
    }

    #[test]
    fn empty_file_path_is_rejected() {
        let raw = r#"{"changes": [{"file_path": "  ", "fixed_code": "x"}]}"#;
        let err = parse_fix_proposal(raw).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn empty_change_list_is_a_valid_proposal() {
        let proposal = parse_fix_proposal(r#"{"changes": []}"#).unwrap();
        assert!(proposal.is_empty());
    }
}
