//! Placeholder substitution for manifest templates.
//!
//! Templates use `{{ .Key }}` placeholders. Values are pasted into the YAML
//! as-is, so they are checked first: a single-line value must read back as
//! the same plain scalar, and a multi-line value must be the only thing on
//! its line. Multi-line values are re-indented to the placeholder's column so
//! YAML block scalars stay valid.
use crate::error::{InstallError, InstallResult};
use crate::params::RenderParams;
use regex::Regex;
use std::sync::OnceLock;

/// Characters that change a plain scalar's meaning when they come first.
const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*\.([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*\}\}")
            .expect("regex for template placeholders")
    })
}

/// Why `value` cannot be pasted into the middle of a plain YAML scalar.
pub fn plain_scalar_problem(value: &str) -> Option<&'static str> {
    if value.contains(['\n', '\r']) {
        return Some("contains a line break");
    }
    if value.trim() != value {
        return Some("has leading or trailing whitespace");
    }
    if value.contains(" #") || value.contains("\t#") {
        return Some("contains a comment marker");
    }
    if value.contains(": ") || value.contains(":\t") || value.ends_with(':') {
        return Some("contains a mapping separator");
    }
    None
}

/// Render `template` (the body of manifest `manifest`) against `params`.
pub fn render_template(
    manifest: &str,
    template: &str,
    params: &RenderParams,
) -> InstallResult<String> {
    let placeholder = placeholder_regex();
    let mut out = String::with_capacity(template.len());
    for (idx, line) in template.split_inclusive('\n').enumerate() {
        let mut last = 0;
        for cap in placeholder.captures_iter(line) {
            let (Some(whole), Some(key)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            push_literal(&mut out, manifest, idx, &line[last..whole.start()])?;
            let key = key.as_str();
            let value = params.get(key).ok_or_else(|| {
                InstallError::render(manifest, format!("line {}: no value for {key:?}", idx + 1))
            })?;
            let prefix = &line[..whole.start()];
            if value.contains('\n') {
                let alone = prefix.trim_start_matches(' ').is_empty()
                    && line[whole.end()..].trim().is_empty();
                if !alone {
                    return Err(InstallError::render(
                        manifest,
                        format!(
                            "line {}: multi-line value for {key:?} must be alone on its line",
                            idx + 1
                        ),
                    ));
                }
                push_indented(&mut out, value, prefix);
            } else {
                check_scalar(manifest, idx, key, value, prefix)?;
                out.push_str(value);
            }
            last = whole.end();
        }
        push_literal(&mut out, manifest, idx, &line[last..])?;
    }
    Ok(out)
}

fn check_scalar(
    manifest: &str,
    idx: usize,
    key: &str,
    value: &str,
    prefix: &str,
) -> InstallResult<()> {
    let starts_scalar = prefix.is_empty() || prefix.ends_with([' ', '\t']);
    let problem = plain_scalar_problem(value).or_else(|| {
        (starts_scalar && value.starts_with(INDICATORS)).then_some("starts with a YAML indicator")
    });
    match problem {
        Some(problem) => Err(InstallError::render(
            manifest,
            format!("line {}: value for {key:?} {problem}: {value:?}", idx + 1),
        )),
        None => Ok(()),
    }
}

fn push_literal(out: &mut String, manifest: &str, idx: usize, literal: &str) -> InstallResult<()> {
    if literal.contains("{{") {
        return Err(InstallError::render(
            manifest,
            format!("line {}: malformed placeholder", idx + 1),
        ));
    }
    out.push_str(literal);
    Ok(())
}

fn push_indented(out: &mut String, value: &str, indent: &str) {
    for (idx, line) in value.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
}
