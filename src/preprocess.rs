//! Textual macro preprocessor.
//!
//! Definitions look like `.macro name(p1, p2)` followed by body lines and a
//! closing `.endm`. A call is a whole line of the form `name(arg1, arg2)`;
//! the body is emitted in place of the call with every `\param` replaced by
//! the corresponding argument text. Expansion is single-level: expanded
//! lines are not rescanned for further calls.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{AsmError, MacroError};
use crate::parser::strip_comment;

#[derive(Debug, Clone)]
struct Macro {
    params: Vec<String>,
    body: Vec<String>,
}

/// Strip definitions out of the line stream, then expand every call site.
pub fn preprocess(lines: &[&str]) -> Result<Vec<String>, AsmError> {
    let (macros, rest) = collect_definitions(lines)?;
    if !macros.is_empty() {
        debug!(count = macros.len(), "collected macro definitions");
    }
    expand(&rest, &macros)
}

fn collect_definitions<'a>(
    lines: &[&'a str],
) -> Result<(HashMap<String, Macro>, Vec<&'a str>), AsmError> {
    let mut macros = HashMap::new();
    let mut rest = Vec::with_capacity(lines.len());
    let mut iter = lines.iter();
    while let Some(&line) = iter.next() {
        let bare = strip_comment(line);
        let bare = bare.trim();
        if !bare.starts_with(".macro") {
            rest.push(line);
            continue;
        }
        let (name, params) = parse_header(bare)?;
        let mut body = Vec::new();
        loop {
            let Some(&body_line) = iter.next() else {
                return Err(MacroError::MalformedDefinition(format!(
                    "`{name}` is missing its .endm terminator"
                ))
                .into());
            };
            if strip_comment(body_line).trim().starts_with(".endm") {
                break;
            }
            body.push(body_line.to_string());
        }
        macros.insert(name, Macro { params, body });
    }
    Ok((macros, rest))
}

/// Parse `.macro name(p1, p2)` into its name and parameter list.
fn parse_header(line: &str) -> Result<(String, Vec<String>), AsmError> {
    let malformed = || MacroError::MalformedDefinition(line.to_string());
    let rest = line.strip_prefix(".macro").ok_or_else(malformed)?.trim();
    let open = rest.find('(').ok_or_else(malformed)?;
    let name = rest[..open].trim();
    if name.is_empty() || !is_ident(name) {
        return Err(malformed().into());
    }
    let inner = rest[open + 1..]
        .trim_end()
        .strip_suffix(')')
        .ok_or_else(malformed)?;
    let params: Vec<String> = inner
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    Ok((name.to_string(), params))
}

fn expand(lines: &[&str], macros: &HashMap<String, Macro>) -> Result<Vec<String>, AsmError> {
    let mut out = Vec::with_capacity(lines.len());
    for &line in lines {
        let bare = strip_comment(line);
        let Some((name, args)) = parse_call(bare.trim()) else {
            out.push(line.to_string());
            continue;
        };
        let mac = macros
            .get(name)
            .ok_or_else(|| MacroError::UndefinedMacro(name.to_string()))?;
        if args.len() != mac.params.len() {
            return Err(MacroError::ArgumentMismatch {
                name: name.to_string(),
                expected: mac.params.len(),
                got: args.len(),
            }
            .into());
        }
        for body_line in &mac.body {
            out.push(substitute(body_line, &mac.params, &args));
        }
    }
    Ok(out)
}

/// A call is an identifier followed by a parenthesized argument list that
/// closes the line. Anything else falls through untouched.
fn parse_call(line: &str) -> Option<(&str, Vec<&str>)> {
    let open = line.find('(')?;
    let name = line[..open].trim_end();
    if name.is_empty() || !is_ident(name) {
        return None;
    }
    let inner = line[open + 1..].trim_end().strip_suffix(')')?;
    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(str::trim).collect()
    };
    Some((name, args))
}

/// Replace `\param` occurrences in a body line. The identifier after the
/// backslash is taken with maximal munch, so a parameter named `a` never
/// matches inside `\ab`.
fn substitute(line: &str, params: &[String], args: &[&str]) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let end = after
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(after.len());
        let ident = &after[..end];
        match params.iter().position(|p| p == ident) {
            Some(idx) if !ident.is_empty() => out.push_str(args[idx]),
            _ => {
                out.push('\\');
                out.push_str(ident);
            }
        }
        rest = &after[end..];
    }
    out.push_str(rest);
    out
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &[&str]) -> Result<Vec<String>, AsmError> {
        preprocess(src)
    }

    #[test]
    fn expands_multi_parameter_macro() {
        let out = run(&[
            ".macro load2(ra, rb, v)",
            "ldi \\ra, \\v",
            "ldi \\rb, \\v",
            ".endm",
            "load2(A, B, 0x10)",
        ])
        .unwrap();
        assert_eq!(out, vec!["ldi A, 0x10", "ldi B, 0x10"]);
    }

    #[test]
    fn expands_single_parameter_macro() {
        let out = run(&[".macro flip(r)", "xori \\r, 0xFF", ".endm", "flip(D)"]).unwrap();
        assert_eq!(out, vec!["xori D, 0xFF"]);
    }

    #[test]
    fn zero_parameter_call() {
        let out = run(&[".macro nopish()", "addi A, 0", ".endm", "nopish()"]).unwrap();
        assert_eq!(out, vec!["addi A, 0"]);
    }

    #[test]
    fn argument_count_mismatch() {
        let err = run(&[".macro one(a)", "ldi A, \\a", ".endm", "one(1, 2)"]).unwrap_err();
        assert!(matches!(
            err,
            AsmError::Macro(MacroError::ArgumentMismatch { expected: 1, got: 2, .. })
        ));
    }

    #[test]
    fn undefined_macro_call() {
        let err = run(&["missing(1)"]).unwrap_err();
        assert!(matches!(
            err,
            AsmError::Macro(MacroError::UndefinedMacro(name)) if name == "missing"
        ));
    }

    #[test]
    fn substitution_respects_token_boundaries() {
        // `\a` must not fire inside `\ab`.
        let out = substitute("add \\a, \\ab, \\a", &["a".into(), "ab".into()], &["B", "C"]);
        assert_eq!(out, "add B, C, B");
    }

    #[test]
    fn missing_endm_is_rejected() {
        let err = run(&[".macro broken(x)", "ldi A, \\x"]).unwrap_err();
        assert!(matches!(
            err,
            AsmError::Macro(MacroError::MalformedDefinition(_))
        ));
    }
}
