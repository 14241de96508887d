use std::borrow::Cow;
use std::collections::HashMap;

use crate::foundation::error::{ImprintError, ImprintResult};

/// Runtime parameters supplied fresh to every render call.
pub type RenderParams = HashMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Param(String),
}

/// Span text with `{{.key}}` directives parsed once at Init.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanTemplate {
    source: String,
    pieces: Vec<Piece>,
}

impl SpanTemplate {
    /// Parse `text`; text without `{{` is kept as a single literal.
    pub fn parse(text: &str) -> ImprintResult<Self> {
        let mut pieces = Vec::new();
        let mut rest = text;
        while let Some(open) = rest.find("{{") {
            if open > 0 {
                pieces.push(Piece::Literal(rest[..open].to_owned()));
            }
            let after = &rest[open + 2..];
            let close = after.find("}}").ok_or_else(|| {
                ImprintError::validation(format!("unterminated directive in \"{text}\""))
            })?;
            pieces.push(Piece::Param(parse_directive(&after[..close], text)?));
            rest = &after[close + 2..];
        }
        if !rest.is_empty() {
            pieces.push(Piece::Literal(rest.to_owned()));
        }
        Ok(Self {
            source: text.to_owned(),
            pieces,
        })
    }

    /// Original template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// `true` when the text contains at least one directive.
    pub fn has_directives(&self) -> bool {
        self.pieces.iter().any(|p| matches!(p, Piece::Param(_)))
    }

    /// Substitute `params`; a referenced key that is absent is a render error.
    pub fn render<'a>(&'a self, params: &RenderParams) -> ImprintResult<Cow<'a, str>> {
        if !self.has_directives() {
            return Ok(Cow::Borrowed(&self.source));
        }
        let mut out = String::with_capacity(self.source.len());
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Param(key) => {
                    let value = params.get(key).ok_or_else(|| {
                        ImprintError::render(format!(
                            "span template: missing parameter '{key}'"
                        ))
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(Cow::Owned(out))
    }
}

fn parse_directive(inner: &str, text: &str) -> ImprintResult<String> {
    let key = inner
        .trim()
        .strip_prefix('.')
        .filter(|k| !k.is_empty() && !k.chars().any(char::is_whitespace))
        .ok_or_else(|| {
            ImprintError::validation(format!(
                "unsupported directive \"{{{{{inner}}}}}\" in \"{text}\" (expected {{{{.key}}}})"
            ))
        })?;
    Ok(key.to_owned())
}

#[cfg(test)]
#[path = "../../tests/unit/text/template.rs"]
mod tests;
