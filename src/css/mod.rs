//! Style sheet reference extraction and relinking
//!
//! Style text is walked token by token with `cssparser`, descending into every
//! block, and re-emitted verbatim. Each `url(...)` encountered is handed to a
//! callback, which is how both passes work:
//!
//! - [`process_style`] resolves every reference and reports it as an image asset,
//!   leaving the text untouched.
//! - [`relink_style`] replaces the content of each `url(...)` once the local path
//!   of the asset is known.
//!
//! Tokens that cannot be part of a valid style sheet are kept, wrapped in an
//! `ERROR(...)` marker, and the walk carries on to the end of the input.

use crate::state::Asset;
use cssparser::{ParseError, Parser, ParserInput, Token};
use url::Url;

/// Resolves a raw reference found in style text to an absolute URL
pub trait ResolveUrl {
    fn resolve(&self, raw: &str) -> Option<Url>;
}

impl<F> ResolveUrl for F
where
    F: Fn(&str) -> Option<Url>,
{
    fn resolve(&self, raw: &str) -> Option<Url> {
        self(raw)
    }
}

/// A `url(...)` reference discovered in style text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleReference {
    /// The reference as written between the parentheses (quotes removed)
    pub raw: String,
    /// The resolved image asset
    pub asset: Asset,
}

/// Extracts every `url(...)` reference from style text
///
/// Returns the re-emitted text, whose `url(...)` tokens are unchanged, and one
/// image asset per reference the resolver could resolve.
///
/// # Example
///
/// ```
/// use sumi_mirror::css::process_style;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/css/site.css").unwrap();
/// let (text, refs) = process_style("body { background: url(bg.png) }", &|raw: &str| base.join(raw).ok());
///
/// assert_eq!(text, "body { background: url(bg.png) }");
/// assert_eq!(refs[0].asset.url.as_str(), "https://example.com/css/bg.png");
/// ```
pub fn process_style<R>(css: &str, resolver: &R) -> (String, Vec<StyleReference>)
where
    R: ResolveUrl + ?Sized,
{
    let mut references = Vec::new();
    let text = transform(css, &mut |raw: &str| -> Option<String> {
        if let Some(url) = resolver.resolve(raw) {
            references.push(StyleReference {
                raw: raw.to_string(),
                asset: Asset::image(url),
            });
        }
        None
    });
    (text, references)
}

/// Replaces the content of `url(...)` tokens
///
/// `replace` receives each raw reference; when it returns a new value, the
/// token is re-emitted as `url("new")`, otherwise it is kept as written.
pub fn relink_style<F>(css: &str, mut replace: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    transform(css, &mut replace)
}

fn transform(css: &str, on_url: &mut dyn FnMut(&str) -> Option<String>) -> String {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut out = String::with_capacity(css.len());
    scan(&mut parser, on_url, &mut out);
    out
}

fn scan<'i, 't>(
    parser: &mut Parser<'i, 't>,
    on_url: &mut dyn FnMut(&str) -> Option<String>,
    out: &mut String,
) {
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::UnquotedUrl(ref value) => {
                emit_url(value.as_ref(), parser.slice_from(start), on_url, out);
            }
            Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
                let argument = parser
                    .parse_nested_block(|nested| {
                        let mut argument = None;
                        while let Ok(token) = nested.next_including_whitespace_and_comments() {
                            match token {
                                Token::WhiteSpace(_) | Token::Comment(_) => {}
                                Token::QuotedString(s) | Token::UnquotedUrl(s) => {
                                    argument = Some(s.as_ref().to_string());
                                    break;
                                }
                                _ => break,
                            }
                        }
                        Ok::<_, ParseError<'i, ()>>(argument)
                    })
                    .ok()
                    .flatten();

                let source = parser.slice_from(start);
                match argument {
                    Some(raw) => emit_url(&raw, source, on_url, out),
                    None => push_error(source, out),
                }
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                out.push_str(parser.slice_from(start));
                let inner_start = parser.position();
                let _ = parser.parse_nested_block(|nested| {
                    scan(nested, on_url, out);
                    Ok::<_, ParseError<'i, ()>>(())
                });

                // An unterminated block at the end of input has no closer to re-emit
                let closer = closing_delimiter(&token);
                if parser.slice_from(inner_start).ends_with(closer) {
                    out.push(closer);
                }
            }
            Token::BadUrl(_)
            | Token::BadString(_)
            | Token::CloseParenthesis
            | Token::CloseSquareBracket
            | Token::CloseCurlyBracket => push_error(parser.slice_from(start), out),
            _ => out.push_str(parser.slice_from(start)),
        }
    }
}

fn emit_url(
    raw: &str,
    source: &str,
    on_url: &mut dyn FnMut(&str) -> Option<String>,
    out: &mut String,
) {
    let raw = raw.trim();
    if raw.is_empty() {
        out.push_str(source);
        return;
    }

    match on_url(raw) {
        Some(replacement) => {
            out.push_str("url(\"");
            out.push_str(&replacement.replace('"', "%22"));
            out.push_str("\")");
        }
        None => out.push_str(source),
    }
}

fn push_error(source: &str, out: &mut String) {
    out.push_str("ERROR(");
    out.push_str(source);
    out.push(')');
}

fn closing_delimiter(token: &Token<'_>) -> char {
    match token {
        Token::SquareBracketBlock => ']',
        Token::CurlyBracketBlock => '}',
        _ => ')',
    }
}
