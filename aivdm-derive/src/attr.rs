use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::{
    Attribute, Error, Expr, Ident, Pat, Result, Stmt, Token, Type, parenthesized,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

/// Where an `#[ais(...)]` list is attached.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Container,
    Field,
    Variant,
}

/// One entry of an `#[ais(...)]` list, with its argument already parsed.
pub enum Attr {
    Bits(Expr),
    Cond(Expr),
    Ignore,
    Into,
    Map(Expr),
    MinLen(Expr),
    ParseAs(Type),
    Parser(Expr),
    PreExec(Stmt),
    PostExec(Stmt),
    Selector(Expr),
    Arm(Arm),
    SelectionError(Expr),
    SkipAfter(Expr),
    SkipBefore(Expr),
}

impl Attr {
    fn keyword(&self) -> &'static str {
        match self {
            Self::Bits(_) => "bits",
            Self::Cond(_) => "cond",
            Self::Ignore => "ignore",
            Self::Into => "into",
            Self::Map(_) => "map",
            Self::MinLen(_) => "min_len",
            Self::ParseAs(_) => "parse_as",
            Self::Parser(_) => "parser",
            Self::PreExec(_) => "pre_exec",
            Self::PostExec(_) => "post_exec",
            Self::Selector(_) | Self::Arm(_) => "selector",
            Self::SelectionError(_) => "selection_error",
            Self::SkipAfter(_) => "skip_after",
            Self::SkipBefore(_) => "skip_before",
        }
    }

    fn allowed_at(&self, position: Position) -> bool {
        match self {
            Self::MinLen(_) | Self::SelectionError(_) | Self::Selector(_) => {
                position == Position::Container
            }
            Self::Arm(_) => position == Position::Variant,
            Self::PreExec(_) | Self::PostExec(_) | Self::SkipAfter(_) | Self::SkipBefore(_) => true,
            _ => position == Position::Field,
        }
    }

    fn repeatable(&self) -> bool {
        matches!(
            self,
            Self::Cond(_) | Self::Map(_) | Self::PreExec(_) | Self::PostExec(_)
        )
    }

    /// Parses a single entry. Variant selectors are match arms rather than expressions.
    fn parse_at(input: ParseStream, position: Position) -> Result<(Span, Self)> {
        let ident: Ident = input.parse()?;
        let span = ident.span();

        let attr = match ident.to_string().as_str() {
            "bits" => Self::Bits(argument(input)?),
            "cond" => Self::Cond(argument(input)?),
            "ignore" => Self::Ignore,
            "into" => Self::Into,
            "map" => Self::Map(argument(input)?),
            "min_len" => Self::MinLen(argument(input)?),
            "parse_as" => Self::ParseAs(argument(input)?),
            "parser" => Self::Parser(argument(input)?),
            "pre_exec" => Self::PreExec(argument(input)?),
            "post_exec" => Self::PostExec(argument(input)?),
            "selector" if position == Position::Variant => Self::Arm(argument(input)?),
            "selector" => Self::Selector(argument(input)?),
            "selection_error" => Self::SelectionError(argument(input)?),
            "skip_after" => Self::SkipAfter(argument(input)?),
            "skip_before" => Self::SkipBefore(argument(input)?),
            other => {
                return Err(Error::new(
                    span,
                    format!("aivdm-derive: unknown attribute `{other}`"),
                ));
            }
        };

        Ok((span, attr))
    }
}

/// A variant selector: `selector(1 | 2)` or `selector(n if n > 3)`.
pub struct Arm {
    pat: Pat,
    guard: Option<Expr>,
}

impl Arm {
    pub fn is_wildcard(&self) -> bool {
        matches!(self.pat, Pat::Wild(_)) && self.guard.is_none()
    }
}

impl Parse for Arm {
    fn parse(input: ParseStream) -> Result<Self> {
        let pat = Pat::parse_multi_with_leading_vert(input)?;
        let guard = if input.peek(Token![if]) {
            let _: Token![if] = input.parse()?;
            Some(input.parse()?)
        } else {
            None
        };
        Ok(Self { pat, guard })
    }
}

impl ToTokens for Arm {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let pat = &self.pat;
        tokens.extend(match &self.guard {
            Some(guard) => quote! { #pat if #guard },
            None => quote! { #pat },
        });
    }
}

fn argument<T: Parse>(input: ParseStream) -> Result<T> {
    let content;
    parenthesized!(content in input);
    content.parse()
}

/// Collects every `#[ais(...)]` entry on an item, in source order, rejecting entries that
/// do not belong at `position` and duplicates of non-repeatable ones.
pub fn collect(attrs: &[Attribute], position: Position) -> Result<Vec<Attr>> {
    let mut seen: Vec<&'static str> = Vec::new();
    let mut collected = Vec::new();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("ais")) {
        let entries = attr.parse_args_with(|input: ParseStream| {
            let mut entries = Vec::new();
            while !input.is_empty() {
                entries.push(Attr::parse_at(input, position)?);
                if !input.is_empty() {
                    let _: Token![,] = input.parse()?;
                }
            }
            Ok(entries)
        })?;

        for (span, entry) in entries {
            let keyword = entry.keyword();
            if !entry.allowed_at(position) {
                return Err(Error::new(
                    span,
                    format!("aivdm-derive: `{keyword}` is not allowed here"),
                ));
            }
            if !entry.repeatable() && seen.contains(&keyword) {
                return Err(Error::new(
                    span,
                    format!("aivdm-derive: duplicate `{keyword}`"),
                ));
            }
            seen.push(keyword);
            collected.push(entry);
        }
    }

    if seen.contains(&"parser") && seen.contains(&"parse_as") {
        return Err(Error::new(
            attrs.first().map_or_else(Span::call_site, Spanned::span),
            "aivdm-derive: `parser` and `parse_as` cannot be combined",
        ));
    }

    Ok(collected)
}

/// Statements to run before and after an item: length checks, spare bits and raw
/// `pre_exec`/`post_exec` statements, in attribute order.
pub fn surroundings(attrs: &[Attr], reader: &Ident) -> (TokenStream, TokenStream) {
    let mut before = TokenStream::new();
    let mut after = TokenStream::new();

    for attr in attrs {
        match attr {
            Attr::MinLen(len) => before.extend(quote! { #reader.require(#len)?; }),
            Attr::SkipBefore(width) => before.extend(quote! { #reader.skip(#width)?; }),
            Attr::SkipAfter(width) => after.extend(quote! { #reader.skip(#width)?; }),
            Attr::PreExec(stmt) => stmt.to_tokens(&mut before),
            Attr::PostExec(stmt) => stmt.to_tokens(&mut after),
            _ => {}
        }
    }

    (before, after)
}
