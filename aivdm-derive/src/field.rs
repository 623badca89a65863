use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Error, Expr, Field, GenericArgument, Ident, PathArguments, Result, Type, spanned::Spanned};

use crate::attr::{self, Attr, Position};

/// How a single value is obtained from the reader. Every step expands to an expression
/// of type `Result<T, aivdm_parser::DecodeError>` with the reader in scope.
pub enum Step {
    /// `FromBits` with an explicit width.
    Bits { ty: Type, width: Expr },
    /// A nested `BitParse` layout.
    Nested(Type),
    /// A user supplied `fn(&mut BitReader) -> Result<T, E>`.
    Custom(Expr),
    /// Nothing is read.
    Default(Type),
    Optional { condition: Expr, inner: Box<Step> },
    Convert(Box<Step>),
    Map { inner: Box<Step>, func: Expr },
}

impl Step {
    /// Builds the step for `ty` from the remaining attributes, applied left to right:
    /// each attribute wraps whatever the attributes after it produce.
    fn build(ty: &Type, attrs: &[Attr], width: Option<&Expr>) -> Result<Self> {
        let Some((first, rest)) = attrs.split_first() else {
            return Ok(match width {
                Some(width) => Self::Bits {
                    ty: ty.clone(),
                    width: width.clone(),
                },
                None => Self::Nested(ty.clone()),
            });
        };

        Ok(match first {
            Attr::Parser(func) => Self::Custom(func.clone()),
            Attr::Ignore => Self::Default(ty.clone()),
            Attr::ParseAs(raw) => Self::build(raw, rest, width)?,
            Attr::Into => Self::Convert(Box::new(Self::build(ty, rest, width)?)),
            Attr::Map(func) => Self::Map {
                inner: Box::new(Self::build(ty, rest, width)?),
                func: func.clone(),
            },
            Attr::Cond(condition) => Self::Optional {
                condition: condition.clone(),
                inner: Box::new(Self::build(option_inner(ty)?, rest, width)?),
            },
            _ => Self::build(ty, rest, width)?,
        })
    }

    fn expand(&self, reader: &Ident) -> TokenStream {
        match self {
            Self::Bits { ty, width } => quote! {
                <#ty as aivdm_parser::FromBits>::from_bits(&mut *#reader, #width)
                    .map_err(aivdm_parser::DecodeError::from)
            },
            Self::Nested(ty) => quote! {
                <#ty as aivdm_parser::BitParse>::parse(&mut *#reader)
            },
            Self::Custom(func) => quote! {
                (#func)(&mut *#reader).map_err(aivdm_parser::DecodeError::from)
            },
            Self::Default(ty) => quote! {
                ::core::result::Result::<#ty, aivdm_parser::DecodeError>::Ok(
                    ::core::default::Default::default()
                )
            },
            Self::Optional { condition, inner } => {
                let inner = inner.expand(reader);
                quote! {
                    if #condition {
                        (#inner).map(::core::option::Option::Some)
                    } else {
                        ::core::result::Result::Ok(::core::option::Option::None)
                    }
                }
            }
            Self::Convert(inner) => {
                let inner = inner.expand(reader);
                quote! { (#inner).map(::core::convert::Into::into) }
            }
            Self::Map { inner, func } => {
                let inner = inner.expand(reader);
                quote! { (#inner).map(#func) }
            }
        }
    }
}

/// `T` for `Option<T>`; `cond` fields must be optional.
fn option_inner(ty: &Type) -> Result<&Type> {
    let segment = match ty {
        Type::Path(path) => path.path.segments.last(),
        _ => None,
    };

    if let Some(segment) = segment.filter(|segment| segment.ident == "Option") {
        if let PathArguments::AngleBracketed(args) = &segment.arguments {
            if let Some(GenericArgument::Type(inner)) = args.args.first() {
                return Ok(inner);
            }
        }
    }

    Err(Error::new(
        ty.span(),
        "aivdm-derive: fields with `cond` must be `Option<T>`",
    ))
}

/// A field, bound to a local variable while the rest of the layout is read.
pub struct FieldPlan {
    member: Option<Ident>,
    binding: Ident,
    ty: Type,
    step: Step,
    before: TokenStream,
    after: TokenStream,
}

impl FieldPlan {
    pub fn new(index: usize, field: &Field, reader: &Ident) -> Result<Self> {
        let attrs = attr::collect(&field.attrs, Position::Field)?;

        let width = attrs.iter().find_map(|attr| match attr {
            Attr::Bits(width) => Some(width),
            _ => None,
        });
        let step = Step::build(&field.ty, &attrs, width)?;
        let (before, after) = attr::surroundings(&attrs, reader);

        // Named fields keep their name so later `cond` expressions can use them.
        let binding = match &field.ident {
            Some(ident) => ident.clone(),
            None => format_ident!("ais_field_{}", index),
        };

        Ok(Self {
            member: field.ident.clone(),
            binding,
            ty: field.ty.clone(),
            step,
            before,
            after,
        })
    }

    pub fn expand(&self, reader: &Ident) -> TokenStream {
        let Self {
            binding,
            ty,
            before,
            after,
            ..
        } = self;
        let value = self.step.expand(reader);

        quote! {
            #before
            let #binding: #ty = (#value)?;
            #after
        }
    }
}

impl ToTokens for FieldPlan {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let binding = &self.binding;
        tokens.extend(match &self.member {
            Some(member) => quote! { #member: #binding },
            None => quote! { #binding },
        });
    }
}
