use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    Data, DataEnum, DataStruct, DeriveInput, Error, Fields, Ident, Result, parse_quote,
    spanned::Spanned,
};

use crate::{
    attr::{self, Attr, Position},
    field::FieldPlan,
};

/// Expands `#[derive(BitParse)]`.
///
/// ```ignore
/// #[derive(BitParse)]
/// #[ais(min_len(168))]
/// pub struct Report {
///     #[ais(bits(4), parse_as(u8), into)]
///     pub status: Status,
///     #[ais(bits(28), parse_as(i32), map(longitude))]
///     pub longitude: Option<f64>,
///     #[ais(bits(1), skip_before(3))]
///     pub raim: bool,
/// }
///
/// #[derive(BitParse)]
/// #[ais(selector(|bits: &mut BitReader<'_>| bits.read_unsigned(2)))]
/// pub enum Part {
///     #[ais(selector(0))]
///     A(PartA),
///     #[ais(selector(1))]
///     B { #[ais(bits(8))] value: u8 },
/// }
/// ```
pub fn expand(input: &DeriveInput) -> Result<TokenStream> {
    let reader = Ident::new("ais_bits", Span::call_site());

    let body = match &input.data {
        Data::Struct(data) => expand_struct(input, data, &reader)?,
        Data::Enum(data) => expand_enum(input, data, &reader)?,
        Data::Union(_) => {
            return Err(Error::new(
                input.ident.span(),
                "aivdm-derive: unions are not supported",
            ));
        }
    };

    let name = &input.ident;
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(aivdm_parser::BitParse));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics aivdm_parser::BitParse for #name #ty_generics #where_clause {
            fn parse(
                #reader: &mut aivdm_parser::BitReader<'_>,
            ) -> ::core::result::Result<Self, aivdm_parser::DecodeError> {
                #body
            }
        }
    })
}

fn expand_struct(input: &DeriveInput, data: &DataStruct, reader: &Ident) -> Result<TokenStream> {
    let attrs = attr::collect(&input.attrs, Position::Container)?;
    if attrs
        .iter()
        .any(|attr| matches!(attr, Attr::Selector(_) | Attr::SelectionError(_)))
    {
        return Err(Error::new(
            input.ident.span(),
            "aivdm-derive: `selector` and `selection_error` are only supported on enums",
        ));
    }

    let (before, after) = attr::surroundings(&attrs, reader);
    let value = construct(quote!(Self), &data.fields, reader)?;

    Ok(quote! {
        #before
        let ais_value = { #value };
        #after
        ::core::result::Result::Ok(ais_value)
    })
}

fn expand_enum(input: &DeriveInput, data: &DataEnum, reader: &Ident) -> Result<TokenStream> {
    let attrs = attr::collect(&input.attrs, Position::Container)?;

    let mut selector = None;
    let mut selection_error = None;
    for attr in &attrs {
        match attr {
            Attr::Selector(expr) => selector = Some(expr),
            Attr::SelectionError(expr) => selection_error = Some(expr),
            _ => {}
        }
    }
    let selector = selector.ok_or_else(|| {
        Error::new(
            input.ident.span(),
            "aivdm-derive: enums need a `selector` attribute",
        )
    })?;

    let selected = Ident::new("ais_selector", Span::call_site());
    let mut arms = Vec::with_capacity(data.variants.len());
    let mut exhaustive = false;

    for variant in &data.variants {
        if exhaustive {
            return Err(Error::new(
                variant.span(),
                "aivdm-derive: `selector(_)` must be on the last variant",
            ));
        }

        let variant_attrs = attr::collect(&variant.attrs, Position::Variant)?;
        let arm = variant_attrs
            .iter()
            .find_map(|attr| match attr {
                Attr::Arm(arm) => Some(arm),
                _ => None,
            })
            .ok_or_else(|| {
                Error::new(
                    variant.span(),
                    "aivdm-derive: variants need a `selector` attribute",
                )
            })?;
        exhaustive = arm.is_wildcard();

        let ident = &variant.ident;
        let (before, after) = attr::surroundings(&variant_attrs, reader);
        let value = construct(quote!(Self::#ident), &variant.fields, reader)?;

        arms.push(quote! {
            #arm => {
                #before
                let ais_value = { #value };
                #after
                ais_value
            }
        });
    }

    let fallback = match (exhaustive, selection_error) {
        (true, _) => None,
        (false, Some(error)) => Some(quote! {
            _ => return ::core::result::Result::Err(#error),
        }),
        (false, None) => Some(quote! {
            _ => return ::core::result::Result::Err(#reader.unexpected_value("selector", #selected)),
        }),
    };

    let (before, after) = attr::surroundings(&attrs, reader);

    Ok(quote! {
        #before
        let #selected = (#selector)(&mut *#reader).map_err(aivdm_parser::DecodeError::from)?;
        let ais_value = match #selected {
            #(#arms)*
            #fallback
        };
        #after
        ::core::result::Result::Ok(ais_value)
    })
}

/// Reads `fields` in declaration order, then builds `path` from them.
fn construct(path: TokenStream, fields: &Fields, reader: &Ident) -> Result<TokenStream> {
    let plans = fields
        .iter()
        .enumerate()
        .map(|(index, field)| FieldPlan::new(index, field, reader))
        .collect::<Result<Vec<_>>>()?;
    let reads = plans.iter().map(|plan| plan.expand(reader));

    let value = match fields {
        Fields::Named(_) => quote! { #path { #(#plans),* } },
        Fields::Unnamed(_) => quote! { #path(#(#plans),*) },
        Fields::Unit => path,
    };

    Ok(quote! {
        #(#reads)*
        #value
    })
}
