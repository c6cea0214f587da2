use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, ExprLit, Field, Ident, Lit, LitStr, Path, Token, bracketed, parenthesized};

/// `#[component(...)]` on the struct.
#[derive(Debug, Default)]
pub struct StructAttrs {
    pub name: Option<String>,
    pub extends: Option<Path>,
    pub nested: Vec<Path>,
    pub metadata: Vec<MetaAttr>,
}

/// `#[component(...)]` on a field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    pub name: Option<String>,
    pub skip: bool,
    pub value_class: Option<Path>,
    pub metadata: Vec<MetaAttr>,
}

/// One `#[meta("kind", key = value, ...)]` attribute.
#[derive(Debug)]
pub struct MetaAttr {
    pub kind: LitStr,
    pub values: Vec<(String, MetaValue)>,
}

#[derive(Debug)]
pub enum MetaValue {
    Lit(Lit),
    Neg(Lit),
    List(Vec<MetaValue>),
    /// `kind_name(key = value, ...)`; underscores in the kind become dashes.
    Object {
        kind: String,
        values: Vec<(String, MetaValue)>,
        span: Span,
    },
}

fn string_lit(expr: Expr, what: &str) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) => Ok(lit.value()),
        other => Err(syn::Error::new(
            other.span(),
            format!("expected string literal for `{what}`"),
        )),
    }
}

fn paths(input: ParseStream) -> syn::Result<Vec<Path>> {
    let content;
    parenthesized!(content in input);
    let list = Punctuated::<Path, Token![,]>::parse_terminated(&content)?;
    Ok(list.into_iter().collect())
}

pub fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut result = StructAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("meta") {
            result.metadata.push(attr.parse_args()?);
            continue;
        }
        if !attr.path().is_ident("component") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = Some(string_lit(meta.value()?.parse()?, "name")?);
            } else if meta.path.is_ident("extends") {
                result.extends = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("nested") {
                result.nested.extend(paths(meta.input)?);
            } else {
                return Err(meta.error("unknown component attribute; expected `name`, `extends` or `nested`"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

pub fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in &field.attrs {
        if attr.path().is_ident("meta") {
            result.metadata.push(attr.parse_args()?);
            continue;
        }
        if !attr.path().is_ident("component") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("name") || meta.path.is_ident("rename") {
                result.name = Some(string_lit(meta.value()?.parse()?, "name")?);
            } else if meta.path.is_ident("value_class") {
                result.value_class = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error(
                    "unknown component field attribute; expected `skip`, `name` or `value_class`",
                ));
            }
            Ok(())
        })?;
    }

    if result.skip && !result.metadata.is_empty() {
        return Err(syn::Error::new(
            field.span(),
            "a skipped field cannot carry #[meta] attributes",
        ));
    }

    Ok(result)
}

impl Parse for MetaAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let kind: LitStr = input.parse()?;
        if kind.value().trim().is_empty() {
            return Err(syn::Error::new(kind.span(), "metadata kind must not be empty"));
        }
        let values = if input.is_empty() {
            Vec::new()
        } else {
            input.parse::<Token![,]>()?;
            parse_pairs(input)?
        };
        Ok(MetaAttr { kind, values })
    }
}

/// `key = value, ...` with an optional trailing comma. Keys are identifiers
/// (keywords allowed) or string literals.
fn parse_pairs(input: ParseStream) -> syn::Result<Vec<(String, MetaValue)>> {
    let mut values = Vec::new();
    while !input.is_empty() {
        let key = if input.peek(LitStr) {
            input.parse::<LitStr>()?.value()
        } else {
            Ident::parse_any(input)?.unraw().to_string()
        };
        input.parse::<Token![=]>()?;
        values.push((key, input.parse()?));
        if input.is_empty() {
            break;
        }
        input.parse::<Token![,]>()?;
    }
    Ok(values)
}

impl Parse for MetaValue {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(syn::token::Bracket) {
            let content;
            bracketed!(content in input);
            let items = Punctuated::<MetaValue, Token![,]>::parse_terminated(&content)?;
            return Ok(MetaValue::List(items.into_iter().collect()));
        }
        if input.peek(Token![-]) {
            input.parse::<Token![-]>()?;
            let lit: Lit = input.parse()?;
            return match lit {
                Lit::Int(_) | Lit::Float(_) => Ok(MetaValue::Neg(lit)),
                other => Err(syn::Error::new(other.span(), "only numbers can be negated")),
            };
        }
        if input.peek(Ident::peek_any) && !input.peek(syn::LitBool) {
            let ident = Ident::parse_any(input)?;
            let span = ident.span();
            let content;
            parenthesized!(content in input);
            let values = parse_pairs(&content)?;
            return Ok(MetaValue::Object {
                kind: ident.unraw().to_string().replace('_', "-"),
                values,
                span,
            });
        }
        match input.parse::<Lit>()? {
            lit @ (Lit::Str(_) | Lit::Int(_) | Lit::Float(_) | Lit::Bool(_)) => Ok(MetaValue::Lit(lit)),
            other => Err(syn::Error::new(
                other.span(),
                "expected a string, number, boolean, list or nested metadata object",
            )),
        }
    }
}
