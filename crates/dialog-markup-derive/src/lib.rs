mod attrs;
mod component_gen;

use proc_macro::TokenStream;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

use attrs::{parse_field_attrs, parse_struct_attrs};
use component_gen::{MemberInfo, generate_component_impl};

/// Implements `dialog_markup::Component` for a struct.
///
/// ```ignore
/// #[derive(Component)]
/// #[component(extends = Base, nested(HeroMain))]
/// #[meta("dialog", title = "Hero")]
/// struct Hero {
///     #[meta("text-field", emptyText = "Title")]
///     #[meta("dialog-field", label = "Title", ranking = 10)]
///     title: String,
///     #[component(value_class = Link)]
///     #[meta("multifield")]
///     links: Vec<Link>,
///     #[component(skip)]
///     cache: Option<String>,
/// }
/// ```
#[proc_macro_derive(Component, attributes(component, meta))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_component_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_component_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_attrs = parse_struct_attrs(&input.attrs)?;

    let members = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => {
                let mut members = Vec::new();
                for field in &named.named {
                    let attrs = parse_field_attrs(field)?;
                    if attrs.skip {
                        continue;
                    }
                    if let Some(ident) = &field.ident {
                        members.push(MemberInfo::new(ident, attrs));
                    }
                }
                members
            }
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Component requires named fields or a unit struct",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Component can only be derived for structs",
            ));
        }
    };

    Ok(generate_component_impl(input, &struct_attrs, &members))
}
