use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::{Ident, Lit, Path};

use crate::attrs::{FieldAttrs, MetaAttr, MetaValue, StructAttrs};

/// A field turned into a member descriptor.
pub struct MemberInfo {
    pub name: String,
    pub attrs: FieldAttrs,
}

impl MemberInfo {
    pub fn new(ident: &Ident, attrs: FieldAttrs) -> Self {
        let name = attrs
            .name
            .clone()
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
        Self { name, attrs }
    }
}

fn component_name(path: &Path) -> TokenStream {
    quote! { <#path as ::dialog_markup::source::Component>::class_name() }
}

fn value_tokens(value: &MetaValue) -> TokenStream {
    match value {
        MetaValue::Lit(Lit::Str(lit)) => quote! { ::dialog_markup::Value::String(#lit.to_string()) },
        MetaValue::Lit(Lit::Int(lit)) => quote! { ::dialog_markup::Value::Int(#lit) },
        MetaValue::Lit(Lit::Float(lit)) => quote! { ::dialog_markup::Value::Float(#lit) },
        MetaValue::Lit(Lit::Bool(lit)) => quote! { ::dialog_markup::Value::Bool(#lit) },
        MetaValue::Lit(other) => {
            syn::Error::new_spanned(other, "unsupported literal").to_compile_error()
        }
        MetaValue::Neg(Lit::Int(lit)) => quote! { ::dialog_markup::Value::Int(-#lit) },
        MetaValue::Neg(Lit::Float(lit)) => quote! { ::dialog_markup::Value::Float(-#lit) },
        MetaValue::Neg(other) => {
            syn::Error::new_spanned(other, "only numbers can be negated").to_compile_error()
        }
        MetaValue::List(items) => {
            let items = items.iter().map(value_tokens);
            quote! { ::dialog_markup::Value::List(::std::vec![#(#items),*]) }
        }
        MetaValue::Object { kind, values, span } => {
            let object = object_tokens(kind, values);
            quote_spanned! {*span=> ::dialog_markup::Value::Object(#object) }
        }
    }
}

fn object_tokens(kind: &str, values: &[(String, MetaValue)]) -> TokenStream {
    let setters = values.iter().map(|(key, value)| {
        let value = value_tokens(value);
        quote! { .with(#key, #value) }
    });
    quote! { ::dialog_markup::MetadataObject::new(#kind) #(#setters)* }
}

fn meta_tokens(meta: &MetaAttr) -> TokenStream {
    let kind = meta.kind.value();
    object_tokens(&kind, &meta.values)
}

fn member_tokens(member: &MemberInfo) -> TokenStream {
    let name = &member.name;
    let metadata = member.attrs.metadata.iter().map(meta_tokens);
    let value_class = member.attrs.value_class.as_ref().map(|path| {
        let class = component_name(path);
        quote! { .value_class(#class) }
    });
    quote! {
        ::dialog_markup::MemberDescriptor::new(#name)
            #(.meta(#metadata))*
            #value_class
    }
}

pub fn generate_component_impl(
    input: &syn::DeriveInput,
    attrs: &StructAttrs,
    members: &[MemberInfo],
) -> TokenStream {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let class_name = attrs.name.clone().unwrap_or_else(|| ident.to_string());

    let extends = attrs.extends.as_ref().map(|path| {
        let parent = component_name(path);
        quote! { let class = class.extends(#parent); }
    });
    let class_metadata = attrs.metadata.iter().map(meta_tokens);
    let member_descriptors = members.iter().map(member_tokens);
    let nested = &attrs.nested;

    let register_parent = attrs.extends.iter().map(|path| {
        quote! { <#path as ::dialog_markup::source::Component>::register(catalog); }
    });
    let register_values = members
        .iter()
        .filter_map(|member| member.attrs.value_class.as_ref())
        .map(|path| quote! { <#path as ::dialog_markup::source::Component>::register(catalog); });

    quote! {
        impl #impl_generics ::dialog_markup::source::Component for #ident #ty_generics #where_clause {
            fn class_name() -> &'static str {
                #class_name
            }

            fn class_descriptor() -> ::dialog_markup::ClassDescriptor {
                let class = ::dialog_markup::ClassDescriptor::new(Self::class_name());
                #extends
                #(let class = class.meta(#class_metadata);)*
                #(let class = class.member(#member_descriptors);)*
                #(let class = class.nested(
                    <#nested as ::dialog_markup::source::Component>::class_descriptor()
                );)*
                class
            }

            fn register_dependencies(catalog: &mut ::dialog_markup::ClassCatalog) {
                #(#register_parent)*
                #(#register_values)*
                #(<#nested as ::dialog_markup::source::Component>::register_dependencies(catalog);)*
            }
        }
    }
}
