//! Procedural macros for dashboard-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Message)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(message), supports(enum_any))]
struct MessageOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<MessageVariant, ()>,

    /// Category applied to every variant without its own override
    #[darling(default)]
    category: Option<String>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(message))]
struct MessageVariant {
    ident: syn::Ident,

    /// Explicit category override
    #[darling(default)]
    category: Option<String>,

    /// Opt out of the container category
    #[darling(default)]
    skip_category: bool,

    /// Override the type tag (defaults to the variant name)
    #[darling(default)]
    rename: Option<String>,
}

impl MessageVariant {
    fn tag(&self) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| self.ident.to_string())
    }

    fn resolve_category(&self, container: Option<&String>) -> Option<String> {
        if self.skip_category {
            return None;
        }
        self.category.clone().or_else(|| container.cloned())
    }
}

/// Derive macro for the Message trait
///
/// Generates:
/// - `name() -> &'static str` returning the variant's type tag
/// - `category() -> Option<&'static str>` from `#[message(category = "...")]`
///   on the variant or, failing that, on the enum
/// - an inherent `all_names()` listing every tag in declaration order
///
/// # Example
/// ```ignore
/// #[derive(Message, Clone, Debug)]
/// #[message(category = "layout")]
/// enum LayoutCommand {
///     AddSection { index: isize },
///     #[message(rename = "RemoveLayoutSection")]
///     RemoveSection { index: isize },
///     #[message(category = "filters")]
///     ClearFilters,
/// }
///
/// assert_eq!(LayoutCommand::ClearFilters.name(), "ClearFilters");
/// assert_eq!(LayoutCommand::AddSection { index: 0 }.category(), Some("layout"));
/// assert_eq!(LayoutCommand::all_names().len(), 3);
/// ```
#[proc_macro_derive(Message, attributes(message))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match MessageOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Message can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    // `{ .. }` matches unit, tuple and struct variants alike
    let name_arms = variants.iter().map(|v| {
        let variant = &v.ident;
        let tag = v.tag();
        quote! { #name::#variant { .. } => #tag }
    });

    let category_arms = variants.iter().map(|v| {
        let variant = &v.ident;
        let cat_expr = match v.resolve_category(opts.category.as_ref()) {
            Some(c) => quote! { ::core::option::Option::Some(#c) },
            None => quote! { ::core::option::Option::None },
        };
        quote! { #name::#variant { .. } => #cat_expr }
    });

    let all_tags: Vec<String> = variants.iter().map(|v| v.tag()).collect();

    let expanded = quote! {
        impl #impl_generics ::dashboard_dispatch::Message for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms,)*
                }
            }

            fn category(&self) -> ::core::option::Option<&'static str> {
                match self {
                    #(#category_arms,)*
                }
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            /// Every type tag of this message enum, in declaration order
            pub fn all_names() -> &'static [&'static str] {
                &[#(#all_tags),*]
            }
        }
    };

    TokenStream::from(expanded)
}
