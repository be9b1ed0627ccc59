use proc_macro2::TokenStream;
use quote::quote;

use crate::attr::Attr;
use crate::method::MockMethod;

pub fn generate(attr: Attr, mut item_trait: syn::ItemTrait) -> syn::Result<TokenStream> {
    if !item_trait.generics.params.is_empty() || item_trait.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &item_trait.generics,
            "Generic traits are not supported",
        ));
    }

    let mut methods = vec![];
    for item in &mut item_trait.items {
        match item {
            syn::TraitItem::Fn(method) => methods.push(MockMethod::parse(method)?),
            syn::TraitItem::Type(item_type) => {
                return Err(syn::Error::new_spanned(
                    &item_type.ident,
                    "Associated types are not supported",
                ))
            }
            syn::TraitItem::Const(item_const) => {
                return Err(syn::Error::new_spanned(
                    &item_const.ident,
                    "Associated constants are not supported",
                ))
            }
            _ => {}
        }
    }

    let prefix = &attr.prefix;
    let vis = &item_trait.vis;
    let trait_ident = &item_trait.ident;
    let trait_name = trait_ident.to_string();
    let api_ident = attr.api_ident(&item_trait);
    let api_doc = format!("Mock API for [`{trait_name}`].");

    let mut properties: Vec<String> = vec![];
    for property in methods.iter().filter_map(MockMethod::property_name) {
        if !properties.contains(&property) {
            properties.push(property);
        }
    }

    let pattern_fns = methods.iter().map(|method| method.pattern_fn(prefix));
    let impl_fns = methods.iter().map(|method| method.impl_fn(prefix));

    Ok(quote! {
        #item_trait

        #[doc = #api_doc]
        #[derive(Clone, Copy, Debug)]
        #vis struct #api_ident;

        impl #prefix::Capability for #api_ident {
            const NAME: &'static str = #trait_name;
            const PROPERTIES: &'static [&'static str] = &[#(#properties),*];
        }

        #[allow(dead_code)]
        impl #api_ident {
            #(#pattern_fns)*
        }

        impl #trait_ident for #prefix::MockObject<#api_ident> {
            #(#impl_fns)*
        }
    })
}
