use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::attr::{take_method_kind, MethodKind};

pub struct MockMethod {
    /// Signature used in the generated impl, with every parameter bound to a plain identifier.
    pub adapted_sig: syn::Signature,
    pub kind: MethodKind,
    pub params: Vec<Param>,
    pub output: Option<syn::Type>,
}

pub struct Param {
    pub ident: syn::Ident,
    /// The type recorded in invocations and matched by patterns.
    pub recorded_ty: syn::Type,
    borrowed: bool,
}

impl Param {
    /// Expression converting the parameter into its recorded form.
    pub fn recorded_expr(&self) -> TokenStream {
        let ident = &self.ident;
        if self.borrowed {
            quote! { ::std::borrow::ToOwned::to_owned(&*#ident) }
        } else {
            quote! { #ident }
        }
    }
}

impl MockMethod {
    pub fn parse(method: &mut syn::TraitItemFn) -> syn::Result<Self> {
        let kind = take_method_kind(&mut method.attrs)?;
        let sig = &method.sig;

        if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "Generic methods are not supported",
            ));
        }
        if let Some(asyncness) = &sig.asyncness {
            return Err(syn::Error::new_spanned(
                asyncness,
                "Async methods are not supported",
            ));
        }
        if sig.receiver().is_none() {
            return Err(syn::Error::new_spanned(
                &sig.ident,
                "Methods without a `self` receiver can not be mocked",
            ));
        }

        let output = match &sig.output {
            syn::ReturnType::Default => None,
            syn::ReturnType::Type(_, ty) => match ty.as_ref() {
                syn::Type::Reference(_) => {
                    return Err(syn::Error::new_spanned(
                        ty,
                        "Methods returning references are not supported",
                    ))
                }
                syn::Type::ImplTrait(_) => {
                    return Err(syn::Error::new_spanned(
                        ty,
                        "Methods returning `impl Trait` are not supported",
                    ))
                }
                syn::Type::Tuple(tuple) if tuple.elems.is_empty() => None,
                _ => Some(ty.as_ref().clone()),
            },
        };

        let mut adapted_sig = sig.clone();
        let mut params = vec![];

        for (index, fn_arg) in adapted_sig.inputs.iter_mut().enumerate() {
            let pat_type = match fn_arg {
                syn::FnArg::Receiver(_) => continue,
                syn::FnArg::Typed(pat_type) => pat_type,
            };

            let ident = match pat_type.pat.as_ref() {
                syn::Pat::Ident(pat_ident) => pat_ident.ident.clone(),
                _ => format_ident!("arg{index}"),
            };
            *pat_type.pat = syn::Pat::Ident(syn::PatIdent {
                attrs: vec![],
                by_ref: None,
                mutability: None,
                ident: ident.clone(),
                subpat: None,
            });

            let (recorded_ty, borrowed) = match pat_type.ty.as_ref() {
                syn::Type::Reference(reference) => {
                    let elem = &reference.elem;
                    (
                        syn::parse_quote!(<#elem as ::std::borrow::ToOwned>::Owned),
                        true,
                    )
                }
                syn::Type::ImplTrait(_) => {
                    return Err(syn::Error::new_spanned(
                        &pat_type.ty,
                        "`impl Trait` parameters are not supported",
                    ))
                }
                ty => (ty.clone(), false),
            };

            params.push(Param {
                ident,
                recorded_ty,
                borrowed,
            });
        }

        match kind {
            MethodKind::Call => {}
            MethodKind::Get => {
                if !params.is_empty() {
                    return Err(syn::Error::new_spanned(
                        &sig.inputs,
                        "Property getters can not take arguments",
                    ));
                }
                if output.is_none() {
                    return Err(syn::Error::new_spanned(
                        &sig.ident,
                        "Property getters must return a value",
                    ));
                }
            }
            MethodKind::Set => {
                if params.len() != 1 {
                    return Err(syn::Error::new_spanned(
                        &sig.inputs,
                        "Property setters must take exactly one argument",
                    ));
                }
                if output.is_some() {
                    return Err(syn::Error::new_spanned(
                        &sig.output,
                        "Property setters must not return a value",
                    ));
                }
            }
        }

        Ok(Self {
            adapted_sig,
            kind,
            params,
            output,
        })
    }

    pub fn ident(&self) -> &syn::Ident {
        &self.adapted_sig.ident
    }

    /// Member name used in patterns and invocations.
    ///
    /// Setters are named after their property: `set_name` writes `name`.
    pub fn member_name(&self) -> String {
        let ident = self.ident().to_string();
        match self.kind {
            MethodKind::Set => match ident.strip_prefix("set_") {
                Some(property) => property.to_string(),
                None => ident,
            },
            _ => ident,
        }
    }

    pub fn property_name(&self) -> Option<String> {
        match self.kind {
            MethodKind::Call => None,
            MethodKind::Get | MethodKind::Set => Some(self.member_name()),
        }
    }

    /// The pattern constructor on the mock API type.
    pub fn pattern_fn(&self, prefix: &syn::Path) -> TokenStream {
        let ident = self.ident();
        let member = self.member_name();

        match self.kind {
            MethodKind::Call => {
                let inputs = self.params.iter().map(|param| {
                    let ident = &param.ident;
                    let ty = &param.recorded_ty;
                    quote! { #ident: impl ::std::convert::Into<#prefix::it::Arg<#ty>> }
                });
                let args = self.params.iter().map(|param| {
                    let ident = &param.ident;
                    quote! { .arg(#ident.into()) }
                });

                quote! {
                    pub fn #ident(#(#inputs),*) -> #prefix::Pattern {
                        #prefix::Pattern::call(#member) #(#args)*
                    }
                }
            }
            MethodKind::Get => quote! {
                pub fn #ident() -> #prefix::Pattern {
                    #prefix::Pattern::getter(#member)
                }
            },
            MethodKind::Set => {
                let param = &self.params[0];
                let value = &param.ident;
                let ty = &param.recorded_ty;

                quote! {
                    pub fn #ident(#value: impl ::std::convert::Into<#prefix::it::Arg<#ty>>) -> #prefix::Pattern {
                        #prefix::Pattern::setter(#member, #value.into())
                    }
                }
            }
        }
    }

    /// The trait method implemented for `MockObject`.
    pub fn impl_fn(&self, prefix: &syn::Path) -> TokenStream {
        let sig = &self.adapted_sig;
        let member = self.member_name();
        let output = match &self.output {
            Some(ty) => quote! { #ty },
            None => quote! { () },
        };

        let body = match self.kind {
            MethodKind::Call => {
                let values = self.params.iter().map(|param| {
                    let expr = param.recorded_expr();
                    quote! { #prefix::Value::new(#expr) }
                });

                quote! {
                    self.invoke::<#output>(#prefix::Invocation::call(
                        #member,
                        ::std::vec![#(#values),*],
                    ))
                }
            }
            MethodKind::Get => quote! {
                self.get::<#output>(#member)
            },
            MethodKind::Set => {
                let expr = self.params[0].recorded_expr();
                quote! {
                    self.set(#member, #expr)
                }
            }
        };

        quote! {
            #sig {
                #body
            }
        }
    }
}
