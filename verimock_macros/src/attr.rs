/// Parsed verimock attribute
pub struct Attr {
    /// Verimock's prefix, e.g. `::verimock`
    pub prefix: syn::Path,
    /// Name of the generated mock API type
    api: Option<syn::Ident>,
}

impl Attr {
    pub fn api_ident(&self, item_trait: &syn::ItemTrait) -> syn::Ident {
        match &self.api {
            Some(api) => api.clone(),
            None => quote::format_ident!("{}Mock", item_trait.ident),
        }
    }
}

impl syn::parse::Parse for Attr {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut prefix: Option<syn::Path> = None;
        let mut api = None;

        while !input.is_empty() {
            let keyword: syn::Ident = input.parse()?;
            let _: syn::token::Eq = input.parse()?;
            match keyword.to_string().as_str() {
                "api" => {
                    api = Some(input.parse()?);
                }
                "prefix" => {
                    prefix = Some(input.parse()?);
                }
                _ => return Err(syn::Error::new(keyword.span(), "Unrecognized keyword")),
            };

            if input.peek(syn::token::Comma) {
                let _: syn::token::Comma = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("Expected `,`"));
        }

        Ok(Self {
            prefix: prefix.unwrap_or_else(|| syn::parse_quote!(::verimock)),
            api,
        })
    }
}

/// How a trait method is exposed on the mock.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Call,
    /// `#[verimock(get)]`
    Get,
    /// `#[verimock(set)]`
    Set,
}

/// Remove `#[verimock(..)]` attributes from a trait method and interpret them.
pub fn take_method_kind(attrs: &mut Vec<syn::Attribute>) -> syn::Result<MethodKind> {
    let mut kind = MethodKind::Call;
    let mut error: Option<syn::Error> = None;

    attrs.retain(|attr| {
        if !attr.path().is_ident("verimock") {
            return true;
        }

        match attr.parse_args::<syn::Ident>() {
            Ok(ident) if ident == "get" => kind = MethodKind::Get,
            Ok(ident) if ident == "set" => kind = MethodKind::Set,
            Ok(ident) => {
                error = Some(syn::Error::new(ident.span(), "Expected `get` or `set`"));
            }
            Err(err) => error = Some(err),
        }

        false
    });

    match error {
        Some(err) => Err(err),
        None => Ok(kind),
    }
}
