//! The verimock procedural macro.

#![forbid(unsafe_code)]

mod attr;
mod generate;
mod method;

extern crate proc_macro;

///
/// The `verimock` attribute macro.
/// Re-exported by `verimock`, it is documented there.
///
#[proc_macro_attribute]
pub fn verimock(
    attr: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let attr = syn::parse_macro_input!(attr as attr::Attr);
    let item_trait = syn::parse_macro_input!(input as syn::ItemTrait);

    let output = match generate::generate(attr, item_trait) {
        Ok(stream) => stream,
        Err(err) => err.to_compile_error(),
    };

    proc_macro::TokenStream::from(output)
}
