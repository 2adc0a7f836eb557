use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// `DativeLocative` → `dative_locative`.
fn field_name(variant: &syn::Ident) -> syn::Ident {
    let mut snake = String::new();
    for ch in variant.to_string().chars() {
        if ch.is_uppercase() && !snake.is_empty() {
            snake.push('_');
        }
        snake.extend(ch.to_lowercase());
    }
    syn::Ident::new(&snake, variant.span())
}

/// Derives `<Enum>Map<T>`, a struct holding one `T` per unit variant.
///
/// The generated map is total: every variant always has a value, so lookups
/// never fail. Besides `get`/`get_mut` it provides `KEYS` (variants in
/// declaration order), `from_fn`, `iter`, `map` and `values`.
#[proc_macro_derive(EnuMap)]
pub fn derive_enumap(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_name = &input.ident;
    let vis = &input.vis;
    let map_name = format_ident!("{}Map", enum_name);

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            enum_name,
            "EnuMap can only be derived for enums",
        ));
    };
    if data_enum.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            enum_name,
            "EnuMap needs at least one variant",
        ));
    }

    let variant_names = data_enum
        .variants
        .iter()
        .map(|variant| match variant.fields {
            Fields::Unit => Ok(&variant.ident),
            _ => Err(syn::Error::new_spanned(
                variant,
                "EnuMap only supports variants without fields",
            )),
        })
        .collect::<syn::Result<Vec<_>>>()?;
    let field_names: Vec<syn::Ident> = variant_names.iter().map(|v| field_name(v)).collect();
    let variant_count = variant_names.len();

    Ok(quote! {
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        #vis struct #map_name<T> {
            #(pub #field_names: T),*
        }

        impl<T> #map_name<T> {
            /// Every key, in declaration order.
            pub const KEYS: [#enum_name; #variant_count] = [#(#enum_name::#variant_names),*];

            pub fn from_fn(mut f: impl FnMut(#enum_name) -> T) -> Self {
                Self {
                    #(#field_names: f(#enum_name::#variant_names)),*
                }
            }

            pub fn get(&self, key: &#enum_name) -> &T {
                match key {
                    #(#enum_name::#variant_names => &self.#field_names),*
                }
            }

            pub fn get_mut(&mut self, key: &#enum_name) -> &mut T {
                match key {
                    #(#enum_name::#variant_names => &mut self.#field_names),*
                }
            }

            pub fn iter(&self) -> impl Iterator<Item = (#enum_name, &T)> {
                [#((#enum_name::#variant_names, &self.#field_names)),*].into_iter()
            }

            pub fn values(&self) -> impl Iterator<Item = &T> {
                [#(&self.#field_names),*].into_iter()
            }

            pub fn map<U>(self, mut f: impl FnMut(#enum_name, T) -> U) -> #map_name<U> {
                #map_name {
                    #(#field_names: f(#enum_name::#variant_names, self.#field_names)),*
                }
            }
        }
    })
}
