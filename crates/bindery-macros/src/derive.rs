//! `FormModel` derive implementation.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::DeriveInput;

use crate::parse::{FormField, FormStruct, Shape};

/// Expands `#[derive(FormModel)]`.
pub fn expand_form_model(item: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(item)?;
    let parsed = FormStruct::parse(&input)?;
    Ok(generate_table(&parsed))
}

/// Generates the trait impl: one accessor fn per field plus a static table.
fn generate_table(parsed: &FormStruct) -> TokenStream {
    let ident = &parsed.ident;
    let count = parsed.fields.len();

    let accessors = parsed.fields.iter().map(|field| accessor(ident, field));
    let entries = parsed.fields.iter().map(|field| {
        let name = &field.name;
        let key = &field.key;
        let accessor = accessor_ident(field);
        let variant = match field.shape {
            Shape::Scalar => quote!(Scalar),
            Shape::Sequence => quote!(Sequence),
            Shape::Record => quote!(Record),
            Shape::Optional => quote!(Optional),
            Shape::File => quote!(File),
        };
        quote! {
            ::bindery::__private::Field::new(
                #name,
                #key,
                ::bindery::__private::FieldKind::#variant(#accessor),
            )
        }
    });

    quote! {
        #[automatically_derived]
        impl ::bindery::__private::FormModel for #ident {
            fn fields() -> &'static [::bindery::__private::Field<Self>] {
                #(#accessors)*

                static FIELDS: [::bindery::__private::Field<#ident>; #count] = [
                    #(#entries),*
                ];
                &FIELDS
            }
        }
    }
}

fn accessor_ident(field: &FormField) -> syn::Ident {
    format_ident!("__bindery_{}", field.name)
}

fn accessor(owner: &syn::Ident, field: &FormField) -> TokenStream {
    let fn_name = accessor_ident(field);
    let member = &field.ident;
    let slot = match field.shape {
        Shape::Scalar => quote!(ScalarSlot),
        Shape::Sequence => quote!(SequenceSlot),
        Shape::Record => quote!(RecordSlot),
        Shape::Optional => quote!(OptionalSlot),
        Shape::File => quote!(FileSlot),
    };

    quote! {
        fn #fn_name(model: &mut #owner) -> &mut dyn ::bindery::__private::#slot {
            &mut model.#member
        }
    }
}
