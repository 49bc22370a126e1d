//! Parsing utilities for the `FormModel` derive.
//!
//! This module turns a struct definition into the list of fields to emit,
//! resolving `#[form(...)]` attributes and inferring each field's shape.

use syn::{
    ext::IdentExt, spanned::Spanned, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr,
    PathArguments, Type,
};

/// The shape a field is mapped as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Single scalar.
    Scalar,
    /// `Vec` of scalars.
    Sequence,
    /// Nested model.
    Record,
    /// Optional nested model.
    Optional,
    /// Uploaded file(s).
    File,
}

/// Options from `#[form(...)]` on one field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// External key override.
    pub rename: Option<String>,
    /// Exclude the field from the table.
    pub skip: bool,
    /// Map the field as a nested model.
    pub nested: bool,
}

impl FieldAttrs {
    /// Collects every `#[form(...)]` attribute of a field.
    pub fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("form")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let key: LitStr = meta.value()?.parse()?;
                    if key.value().is_empty() {
                        return Err(syn::Error::new(key.span(), "form key cannot be empty"));
                    }
                    parsed.rename = Some(key.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                    Ok(())
                } else if meta.path.is_ident("nested") {
                    parsed.nested = true;
                    Ok(())
                } else {
                    let name = meta
                        .path
                        .get_ident()
                        .map_or_else(|| "?".to_string(), ToString::to_string);
                    Err(meta.error(format!("unknown form attribute: {name}")))
                }
            })?;
        }

        Ok(parsed)
    }
}

/// One field that ends up in the generated table.
#[derive(Debug)]
pub struct FormField {
    /// The field identifier.
    pub ident: Ident,
    /// The field name without a raw-identifier prefix.
    pub name: String,
    /// The external key.
    pub key: String,
    /// The mapped shape.
    pub shape: Shape,
}

/// A struct accepted by the derive.
#[derive(Debug)]
pub struct FormStruct {
    /// The struct name.
    pub ident: Ident,
    /// The writable fields, in declaration order.
    pub fields: Vec<FormField>,
}

impl FormStruct {
    /// Validates and parses a derive input.
    pub fn parse(input: &DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new(
                input.generics.span(),
                "FormModel cannot be derived for generic structs",
            ));
        }

        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named,
                _ => {
                    return Err(syn::Error::new(
                        input.ident.span(),
                        "FormModel requires a struct with named fields",
                    ))
                }
            },
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "FormModel can only be derived for structs",
                ))
            }
        };

        let mut fields = Vec::new();
        for field in &named.named {
            let attrs = FieldAttrs::from_attrs(&field.attrs)?;
            if attrs.skip {
                continue;
            }

            let Some(ident) = field.ident.clone() else {
                continue;
            };
            let name = ident.unraw().to_string();
            let key = attrs.rename.clone().unwrap_or_else(|| name.clone());
            let shape = infer_shape(&field.ty, attrs.nested)?;

            fields.push(FormField {
                ident,
                name,
                key,
                shape,
            });
        }

        Ok(Self {
            ident: input.ident.clone(),
            fields,
        })
    }
}

/// Infers the mapped shape from the declared type.
pub fn infer_shape(ty: &Type, nested: bool) -> syn::Result<Shape> {
    let outer = last_ident(ty);

    if nested {
        return Ok(if outer.as_deref() == Some("Option") {
            Shape::Optional
        } else {
            Shape::Record
        });
    }

    let inner_is_file = first_type_argument(ty)
        .and_then(last_ident)
        .is_some_and(|ident| ident == "UploadedFile");

    match outer.as_deref() {
        Some("Vec" | "Option") if inner_is_file => Ok(Shape::File),
        Some("Vec") => Ok(Shape::Sequence),
        Some("UploadedFile") => Err(syn::Error::new(
            ty.span(),
            "a single uploaded file must be declared as Option<UploadedFile>",
        )),
        Some("Option") => Err(syn::Error::new(
            ty.span(),
            "optional fields must be nested models; add #[form(nested)]",
        )),
        _ => Ok(Shape::Scalar),
    }
}

fn last_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

fn first_type_argument(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_keys_and_skip() {
        let input: DeriveInput = parse_quote! {
            struct User {
                #[form(rename = "first_name")]
                first: String,
                age: u8,
                #[form(skip)]
                secret: String,
                r#type: String,
            }
        };
        let parsed = FormStruct::parse(&input).unwrap();

        let keys: Vec<_> = parsed.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["first_name", "age", "type"]);
        assert_eq!(parsed.fields[0].name, "first");
        assert_eq!(parsed.fields[2].name, "type");
    }

    #[test]
    fn test_infer_shapes() {
        assert_eq!(infer_shape(&parse_quote!(u8), false).unwrap(), Shape::Scalar);
        assert_eq!(infer_shape(&parse_quote!(Vec<String>), false).unwrap(), Shape::Sequence);
        assert_eq!(
            infer_shape(&parse_quote!(Vec<UploadedFile>), false).unwrap(),
            Shape::File
        );
        assert_eq!(
            infer_shape(&parse_quote!(Option<bindery::UploadedFile>), false).unwrap(),
            Shape::File
        );
        assert_eq!(infer_shape(&parse_quote!(Address), true).unwrap(), Shape::Record);
        assert_eq!(
            infer_shape(&parse_quote!(Option<Address>), true).unwrap(),
            Shape::Optional
        );
    }

    #[test]
    fn test_rejects_bare_file_and_plain_option() {
        assert!(infer_shape(&parse_quote!(UploadedFile), false).is_err());
        assert!(infer_shape(&parse_quote!(Option<String>), false).is_err());
    }

    #[test]
    fn test_rejects_generics_and_enums() {
        let generic: DeriveInput = parse_quote! { struct Wrapper<T> { inner: T } };
        assert!(FormStruct::parse(&generic).is_err());

        let tuple: DeriveInput = parse_quote! { struct Pair(u8, u8); };
        assert!(FormStruct::parse(&tuple).is_err());

        let enumeration: DeriveInput = parse_quote! { enum Choice { A, B } };
        assert!(FormStruct::parse(&enumeration).is_err());
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let input: DeriveInput = parse_quote! {
            struct User {
                #[form(default = "x")]
                name: String,
            }
        };
        let err = FormStruct::parse(&input).unwrap_err();
        assert!(err.to_string().contains("unknown form attribute: default"));
    }
}
