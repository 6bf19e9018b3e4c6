//! Injectable attribute macro implementation
//!
//! Provides the `#[injectable]` attribute macro, which implements the
//! `Injectable` trait for a struct by analyzing its annotated fields.

use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use syn::{
    parse::Result, parse_macro_input, parse_quote, Attribute, Error, Expr, Fields,
    GenericArgument, Item, ItemStruct, LitStr, Meta, PathArguments, PathSegment, Type,
};

/// Main implementation function for the injectable macro
pub fn injectable_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = proc_macro2::TokenStream::from(args);
    let input_item = parse_macro_input!(input as Item);

    if !args.is_empty() {
        return Error::new_spanned(args, "#[injectable] takes no arguments")
            .to_compile_error()
            .into();
    }

    match process_injectable_item(input_item) {
        Ok(result) => result.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn process_injectable_item(item: Item) -> Result<proc_macro2::TokenStream> {
    match item {
        Item::Struct(mut item_struct) => process_injectable_struct(&mut item_struct),
        _ => Err(Error::new_spanned(
            item,
            "#[injectable] can only be applied to structs",
        )),
    }
}

/// Process a struct marked with #[injectable]
fn process_injectable_struct(item_struct: &mut ItemStruct) -> Result<proc_macro2::TokenStream> {
    let fields = extract_fields(item_struct)?;
    let injectable_impl = generate_injectable_impl(item_struct, &fields);

    Ok(quote! {
        #item_struct

        #injectable_impl
    })
}

/// Explicit identifier given in a field attribute
#[derive(Debug, Clone)]
enum IdentOverride {
    Name(LitStr),
    Expr(Expr),
}

/// How a field gets its value
#[derive(Debug, Clone)]
enum FieldRole {
    /// Constructor parameter, from `#[inject]`
    Param {
        service_type: Type,
        ident: Option<IdentOverride>,
    },
    /// Assigned after construction, from `#[property]`
    Property {
        service_type: Type,
        ident: Option<IdentOverride>,
    },
    /// Not injected; starts from `Default::default()`
    Default,
}

#[derive(Debug, Clone)]
struct FieldInfo {
    name: Ident,
    role: FieldRole,
}

/// Read the field attributes and strip them from the struct
fn extract_fields(item_struct: &mut ItemStruct) -> Result<Vec<FieldInfo>> {
    if matches!(item_struct.fields, Fields::Unnamed(_)) {
        return Err(Error::new_spanned(
            &item_struct.fields,
            "#[injectable] requires structs with named fields",
        ));
    }
    let fields = match &mut item_struct.fields {
        Fields::Named(fields) => &mut fields.named,
        _ => return Ok(Vec::new()),
    };

    let mut infos = Vec::new();
    for field in fields.iter_mut() {
        let Some(name) = field.ident.clone() else {
            continue;
        };

        let mut role = FieldRole::Default;
        let mut kept = Vec::with_capacity(field.attrs.len());
        for attr in field.attrs.drain(..) {
            let is_inject = attr.path().is_ident("inject");
            let is_property = attr.path().is_ident("property");
            if !is_inject && !is_property {
                kept.push(attr);
                continue;
            }
            if !matches!(role, FieldRole::Default) {
                return Err(Error::new_spanned(
                    attr,
                    "a field may carry only one #[inject] or #[property] attribute",
                ));
            }

            let ident = parse_ident_override(&attr)?;
            role = if is_inject {
                FieldRole::Param {
                    service_type: extract_arc_inner_type(&field.ty)?,
                    ident,
                }
            } else {
                FieldRole::Property {
                    service_type: extract_option_arc_inner_type(&field.ty)?,
                    ident,
                }
            };
        }
        field.attrs = kept;

        infos.push(FieldInfo { name, role });
    }

    Ok(infos)
}

/// Parse `name = "..."` or `ident = <expr>` from an inject/property attribute
fn parse_ident_override(attr: &Attribute) -> Result<Option<IdentOverride>> {
    if !matches!(attr.meta, Meta::List(_)) {
        return Ok(None);
    }

    let mut result = None;
    attr.parse_nested_meta(|meta| {
        if result.is_some() {
            return Err(meta.error("only one of `name` or `ident` may be given"));
        }
        if meta.path.is_ident("name") {
            result = Some(IdentOverride::Name(meta.value()?.parse()?));
            Ok(())
        } else if meta.path.is_ident("ident") {
            result = Some(IdentOverride::Expr(meta.value()?.parse()?));
            Ok(())
        } else {
            Err(meta.error("expected `name = \"...\"` or `ident = <expression>`"))
        }
    })?;

    Ok(result)
}

/// Extract the generic type from a type segment
fn extract_generic_type(segment: &PathSegment, expected_name: &str) -> Result<Type> {
    if let PathArguments::AngleBracketed(args) = &segment.arguments {
        if let Some(GenericArgument::Type(inner_type)) = args.args.first() {
            return Ok(inner_type.clone());
        }
    }

    Err(Error::new_spanned(
        segment,
        format!("Failed to extract generic type from {}<T>", expected_name),
    ))
}

/// Extract the inner type from Arc<T>
fn extract_arc_inner_type(ty: &Type) -> Result<Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Arc" {
                return extract_generic_type(segment, "Arc");
            }
        }
    }

    Err(Error::new_spanned(ty, "#[inject] fields must have type Arc<T>"))
}

/// Extract the inner type from Option<Arc<T>>
fn extract_option_arc_inner_type(ty: &Type) -> Result<Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                let inner = extract_generic_type(segment, "Option")?;
                return extract_arc_inner_type(&inner).map_err(|_| {
                    Error::new_spanned(ty, "#[property] fields must have type Option<Arc<T>>")
                });
            }
        }
    }

    Err(Error::new_spanned(
        ty,
        "#[property] fields must have type Option<Arc<T>>",
    ))
}

/// `DeclaredType` for a service type; trait objects are abstract
fn declared_type(service_type: &Type) -> proc_macro2::TokenStream {
    let is_abstract = match service_type {
        Type::TraitObject(_) => true,
        Type::Paren(paren) => matches!(*paren.elem, Type::TraitObject(_)),
        _ => false,
    };

    if is_abstract {
        quote! { ::graft_core::container::DeclaredType::of_abstract::<#service_type>() }
    } else {
        quote! { ::graft_core::container::DeclaredType::of::<#service_type>() }
    }
}

fn ident_expr(ident: &Option<IdentOverride>) -> proc_macro2::TokenStream {
    match ident {
        Some(IdentOverride::Name(name)) => quote! {
            ::std::option::Option::Some(::graft_core::container::ServiceIdent::name(#name))
        },
        Some(IdentOverride::Expr(expr)) => quote! {
            ::std::option::Option::Some(::graft_core::container::ServiceIdent::from(#expr))
        },
        None => quote! { ::std::option::Option::None },
    }
}

/// Generate the Injectable trait implementation
fn generate_injectable_impl(item_struct: &ItemStruct, fields: &[FieldInfo]) -> proc_macro2::TokenStream {
    let struct_name = &item_struct.ident;

    // Every type parameter must satisfy the trait's Send + Sync + 'static bound
    let mut generics = item_struct.generics.clone();
    let type_params: Vec<Ident> = generics.type_params().map(|param| param.ident.clone()).collect();
    if !type_params.is_empty() {
        let where_clause = generics.make_where_clause();
        for param in &type_params {
            where_clause.predicates.push(parse_quote! {
                #param: ::std::marker::Send + ::std::marker::Sync + 'static
            });
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut param_types = Vec::new();
    let mut param_declarations = Vec::new();
    let mut property_declarations = Vec::new();
    let mut field_initializers = Vec::new();
    let mut property_arms = Vec::new();

    for field in fields {
        let name = &field.name;
        match &field.role {
            FieldRole::Param {
                service_type,
                ident,
            } => {
                let index = param_types.len();
                param_types.push(declared_type(service_type));
                let ident = ident_expr(ident);
                param_declarations.push(quote! {
                    declaration.inject_param(#index, #ident)?;
                });
                field_initializers.push(quote! {
                    #name: args.next::<#service_type>()?
                });
            }
            FieldRole::Property {
                service_type,
                ident,
            } => {
                let key = name.to_string();
                let declared = declared_type(service_type);
                let ident = ident_expr(ident);
                property_declarations.push(quote! {
                    declaration.inject_property(#key, #ident, #declared)?;
                });
                field_initializers.push(quote! {
                    #name: ::std::option::Option::None
                });
                property_arms.push(quote! {
                    #key => {
                        self.#name = ::std::option::Option::Some(property.value::<#service_type>()?);
                        ::std::result::Result::Ok(())
                    }
                });
            }
            FieldRole::Default => {
                field_initializers.push(quote! {
                    #name: ::std::default::Default::default()
                });
            }
        }
    }

    let declare_param_types = if param_types.is_empty() {
        quote! {}
    } else {
        quote! { declaration.param_types([#(#param_types),*]); }
    };

    let assign = if property_arms.is_empty() {
        quote! {}
    } else {
        quote! {
            fn assign(
                &mut self,
                property: ::graft_core::container::Property,
            ) -> ::std::result::Result<(), ::graft_core::errors::ContainerError> {
                match property.key() {
                    #(#property_arms)*
                    key => ::std::result::Result::Err(
                        ::graft_core::errors::ContainerError::unknown_property(
                            ::std::any::type_name::<Self>(),
                            key,
                        ),
                    ),
                }
            }
        }
    };

    quote! {
        impl #impl_generics ::graft_core::container::Injectable for #struct_name #ty_generics #where_clause {
            fn declare(
                declaration: &mut ::graft_core::container::Declaration,
            ) -> ::std::result::Result<(), ::graft_core::errors::ContainerError> {
                declaration.mark_injectable()?;
                #declare_param_types
                #(#param_declarations)*
                #(#property_declarations)*
                ::std::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn construct(
                args: &mut ::graft_core::container::Arguments,
            ) -> ::std::result::Result<Self, ::graft_core::errors::ContainerError> {
                ::std::result::Result::Ok(Self {
                    #(#field_initializers),*
                })
            }

            #assign
        }
    }
}
