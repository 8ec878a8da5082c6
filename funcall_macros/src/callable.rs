use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{FnArg, ItemFn, Pat, PatType, ReturnType, Type, parse_macro_input};

pub fn callable_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return syn::Error::new(attr.span(), "#[callable] takes no arguments")
            .to_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as ItemFn);

    if let Some(asyncness) = &input.sig.asyncness {
        return syn::Error::new(asyncness.span(), "#[callable] functions must be synchronous")
            .to_compile_error()
            .into();
    }

    let fn_name = &input.sig.ident;
    let fn_vis = &input.vis;
    let fn_attrs = &input.attrs;
    let fn_output = &input.sig.output;
    let fn_generics = &input.sig.generics;
    let fn_block = &input.block;

    if !fn_generics.params.is_empty() {
        return syn::Error::new(fn_generics.span(), "#[callable] functions cannot be generic")
            .to_compile_error()
            .into();
    }

    // function_name -> FunctionNameArgs
    let struct_name = syn::Ident::new(
        &format!(
            "{}Args",
            fn_name
                .to_string()
                .split('_')
                .map(|s| {
                    let mut c = s.chars();
                    match c.next() {
                        None => String::new(),
                        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
                    }
                })
                .collect::<String>()
        ),
        fn_name.span(),
    );

    let mut params = Vec::new();
    for arg in &input.sig.inputs {
        match arg {
            FnArg::Receiver(receiver) => {
                return syn::Error::new(receiver.span(), "#[callable] cannot be used on methods")
                    .to_compile_error()
                    .into();
            }
            FnArg::Typed(PatType { pat, ty, attrs, .. }) => match pat.as_ref() {
                Pat::Ident(pat_ident) => {
                    params.push((pat_ident.ident.clone(), ty.clone(), attrs.clone()));
                }
                other => {
                    return syn::Error::new(
                        other.span(),
                        "#[callable] parameters must be plain identifiers",
                    )
                    .to_compile_error()
                    .into();
                }
            },
        }
    }

    let param_names: Vec<_> = params.iter().map(|(name, _, _)| name).collect();
    let param_types: Vec<_> = params.iter().map(|(_, ty, _)| ty).collect();
    let struct_fields = params.iter().map(|(name, ty, attrs)| {
        quote! {
            #(#attrs)*
            pub #name: #ty
        }
    });

    let function_name = fn_name.to_string();
    let description = match doc_string(fn_attrs) {
        Some(doc) => quote! { function.with_description(#doc) },
        None => quote! { function },
    };

    let constructor = if returns_result(fn_output) {
        quote! {
            ::funcall::CallableFunction::from_fallible_fn(
                #function_name,
                |args: #struct_name| #fn_name(#(args.#param_names),*).map_err(::core::convert::Into::into),
            )
        }
    } else {
        quote! {
            ::funcall::CallableFunction::from_fn(
                #function_name,
                |args: #struct_name| #fn_name(#(args.#param_names),*),
            )
        }
    };

    let expanded = quote! {
        #(#fn_attrs)*
        #fn_vis fn #fn_name(#(#param_names: #param_types),*) #fn_output #fn_block

        #[derive(::serde::Deserialize, ::schemars::JsonSchema)]
        #fn_vis struct #struct_name {
            #(#struct_fields),*
        }

        impl #struct_name {
            pub fn callable() -> ::funcall::CallableFunction {
                let function = #constructor;
                #description
            }
        }
    };

    TokenStream::from(expanded)
}

/// Join the non-empty lines of the `///` comments.
fn doc_string(attrs: &[syn::Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| {
            let name_value = attr.meta.require_name_value().ok()?;
            match &name_value.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => {
                    let value = s.value();
                    let line = value.trim();
                    (!line.is_empty()).then(|| line.to_string())
                }
                _ => None,
            }
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(path) => path
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    }
}
