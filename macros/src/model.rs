use darling::{ast, FromMeta};
use proc_macro2::{TokenStream, TokenTree};
use quote::{format_ident, quote, ToTokens};
use syn::{spanned::Spanned, Meta};

/// Which input structs to generate. With no arguments, both are generated.
#[derive(Default, FromMeta)]
struct ModelArgs {
	#[darling(default)]
	create: bool,
	#[darling(default)]
	update: bool,
}

/// How a field takes part in the generated inputs.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldMode {
	Both,
	CreateOnly,
	Skip,
}

struct InputField {
	attrs: Vec<syn::Attribute>,
	ident: syn::Ident,
	ty: syn::Type,
	vis: syn::Visibility,
	mode: FieldMode,
}

pub fn from_input(
	args: proc_macro::TokenStream,
	input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
	let args = match ast::NestedMeta::parse_meta_list(args.into()) {
		Ok(x) => x,
		Err(e) => return e.into_compile_error().into(),
	};

	let args = match ModelArgs::from_list(&args) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let mut input = syn::parse_macro_input!(input as syn::DeriveInput);

	match expand(&args, &mut input) {
		Ok(tokens) => tokens.into(),
		Err(e) => e.into_compile_error().into(),
	}
}

fn expand(args: &ModelArgs, input: &mut syn::DeriveInput) -> syn::Result<TokenStream> {
	let syn::Data::Struct(syn::DataStruct {
		fields: syn::Fields::Named(ref mut named),
		..
	}) = input.data
	else {
		return Err(syn::Error::new(
			input.span(),
			"#[model] only supports structs with named fields",
		));
	};

	let mut fields = Vec::with_capacity(named.named.len());

	for field in &mut named.named {
		let mode = field_mode(&field.attrs)?;

		// `#[model(..)]` is consumed here and must not reach the compiler
		field.attrs.retain(|attr| !attr.path().is_ident("model"));

		if mode == FieldMode::Skip || is_serde_skipped(&field.attrs) {
			continue;
		}

		let Some(ident) = field.ident.clone() else {
			continue;
		};

		fields.push(InputField {
			attrs: field
				.attrs
				.iter()
				.filter(|attr| is_input_attr(attr))
				.cloned()
				.collect(),
			ident,
			ty: field.ty.clone(),
			vis: field.vis.clone(),
			mode,
		});
	}

	let ident = &input.ident;
	let vis = &input.vis;
	let generics = &input.generics;
	let docs = input
		.attrs
		.iter()
		.filter(|attr| attr.path().is_ident("doc"))
		.collect::<Vec<_>>();

	let (create, update) = if args.create || args.update {
		(args.create, args.update)
	} else {
		(true, true)
	};

	let create_struct = create.then(|| {
		let create_ident = format_ident!("Create{}Input", ident);
		let create_fields = fields.iter().map(|field| {
			let InputField {
				attrs, ident, ty, vis, ..
			} = field;

			quote! {
				#(#attrs)*
				#vis #ident: #ty,
			}
		});

		quote! {
			#(#docs)*
			#[derive(Debug, ::serde::Deserialize, ::schemars::JsonSchema, ::validator::Validate)]
			#vis struct #create_ident #generics {
				#(#create_fields)*
			}
		}
	});

	let update_struct = update.then(|| {
		let update_ident = format_ident!("Update{}Input", ident);
		let update_fields = fields
			.iter()
			.filter(|field| field.mode == FieldMode::Both)
			.map(|field| {
				let InputField {
					attrs, ident, ty, vis, ..
				} = field;

				let ty = if is_option(ty) {
					quote!(#ty)
				} else {
					quote!(Option<#ty>)
				};

				quote! {
					#(#attrs)*
					#[serde(default)]
					#vis #ident: #ty,
				}
			});

		quote! {
			#(#docs)*
			#[derive(Debug, ::serde::Deserialize, ::schemars::JsonSchema, ::validator::Validate)]
			#vis struct #update_ident #generics {
				#(#update_fields)*
			}
		}
	});

	Ok(quote! {
		#input

		#create_struct

		#update_struct
	})
}

/// Optional fields stay as-is in the update input, so `None` means "unchanged".
fn is_option(ty: &syn::Type) -> bool {
	let syn::Type::Path(syn::TypePath { qself: None, path }) = ty else {
		return false;
	};

	path.segments
		.last()
		.is_some_and(|segment| segment.ident == "Option")
}

/// Reads `#[model(skip)]` and `#[model(create_only)]` from a field.
fn field_mode(attrs: &[syn::Attribute]) -> syn::Result<FieldMode> {
	let mut mode = FieldMode::Both;

	for attr in attrs.iter().filter(|attr| attr.path().is_ident("model")) {
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("skip") {
				mode = FieldMode::Skip;
				Ok(())
			} else if meta.path.is_ident("create_only") {
				mode = FieldMode::CreateOnly;
				Ok(())
			} else {
				Err(meta.error("expected `skip` or `create_only`"))
			}
		})?;
	}

	Ok(mode)
}

/// Fields with `#[serde(skip_deserializing)]` or `#[serde(skip)]` can never
/// come from a client, so they are left out of the inputs.
fn is_serde_skipped(attrs: &[syn::Attribute]) -> bool {
	attrs.iter().any(|attr| {
		let Meta::List(ref list) = attr.meta else {
			return false;
		};

		if !list.path.is_ident("serde") {
			return false;
		}

		list.tokens.to_token_stream().into_iter().any(|token| {
			matches!(token, TokenTree::Ident(ref ident) if ident == "skip_deserializing" || ident == "skip")
		})
	})
}

/// Attributes that are meaningful on a deserialized input. Storage attributes
/// such as `#[sqlx(..)]` are dropped.
fn is_input_attr(attr: &syn::Attribute) -> bool {
	["doc", "serde", "validate", "schemars"]
		.iter()
		.any(|name| attr.path().is_ident(name))
}
