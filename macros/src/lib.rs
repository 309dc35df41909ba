mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a documentation function for the route, named after the original function with the suffix `_docs`.
///
/// The first paragraph of the doc comment becomes the summary, the rest becomes the description.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates `CreateXInput` and `UpdateXInput` structs for the model `X`.
///
/// Fields with `#[serde(skip_deserializing)]`, `#[serde(skip)]` or `#[model(skip)]` are left out.
/// Fields with `#[model(create_only)]` only appear in the create input. Every field of the update
/// input is wrapped in an `Option`, unless it already is one. Pass `create` or `update` to generate only one of them.
#[proc_macro_attribute]
pub fn model(args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(args, input)
}
