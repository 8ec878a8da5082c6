use proc_macro::TokenStream;

mod callable;

/// Expose a plain function to the model.
///
/// For `fn generate_password(len: usize) -> String` this generates a
/// `GeneratePasswordArgs` struct holding the parameters and
/// `GeneratePasswordArgs::callable()`, which builds a
/// `funcall::CallableFunction` named `generate_password`. The function's doc
/// comment becomes the description. Functions returning `Result` are
/// registered as fallible.
///
/// The crate using the attribute needs `serde` (with `derive`) and
/// `schemars` as dependencies.
#[proc_macro_attribute]
pub fn callable(attr: TokenStream, item: TokenStream) -> TokenStream {
    callable::callable_impl(attr, item)
}
