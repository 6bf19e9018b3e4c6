//! # graft-core-derive
//!
//! Procedural macros for the graft-core dependency injection engine:
//! - `#[injectable]`: implement the `Injectable` trait for a struct
//!
//! Fields marked `#[inject]` become constructor parameters, in field order,
//! and must be `Arc<T>`. Fields marked `#[property]` are assigned after
//! construction and must be `Option<Arc<T>>`. Both accept an explicit
//! identifier, `#[inject(name = "db")]` or `#[inject(ident = expr)]`; without
//! one the identifier is the field's service type. Remaining fields start from
//! `Default::default()`.
//!
//! ```ignore
//! use std::sync::Arc;
//! use graft_core_derive::injectable;
//!
//! #[injectable]
//! pub struct UserService {
//!     #[inject]
//!     repository: Arc<dyn UserRepository>,
//!     #[inject(name = "database_url")]
//!     url: Arc<String>,
//!     #[property]
//!     audit: Option<Arc<AuditLog>>,
//! }
//! ```

use proc_macro::TokenStream;

mod injectable;

/// Injectable attribute macro for automatic dependency injection
#[proc_macro_attribute]
pub fn injectable(args: TokenStream, input: TokenStream) -> TokenStream {
    injectable::injectable_impl(args, input)
}
