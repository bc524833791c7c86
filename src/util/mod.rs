mod result_ext;
pub use result_ext::*;

#[cfg(feature = "csr")]
mod web;
#[cfg(feature = "csr")]
pub use web::*;
