#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![allow(non_snake_case)]
#![forbid(unsafe_code)]
#![warn(
    clippy::unwrap_used,
    clippy::mod_module_files,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused,
    unused_attributes,
    unused_imports,
    unused_mut,
    unused_must_use
)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

// Internal macros. Must come first!
#[macro_use]
pub(crate) mod macros;

pub use rand_core;
pub use sha3;
pub use subtle;

pub(crate) mod basis;
pub(crate) mod curve;
pub mod error;
pub(crate) mod fp;
pub(crate) mod fp2;
pub(crate) mod isogeny;
pub(crate) mod kem;
pub mod params;
pub(crate) mod strategy;

pub use error::{Error, ErrorKind, Result};
pub use kem::{decapsulate, encapsulate, keygen, Ciphertext, PublicKey, SecretKey};
pub use params::Variant;

use rand_core::{CryptoRng, RngCore};

/// Generate a responder keypair for `variant`.
pub fn generate_keypair(
    rng: &mut (impl RngCore + CryptoRng),
    variant: Variant,
) -> SecretKey {
    keygen(rng, variant.params())
}
