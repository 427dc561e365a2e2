//! # Scrudgen Codec
//!
//! Canonical string encoding for composite identifiers: identifiers made of an
//! ordered tuple of two to four component entity identifiers.
//!
//! The encoded form joins each component identifier with [`SEPARATOR`]. It is
//! meant to travel through REST paths and form fields while the decoded value
//! keeps structural identity semantics:
//!
//! ```
//! use scrudgen_codec::{Pair, FromIdentifier};
//!
//! let id: Pair<String, String> = "alice_bob".parse().unwrap();
//! assert_eq!(id.left, "alice");
//! assert_eq!(id.to_string(), "alice_bob");
//! ```
//!
//! Decoding is strict: exactly `arity` non-blank segments are required. The
//! encoder on the other hand keeps empty positions for partially populated
//! composites, so a half-filled value encodes fine but does not decode.
//!
//! This crate does not depend on the generator and is what generated
//! identifier adapters call into at runtime.

mod arity;
mod codec;
mod composite;
mod error;
mod identifiable;

pub use arity::Arity;
pub use codec::{SEPARATOR, encode_segments, split};
pub use composite::{Pair, Quadruple, Triple};
pub use error::{MalformedIdentifier, UnsupportedArity};
pub use identifiable::{FromIdentifier, Identifiable};
