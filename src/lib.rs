//! Small, stateless helpers shared across a web-application codebase:
//! secure random tokens and passwords, string normalization, base64 /
//! data-URI handling, date arithmetic, IBAN masking and hash-bucket
//! paths.
//!
//! The security-sensitive part is [`random`]: uniform sampling from
//! arbitrary alphabets over a caller-supplied CSPRNG, with rejection
//! sampling against modulo bias and a secure Fisher-Yates shuffle for
//! structured passwords. Everything else is a thin, independently
//! testable utility.

pub mod arrays;
pub mod convert;
pub mod datetime;
pub mod encoding;
pub mod hashing;
pub mod masking;
pub mod paths;
pub mod random;
pub mod security;
pub mod strings;

pub use random::{
    random_password, random_token, sample_symbols, secure_shuffle, uniform_int, RandomError,
};
