//! Read, edit and regenerate the metadata header of gettext PO catalogs.
//!
//! The header is the entry with an empty msgid; its translation holds
//! `Key: value` lines. [`header::codec::decode`] turns that payload into an
//! ordered [`header::fields::HeaderFields`] store and
//! [`header::codec::encode`] turns it back. Malformed lines never abort a
//! decode; they come back as diagnostics.
//!
//! [`oracle::verify_round_trip`] checks a catalog against an external
//! canonicalizer such as `msgcat`.

pub mod catalog;
pub mod config;
pub mod header;
pub mod oracle;
