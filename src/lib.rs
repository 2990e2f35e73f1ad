//! Build Atom syndication feeds in memory, check them against the
//! mandatory-field rules of RFC 4287, and serialize them to XML.
//!
//! The [`atom`] module is the library proper. [`input`] and [`config`]
//! back the `atomgen` command-line tool.

pub mod atom;
pub mod config;
pub mod input;

pub use atom::{Author, Category, Entry, Feed, GenerateError, ValidationError, XmlOptions};
