//! Archives long-form subreddit posts into annotated Markdown files.
//!
//! The pipeline discovers post links on an index page (or in a set of
//! discussion threads), normalizes them into reddit fullnames, fetches the
//! underlying posts in rate-limited batches, and writes each one to disk as
//! a word-wrapped file with a metadata header.

pub mod archive;
pub mod client;
pub mod config;
mod error;
pub mod extract;
pub mod fetch;
pub mod fullname;
pub mod listing;
pub mod post;
pub mod process;
pub mod text;

pub use error::{Error, Result};
