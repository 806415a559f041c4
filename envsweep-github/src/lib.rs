//! # envsweep-github
//!
//! GitHub REST client for the reconciler: cursor-following paged reads,
//! branch and deployment catalog construction, and delete-by-id.
//!
//! The network sits behind two small traits so everything above it is
//! testable with stubs:
//! - [`PageSource`] — fetch one page URL, yielding records plus the next
//!   cursor from the `Link` header;
//! - [`PagedApi`] — fetch every record of a repository endpoint.
//!
//! [`GithubClient`] implements both over `ureq`.

pub mod catalog;
pub mod client;
pub mod error;
pub mod pages;

pub use catalog::{fetch_branches, fetch_deployments, PagedApi};
pub use client::GithubClient;
pub use error::GithubError;
pub use pages::{next_link, Page, PageIter, PageSource};
