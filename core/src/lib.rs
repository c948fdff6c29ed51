//! Domain core for the multi-user todo service.
//!
//! # Overview
//! Everything here is deterministic and free of I/O. The server crate owns
//! the file system, the network and the runtime; this crate owns the rules:
//! what a todo looks like, which defaults apply at creation, how a partial
//! update merges, how ids are allocated in the file collection and how a
//! todo maps onto a document in the remote collection.
//!
//! # Design
//! - `Todo` is the single entity. Its id is either a sequential number
//!   (file backend) or an opaque backend key (document backend).
//! - `collection` holds the pure operations on a loaded file collection.
//! - `DocumentClient` follows the host-does-IO split: `build_*` produces an
//!   `HttpRequest`, the caller executes it, `parse_*` consumes the
//!   `HttpResponse`.

pub mod client;
pub mod collection;
pub mod credentials;
pub mod error;
pub mod http;
pub mod mapping;
pub mod types;

pub use client::DocumentClient;
pub use collection::IdPolicy;
pub use credentials::Credentials;
pub use error::{BackendError, CredentialsError, TodoError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{Document, NewTodo, Todo, TodoId, TodoPatch};
