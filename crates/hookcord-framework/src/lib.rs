//! # Hookcord Framework
//!
//! Routing layer between platform interactions and HTTP-style handlers.
//!
//! This layer provides:
//! - The route pattern DSL (`/name/:required?optional=`) with inline regex constraints
//! - Slash-command schema derivation and name validation
//! - An immutable command registry shared by the dispatcher
//! - Interaction option resolution into a synthetic request URL
//! - Button and attachment extraction from handler response headers
//!
//! Nothing here touches the network; the runtime layer drives it.

pub mod attachment;
pub mod command;
pub mod components;
pub mod error;
pub mod handler;
pub mod params;
pub mod registry;
pub mod resolve;
pub mod route;

pub use attachment::attachment_from_headers;
pub use command::{derive_command, is_valid_name};
pub use components::{LinkEntry, extract_buttons, parse_link_headers};
pub use error::{ResolveError, ResolveResult, RouteError, RouteResult};
pub use handler::{BoxedHandler, Handler, IntoResponse};
pub use params::Params;
pub use registry::CommandRegistry;
pub use resolve::{Resolution, resolve_options};
pub use route::{Route, RoutePattern, Segment};
