//! The command registry.
//!
//! Built once at startup from the registered routes and read-only afterwards,
//! so it is shared between tasks behind an `Arc` without locking.

use std::collections::HashMap;
use std::sync::Arc;

use hookcord_core::{CommandSchema, Url};
use tracing::{debug, warn};

use crate::command::derive_command;
use crate::error::{ResolveError, ResolveResult};
use crate::params::Params;
use crate::route::Route;

/// Immutable mapping from command names and request paths to routes.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    routes: Vec<Arc<Route>>,
    commands: HashMap<String, usize>,
    schemas: Vec<CommandSchema>,
}

impl CommandRegistry {
    /// Builds the registry from `routes`.
    ///
    /// Routes whose command cannot be derived stay reachable as plain HTTP
    /// routes. When two routes derive the same command name the first wins.
    pub fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        let mut registry = Self::default();

        for route in routes {
            let index = registry.routes.len();
            if let Some(schema) = derive_command(&route) {
                if registry.commands.contains_key(&schema.name) {
                    warn!(
                        command = %schema.name,
                        route = %route.pattern(),
                        "Duplicate command name, keeping the first route"
                    );
                } else {
                    debug!(command = %schema.name, options = schema.options.len(), "Command derived");
                    registry.commands.insert(schema.name.clone(), index);
                    registry.schemas.push(schema);
                }
            }
            registry.routes.push(Arc::new(route));
        }

        registry
    }

    /// Looks up the route registered under a command name.
    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.commands.get(name).map(|&i| &self.routes[i])
    }

    /// Route for a command interaction carrying `name`.
    pub fn command(&self, name: Option<&str>) -> ResolveResult<&Arc<Route>> {
        let name = name.ok_or(ResolveError::MissingName)?;
        self.get(name)
            .ok_or_else(|| ResolveError::UnknownCommand(name.to_string()))
    }

    /// Route for a clicked button whose custom id is a path relative to `base`.
    ///
    /// Returns the absolute URL the click stands for along with the match.
    pub fn component(
        &self,
        base: &Url,
        custom_id: Option<&str>,
    ) -> ResolveResult<(Arc<Route>, Params, Url)> {
        let custom_id = custom_id.ok_or(ResolveError::MissingName)?;
        let url = base
            .join(custom_id)
            .map_err(|e| ResolveError::InvalidUrl(format!("{custom_id}: {e}")))?;
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let (route, params) = self
            .match_path(url.path(), &query)
            .ok_or_else(|| ResolveError::UnknownComponent(custom_id.to_string()))?;
        Ok((route, params, url))
    }

    /// Derived command schemas in registration order.
    pub fn schemas(&self) -> &[CommandSchema] {
        &self.schemas
    }

    /// All registered routes in registration order.
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// Finds the first route matching a plain request path and query.
    pub fn match_path(&self, path: &str, query: &[(String, String)]) -> Option<(Arc<Route>, Params)> {
        self.routes.iter().find_map(|route| {
            route
                .pattern()
                .match_request(path, query)
                .map(|params| (Arc::clone(route), params))
        })
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns whether no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookcord_core::{ConnectionInfo, Request};

    async fn first(_: Request, _: ConnectionInfo, _: Params) -> &'static str {
        "first"
    }

    async fn second(_: Request, _: ConnectionInfo, _: Params) -> &'static str {
        "second"
    }

    fn registry() -> CommandRegistry {
        CommandRegistry::new([
            Route::new("/hello/:name?age=", first).unwrap(),
            Route::new("/hello/:other", second).unwrap(),
            Route::new("/bad.name/:x", second).unwrap(),
            Route::new(r"/roll/:n(\d+)", first).unwrap(),
        ])
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let registry = registry();
        let route = registry.get("hello").unwrap();
        assert_eq!(route.pattern().as_str(), "/hello/:name?age=");
        assert_eq!(registry.schemas().len(), 2);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_invalid_name_stays_plain_route() {
        let registry = registry();
        assert!(registry.get("bad.name").is_none());
        let (route, params) = registry.match_path("/bad.name/7", &[]).unwrap();
        assert_eq!(route.pattern().as_str(), "/bad.name/:x");
        assert_eq!(params.get("x"), Some("7"));
    }

    #[test]
    fn test_match_path_honours_constraints() {
        let registry = registry();
        assert!(registry.match_path("/roll/12", &[]).is_some());
        assert!(registry.match_path("/roll/dice", &[]).is_none());
        assert!(registry.match_path("/unknown", &[]).is_none());
    }

    #[test]
    fn test_command_lookup_errors() {
        let registry = registry();
        assert!(registry.command(Some("hello")).is_ok());
        assert_eq!(registry.command(None).unwrap_err(), ResolveError::MissingName);
        assert_eq!(
            registry.command(Some("nope")).unwrap_err(),
            ResolveError::UnknownCommand("nope".into())
        );
    }

    #[test]
    fn test_component_resolves_relative_to_base() {
        let registry = registry();
        let base = Url::parse("http://bridge.test/interactions").unwrap();

        let (route, params, url) = registry.component(&base, Some("/hello/Bob?age=3")).unwrap();
        assert_eq!(route.pattern().as_str(), "/hello/:name?age=");
        assert_eq!(params.get("name"), Some("Bob"));
        assert_eq!(params.get("age"), Some("3"));
        assert_eq!(url.as_str(), "http://bridge.test/hello/Bob?age=3");

        assert_eq!(
            registry.component(&base, Some("/missing")).unwrap_err(),
            ResolveError::UnknownComponent("/missing".into())
        );
        assert_eq!(registry.component(&base, None).unwrap_err(), ResolveError::MissingName);
    }
}
