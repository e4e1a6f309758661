//! Authenticated navigation gate.

use std::fmt;

use crate::session::Session;
use crate::store::ApiStore;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Products,
    AddProduct,
    EditProduct(String),
    Orders,
    Users,
    Blogs,
    AddBlog,
    EditBlog(String),
}

impl Route {
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Products => "/products".to_string(),
            Route::AddProduct => "/add-product".to_string(),
            Route::EditProduct(id) => format!("/add-product/{id}"),
            Route::Orders => "/orders".to_string(),
            Route::Users => "/users".to_string(),
            Route::Blogs => "/blog".to_string(),
            Route::AddBlog => "/add-blog".to_string(),
            Route::EditBlog(id) => format!("/add-blog?id={id}"),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        if let Some(id) = path.strip_prefix("/add-blog?id=") {
            return (!id.is_empty()).then(|| Route::EditBlog(id.to_string()));
        }
        if let Some(id) = path.strip_prefix("/add-product/") {
            return (!id.is_empty()).then(|| Route::EditProduct(id.to_string()));
        }
        match path {
            "/login" => Some(Route::Login),
            "/" => Some(Route::Dashboard),
            "/products" => Some(Route::Products),
            "/add-product" => Some(Route::AddProduct),
            "/orders" => Some(Route::Orders),
            "/users" => Some(Route::Users),
            "/blog" => Some(Route::Blogs),
            "/add-blog" => Some(Route::AddBlog),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow(Route),
    Redirect(Route),
}

/// Protected routes need a session token; without one, go to login.
pub fn guard(session: &Session, route: Route) -> Navigation {
    if route.is_protected() && !session.is_authenticated() {
        tracing::debug!(route = %route, "redirecting to login");
        return Navigation::Redirect(Route::Login);
    }
    Navigation::Allow(route)
}

/// Gate a navigation on the store's current session. A token the server
/// rejected earlier has already been cleared, so this redirects too.
pub fn navigate<T: Transport>(store: &ApiStore<T>, route: Route) -> Navigation {
    guard(&store.session(), route)
}

/// Clear the token and the whole cache, then head to login.
pub fn logout<T: Transport>(store: &ApiStore<T>) -> Route {
    store.logout();
    Route::Login
}
