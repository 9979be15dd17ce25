/// Navigable views. Anything unrecognised lands on the home view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    Posts,
}

pub const HOME_PATH: &str = "/home";
pub const POSTS_PATH: &str = "/post";

/// Outcome of resolving a path: either a direct hit or a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Render(Route),
    Redirect(Route),
}

impl Resolved {
    pub fn route(self) -> Route {
        match self {
            Resolved::Render(route) | Resolved::Redirect(route) => route,
        }
    }
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => HOME_PATH,
            Route::Posts => POSTS_PATH,
        }
    }

    pub fn resolve(path: &str) -> Resolved {
        let trimmed = path.trim();
        let normalised = trimmed.trim_end_matches('/');
        match normalised {
            HOME_PATH => Resolved::Render(Route::Home),
            POSTS_PATH => Resolved::Render(Route::Posts),
            _ => Resolved::Redirect(Route::Home),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths_render() {
        assert_eq!(Route::resolve("/home"), Resolved::Render(Route::Home));
        assert_eq!(Route::resolve("/post/"), Resolved::Render(Route::Posts));
    }

    #[test]
    fn root_and_unknown_paths_redirect_home() {
        assert_eq!(Route::resolve("/"), Resolved::Redirect(Route::Home));
        assert_eq!(Route::resolve(""), Resolved::Redirect(Route::Home));
        assert_eq!(Route::resolve("/nope"), Resolved::Redirect(Route::Home));
        assert_eq!(Route::resolve("/nope").route().path(), "/home");
    }
}
