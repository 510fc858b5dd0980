//! Navigation seam between widgets and the host app's router.

use std::fmt;

/// Screens a cart widget can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The cart detail screen.
    Cart,
}

impl Route {
    /// Route name as registered with the host router.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cart => "Cart",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can move the app to another screen.
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

/// Records routes in order; useful for headless hosts and tests.
impl Navigator for Vec<Route> {
    fn navigate(&mut self, route: Route) {
        self.push(route);
    }
}
