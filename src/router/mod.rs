use crate::filters::{notes_href, FilterSet, Route};
use std::rc::Rc;

/// The URL router as seen by the sync engine.
pub trait RouterPort {
    fn current(&self) -> Route;
    /// Replace the current history entry with the notes path carrying
    /// `filters`. Never pushes.
    fn replace_filters(&self, filters: &FilterSet);
}

/// [`RouterPort`] over leptos_router's location and navigate hooks.
pub struct LeptosRouter {
    href: Rc<dyn Fn() -> String>,
    replace: Rc<dyn Fn(&str)>,
}

impl LeptosRouter {
    /// `href` returns the current `path?query`; `replace` navigates with
    /// `replace: true`.
    pub fn new(href: impl Fn() -> String + 'static, replace: impl Fn(&str) + 'static) -> Self {
        Self {
            href: Rc::new(href),
            replace: Rc::new(replace),
        }
    }
}

impl RouterPort for LeptosRouter {
    fn current(&self) -> Route {
        Route::parse(&(self.href)())
    }

    fn replace_filters(&self, filters: &FilterSet) {
        (self.replace)(&notes_href(filters));
    }
}
