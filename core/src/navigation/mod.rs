//! Navigation orchestration: route matching, preloading, and the
//! redirect/error classification that decides what a navigation settles to.

mod classify;
pub mod handler;
pub mod navigator;
pub mod outcome;
pub mod route;

pub use handler::{ErrorContext, ErrorHandler, Redirector};
pub use navigator::{Navigator, NavigatorBuilder};
pub use outcome::{Outcome, PreloadFailure};
pub use route::{Component, MatchedRoute, RouteComponent, RouteMatch, RouteMatcher};
