use std::sync::Arc;

use tracing::warn;

use crate::dispatch::{Action, Dispatcher, NavigationAction};
use crate::error::PreloadError;
use crate::location::Location;
use crate::runtime::Environment;

use super::handler::{ErrorContext, ErrorHandler, Redirector};
use super::outcome::{Outcome, PreloadFailure};

/// A redirect on the server is returned as data for the render boundary;
/// on the client it becomes a fresh navigation.
pub(crate) fn redirect_outcome(
    env: Environment,
    dispatcher: &Arc<dyn Dispatcher>,
    location: Location,
) -> Outcome {
    if env.is_client() {
        dispatcher.dispatch(Action::Navigate(NavigationAction::redirect_to(
            location.clone(),
        )));
    }
    Outcome::Redirect { location }
}

/// Decide what a non-redirect failure settles to.
pub(crate) async fn classify_failure(
    env: Environment,
    handler: Option<&Arc<dyn ErrorHandler>>,
    dispatcher: &Arc<dyn Dispatcher>,
    error: PreloadError,
    path: &str,
    url: &str,
) -> Result<Outcome, PreloadError> {
    if let PreloadError::Redirect(location) = error {
        return Ok(redirect_outcome(env, dispatcher, location));
    }

    let report = PreloadFailure::from(&error);

    let Some(handler) = handler else {
        if env.is_server() {
            return Err(error);
        }
        warn!(url, error = %error, "preload failed");
        return Ok(Outcome::Failed(report));
    };

    let redirector = Redirector::default();
    let ctx = ErrorContext {
        path: path.to_string(),
        url: url.to_string(),
        redirect: redirector.clone(),
        dispatch: dispatcher.clone(),
        server: env.is_server(),
    };
    let handled = handler.handle(error, ctx).await;

    if let Some(target) = redirector.target() {
        return Ok(redirect_outcome(env, dispatcher, target));
    }

    match handled {
        Err(PreloadError::Redirect(location)) => Ok(redirect_outcome(env, dispatcher, location)),
        Err(err) if env.is_server() => Err(err),
        Err(err) => {
            warn!(url, error = %err, "preload error handler failed");
            Ok(Outcome::Failed(PreloadFailure::from(&err)))
        }
        Ok(()) if env.is_server() => Err(PreloadError::HandlerContractViolation {
            path: path.to_string(),
        }),
        Ok(()) => Ok(Outcome::Failed(report)),
    }
}
