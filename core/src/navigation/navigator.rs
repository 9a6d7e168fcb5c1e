use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::config::PreloadSettings;
use crate::descriptor::{DescriptorListBuilder, LoadContext, PreviousRoutes, SkipPolicy};
use crate::dispatch::{Action, Dispatcher, NavigationAction, PreloadDispatcher};
use crate::error::PreloadError;
use crate::events::{NavigateHook, PreloadEvent, PreloadStats, PreloadTiming, StatsReporter};
use crate::executor::{Chain, ChainResult, ExecutionEngine};
use crate::runtime::Environment;
use crate::state::{SessionHandle, SessionManager, Supersession};

use super::classify::{classify_failure, redirect_outcome};
use super::handler::ErrorHandler;
use super::outcome::Outcome;
use super::route::{RouteMatch, RouteMatcher};

/// Drives navigations for one runtime context.
///
/// Owns the active-session slot, the previous-route record used by the
/// client-side skip policy, and the post-hydration flag.
pub struct Navigator {
    env: Environment,
    matcher: Arc<dyn RouteMatcher>,
    dispatcher: Arc<dyn Dispatcher>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    navigate_hook: Option<Arc<dyn NavigateHook>>,
    stats: Option<Arc<dyn StatsReporter>>,
    settings: PreloadSettings,
    sessions: SessionManager,
    initial_client_side_preload: AtomicBool,
    previous: Mutex<PreviousRoutes>,
}

pub struct NavigatorBuilder {
    env: Environment,
    matcher: Arc<dyn RouteMatcher>,
    dispatcher: Arc<dyn Dispatcher>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    navigate_hook: Option<Arc<dyn NavigateHook>>,
    stats: Option<Arc<dyn StatsReporter>>,
    settings: PreloadSettings,
    server_rendered: bool,
}

impl NavigatorBuilder {
    pub fn new(
        env: Environment,
        matcher: Arc<dyn RouteMatcher>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            env,
            matcher,
            dispatcher,
            error_handler: None,
            navigate_hook: None,
            stats: None,
            settings: PreloadSettings::default(),
            server_rendered: false,
        }
    }

    pub fn error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn on_navigate(mut self, hook: Arc<dyn NavigateHook>) -> Self {
        self.navigate_hook = Some(hook);
        self
    }

    pub fn report_stats(mut self, reporter: Arc<dyn StatsReporter>) -> Self {
        self.stats = Some(reporter);
        self
    }

    pub fn settings(mut self, settings: PreloadSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The client is hydrating a page the server already preloaded: the
    /// first initial navigation only runs client-only tasks.
    pub fn server_rendered(mut self, server_rendered: bool) -> Self {
        self.server_rendered = server_rendered;
        self
    }

    pub fn build(self) -> Navigator {
        Navigator {
            env: self.env,
            matcher: self.matcher,
            dispatcher: self.dispatcher,
            error_handler: self.error_handler,
            navigate_hook: self.navigate_hook,
            stats: self.stats,
            settings: self.settings,
            sessions: SessionManager::new(),
            initial_client_side_preload: AtomicBool::new(
                self.env.is_client() && self.server_rendered,
            ),
            previous: Mutex::new(PreviousRoutes::new()),
        }
    }
}

impl Navigator {
    pub fn builder(
        env: Environment,
        matcher: Arc<dyn RouteMatcher>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> NavigatorBuilder {
        NavigatorBuilder::new(env, matcher, dispatcher)
    }

    pub fn environment(&self) -> Environment {
        self.env
    }

    pub fn settings(&self) -> &PreloadSettings {
        &self.settings
    }

    pub fn active_session(&self) -> Option<SessionHandle> {
        self.sessions.active()
    }

    /// Cancel the pending navigation, if any, emitting the supersession event.
    pub fn cancel_active(&self) -> bool {
        match self.sessions.cancel_active() {
            Some(session) => {
                self.emit(PreloadEvent::superseded(&session));
                true
            }
            None => false,
        }
    }

    /// Run one navigation to settlement.
    ///
    /// Server-side failures without a handler, handler rethrows and handler
    /// contract violations come back as `Err`; everything else is an
    /// [`Outcome`].
    pub async fn navigate(&self, action: NavigationAction) -> Result<Outcome, PreloadError> {
        let Supersession {
            session,
            superseded,
        } = self.sessions.begin(action.location.clone());
        if let Some(previous) = superseded {
            self.emit(PreloadEvent::superseded(&previous));
        }

        let initial_pass = self.take_initial_pass(&action);

        if !action.initial {
            if let Some(hook) = &self.navigate_hook {
                hook.on_navigate(&action.location);
            }
        }

        let result = self.run(&session, &action, initial_pass).await;
        self.sessions.release(&session);
        result
    }

    async fn run(
        &self,
        session: &SessionHandle,
        action: &NavigationAction,
        initial_pass: bool,
    ) -> Result<Outcome, PreloadError> {
        let url = action.location.url();
        debug!(session_id = session.id(), url = %url, env = %self.env, "navigation start");

        let matched = match self.matcher.match_route(&action.location).await {
            _ if session.is_cancelled() => return Ok(Outcome::Cancelled),
            Ok(RouteMatch::Matched(matched)) => matched,
            Ok(RouteMatch::Redirect(target)) => {
                if session.redirect().is_err() {
                    return Ok(Outcome::Cancelled);
                }
                info!(url = %url, target = %target, "route resolved to a redirect");
                return Ok(redirect_outcome(self.env, &self.dispatcher, target));
            }
            Err(err) => return self.settle_failure(session, err, "", &url, false).await,
        };

        let ctx = LoadContext {
            location: action.location.clone(),
            params: matched.params.clone(),
            route_path: matched.route_path.clone(),
            server: self.env.is_server(),
            dispatch: PreloadDispatcher::new(self.dispatcher.clone(), self.env, session.clone()),
        };

        // only becomes the skip baseline once this navigation finishes
        let loaded = PreviousRoutes::record(&matched, &action.location);
        let descriptors = DescriptorListBuilder::new(self.env)
            .initial_client_side_preload(initial_pass)
            .skip_policy(SkipPolicy::from(&self.settings))
            .build(&matched, &self.previous_routes(), &ctx);
        let chain = Chain::build(descriptors);

        if chain.is_empty() {
            if session.finish().is_err() {
                return Ok(Outcome::Cancelled);
            }
            debug!(session_id = session.id(), url = %url, "nothing to preload");
            self.commit(action, loaded);
            return Ok(Outcome::Proceed {
                location: action.location.clone(),
                elapsed: None,
            });
        }

        self.emit(PreloadEvent::started(session));

        let engine = ExecutionEngine::new(self.settings.batch_failure);
        match engine.execute(chain, session).await {
            ChainResult::Cancelled => Ok(Outcome::Cancelled),
            ChainResult::Finished { elapsed } => {
                if session.finish().is_err() {
                    return Ok(Outcome::Cancelled);
                }
                self.emit(PreloadEvent::finished(session, elapsed));
                if let Some(stats) = &self.stats {
                    stats.report(PreloadStats {
                        url: url.clone(),
                        route: matched.route_path.clone(),
                        time: PreloadTiming {
                            preload: elapsed.as_millis() as u64,
                        },
                    });
                }
                info!(
                    url = %url,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "preload finished"
                );
                self.commit(action, loaded);
                Ok(Outcome::Proceed {
                    location: action.location.clone(),
                    elapsed: Some(elapsed),
                })
            }
            ChainResult::Failed(PreloadError::Redirect(target)) => {
                if session.redirect().is_err() {
                    return Ok(Outcome::Cancelled);
                }
                info!(url = %url, target = %target, "load task redirected");
                Ok(redirect_outcome(self.env, &self.dispatcher, target))
            }
            ChainResult::Failed(err) => {
                self.settle_failure(session, err, &matched.route_path, &url, true)
                    .await
            }
        }
    }

    async fn settle_failure(
        &self,
        session: &SessionHandle,
        err: PreloadError,
        path: &str,
        url: &str,
        started: bool,
    ) -> Result<Outcome, PreloadError> {
        if !session.is_pending() {
            return Ok(Outcome::Cancelled);
        }
        if started {
            self.emit(PreloadEvent::failed(session, &err));
        }

        let message = err.to_string();
        let settled = classify_failure(
            self.env,
            self.error_handler.as_ref(),
            &self.dispatcher,
            err,
            path,
            url,
        )
        .await;

        // the handler decides between a redirect and a failure
        let terminal = match &settled {
            Ok(Outcome::Redirect { .. }) => session.redirect(),
            _ => session.fail(&message),
        };
        if terminal.is_err() {
            debug!(session_id = session.id(), "session superseded while handling its failure");
            return Ok(Outcome::Cancelled);
        }
        settled
    }

    /// Consume the post-hydration flag; only an initial navigation uses it.
    fn take_initial_pass(&self, action: &NavigationAction) -> bool {
        self.initial_client_side_preload.swap(false, Ordering::SeqCst) && action.initial
    }

    /// Components of the last navigation that finished loading.
    fn previous_routes(&self) -> PreviousRoutes {
        self.previous
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record the loaded route as the next skip baseline and let the page switch.
    fn commit(&self, action: &NavigationAction, loaded: PreviousRoutes) {
        *self.previous.lock().unwrap_or_else(PoisonError::into_inner) = loaded;
        if action.navigate {
            self.dispatcher
                .dispatch(Action::LocationChanged(action.location.clone()));
        }
    }

    fn emit(&self, event: PreloadEvent) {
        debug!(kind = event.kind(), session_id = event.session_id(), "status event");
        self.dispatcher.dispatch(Action::Preload(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::NullDispatcher;
    use crate::location::Location;
    use crate::navigation::handler::ErrorContext;
    use crate::state::SessionStatus;
    use async_trait::async_trait;

    struct Unroutable;

    #[async_trait]
    impl RouteMatcher for Unroutable {
        async fn match_route(&self, location: &Location) -> Result<RouteMatch, PreloadError> {
            Err(PreloadError::Routing(anyhow::anyhow!("no route for {location}")))
        }
    }

    struct RedirectHome;

    #[async_trait]
    impl ErrorHandler for RedirectHome {
        async fn handle(&self, _error: PreloadError, ctx: ErrorContext) -> Result<(), PreloadError> {
            ctx.redirect.redirect("/");
            Ok(())
        }
    }

    fn navigator(env: Environment, handler: Option<Arc<dyn ErrorHandler>>) -> Navigator {
        let builder = Navigator::builder(env, Arc::new(Unroutable), Arc::new(NullDispatcher));
        match handler {
            Some(handler) => builder.error_handler(handler).build(),
            None => builder.build(),
        }
    }

    #[tokio::test]
    async fn test_routing_error_redirected_by_handler_settles_redirected() {
        let navigator = navigator(Environment::Server, Some(Arc::new(RedirectHome)));
        let action = NavigationAction::initial("/missing");
        let session = SessionHandle::new(action.location.clone());

        let outcome = navigator.run(&session, &action, false).await.unwrap();
        assert_eq!(outcome.redirect_location(), Some(&Location::new("/")));
        assert_eq!(session.status(), SessionStatus::Redirected);
        assert!(session.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn test_unhandled_routing_error_settles_failed() {
        let navigator = navigator(Environment::Client, None);
        let action = NavigationAction::to("/missing");
        let session = SessionHandle::new(action.location.clone());

        let outcome = navigator.run(&session, &action, false).await.unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(session
            .snapshot()
            .error
            .is_some_and(|e| e.contains("no route for /missing")));
    }

    #[tokio::test]
    async fn test_session_cancelled_before_failure_settles_cancelled() {
        let navigator = navigator(Environment::Client, None);
        let action = NavigationAction::to("/missing");
        let session = SessionHandle::new(action.location.clone());
        session.cancel();

        let outcome = navigator.run(&session, &action, false).await.unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(session.status(), SessionStatus::Cancelled);
    }
}
