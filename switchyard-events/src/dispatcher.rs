//! Sequential and concurrent event dispatch

use crate::error::{DispatchError, DispatchErrorList, Error, Result};
use crate::event::{Event, HandlerError, SharedHandler};
use crate::registry::HandlerRegistry;
use crate::router::{Outcome, OutcomeRouter};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const DISPATCH: &str = "Dispatcher::dispatch";
const DISPATCH_CONCURRENT: &str = "Dispatcher::dispatch_concurrent";

/// How the handlers of one event are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// One after another in registration order, stopping at the first failure
    #[default]
    Sequential,

    /// All at once, waiting for every handler before resolving
    Concurrent,
}

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Enable dispatch logging
    pub enable_logging: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
        }
    }
}

/// Dispatches events to the handlers registered for their type
///
/// Cloning is cheap; clones share the same read-only registry.
pub struct Dispatcher<E: Event, R> {
    registry: Arc<HandlerRegistry<E, R>>,
    config: Arc<DispatcherConfig>,
}

impl<E: Event, R: Send + 'static> Dispatcher<E, R> {
    /// Create a dispatcher over a populated registry
    pub fn new(registry: HandlerRegistry<E, R>) -> Self {
        Self::with_config(registry, DispatcherConfig::default())
    }

    /// Create a dispatcher with custom config
    pub fn with_config(registry: HandlerRegistry<E, R>, config: DispatcherConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }

    /// Read access to the registry
    pub fn registry(&self) -> &HandlerRegistry<E, R> {
        &self.registry
    }

    /// Dispatch an event in the given mode
    pub async fn dispatch_with(
        &self,
        mode: DispatchMode,
        event: impl Into<Arc<E>>,
    ) -> Result<Outcome<R>> {
        match mode {
            DispatchMode::Sequential => self.dispatch(event).await,
            DispatchMode::Concurrent => self.dispatch_concurrent(event).await,
        }
    }

    /// Run the handlers one after another in registration order
    ///
    /// The first failing handler stops the dispatch; handlers after it never
    /// run and the failure is routed to the failure callback.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let dispatcher = Dispatcher::new(registry);
    /// match dispatcher.dispatch(event).await? {
    ///     Outcome::Completed(results) => println!("{} handlers ran", results.len()),
    ///     Outcome::Recovered => println!("failure handled"),
    /// }
    /// ```
    pub async fn dispatch(&self, event: impl Into<Arc<E>>) -> Result<Outcome<R>> {
        let event = event.into();
        let handlers = self.lookup(&event)?;

        if self.config.enable_logging {
            info!(
                event_type = event.event_type(),
                event_id = event.event_id(),
                handlers = handlers.len(),
                "Dispatching event"
            );
        }

        let router = self.router();
        let mut results = Vec::with_capacity(handlers.len());

        for (index, handler) in handlers.iter().enumerate() {
            match handler.handle(&event).await {
                Ok(result) => results.push(result),
                Err(source) => {
                    if self.config.enable_logging {
                        error!(
                            event_type = event.event_type(),
                            index,
                            error = %source,
                            "Handler failed, skipping remaining handlers"
                        );
                    }
                    let failure = DispatchError::new(DISPATCH, index, &*event, source);
                    return router.fail(&event, Error::Handler(failure));
                }
            }
        }

        if self.config.enable_logging {
            debug!(event_type = event.event_type(), "Event dispatched successfully");
        }

        router.succeed(&event, results)
    }

    /// Run every handler as its own task and wait for all of them
    ///
    /// A failing handler does not cancel its siblings. All failures are
    /// aggregated into one [`DispatchErrorList`]. Results are handed to the
    /// success callback in registration order.
    pub async fn dispatch_concurrent(&self, event: impl Into<Arc<E>>) -> Result<Outcome<R>> {
        let event = event.into();
        let handlers = self.lookup(&event)?;
        let expected = handlers.len();

        if self.config.enable_logging {
            info!(
                event_type = event.event_type(),
                event_id = event.event_id(),
                handlers = expected,
                "Dispatching event concurrently"
            );
        }

        // One slot per handler, so no task ever waits on send
        let (tx, mut rx) = mpsc::channel::<(usize, std::result::Result<R, HandlerError>)>(expected);
        let mut tasks = Vec::with_capacity(expected);

        for (index, handler) in handlers.iter().enumerate() {
            let handler = Arc::clone(handler);
            let event = Arc::clone(&event);
            let tx = tx.clone();
            tasks.push(tokio::spawn(async move {
                let result = handler.handle(event.as_ref()).await;
                let _ = tx.send((index, result)).await;
            }));
        }
        drop(tx);

        let mut failures = Vec::new();

        for (index, task) in tasks.into_iter().enumerate() {
            if let Err(e) = task.await {
                if self.config.enable_logging {
                    error!(event_type = event.event_type(), index, "Handler task panicked: {}", e);
                }
                failures.push(DispatchError::new(
                    DISPATCH_CONCURRENT,
                    index,
                    &*event,
                    HandlerError::Panicked(e.to_string()),
                ));
            }
        }

        let mut results = Vec::with_capacity(expected);

        while let Some((index, result)) = rx.recv().await {
            match result {
                Ok(value) => results.push((index, value)),
                Err(source) => {
                    if self.config.enable_logging {
                        error!(
                            event_type = event.event_type(),
                            index,
                            error = %source,
                            "Handler failed"
                        );
                    }
                    failures.push(DispatchError::new(
                        DISPATCH_CONCURRENT,
                        index,
                        &*event,
                        source,
                    ));
                }
            }
        }

        let router = self.router();

        if let Some(errors) = DispatchErrorList::aggregate(failures) {
            return router.fail(&event, Error::Handlers(errors));
        }

        if results.len() != expected {
            if self.config.enable_logging {
                error!(
                    event_type = event.event_type(),
                    expected,
                    collected = results.len(),
                    "Handler result count mismatch"
                );
            }
            let mismatch = Error::ResultCountMismatch {
                operation: DISPATCH_CONCURRENT,
                event_type: event.event_type().to_string(),
                expected,
                collected: results.len(),
            };
            return router.fail(&event, mismatch);
        }

        results.sort_by_key(|(index, _)| *index);
        let results = results.into_iter().map(|(_, value)| value).collect();

        if self.config.enable_logging {
            debug!(event_type = event.event_type(), "Event dispatched successfully");
        }

        router.succeed(&event, results)
    }

    fn lookup(&self, event: &E) -> Result<&[SharedHandler<E, R>]> {
        self.registry.lookup(event.event_type()).map_err(|e| {
            if self.config.enable_logging {
                warn!("No handlers registered for event: {}", e.event_type());
            }
            Error::Unsupported(e)
        })
    }

    fn router(&self) -> OutcomeRouter<'_, E, R> {
        OutcomeRouter::new(&self.registry, self.config.enable_logging)
    }
}

impl<E: Event, R> Clone for Dispatcher<E, R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            config: Arc::clone(&self.config),
        }
    }
}

/// Dispatcher builder
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Create new dispatcher builder
    pub fn new() -> Self {
        Self {
            config: DispatcherConfig::default(),
        }
    }

    /// Enable/disable logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Build the dispatcher over a populated registry
    pub fn build<E: Event, R: Send + 'static>(
        self,
        registry: HandlerRegistry<E, R>,
    ) -> Dispatcher<E, R> {
        Dispatcher::with_config(registry, self.config)
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventHandler, handler_fn};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Debug, Clone)]
    struct TestEvent {
        event_type: String,
    }

    impl TestEvent {
        fn new(event_type: &str) -> Self {
            Self {
                event_type: event_type.to_string(),
            }
        }
    }

    impl Event for TestEvent {
        fn event_type(&self) -> &str {
            &self.event_type
        }

        fn event_id(&self) -> Option<&str> {
            Some("evt_test")
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Res {
        Text(String),
        Number(i64),
        Board { name: String },
    }

    fn text(value: &str) -> SharedHandler<TestEvent, Res> {
        let value = value.to_string();
        handler_fn(move |_: &TestEvent| Ok(Res::Text(value.clone())))
    }

    fn number(value: i64) -> SharedHandler<TestEvent, Res> {
        handler_fn(move |_: &TestEvent| Ok(Res::Number(value)))
    }

    fn fails(message: &'static str) -> SharedHandler<TestEvent, Res> {
        handler_fn(move |_: &TestEvent| Err(HandlerError::msg(message)))
    }

    #[derive(Clone)]
    struct CountingHandler {
        counter: Arc<AtomicU32>,
        delay: Duration,
        fail: bool,
    }

    impl CountingHandler {
        fn new() -> Self {
            Self {
                counter: Arc::new(AtomicU32::new(0)),
                delay: Duration::ZERO,
                fail: false,
            }
        }

        fn delayed(mut self, millis: u64) -> Self {
            self.delay = Duration::from_millis(millis);
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn count(&self) -> u32 {
            self.counter.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EventHandler<TestEvent, Res> for CountingHandler {
        async fn handle(&self, _event: &TestEvent) -> std::result::Result<Res, HandlerError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(HandlerError::msg("counting handler failed"));
            }
            Ok(Res::Number(n as i64))
        }
    }

    struct Panicking;

    #[async_trait]
    impl EventHandler<TestEvent, Res> for Panicking {
        async fn handle(&self, _event: &TestEvent) -> std::result::Result<Res, HandlerError> {
            panic!("handler exploded");
        }
    }

    fn quiet<R: Send + 'static>(registry: HandlerRegistry<TestEvent, R>) -> Dispatcher<TestEvent, R> {
        DispatcherBuilder::new().enable_logging(false).build(registry)
    }

    #[tokio::test]
    async fn test_dispatch_results_in_order() {
        let mut registry = HandlerRegistry::new();
        registry.register("t", [text("x"), number(2)]);
        let dispatcher = Dispatcher::new(registry);

        let outcome = dispatcher.dispatch(TestEvent::new("t")).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Completed(vec![Res::Text("x".to_string()), Res::Number(2)])
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_reports_index() {
        let mut registry = HandlerRegistry::new();
        registry.register("u", [fails("boom")]);
        let dispatcher = quiet(registry);

        let err = dispatcher.dispatch(TestEvent::new("u")).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("boom"));
        assert!(message.contains("handlers[0]"));
        assert_eq!(err.handler_failures()[0].index(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_short_circuits() {
        let before = CountingHandler::new();
        let failing = CountingHandler::new().failing();
        let after = CountingHandler::new();

        let mut registry = HandlerRegistry::new();
        registry
            .register_handler("customer.deleted", before.clone())
            .register_handler("customer.deleted", failing.clone())
            .register_handler("customer.deleted", after.clone());
        let dispatcher = quiet(registry);

        let err = dispatcher
            .dispatch(TestEvent::new("customer.deleted"))
            .await
            .unwrap_err();

        match &err {
            Error::Handler(failure) => {
                assert_eq!(failure.index(), 1);
                assert_eq!(failure.operation(), "Dispatcher::dispatch");
                assert_eq!(failure.event_id(), Some("evt_test"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(before.count(), 1);
        assert_eq!(failing.count(), 1);
        assert_eq!(after.count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_skips_callbacks() {
        let calls = Arc::new(AtomicU32::new(0));
        let on_success = calls.clone();
        let on_failure = calls.clone();

        let mut registry = HandlerRegistry::new();
        registry.register("customer.created", [number(1)]);
        registry
            .on_success("checkout.session.completed", move |_, _| {
                on_success.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .on_failure("checkout.session.completed", move |_, _| {
                on_failure.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        let dispatcher = quiet(registry);

        for mode in [DispatchMode::Sequential, DispatchMode::Concurrent] {
            let err = dispatcher
                .dispatch_with(mode, TestEvent::new("checkout.session.completed"))
                .await
                .unwrap_err();
            assert!(err.is_unsupported());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_callback_suppresses() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("subscription.created", [fails("It fails"), number(2)])
            .on_failure("subscription.created", |_, err| {
                if err.to_string().contains("It fails") {
                    Ok(())
                } else {
                    Err(err)
                }
            });
        let dispatcher = quiet(registry);

        let outcome = dispatcher
            .dispatch(TestEvent::new("subscription.created"))
            .await
            .unwrap();
        assert!(outcome.is_recovered());
    }

    #[tokio::test]
    async fn test_failure_callback_replaces() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("customer.deleted", [fails("It fails")])
            .on_failure("customer.deleted", |_, _| Err(Error::callback("escalated")));
        let dispatcher = quiet(registry);

        let err = dispatcher
            .dispatch(TestEvent::new("customer.deleted"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "callback failed: escalated");
    }

    #[tokio::test]
    async fn test_success_callback_discriminates_results() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("customer.created", [text("testing 1"), number(2)])
            .register("customer.created", {
                let board = Res::Board {
                    name: "acme".to_string(),
                };
                [handler_fn(move |_: &TestEvent| Ok(board.clone()))]
            })
            .on_success("customer.created", |_, results| {
                for result in results {
                    match result {
                        Res::Text(_) | Res::Number(_) | Res::Board { .. } => {}
                    }
                }
                Ok(())
            })
            .register("customer.updated", [number(0)])
            .on_success("customer.updated", |_, results| match results {
                [Res::Text(_)] => Ok(()),
                _ => Err(Error::callback("unexpected response type")),
            });
        let dispatcher = quiet(registry);

        for mode in [DispatchMode::Sequential, DispatchMode::Concurrent] {
            let outcome = dispatcher
                .dispatch_with(mode, TestEvent::new("customer.created"))
                .await
                .unwrap();
            assert_eq!(outcome.results().map(<[Res]>::len), Some(3));

            let err = dispatcher
                .dispatch_with(mode, TestEvent::new("customer.updated"))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Callback(_)));
        }
    }

    #[tokio::test]
    async fn test_concurrent_aggregates_every_failure() {
        let mut registry = HandlerRegistry::new();
        registry.register(
            "customer.deleted",
            [fails("first"), number(1), fails("second"), number(3), fails("third")],
        );
        let dispatcher = quiet(registry);

        let err = dispatcher
            .dispatch_concurrent(TestEvent::new("customer.deleted"))
            .await
            .unwrap_err();

        match &err {
            Error::Handlers(list) => {
                assert_eq!(list.len(), 3);
                assert_eq!(list.indices(), vec![0, 2, 4]);
                assert!(list.iter().all(|e| e.operation() == "Dispatcher::dispatch_concurrent"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("first"));
        assert!(message.contains("third"));
    }

    #[tokio::test]
    async fn test_concurrent_runs_every_handler() {
        let slow_failure = CountingHandler::new().delayed(30).failing();
        let slow = CountingHandler::new().delayed(50);
        let fast = CountingHandler::new();

        let mut registry = HandlerRegistry::new();
        registry
            .register_handler("customer.deleted", slow_failure.clone())
            .register_handler("customer.deleted", slow.clone())
            .register_handler("customer.deleted", fast.clone());
        let dispatcher = quiet(registry);

        let err = dispatcher
            .dispatch_concurrent(TestEvent::new("customer.deleted"))
            .await
            .unwrap_err();

        assert_eq!(err.handler_failures().len(), 1);
        assert_eq!(slow_failure.count(), 1);
        assert_eq!(slow.count(), 1);
        assert_eq!(fast.count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_results_keep_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut registry = HandlerRegistry::new();
        registry
            .register_handler("t", CountingHandler::new().delayed(40))
            .register("t", [text("x")])
            .register_handler("t", CountingHandler::new().delayed(10))
            .on_success("t", {
                let order = order.clone();
                move |_, results| {
                    order.lock().unwrap().extend(results.iter().cloned());
                    Ok(())
                }
            });
        let dispatcher = quiet(registry);

        let outcome = dispatcher
            .dispatch_concurrent(TestEvent::new("t"))
            .await
            .unwrap();

        let expected = vec![Res::Number(1), Res::Text("x".to_string()), Res::Number(1)];
        assert_eq!(outcome.into_results(), Some(expected.clone()));
        assert_eq!(*order.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_concurrent_failure_callback_suppresses() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("v", [fails("boom"), number(2)])
            .on_failure("v", |_, err| match err {
                Error::Handlers(list) if list.len() == 1 => Ok(()),
                other => Err(other),
            });
        let dispatcher = quiet(registry);

        let outcome = dispatcher
            .dispatch_concurrent(TestEvent::new("v"))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Recovered);
    }

    #[tokio::test]
    async fn test_concurrent_panic_is_a_failure() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_handler("t", Panicking)
            .register("t", [number(1)]);
        let dispatcher = quiet(registry);

        let err = dispatcher
            .dispatch_concurrent(TestEvent::new("t"))
            .await
            .unwrap_err();

        let failures = err.handler_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index(), 0);
        assert!(matches!(failures[0].cause(), HandlerError::Panicked(_)));
    }

    #[tokio::test]
    async fn test_register_twice_runs_both() {
        let mut registry = HandlerRegistry::new();
        registry.register("t", [text("a")]).register("t", [text("b")]);
        let dispatcher = quiet(registry);

        let results = dispatcher
            .dispatch(TestEvent::new("t"))
            .await
            .unwrap()
            .into_results()
            .unwrap();
        assert_eq!(
            results,
            vec![Res::Text("a".to_string()), Res::Text("b".to_string())]
        );
    }

    #[tokio::test]
    async fn test_shared_event_and_clone() {
        let mut registry = HandlerRegistry::new();
        registry.register("t", [number(5)]);
        let dispatcher = quiet(registry);
        let clone = dispatcher.clone();

        let event = Arc::new(TestEvent::new("t"));
        let first = dispatcher.dispatch(Arc::clone(&event)).await.unwrap();
        let second = clone.dispatch_concurrent(event).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(clone.registry().handler_count("t"), 1);
    }

    #[test]
    fn test_default_mode_is_sequential() {
        assert_eq!(DispatchMode::default(), DispatchMode::Sequential);
        assert!(DispatcherConfig::default().enable_logging);
    }
}
