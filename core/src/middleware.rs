//! Middleware chain execution.
//!
//! Stages run root-to-leaf. Each stage receives the context and a [`Next`]
//! continuation; awaiting `next.run(ctx)` runs the rest of the chain and
//! eventually the handler, and code after the await observes the unwinding.
//! A stage that returns without calling `next` short-circuits everything
//! after it.
//!
//! A continuation may be used once. The chain tracks the highest index that
//! has been entered; asking to enter an index that is not the next one fails
//! with [`ContinuationReused`] instead of re-running stages.
//!
//! ```
//! use argus_core::{InvocationContext, Next};
//! use futures::future::BoxFuture;
//!
//! fn logging<'a>(
//!     ctx: &'a mut InvocationContext,
//!     next: Next<'a>,
//! ) -> BoxFuture<'a, anyhow::Result<()>> {
//!     Box::pin(async move {
//!         ctx.console().out("before");
//!         next.run(ctx).await?;
//!         ctx.console().out("after");
//!         Ok(())
//!     })
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::{self, BoxFuture};
use tracing::{trace, warn};

use crate::context::InvocationContext;
use crate::error::ContinuationReused;

/// A stage that wraps everything registered below it.
pub trait Middleware: Send + Sync {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut InvocationContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, anyhow::Result<()>>;
}

impl<F> Middleware for F
where
    F: for<'a> Fn(&'a mut InvocationContext, Next<'a>) -> BoxFuture<'a, anyhow::Result<()>>
        + Send
        + Sync,
{
    fn handle<'a>(
        &'a self,
        ctx: &'a mut InvocationContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        (self)(ctx, next)
    }
}

/// The action bound to a command.
pub trait Handler: Send + Sync {
    fn invoke<'a>(&'a self, ctx: &'a InvocationContext) -> BoxFuture<'a, anyhow::Result<()>>;
}

impl<F> Handler for F
where
    F: for<'a> Fn(&'a InvocationContext) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync,
{
    fn invoke<'a>(&'a self, ctx: &'a InvocationContext) -> BoxFuture<'a, anyhow::Result<()>> {
        (self)(ctx)
    }
}

/// Continuation into the remainder of a chain.
pub struct Next<'a> {
    chain: &'a Chain,
    index: usize,
}

impl Next<'_> {
    /// Runs the remaining stages and the handler.
    pub fn run<'b>(&'b self, ctx: &'b mut InvocationContext) -> BoxFuture<'b, anyhow::Result<()>> {
        self.chain.dispatch(self.index, ctx)
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("stages", &self.chain.stages.len())
            .finish()
    }
}

/// Ordered stages terminating in a handler, for a single invocation.
pub(crate) struct Chain {
    stages: Vec<Arc<dyn Middleware>>,
    handler: Arc<dyn Handler>,
    entered: AtomicUsize,
}

impl Chain {
    pub(crate) fn new(stages: Vec<Arc<dyn Middleware>>, handler: Arc<dyn Handler>) -> Self {
        Self {
            stages,
            handler,
            entered: AtomicUsize::new(0),
        }
    }

    pub(crate) fn run<'a>(
        &'a self,
        ctx: &'a mut InvocationContext,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        self.dispatch(0, ctx)
    }

    fn dispatch<'a>(
        &'a self,
        index: usize,
        ctx: &'a mut InvocationContext,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        if let Err(reached) =
            self.entered
                .compare_exchange(index, index + 1, Ordering::AcqRel, Ordering::Acquire)
        {
            let stage = index.saturating_sub(1);
            warn!(stage, reached, "Continuation invoked more than once");
            return Box::pin(future::ready(Err(anyhow::Error::from(
                ContinuationReused { stage },
            ))));
        }

        match self.stages.get(index) {
            Some(stage) => {
                trace!(stage = index, "Entering middleware stage");
                stage.handle(ctx, Next { chain: self, index: index + 1 })
            }
            None => {
                trace!("Invoking handler");
                self.handler.invoke(ctx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::parser::ParsedArgs;
    use crate::ui::StdConsole;

    type Log = Arc<Mutex<Vec<String>>>;

    fn context() -> InvocationContext {
        InvocationContext::new(
            ParsedArgs {
                positionals: BTreeMap::new(),
                options: BTreeMap::new(),
            },
            vec!["app".into()],
            None,
            Arc::new(StdConsole),
        )
    }

    fn stage<F>(f: F) -> Arc<dyn Middleware>
    where
        F: for<'a> Fn(&'a mut InvocationContext, Next<'a>) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(f)
    }

    fn recording_stage(log: &Log, name: &'static str) -> Arc<dyn Middleware> {
        let log = log.clone();
        stage(move |ctx, next| {
            let log = log.clone();
            Box::pin(async move {
                log.lock().unwrap().push(name.to_string());
                next.run(ctx).await?;
                log.lock().unwrap().push(format!("{name}-after"));
                Ok(())
            })
        })
    }

    fn recording_handler(log: &Log) -> Arc<dyn Handler> {
        fn handler<F>(f: F) -> Arc<dyn Handler>
        where
            F: for<'a> Fn(&'a InvocationContext) -> BoxFuture<'a, anyhow::Result<()>>
                + Send
                + Sync
                + 'static,
        {
            Arc::new(f)
        }

        let log = log.clone();
        handler(move |_ctx| {
            let log = log.clone();
            Box::pin(async move {
                log.lock().unwrap().push("action".to_string());
                Ok(())
            })
        })
    }

    #[tokio::test]
    async fn test_stages_wrap_handler_in_order() {
        let log: Log = Arc::default();
        let chain = Chain::new(
            vec![recording_stage(&log, "first"), recording_stage(&log, "second")],
            recording_handler(&log),
        );

        chain.run(&mut context()).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["first", "second", "action", "second-after", "first-after"]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_runs_handler() {
        let log: Log = Arc::default();
        let chain = Chain::new(Vec::new(), recording_handler(&log));
        chain.run(&mut context()).await.unwrap();
        assert_eq!(*log.lock().unwrap(), ["action"]);
    }

    #[tokio::test]
    async fn test_stage_without_next_short_circuits() {
        let log: Log = Arc::default();
        let blocker = stage(|_ctx, _next| Box::pin(async { Ok(()) }));
        let chain = Chain::new(vec![blocker], recording_handler(&log));
        chain.run(&mut context()).await.unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_next_call_fails() {
        let log: Log = Arc::default();
        let twice = stage(|ctx, next| {
            Box::pin(async move {
                next.run(ctx).await?;
                next.run(ctx).await
            })
        });
        let chain = Chain::new(
            vec![recording_stage(&log, "outer"), twice],
            recording_handler(&log),
        );

        let err = chain.run(&mut context()).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ContinuationReused>(),
            Some(&ContinuationReused { stage: 1 })
        );
        assert_eq!(*log.lock().unwrap(), ["outer", "action"]);
    }
}
