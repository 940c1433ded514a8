use crate::error::RouteError;
use std::marker::PhantomData;
use std::sync::Arc;

/// One layer of an onion pipeline.
///
/// A middleware receives the stage input and a [`Next`] continuation. It
/// may call `next.run(input)` to continue inward, return a value without
/// calling it to short-circuit the rest of the chain, or fail.
pub trait Middleware<I, O>: Send + Sync {
    /// # Errors
    ///
    /// Any error aborts the chain and propagates to the caller of the stage.
    fn handle(&self, input: I, next: Next<'_, I, O>) -> Result<O, RouteError>;
}

/// Terminal operation of a stage
pub type Terminal<'a, I, O> = &'a dyn Fn(I) -> Result<O, RouteError>;

/// Continuation handed to each middleware: the remaining layers plus the
/// terminal operation.
///
/// Consumed by [`Next::run`], so a middleware can continue at most once.
pub struct Next<'a, I, O> {
    chain: &'a [Arc<dyn Middleware<I, O>>],
    terminal: Terminal<'a, I, O>,
}

impl<'a, I, O> Next<'a, I, O> {
    /// Run the next layer, or the terminal operation when none is left.
    ///
    /// # Errors
    ///
    /// Whatever the inner layers or the terminal operation return.
    pub fn run(self, input: I) -> Result<O, RouteError> {
        match self.chain.split_first() {
            Some((layer, rest)) => layer.handle(
                input,
                Next {
                    chain: rest,
                    terminal: self.terminal,
                },
            ),
            None => (self.terminal)(input),
        }
    }

    /// Layers still ahead of the terminal operation
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }
}

/// Ordered middleware wrapping a terminal operation.
///
/// Layers run in registration order on the way in and in reverse order on
/// the way out.
pub struct Pipeline<I, O> {
    layers: Vec<Arc<dyn Middleware<I, O>>>,
}

impl<I, O> Default for Pipeline<I, O> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<I, O> Clone for Pipeline<I, O> {
    fn clone(&self) -> Self {
        Self {
            layers: self.layers.clone(),
        }
    }
}

impl<I, O> Pipeline<I, O> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Arc<dyn Middleware<I, O>>) {
        self.layers.push(layer);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[must_use]
    pub fn layers(&self) -> &[Arc<dyn Middleware<I, O>>] {
        &self.layers
    }

    /// Run every layer around `terminal`.
    ///
    /// # Errors
    ///
    /// The first error raised by a layer or the terminal operation.
    pub fn run<F>(&self, input: I, terminal: F) -> Result<O, RouteError>
    where
        F: Fn(I) -> Result<O, RouteError>,
    {
        Next {
            chain: &self.layers,
            terminal: &terminal,
        }
        .run(input)
    }
}

/// Middleware built from a closure, see [`from_fn`]
pub struct FnMiddleware<I, O, F> {
    f: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O, F> Middleware<I, O> for FnMiddleware<I, O, F>
where
    F: Fn(I, Next<'_, I, O>) -> Result<O, RouteError> + Send + Sync,
{
    fn handle(&self, input: I, next: Next<'_, I, O>) -> Result<O, RouteError> {
        (self.f)(input, next)
    }
}

/// Wrap a closure as a shared middleware layer.
///
/// ```rust
/// use routeflow::middleware::{from_fn, Next, Pipeline};
///
/// let mut pipeline: Pipeline<i32, i32> = Pipeline::new();
/// pipeline.push(from_fn(|n: i32, next: Next<'_, i32, i32>| Ok(next.run(n + 1)? * 2)));
/// assert_eq!(pipeline.run(1, Ok).unwrap(), 4);
/// ```
pub fn from_fn<I, O, F>(f: F) -> Arc<dyn Middleware<I, O>>
where
    I: 'static,
    O: 'static,
    F: Fn(I, Next<'_, I, O>) -> Result<O, RouteError> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware {
        f,
        _marker: PhantomData,
    })
}
