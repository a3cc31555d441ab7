//! Handler trait and handler chains
//!
//! A handler is any `Fn(&mut Context)`. Everything a handler does goes
//! through the [`Context`]: writing the response, reading and writing the
//! request-scoped store, and driving or stopping the rest of the chain.
//!
//! Handlers registered for a route are combined with the middleware of every
//! enclosing group into one [`HandlerChain`], built once at registration time
//! and shared by every request to that route.
//!
//! # Example
//!
//! ```rust,ignore
//! use geneva_core::{Context, Engine};
//!
//! fn hello(c: &mut Context) {
//!     c.string(StatusCode::OK, "hello");
//! }
//!
//! let mut r = Engine::new();
//! r.get("/one", hello);
//! r.get("/two", (|c: &mut Context| c.set("seen", true), hello));
//! ```

use crate::context::Context;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Trait representing a request handler or middleware
pub trait Handler: Send + Sync + 'static {
    /// Run the handler against the request context
    fn call(&self, ctx: &mut Context);
}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut Context) {
        self(ctx)
    }
}

/// Type-erased handler, shared by every chain that contains it
pub type BoxedHandler = Arc<dyn Handler>;

/// Box a handler for storage in a chain
pub fn into_boxed_handler<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(handler)
}

/// Ordered, immutable sequence of handlers bound to one route
///
/// Cloning a chain is cheap: clones share the same storage and no operation
/// ever mutates it.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Arc<[BoxedHandler]>,
}

impl HandlerChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over the handlers in execution order
    pub fn iter(&self) -> impl Iterator<Item = &BoxedHandler> {
        self.handlers.iter()
    }

    /// Check whether two chains share the same storage
    pub fn ptr_eq(&self, other: &HandlerChain) -> bool {
        Arc::ptr_eq(&self.handlers, &other.handlers)
    }
}

impl Deref for HandlerChain {
    type Target = [BoxedHandler];

    fn deref(&self) -> &Self::Target {
        &self.handlers
    }
}

impl From<Vec<BoxedHandler>> for HandlerChain {
    fn from(handlers: Vec<BoxedHandler>) -> Self {
        Self {
            handlers: handlers.into(),
        }
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("len", &self.handlers.len())
            .finish()
    }
}

/// Concatenate inherited middleware with a route's own handlers.
///
/// The result is a new chain with its own storage; later changes to either
/// input buffer are not observed through it.
pub fn combine_handlers(inherited: &[BoxedHandler], own: &[BoxedHandler]) -> HandlerChain {
    let mut combined = Vec::with_capacity(inherited.len() + own.len());
    combined.extend(inherited.iter().cloned());
    combined.extend(own.iter().cloned());
    HandlerChain::from(combined)
}

/// Conversion into the list of handlers passed to a registration method
///
/// Implemented for a single handler, for tuples of handlers (up to twelve)
/// and for pre-boxed handlers and lists, so that registration reads like a variadic call:
///
/// ```rust,ignore
/// r.get("/a", hello);
/// r.get("/b", (auth, load_user, hello));
/// r.use_middleware(());
/// ```
pub trait IntoHandlers {
    /// Box every handler, keeping declaration order
    fn into_handlers(self) -> Vec<BoxedHandler>;
}

impl IntoHandlers for () {
    fn into_handlers(self) -> Vec<BoxedHandler> {
        Vec::new()
    }
}

impl<H: Handler> IntoHandlers for H {
    fn into_handlers(self) -> Vec<BoxedHandler> {
        vec![into_boxed_handler(self)]
    }
}

impl IntoHandlers for BoxedHandler {
    fn into_handlers(self) -> Vec<BoxedHandler> {
        vec![self]
    }
}

impl IntoHandlers for Vec<BoxedHandler> {
    fn into_handlers(self) -> Vec<BoxedHandler> {
        self
    }
}

impl IntoHandlers for HandlerChain {
    fn into_handlers(self) -> Vec<BoxedHandler> {
        self.iter().cloned().collect()
    }
}

macro_rules! impl_into_handlers_for_tuple {
    ($($ty:ident),+) => {
        impl<$($ty: Handler),+> IntoHandlers for ($($ty,)+) {
            #[allow(non_snake_case)]
            fn into_handlers(self) -> Vec<BoxedHandler> {
                let ($($ty,)+) = self;
                vec![$(into_boxed_handler($ty)),+]
            }
        }
    };
}

impl_into_handlers_for_tuple!(H1);
impl_into_handlers_for_tuple!(H1, H2);
impl_into_handlers_for_tuple!(H1, H2, H3);
impl_into_handlers_for_tuple!(H1, H2, H3, H4);
impl_into_handlers_for_tuple!(H1, H2, H3, H4, H5);
impl_into_handlers_for_tuple!(H1, H2, H3, H4, H5, H6);
impl_into_handlers_for_tuple!(H1, H2, H3, H4, H5, H6, H7);
impl_into_handlers_for_tuple!(H1, H2, H3, H4, H5, H6, H7, H8);
impl_into_handlers_for_tuple!(H1, H2, H3, H4, H5, H6, H7, H8, H9);
impl_into_handlers_for_tuple!(H1, H2, H3, H4, H5, H6, H7, H8, H9, H10);
impl_into_handlers_for_tuple!(H1, H2, H3, H4, H5, H6, H7, H8, H9, H10, H11);
impl_into_handlers_for_tuple!(H1, H2, H3, H4, H5, H6, H7, H8, H9, H10, H11, H12);

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tag: &'static str) -> BoxedHandler {
        into_boxed_handler(move |c: &mut Context| {
            let mut trail = c.get_as::<Vec<&'static str>>("trail").cloned().unwrap_or_default();
            trail.push(tag);
            c.set("trail", trail);
        })
    }

    #[test]
    fn test_combine_keeps_declaration_order() {
        let a = tagged("a");
        let b = tagged("b");
        let c = tagged("c");

        let chain = combine_handlers(&[a.clone(), b.clone()], &[c.clone()]);

        assert_eq!(chain.len(), 3);
        assert!(Arc::ptr_eq(&chain[0], &a));
        assert!(Arc::ptr_eq(&chain[1], &b));
        assert!(Arc::ptr_eq(&chain[2], &c));
    }

    #[test]
    fn test_combine_copies_inputs() {
        let mut inherited = vec![tagged("a")];
        let own = vec![tagged("b")];

        let chain = combine_handlers(&inherited, &own);
        inherited.push(tagged("late"));
        inherited.clear();

        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_combine_empty_inputs() {
        let chain = combine_handlers(&[], &[]);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_into_handlers_variants() {
        fn noop(_: &mut Context) {}

        assert_eq!(().into_handlers().len(), 0);
        assert_eq!(noop.into_handlers().len(), 1);
        assert_eq!((noop, noop, noop).into_handlers().len(), 3);
        assert_eq!(vec![tagged("a"), tagged("b")].into_handlers().len(), 2);
        assert_eq!(
            combine_handlers(&[tagged("a")], &[tagged("b")])
                .into_handlers()
                .len(),
            2
        );
    }

    #[test]
    fn test_boxed_handler_keeps_identity() {
        let boxed = tagged("a");
        let handlers = boxed.clone().into_handlers();

        assert_eq!(handlers.len(), 1);
        assert!(Arc::ptr_eq(&handlers[0], &boxed));
    }

    #[test]
    fn test_chain_clone_shares_storage() {
        let chain = combine_handlers(&[tagged("a")], &[]);
        let clone = chain.clone();
        assert!(chain.ptr_eq(&clone));
        assert!(!chain.ptr_eq(&combine_handlers(&chain, &[])));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn numbered(n: usize) -> Vec<BoxedHandler> {
        (0..n)
            .map(|_| into_boxed_handler(|_: &mut Context| {}))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The combined chain is `inherited ++ own`: same length, same order.
        #[test]
        fn prop_combine_is_concatenation(left in 0usize..16, right in 0usize..16) {
            let inherited = numbered(left);
            let own = numbered(right);
            let chain = combine_handlers(&inherited, &own);

            prop_assert_eq!(chain.len(), left + right);
            for (i, handler) in inherited.iter().chain(own.iter()).enumerate() {
                prop_assert!(Arc::ptr_eq(&chain[i], handler));
            }
        }
    }
}
