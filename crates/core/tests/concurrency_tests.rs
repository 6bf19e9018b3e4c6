//! Concurrent resolution from a shared collection

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use graft_core::container::{
    Arguments, Declaration, DeclaredType, Injectable, ServiceCollection, ServiceResolver,
};
use graft_core::errors::ContainerError;

static CONNECTIONS: AtomicUsize = AtomicUsize::new(0);

struct Connection {
    id: usize,
}

impl Injectable for Connection {
    fn declare(declaration: &mut Declaration) -> Result<(), ContainerError> {
        declaration.mark_injectable()
    }

    fn construct(_args: &mut Arguments) -> Result<Self, ContainerError> {
        // Widen the window in which threads race to build the singleton
        thread::yield_now();
        Ok(Connection {
            id: CONNECTIONS.fetch_add(1, Ordering::SeqCst),
        })
    }
}

struct Handler {
    connection: Arc<Connection>,
}

impl Injectable for Handler {
    fn declare(declaration: &mut Declaration) -> Result<(), ContainerError> {
        declaration.mark_injectable()?;
        declaration.param_types([DeclaredType::of::<Connection>()]);
        Ok(())
    }

    fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
        Ok(Handler {
            connection: args.next()?,
        })
    }
}

const THREADS: usize = 16;

#[test]
fn test_racing_threads_observe_one_singleton() {
    let mut collection = ServiceCollection::new();
    collection
        .add_singleton::<Connection>()
        .unwrap()
        .add_transient::<Handler>()
        .unwrap();
    let collection = Arc::new(collection);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let collection = collection.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                collection.resolve::<Handler>().unwrap()
            })
        })
        .collect();

    let handlers: Vec<Arc<Handler>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let shared = collection.resolve::<Connection>().unwrap();
    for handler in &handlers {
        assert!(Arc::ptr_eq(&handler.connection, &shared));
        assert_eq!(handler.connection.id, shared.id);
    }
}

#[test]
fn test_concurrent_calls_get_independent_scopes() {
    let built = Arc::new(AtomicUsize::new(0));
    let mut collection = ServiceCollection::new();
    let counter = built.clone();
    collection
        .add_scoped_factory("request", move || {
            Ok(Arc::new(counter.fetch_add(1, Ordering::SeqCst)))
        })
        .unwrap();
    let collection = Arc::new(collection);

    thread::scope(|s| {
        for _ in 0..THREADS {
            let collection = &collection;
            s.spawn(move || {
                let mut scope = collection.create_scope();
                let first = scope.get::<usize>("request").unwrap();
                let second = scope.get::<usize>("request").unwrap();
                assert!(Arc::ptr_eq(&first, &second));
            });
        }
    });

    assert_eq!(built.load(Ordering::SeqCst), THREADS);
}
