//! # Mock Clients
//!
//! Utilities for testing typed clients (such as `OrderClient`) without a
//! running store actor.
//!
//! Two styles are available:
//!
//! - [`create_mock_client`] hands back the raw request receiver; pair it with
//!   [`expect_action`], [`expect_get`] or [`expect_create`] to inspect each
//!   request and answer it by hand.
//! - [`MockClient`] answers requests from a queue of canned responses and can
//!   [`verify`](MockClient::verify) that every expectation was consumed.

use crate::framework::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

enum Expectation<T: ActorEntity> {
    Create(Result<T::Id, FrameworkError>),
    Get(Result<Option<T>, FrameworkError>),
    Delete(Result<(), FrameworkError>),
    Action(Result<T::ActionResult, FrameworkError>),
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn lock<T: ActorEntity>(queue: &Queue<T>) -> MutexGuard<'_, VecDeque<Expectation<T>>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A client backed by a queue of canned responses.
///
/// ```ignore
/// let mut mock = MockClient::<Order>::new();
/// mock.expect_action().return_ok(claimed_order);
/// let orders = OrderClient::new(mock.client());
/// orders.claim(id, user).await?;
/// mock.verify();
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a mock with no expectations. Requests arriving with an empty
    /// queue, or of the wrong kind, panic the responder task.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(64);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = lock(&queue).pop_front();
                match (request, next) {
                    (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (ResourceRequest::Get { respond_to, .. }, Some(Expectation::Get(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (ResourceRequest::Delete { respond_to, .. }, Some(Expectation::Delete(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (ResourceRequest::Action { respond_to, .. }, Some(Expectation::Action(r))) => {
                        let _ = respond_to.send(r);
                    }
                    _ => panic!("Unexpected request or expectation mismatch"),
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Create)
    }

    pub fn expect_get(&mut self) -> ExpectationBuilder<T, Option<T>> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Get)
    }

    pub fn expect_delete(&mut self) -> ExpectationBuilder<T, ()> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Delete)
    }

    pub fn expect_action(&mut self) -> ExpectationBuilder<T, T::ActionResult> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Action)
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Queues one canned response of type `R`.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Queue<T>,
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn new(expectations: Queue<T>, wrap: fn(Result<R, FrameworkError>) -> Expectation<T>) -> Self {
        Self { expectations, wrap }
    }

    pub fn return_ok(self, value: R) {
        lock(&self.expectations).push_back((self.wrap)(Ok(value)));
    }

    pub fn return_err(self, error: FrameworkError) {
        lock(&self.expectations).push_back((self.wrap)(Err(error)));
    }
}

/// Creates a client whose requests land on the returned receiver.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Returns the next request if it is a `Create`.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Response<T::Id>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Returns the next request if it is a `Get`.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Returns the next request if it is an `Action`.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}
