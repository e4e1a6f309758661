//! The stateful half of the client: session, query cache and transport.
//!
//! # Design
//! `ApiStore` ties the stateless [`AdminClient`] to a host [`Transport`].
//! Queries are served from the [`QueryCache`] when fresh; otherwise exactly
//! one request per query key is in flight at a time and every concurrent
//! caller for the same key awaits its result through a `watch` channel.
//! Mutations invalidate their declared tags only after the response parsed
//! as success, then refetch each stale subscribed query once.
//!
//! A flight only writes to the cache while it is still the registered
//! flight for its key. Invalidating a tag or logging out detaches the
//! matching flights: their callers still get the response, but the cache
//! and later callers never see it.
//!
//! Locks are `parking_lot` mutexes and are never held across an `.await`.
//! When both are needed, `flights` is taken before `cache`.
//! In-flight requests are not cancelled when subscribers go away; a late
//! result still lands in the cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::cache::QueryCache;
use crate::client::{decode_data, parse_value, AdminClient};
use crate::config::ClientConfig;
use crate::endpoints::{Mutation, Query};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::Session;
use crate::tags::{intersects, Tag};
use crate::transport::Transport;
use crate::types::{Credentials, LoginData};

pub type QueryResult = Result<Arc<Value>, ApiError>;

const EVENT_CAPACITY: usize = 64;

/// Change notifications for views holding subscriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Updated(Query),
    Removed(Query),
    Cleared,
}

type Outcome = watch::Receiver<Option<QueryResult>>;

enum Role {
    Lead(u64, watch::Sender<Option<QueryResult>>),
    Join(Outcome),
}

struct Flight {
    id: u64,
    outcome: Outcome,
}

/// Requests currently on the wire, one per query key.
#[derive(Default)]
struct Flights {
    next_id: u64,
    by_query: HashMap<Query, Flight>,
}

impl Flights {
    fn join_or_lead(&mut self, query: &Query) -> Role {
        if let Some(flight) = self.by_query.get(query) {
            return Role::Join(flight.outcome.clone());
        }
        self.next_id += 1;
        let (tx, outcome) = watch::channel(None);
        self.by_query.insert(query.clone(), Flight { id: self.next_id, outcome });
        Role::Lead(self.next_id, tx)
    }

    /// Unregister flight `id`. False when it was already detached.
    fn finish(&mut self, query: &Query, id: u64) -> bool {
        if self.by_query.get(query).is_some_and(|flight| flight.id == id) {
            self.by_query.remove(query);
            return true;
        }
        false
    }

    /// Detach every flight whose query provides one of `tags`.
    fn detach(&mut self, tags: &[Tag]) -> usize {
        let before = self.by_query.len();
        self.by_query.retain(|query, _| !intersects(query.provides(), tags));
        before - self.by_query.len()
    }

    fn detach_all(&mut self) -> usize {
        let n = self.by_query.len();
        self.by_query.clear();
        n
    }
}

/// Unregisters the leading flight when it finishes or is dropped mid-flight.
struct FlightGuard<'a> {
    flights: &'a Mutex<Flights>,
    query: &'a Query,
    id: u64,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flights.lock().finish(self.query, self.id);
    }
}

pub struct ApiStore<T> {
    client: AdminClient,
    transport: T,
    session: Mutex<Session>,
    cache: Mutex<QueryCache>,
    flights: Mutex<Flights>,
    events: broadcast::Sender<CacheEvent>,
}

impl<T: Transport> ApiStore<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client: AdminClient::new(&config.base_url),
            transport,
            session: Mutex::new(Session::new(&config.cookie_name)),
            cache: Mutex::new(QueryCache::new()),
            flights: Mutex::new(Flights::default()),
            events,
        }
    }

    /// Start from an existing session, e.g. one restored from a cookie.
    pub fn with_session(self, session: Session) -> Self {
        *self.session.lock() = session;
        self
    }

    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn session(&self) -> Session {
        self.session.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.lock().is_authenticated()
    }

    pub fn events(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Register interest in `query`. The entry stays subscribed until the
    /// returned guard is dropped.
    pub fn subscribe(&self, query: Query) -> Subscription<'_, T> {
        let count = self.cache.lock().subscribe(&query);
        debug!(query = %query, subscribers = count, "subscribed");
        Subscription { store: self, query }
    }

    /// Last cached payload for `query`, fresh or stale, without any I/O.
    pub fn cached(&self, query: &Query) -> Option<Arc<Value>> {
        self.cache.lock().data(query)
    }

    pub fn is_stale(&self, query: &Query) -> bool {
        self.cache.lock().is_stale(query)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Run a query, serving a fresh cached payload when there is one.
    pub async fn query(&self, query: &Query) -> QueryResult {
        let cached = self.cache.lock().fresh(query);
        if let Some(data) = cached {
            debug!(query = %query, "cache hit");
            return Ok(data);
        }
        self.fetch(query).await
    }

    /// Run a query and decode the envelope's `data` field.
    pub async fn query_as<D: DeserializeOwned>(&self, query: &Query) -> Result<D, ApiError> {
        let value = self.query(query).await?;
        decode_data(&value)
    }

    async fn fetch(&self, query: &Query) -> QueryResult {
        let role = self.flights.lock().join_or_lead(query);

        match role {
            Role::Join(mut rx) => {
                debug!(query = %query, "joining in-flight request");
                let result = rx
                    .wait_for(Option::is_some)
                    .await
                    .map_err(|_| ApiError::Transport("in-flight request was abandoned".to_string()))?;
                (*result)
                    .clone()
                    .unwrap_or_else(|| Err(ApiError::Transport("in-flight request was abandoned".to_string())))
            }
            Role::Lead(id, tx) => {
                let guard = FlightGuard {
                    flights: &self.flights,
                    query,
                    id,
                };
                let request = query.build(&self.client);
                let result = self.execute(request, true).await.and_then(parse_value).map(Arc::new);
                {
                    let mut flights = self.flights.lock();
                    let current = flights.finish(query, id);
                    match &result {
                        Ok(data) if current => {
                            self.cache.lock().store(query, Arc::clone(data));
                            let _ = self.events.send(CacheEvent::Updated(query.clone()));
                        }
                        Ok(_) => debug!(query = %query, "discarding result of a detached request"),
                        Err(err) => warn!(query = %query, error = %err, "query failed"),
                    }
                }
                drop(guard);
                let _ = tx.send(Some(result.clone()));
                result
            }
        }
    }

    /// Run a mutation. On success its tags are invalidated and every stale
    /// subscribed query is refetched once before this returns; on failure
    /// the cache is left exactly as it was.
    pub async fn mutate(&self, mutation: &Mutation) -> QueryResult {
        let request = mutation.build(&self.client)?;
        let data = match self
            .execute(request, mutation.requires_auth())
            .await
            .and_then(parse_value)
        {
            Ok(data) => Arc::new(data),
            Err(err) => {
                warn!(mutation = mutation.name(), error = %err, "mutation failed");
                return Err(err);
            }
        };

        if let Mutation::Login(_) = mutation {
            let login: LoginData = decode_data(&data)?;
            self.session.lock().set_token(&login.access_token);
            info!("session started");
        }

        let tags = mutation.invalidates();
        let (invalidation, detached) = {
            let mut flights = self.flights.lock();
            let invalidation = self.cache.lock().invalidate(tags);
            (invalidation, flights.detach(tags))
        };
        debug!(
            mutation = mutation.name(),
            refetch = invalidation.refetch.len(),
            removed = invalidation.removed.len(),
            detached,
            "tags invalidated"
        );
        for query in invalidation.removed {
            let _ = self.events.send(CacheEvent::Removed(query));
        }
        for query in &invalidation.refetch {
            // Stale data stays visible when the refetch fails.
            if let Err(err) = self.fetch(query).await {
                warn!(query = %query, error = %err, "refetch after mutation failed");
            }
        }
        Ok(data)
    }

    /// Log in and keep the returned token for every later request.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.mutate(&Mutation::Login(credentials.clone())).await.map(|_| ())
    }

    /// Forget the token, flush every cached payload and detach requests
    /// still on the wire so nothing from this session reaches the next one.
    /// Open subscriptions stay registered.
    pub fn logout(&self) {
        let (flushed, detached) = {
            let mut flights = self.flights.lock();
            self.session.lock().clear();
            let flushed = self.cache.lock().clear();
            (flushed, flights.detach_all())
        };
        let _ = self.events.send(CacheEvent::Cleared);
        info!(flushed, detached, "session ended");
    }

    async fn execute(&self, mut request: HttpRequest, authorize: bool) -> Result<HttpResponse, ApiError> {
        if authorize {
            self.session.lock().authorize(&mut request);
        }
        debug!(method = request.method.as_str(), path = %request.path, "request");
        let response = self.transport.execute(request).await?;
        if authorize && response.status == 401 {
            warn!("session token rejected");
            self.session.lock().clear();
        }
        Ok(response)
    }
}

/// A live view reading one query.
pub struct Subscription<'a, T: Transport> {
    store: &'a ApiStore<T>,
    query: Query,
}

impl<T: Transport> Subscription<'_, T> {
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub async fn data(&self) -> QueryResult {
        self.store.query(&self.query).await
    }

    pub async fn data_as<D: DeserializeOwned>(&self) -> Result<D, ApiError> {
        self.store.query_as(&self.query).await
    }
}

impl<T: Transport> Drop for Subscription<'_, T> {
    fn drop(&mut self) {
        let remaining = self.store.cache.lock().unsubscribe(&self.query);
        debug!(query = %self.query, subscribers = remaining, "unsubscribed");
    }
}
