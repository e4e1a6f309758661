//! API client core for the storefront admin dashboard.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of that stateless
//! layer sit the pieces a dashboard needs to stay in sync with the backend:
//! a cookie-backed session, a tag-invalidated query cache, form validation,
//! navigation gating and the overview counters.
//!
//! # Design
//! - `AdminClient` is stateless; it holds only `base_url`.
//! - Each REST operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit. The host plugs in a [`Transport`].
//! - [`ApiStore`] owns the mutable state: session token, [`QueryCache`] and
//!   in-flight requests. Queries provide tags, mutations invalidate them;
//!   see [`endpoints`].
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod actions;
pub mod cache;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod endpoints;
pub mod error;
pub mod forms;
pub mod http;
pub mod listing;
pub mod multipart;
pub mod navigation;
pub mod notify;
pub mod session;
pub mod store;
pub mod tags;
pub mod transport;
pub mod types;

pub use cache::{Invalidation, QueryCache};
pub use client::AdminClient;
pub use config::ClientConfig;
pub use dashboard::{DashboardOverview, OrderCounters};
pub use endpoints::{Mutation, Query};
pub use error::{ApiError, FieldErrors};
pub use forms::{BlogForm, ProductForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use listing::UserPager;
pub use navigation::{Navigation, Route};
pub use notify::{Level, Notification, Notifications};
pub use session::Session;
pub use store::{ApiStore, CacheEvent, Subscription};
pub use tags::Tag;
pub use transport::Transport;
pub use types::{
    BlogInput, BlogPost, Credentials, Envelope, FileUpload, LoginData, Order, OrderStatus, PageMeta,
    Product, ProductInput, UploadedFile, User, UserPage, UserQuery, UserStatus,
};
