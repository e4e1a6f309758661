//! Dashboard session against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the store, forms,
//! actions and navigation gate over real HTTP using ureq. Validates that
//! request building, tag invalidation and response parsing work end-to-end
//! with the actual server.

use std::sync::Arc;

use admin_core::navigation::{self, navigate};
use admin_core::{
    actions, ApiError, ApiStore, BlogForm, ClientConfig, Credentials, DashboardOverview, FileUpload, HttpMethod,
    HttpRequest, HttpResponse, Navigation, Notifications, OrderCounters, OrderStatus, Product, ProductForm,
    Query, Route, Transport, UserPager, UserStatus,
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Execute requests with ureq on the blocking pool and record what was sent.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
#[derive(Default)]
struct UreqTransport {
    sent: Mutex<Vec<(HttpMethod, String)>>,
}

impl UreqTransport {
    fn count(&self, method: HttpMethod, path_suffix: &str) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|(m, p)| *m == method && p.ends_with(path_suffix))
            .count()
    }
}

fn execute(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let uri = req.path.as_str();
    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => {
            let mut builder = agent.get(uri);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        (HttpMethod::Delete, _) => {
            let mut builder = agent.delete(uri);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        (method, body) => {
            let mut builder = match method {
                HttpMethod::Post => agent.post(uri),
                HttpMethod::Put => agent.put(uri),
                _ => agent.patch(uri),
            };
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match body {
                Some(bytes) => builder.send(&bytes[..]),
                None => builder.send_empty(),
            }
        }
    }
    .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body,
    })
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.sent.lock().push((request.method, request.path.clone()));
        tokio::task::spawn_blocking(move || execute(request))
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
    }
}

fn start_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn shirt_form() -> ProductForm {
    let mut form = ProductForm::new();
    form.name = "Shirt".to_string();
    form.category = "Clothes".to_string();
    form.color = "Red".to_string();
    form.size = "S,M".to_string();
    form.price = "10".to_string();
    form.in_stock = "5".to_string();
    form.description = "desc".to_string();
    form.image = Some(FileUpload::new("shirt.png", "image/png", vec![1, 2, 3]));
    form
}

#[tokio::test(flavor = "multi_thread")]
async fn dashboard_session() {
    // Step 1: start mock server on a random port.
    let addr = start_server();
    let transport = Arc::new(UreqTransport::default());
    let store = ApiStore::new(
        &ClientConfig::new(&format!("http://{addr}/api/v1")),
        Arc::clone(&transport),
    );
    let mut notes = Notifications::default();

    // Step 2: signed out, protected routes redirect and the API refuses.
    assert_eq!(navigate(&store, Route::Products), Navigation::Redirect(Route::Login));
    let err = store.query(&Query::AllProducts).await.unwrap_err();
    assert!(err.is_unauthorized(), "expected 401, got {err:?}");

    let bad = Credentials {
        email: mock_server::ADMIN_EMAIL.to_string(),
        password: "wrong".to_string(),
    };
    assert!(store.login(&bad).await.is_err());
    assert!(!store.is_authenticated());

    // Step 3: log in.
    let creds = Credentials {
        email: mock_server::ADMIN_EMAIL.to_string(),
        password: mock_server::ADMIN_PASSWORD.to_string(),
    };
    store.login(&creds).await.unwrap();
    assert!(store.is_authenticated());
    assert_eq!(navigate(&store, Route::Products), Navigation::Allow(Route::Products));

    // Step 4: subscribed product list refreshes after a create.
    let products = store.subscribe(Query::AllProducts);
    let listed: Vec<Product> = products.data_as().await.unwrap();
    assert!(listed.is_empty(), "expected empty list");

    let mut form = shirt_form();
    let created = form.submit(&store, &mut notes).await.unwrap();
    assert_eq!(created.name, "Shirt");
    assert_eq!(created.size, vec!["S".to_string(), "M".to_string()]);
    assert!(created.product_image.as_deref().unwrap_or_default().ends_with("shirt.png"));
    assert!(form.name.is_empty(), "create resets the form");
    assert_eq!(notes.last().unwrap().message, "Product added successfully");
    assert_eq!(transport.count(HttpMethod::Post, "/products"), 1);
    assert_eq!(transport.count(HttpMethod::Get, "/products"), 3);

    let listed: Vec<Product> = products.data_as().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(transport.count(HttpMethod::Get, "/products"), 3, "fresh data is served from cache");

    // Step 5: duplicate name reports a field error and keeps the cache.
    let mut dup = shirt_form();
    let err = dup.submit(&store, &mut notes).await.unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 409, .. }), "got {err:?}");
    assert!(dup.errors().contains("name"));
    assert_eq!(dup.name, "Shirt", "failed submit keeps the entered values");
    assert!(notes.last().unwrap().message.starts_with("Failed to add product"));
    assert_eq!(transport.count(HttpMethod::Get, "/products"), 3);

    // Step 6: edit keeps the image when none is picked.
    let mut edit = ProductForm::edit(&created);
    edit.name = "Shirt v2".to_string();
    let updated = edit.submit(&store, &mut notes).await.unwrap();
    assert_eq!(updated.name, "Shirt v2");
    assert_eq!(updated.product_image, created.product_image);
    assert_eq!(edit.editing(), Some(created.id.as_str()));
    let listed: Vec<Product> = products.data_as().await.unwrap();
    assert_eq!(listed[0].name, "Shirt v2");

    // Step 7: dashboard counters follow order status changes.
    let overview = DashboardOverview::open(&store);
    assert_eq!(
        overview.counters().await.unwrap(),
        OrderCounters {
            all: 4,
            delivered: 1,
            shipped: 1,
            pending: 2,
        }
    );
    let order = actions::change_order_status(&store, "o1", OrderStatus::Shipped, &mut notes)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(
        overview.counters().await.unwrap(),
        OrderCounters {
            all: 4,
            delivered: 1,
            shipped: 2,
            pending: 1,
        }
    );

    // Step 8: users filter by email and change status.
    let mut pager = UserPager::new(10);
    pager.filter_email("example.com");
    let page = pager.load(&store).await.unwrap();
    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].name, "Carol");
    assert!(!pager.has_next());

    let carol_id = page.users[0].id.clone();
    let user = actions::change_user_status(&store, &carol_id, UserStatus::Suspended, &mut notes)
        .await
        .unwrap();
    assert_eq!(user.status, UserStatus::Suspended);

    // Step 9: upload a cover and publish a post.
    let blogs = store.subscribe(Query::Blogs);
    assert!(blogs.data().await.unwrap()["data"].as_array().unwrap().is_empty());

    let mut post = BlogForm::new();
    let url = post
        .upload_image(&store, FileUpload::new("cover.png", "image/png", b"png".to_vec()), &mut notes)
        .await
        .unwrap();
    assert!(url.ends_with("cover.png"));
    assert_eq!(post.image, url);
    post.title = "Hello".to_string();
    post.description = "<p>hi</p>".to_string();
    let published = post.submit(&store, &mut notes).await.unwrap();
    assert_eq!(published.title, "Hello");
    assert_eq!(published.image, url);
    assert_eq!(blogs.data().await.unwrap()["data"].as_array().unwrap().len(), 1);

    // Step 10: delete the product; the list empties, deleting again fails.
    actions::delete_product(&store, &created.id, &mut notes).await.unwrap();
    let listed: Vec<Product> = products.data_as().await.unwrap();
    assert!(listed.is_empty());
    let err = actions::delete_product(&store, &created.id, &mut notes).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound), "got {err:?}");

    // Step 11: logout flushes everything.
    drop(overview);
    drop(blogs);
    drop(products);
    assert_eq!(navigation::logout(&store), Route::Login);
    assert_eq!(store.cache_len(), 0);
    assert_eq!(navigate(&store, Route::Dashboard), Navigation::Redirect(Route::Login));
    let err = store.query(&Query::AllProducts).await.unwrap_err();
    assert!(err.is_unauthorized(), "expected 401 after logout, got {err:?}");
}
