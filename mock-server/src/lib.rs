use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{FromRequestParts, Multipart, Path, Query, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@shop.test";
pub const ADMIN_PASSWORD: &str = "admin123";

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub color: String,
    pub size: Vec<String>,
    pub price: f64,
    pub in_stock: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub name: String,
    pub category: String,
    pub color: String,
    pub size: Vec<String>,
    pub price: f64,
    pub in_stock: u32,
    pub description: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub user_info: Value,
    pub address: Value,
    pub items: Vec<Value>,
    pub total_amount: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Suspended,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: UserStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Deserialize)]
pub struct BlogBody {
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct StatusBody<S> {
    pub status: S,
}

#[derive(Deserialize)]
pub struct UsersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct OrdersParams {
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Data {
    pub products: BTreeMap<String, Product>,
    pub orders: BTreeMap<String, Order>,
    pub users: BTreeMap<String, User>,
    pub blogs: BTreeMap<String, Blog>,
    pub tokens: HashSet<String>,
}

impl Data {
    /// A few users and orders; products and blogs start empty.
    pub fn seeded() -> Self {
        let mut data = Data::default();
        for (i, (name, email)) in [("Alice", "alice@shop.test"), ("Bob", "bob@shop.test"), ("Carol", "carol@example.com")]
            .into_iter()
            .enumerate()
        {
            let id = format!("u{}", i + 1);
            data.users.insert(
                id.clone(),
                User {
                    id,
                    email: email.to_string(),
                    name: name.to_string(),
                    role: "USER".to_string(),
                    status: UserStatus::Active,
                },
            );
        }
        for (i, status) in [OrderStatus::Pending, OrderStatus::Pending, OrderStatus::Shipped, OrderStatus::Delivered]
            .into_iter()
            .enumerate()
        {
            let id = format!("o{}", i + 1);
            data.orders.insert(
                id.clone(),
                Order {
                    id,
                    status,
                    user_info: json!({"name": "Alice", "email": "alice@shop.test"}),
                    address: json!({"address": "1 Main St", "city": "Springfield", "country": "US", "phone": "555-0100"}),
                    items: vec![json!({"productId": "p1", "quantity": 1})],
                    total_amount: 10.0,
                },
            );
        }
        data
    }
}

pub type Db = Arc<RwLock<Data>>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum MockError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("You are not authorized")]
    Unauthorized,
    #[error("Invalid email or password")]
    BadCredentials,
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    Conflict { message: String, field: &'static str },
    #[error("Validation error")]
    Validation(Vec<(&'static str, String)>),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = match &self {
            MockError::NotFound(_) => StatusCode::NOT_FOUND,
            MockError::Unauthorized | MockError::BadCredentials => StatusCode::UNAUTHORIZED,
            MockError::BadRequest(_) | MockError::Validation(_) => StatusCode::BAD_REQUEST,
            MockError::Conflict { .. } => StatusCode::CONFLICT,
        };
        let fields: Vec<Value> = match &self {
            MockError::Conflict { message, field } => vec![json!({"path": field, "message": message})],
            MockError::Validation(fields) => fields
                .iter()
                .map(|(path, message)| json!({"path": path, "message": message}))
                .collect(),
            _ => Vec::new(),
        };
        tracing::debug!(%status, error = %self, "request rejected");
        let body = json!({"success": false, "message": self.to_string(), "errorMessages": fields});
        (status, Json(body)).into_response()
    }
}

type ApiResult = Result<(StatusCode, Json<Value>), MockError>;

fn ok<T: Serialize>(status: StatusCode, message: &str, data: T) -> ApiResult {
    Ok((status, Json(json!({"success": true, "message": message, "data": data}))))
}

/// Requests carrying a token handed out by `/auth/login`.
pub struct Authorized;

impl FromRequestParts<Db> for Authorized {
    type Rejection = MockError;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(MockError::Unauthorized)?;
        if db.read().await.tokens.contains(token) {
            Ok(Authorized)
        } else {
            Err(MockError::Unauthorized)
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn app() -> Router {
    app_with(Data::seeded())
}

pub fn app_with(data: Data) -> Router {
    let db: Db = Arc::new(RwLock::new(data));
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/users", get(list_users))
        .route("/users/update-status/{id}", put(update_user_status))
        .route("/products", get(list_products).post(create_product))
        .route("/products/upload-file", post(upload_file))
        .route("/products/{id}", get(get_product).patch(update_product).delete(delete_product))
        .route("/orders/all", get(list_orders))
        .route("/orders/{id}", patch(update_order_status))
        .route("/blogs", get(list_blogs))
        .route("/blogs/create-blog", post(create_blog))
        .route("/blogs/{id}", patch(update_blog).delete(delete_blog))
        .with_state(db);
    Router::new().nest("/api/v1", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// -- auth -------------------------------------------------------------------

async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> ApiResult {
    if input.email != ADMIN_EMAIL || input.password != ADMIN_PASSWORD {
        return Err(MockError::BadCredentials);
    }
    let token = Uuid::new_v4().to_string();
    db.write().await.tokens.insert(token.clone());
    tracing::info!(email = %input.email, "login");
    ok(StatusCode::OK, "Logged in", json!({"accessToken": token}))
}

// -- users ------------------------------------------------------------------

async fn list_users(_: Authorized, State(db): State<Db>, Query(params): Query<UsersParams>) -> ApiResult {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).max(1);
    let email = params.email.unwrap_or_default().to_lowercase();
    let data = db.read().await;
    let matching: Vec<&User> = data
        .users
        .values()
        .filter(|u| email.is_empty() || u.email.to_lowercase().contains(&email))
        .collect();
    let total = matching.len();
    let items: Vec<&User> = matching
        .into_iter()
        .skip((page as usize - 1).saturating_mul(limit as usize))
        .take(limit as usize)
        .collect();
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Users retrieved",
            "data": items,
            "meta": {"page": page, "limit": limit, "total": total}
        })),
    ))
}

async fn update_user_status(
    _: Authorized,
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<StatusBody<UserStatus>>,
) -> ApiResult {
    let mut data = db.write().await;
    let user = data.users.get_mut(&id).ok_or(MockError::NotFound("User"))?;
    user.status = input.status;
    ok(StatusCode::OK, "User status updated", user.clone())
}

// -- products ---------------------------------------------------------------

struct ProductParts {
    body: Option<ProductBody>,
    image: Option<String>,
}

async fn read_product_parts(mut multipart: Multipart) -> Result<ProductParts, MockError> {
    let mut parts = ProductParts { body: None, image: None };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MockError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("bodyData") => {
                let text = field.text().await.map_err(|e| MockError::BadRequest(e.to_string()))?;
                let body = serde_json::from_str(&text).map_err(|e| MockError::BadRequest(e.to_string()))?;
                parts.body = Some(body);
            }
            Some("productImage") => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                field.bytes().await.map_err(|e| MockError::BadRequest(e.to_string()))?;
                parts.image = Some(format!("/uploads/{}-{file_name}", Uuid::new_v4().simple()));
            }
            _ => {}
        }
    }
    Ok(parts)
}

fn check_product(body: &ProductBody) -> Result<(), MockError> {
    let mut fields = Vec::new();
    if body.name.trim().is_empty() {
        fields.push(("name", "Name is required".to_string()));
    }
    if body.price.is_nan() || body.price <= 0.0 {
        fields.push(("price", "Price must be greater than zero".to_string()));
    }
    if body.size.is_empty() {
        fields.push(("size", "At least one size is required".to_string()));
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(MockError::Validation(fields))
    }
}

fn duplicate_name(data: &Data, name: &str, except: Option<&str>) -> Result<(), MockError> {
    let taken = data
        .products
        .values()
        .any(|p| p.name.eq_ignore_ascii_case(name) && Some(p.id.as_str()) != except);
    if taken {
        return Err(MockError::Conflict {
            message: "Product name already exists".to_string(),
            field: "name",
        });
    }
    Ok(())
}

async fn create_product(_: Authorized, State(db): State<Db>, multipart: Multipart) -> ApiResult {
    let parts = read_product_parts(multipart).await?;
    let body = parts
        .body
        .ok_or_else(|| MockError::BadRequest("bodyData is required".to_string()))?;
    check_product(&body)?;
    let mut data = db.write().await;
    duplicate_name(&data, &body.name, None)?;
    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: body.name,
        category: body.category,
        color: body.color,
        size: body.size,
        price: body.price,
        in_stock: body.in_stock,
        description: body.description,
        product_image: parts.image,
    };
    data.products.insert(product.id.clone(), product.clone());
    ok(StatusCode::CREATED, "Product created", product)
}

async fn list_products(_: Authorized, State(db): State<Db>) -> ApiResult {
    let data = db.read().await;
    let products: Vec<&Product> = data.products.values().collect();
    ok(StatusCode::OK, "Products retrieved", products)
}

async fn get_product(_: Authorized, State(db): State<Db>, Path(id): Path<String>) -> ApiResult {
    let data = db.read().await;
    let product = data.products.get(&id).ok_or(MockError::NotFound("Product"))?;
    ok(StatusCode::OK, "Product retrieved", product)
}

async fn update_product(
    _: Authorized,
    State(db): State<Db>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult {
    let parts = read_product_parts(multipart).await?;
    let mut data = db.write().await;
    if !data.products.contains_key(&id) {
        return Err(MockError::NotFound("Product"));
    }
    if let Some(body) = &parts.body {
        check_product(body)?;
        duplicate_name(&data, &body.name, Some(&id))?;
    }
    let product = data.products.get_mut(&id).ok_or(MockError::NotFound("Product"))?;
    if let Some(body) = parts.body {
        product.name = body.name;
        product.category = body.category;
        product.color = body.color;
        product.size = body.size;
        product.price = body.price;
        product.in_stock = body.in_stock;
        product.description = body.description;
    }
    if let Some(image) = parts.image {
        product.product_image = Some(image);
    }
    ok(StatusCode::OK, "Product updated", product.clone())
}

async fn delete_product(_: Authorized, State(db): State<Db>, Path(id): Path<String>) -> ApiResult {
    let removed = db.write().await.products.remove(&id);
    removed.ok_or(MockError::NotFound("Product"))?;
    ok(StatusCode::OK, "Product deleted", Value::Null)
}

async fn upload_file(_: Authorized, mut multipart: Multipart) -> ApiResult {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MockError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("file").to_string();
            field.bytes().await.map_err(|e| MockError::BadRequest(e.to_string()))?;
            let url = format!("/uploads/{}-{file_name}", Uuid::new_v4().simple());
            return ok(StatusCode::OK, "File uploaded", json!({"url": url}));
        }
    }
    Err(MockError::BadRequest("file is required".to_string()))
}

// -- orders -----------------------------------------------------------------

async fn list_orders(_: Authorized, State(db): State<Db>, Query(params): Query<OrdersParams>) -> ApiResult {
    let filter = match params.status.as_deref() {
        None | Some("") => None,
        Some(s) => Some(
            serde_json::from_value::<OrderStatus>(Value::String(s.to_string()))
                .map_err(|_| MockError::BadRequest(format!("unknown status {s}")))?,
        ),
    };
    let data = db.read().await;
    let orders: Vec<&Order> = data
        .orders
        .values()
        .filter(|o| filter.map_or(true, |status| o.status == status))
        .collect();
    ok(StatusCode::OK, "Orders retrieved", orders)
}

async fn update_order_status(
    _: Authorized,
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<StatusBody<OrderStatus>>,
) -> ApiResult {
    let mut data = db.write().await;
    let order = data.orders.get_mut(&id).ok_or(MockError::NotFound("Order"))?;
    order.status = input.status;
    ok(StatusCode::OK, "Order status updated", order.clone())
}

// -- blogs ------------------------------------------------------------------

async fn list_blogs(_: Authorized, State(db): State<Db>) -> ApiResult {
    let data = db.read().await;
    let blogs: Vec<&Blog> = data.blogs.values().collect();
    ok(StatusCode::OK, "Blogs retrieved", blogs)
}

async fn create_blog(_: Authorized, State(db): State<Db>, Json(input): Json<BlogBody>) -> ApiResult {
    if input.title.trim().is_empty() {
        return Err(MockError::Validation(vec![("title", "Title is required".to_string())]));
    }
    let blog = Blog {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        image: input.image,
    };
    db.write().await.blogs.insert(blog.id.clone(), blog.clone());
    ok(StatusCode::CREATED, "Blog created", blog)
}

async fn update_blog(
    _: Authorized,
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<BlogBody>,
) -> ApiResult {
    let mut data = db.write().await;
    let blog = data.blogs.get_mut(&id).ok_or(MockError::NotFound("Blog"))?;
    blog.title = input.title;
    blog.description = input.description;
    blog.image = input.image;
    ok(StatusCode::OK, "Blog updated", blog.clone())
}

async fn delete_blog(_: Authorized, State(db): State<Db>, Path(id): Path<String>) -> ApiResult {
    let removed = db.write().await.blogs.remove(&id);
    removed.ok_or(MockError::NotFound("Blog"))?;
    ok(StatusCode::OK, "Blog deleted", Value::Null)
}
