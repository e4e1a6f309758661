//! Stateless HTTP request builder and response parser for the admin API.
//!
//! # Design
//! `AdminClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation of the REST contract is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. The caller executes the actual HTTP round-trip, keeping
//! the core deterministic and free of I/O dependencies.
//!
//! Builders never attach the session token; that is the job of
//! [`crate::session::Session::authorize`], applied by the store to every
//! request but login.

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::form_urlencoded;

use crate::error::{ApiError, FieldErrors};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::MultipartForm;
use crate::types::{
    BlogInput, BlogPost, Credentials, Envelope, ErrorBody, FileUpload, LoginData, Order,
    OrderStatus, OrderStatusUpdate, Product, ProductInput, UploadedFile, User, UserPage,
    UserQuery, UserStatus, UserStatusUpdate,
};

/// Synchronous, stateless client for the admin API.
#[derive(Debug, Clone)]
pub struct AdminClient {
    base_url: String,
}

impl AdminClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_vec(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut req = HttpRequest::new(method, self.url(path));
        req.set_header("content-type", "application/json".to_string());
        req.body = Some(body);
        Ok(req)
    }

    fn product_request(
        &self,
        method: HttpMethod,
        path: &str,
        input: &ProductInput,
        image: Option<&FileUpload>,
    ) -> Result<HttpRequest, ApiError> {
        let body_data =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut form = MultipartForm::new().text("bodyData", &body_data);
        if let Some(image) = image {
            form = form.file("productImage", &image.file_name, &image.content_type, &image.bytes);
        }
        let (content_type, body) = form.finish();
        let mut req = HttpRequest::new(method, self.url(path));
        req.set_header("content-type", content_type);
        req.body = Some(body);
        Ok(req)
    }

    // -- auth ---------------------------------------------------------------

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/login", credentials)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginData, ApiError> {
        parse_data(response)
    }

    // -- users --------------------------------------------------------------

    pub fn build_list_users(&self, query: &UserQuery) -> HttpRequest {
        let qs = form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &query.page.to_string())
            .append_pair("limit", &query.limit.to_string())
            .append_pair("email", &query.email)
            .finish();
        HttpRequest::new(HttpMethod::Get, self.url(&format!("/users?{qs}")))
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<UserPage, ApiError> {
        let envelope: Envelope<Vec<User>> = parse_envelope(response)?;
        Ok(UserPage {
            users: envelope.data,
            meta: envelope.meta,
        })
    }

    pub fn build_update_user_status(&self, id: &str, status: UserStatus) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Put,
            &format!("/users/update-status/{id}"),
            &UserStatusUpdate { status },
        )
    }

    pub fn parse_update_user_status(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_data(response)
    }

    // -- products -----------------------------------------------------------

    pub fn build_create_product(
        &self,
        input: &ProductInput,
        image: Option<&FileUpload>,
    ) -> Result<HttpRequest, ApiError> {
        self.product_request(HttpMethod::Post, "/products", input, image)
    }

    pub fn parse_create_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        parse_data(response)
    }

    pub fn build_list_products(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url("/products"))
    }

    pub fn parse_list_products(&self, response: HttpResponse) -> Result<Vec<Product>, ApiError> {
        parse_data(response)
    }

    pub fn build_get_product(&self, id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url(&format!("/products/{id}")))
    }

    pub fn parse_get_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        parse_data(response)
    }

    pub fn build_update_product(
        &self,
        id: &str,
        input: &ProductInput,
        image: Option<&FileUpload>,
    ) -> Result<HttpRequest, ApiError> {
        self.product_request(HttpMethod::Patch, &format!("/products/{id}"), input, image)
    }

    pub fn parse_update_product(&self, response: HttpResponse) -> Result<Product, ApiError> {
        parse_data(response)
    }

    pub fn build_delete_product(&self, id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, self.url(&format!("/products/{id}")))
    }

    pub fn parse_delete_product(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // -- file upload --------------------------------------------------------

    pub fn build_upload_file(&self, file: &FileUpload) -> HttpRequest {
        let (content_type, body) = MultipartForm::new()
            .file("file", &file.file_name, &file.content_type, &file.bytes)
            .finish();
        let mut req = HttpRequest::new(HttpMethod::Post, self.url("/products/upload-file"));
        req.set_header("content-type", content_type);
        req.body = Some(body);
        req
    }

    pub fn parse_upload_file(&self, response: HttpResponse) -> Result<UploadedFile, ApiError> {
        parse_data(response)
    }

    // -- orders -------------------------------------------------------------

    /// `None` lists orders in every status.
    pub fn build_list_orders(&self, status: Option<OrderStatus>) -> HttpRequest {
        let qs = form_urlencoded::Serializer::new(String::new())
            .append_pair("status", status.map(OrderStatus::as_str).unwrap_or(""))
            .finish();
        HttpRequest::new(HttpMethod::Get, self.url(&format!("/orders/all?{qs}")))
    }

    pub fn parse_list_orders(&self, response: HttpResponse) -> Result<Vec<Order>, ApiError> {
        parse_data(response)
    }

    pub fn build_update_order_status(&self, id: &str, status: OrderStatus) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Patch,
            &format!("/orders/{id}"),
            &OrderStatusUpdate { status },
        )
    }

    pub fn parse_update_order_status(&self, response: HttpResponse) -> Result<Order, ApiError> {
        parse_data(response)
    }

    // -- blog ---------------------------------------------------------------

    pub fn build_list_blogs(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url("/blogs"))
    }

    pub fn parse_list_blogs(&self, response: HttpResponse) -> Result<Vec<BlogPost>, ApiError> {
        parse_data(response)
    }

    pub fn build_create_blog(&self, input: &BlogInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/blogs/create-blog", input)
    }

    pub fn parse_create_blog(&self, response: HttpResponse) -> Result<BlogPost, ApiError> {
        parse_data(response)
    }

    pub fn build_update_blog(&self, id: &str, input: &BlogInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, &format!("/blogs/{id}"), input)
    }

    pub fn parse_update_blog(&self, response: HttpResponse) -> Result<BlogPost, ApiError> {
        parse_data(response)
    }

    pub fn build_delete_blog(&self, id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, self.url(&format!("/blogs/{id}")))
    }

    pub fn parse_delete_blog(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

/// Parse a successful response into its raw JSON envelope.
///
/// Empty 2xx bodies become `{"data": null}` so deletes without content still
/// yield a value.
pub fn parse_value(response: HttpResponse) -> Result<serde_json::Value, ApiError> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Ok(serde_json::json!({ "data": null }));
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Decode the `data` field of an envelope already held as JSON.
pub fn decode_data<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, ApiError> {
    let data = value.get("data").cloned().unwrap_or(serde_json::Value::Null);
    serde_json::from_value(data).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Decode a whole envelope already held as JSON.
pub fn decode_envelope<T: DeserializeOwned>(value: &serde_json::Value) -> Result<Envelope<T>, ApiError> {
    serde_json::from_value(value.clone()).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn parse_envelope<T: DeserializeOwned>(response: HttpResponse) -> Result<Envelope<T>, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn parse_data<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    parse_envelope(response).map(|envelope| envelope.data)
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let body: ErrorBody = serde_json::from_str(&response.body).unwrap_or_else(|_| ErrorBody {
        message: response.body.clone(),
        error_messages: Vec::new(),
    });
    match response.status {
        404 => Err(ApiError::NotFound),
        401 => Err(ApiError::Unauthorized { message: body.message }),
        status => {
            let mut fields = FieldErrors::new();
            for field in &body.error_messages {
                fields.add(&field.path, field.message.clone());
            }
            Err(ApiError::HttpError {
                status,
                message: body.message,
                fields,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AdminClient {
        AdminClient::new("http://localhost:5009/api/v1")
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn shirt() -> ProductInput {
        ProductInput {
            name: "Shirt".to_string(),
            category: "Clothes".to_string(),
            color: "Red".to_string(),
            size: vec!["S".to_string(), "M".to_string()],
            price: 10.0,
            in_stock: 5,
            description: "desc".to_string(),
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = AdminClient::new("http://localhost:5009/api/v1/");
        let req = client.build_list_products();
        assert_eq!(req.path, "http://localhost:5009/api/v1/products");
    }

    #[test]
    fn build_login_posts_json_without_authorization() {
        let req = client()
            .build_login(&Credentials {
                email: "admin@shop.test".into(),
                password: "secret".into(),
            })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:5009/api/v1/auth/login");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert!(req.header("authorization").is_none());
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["email"], "admin@shop.test");
    }

    #[test]
    fn build_list_users_always_sends_all_params() {
        let req = client().build_list_users(&UserQuery::default());
        assert_eq!(req.path, "http://localhost:5009/api/v1/users?page=1&limit=10&email=");

        let req = client().build_list_users(&UserQuery {
            page: 2,
            limit: 5,
            email: "a+b@shop.test".into(),
        });
        assert_eq!(
            req.path,
            "http://localhost:5009/api/v1/users?page=2&limit=5&email=a%2Bb%40shop.test"
        );
    }

    #[test]
    fn build_update_user_status_puts_status_object() {
        let req = client().build_update_user_status("u1", UserStatus::Suspended).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert!(req.path.ends_with("/users/update-status/u1"));
        assert_eq!(req.body_text(), Some(r#"{"status":"SUSPENDED"}"#));
    }

    #[test]
    fn build_create_product_is_multipart_with_body_data() {
        let image = FileUpload::new("shirt.png", "image/png", vec![0x89, 0x50]);
        let req = client().build_create_product(&shirt(), Some(&image)).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.path.ends_with("/products"));
        let content_type = req.header("content-type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));

        let body = String::from_utf8_lossy(req.body.as_deref().unwrap()).into_owned();
        assert!(body.contains("name=\"bodyData\""));
        assert!(body.contains(r#""size":["S","M"]"#));
        assert!(body.contains(r#""inStock":5"#));
        assert!(body.contains("name=\"productImage\"; filename=\"shirt.png\""));
    }

    #[test]
    fn build_update_product_without_image_has_only_body_data() {
        let req = client().build_update_product("p1", &shirt(), None).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert!(req.path.ends_with("/products/p1"));
        let body = String::from_utf8_lossy(req.body.as_deref().unwrap()).into_owned();
        assert!(body.contains("bodyData"));
        assert!(!body.contains("productImage"));
    }

    #[test]
    fn build_upload_file_uses_file_part() {
        let req = client().build_upload_file(&FileUpload::new("cover.jpg", "image/jpeg", b"jpg".to_vec()));
        assert!(req.path.ends_with("/products/upload-file"));
        let body = String::from_utf8_lossy(req.body.as_deref().unwrap()).into_owned();
        assert!(body.contains("name=\"file\"; filename=\"cover.jpg\""));
    }

    #[test]
    fn build_list_orders_encodes_status_filter() {
        let req = client().build_list_orders(None);
        assert!(req.path.ends_with("/orders/all?status="));
        let req = client().build_list_orders(Some(OrderStatus::Shipped));
        assert!(req.path.ends_with("/orders/all?status=SHIPPED"));
    }

    #[test]
    fn build_update_order_status_patches_status() {
        let req = client().build_update_order_status("o1", OrderStatus::Delivered).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert!(req.path.ends_with("/orders/o1"));
        assert_eq!(req.body_text(), Some(r#"{"status":"DELIVERED"}"#));
    }

    #[test]
    fn blog_paths() {
        let c = client();
        assert!(c.build_list_blogs().path.ends_with("/blogs"));
        let input = BlogInput {
            title: "Hello".into(),
            image: String::new(),
            description: "<p>hi</p>".into(),
        };
        assert!(c.build_create_blog(&input).unwrap().path.ends_with("/blogs/create-blog"));
        assert_eq!(c.build_update_blog("b1", &input).unwrap().method, HttpMethod::Patch);
        assert_eq!(c.build_delete_blog("b1").method, HttpMethod::Delete);
    }

    #[test]
    fn parse_list_users_keeps_meta() {
        let page = client()
            .parse_list_users(ok(
                r#"{"success":true,"message":"ok","data":[{"id":"u1","email":"a@b.c","name":"A","status":"ACTIVE"}],"meta":{"page":1,"limit":10,"total":1}}"#,
            ))
            .unwrap();
        assert_eq!(page.users.len(), 1);
        assert_eq!(page.meta.unwrap().total, 1);
    }

    #[test]
    fn parse_get_product_not_found() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: r#"{"success":false,"message":"Product not found"}"#.to_string(),
        };
        let err = client().parse_get_product(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn unauthorized_is_its_own_variant() {
        let response = HttpResponse {
            status: 401,
            headers: Vec::new(),
            body: r#"{"success":false,"message":"You are not authorized"}"#.to_string(),
        };
        let err = client().parse_list_products(response).unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn server_field_errors_are_collected() {
        let response = HttpResponse {
            status: 409,
            headers: Vec::new(),
            body: r#"{"success":false,"message":"Product already exists","errorMessages":[{"path":"name","message":"Name already taken"}]}"#.to_string(),
        };
        let err = client().parse_create_product(response).unwrap_err();
        match err {
            ApiError::HttpError { status, message, fields } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Product already exists");
                assert_eq!(fields.get("name"), Some("Name already taken"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_error_body_becomes_message() {
        let response = HttpResponse {
            status: 502,
            headers: Vec::new(),
            body: "bad gateway".to_string(),
        };
        let err = client().parse_list_blogs(response).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }

    #[test]
    fn parse_list_products_bad_json() {
        let err = client().parse_list_products(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_delete_accepts_empty_body() {
        let response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(client().parse_delete_product(response).is_ok());
    }

    #[test]
    fn parse_value_and_decode_data() {
        let value = parse_value(ok(r#"{"success":true,"message":"","data":{"url":"http://cdn/x.png"}}"#)).unwrap();
        let uploaded: UploadedFile = decode_data(&value).unwrap();
        assert_eq!(uploaded.url, "http://cdn/x.png");
    }
}
