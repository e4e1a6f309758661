//! Query and mutation descriptors.
//!
//! Every read the dashboard performs is a [`Query`]; its value doubles as the
//! cache key (resource plus parameters), so two equal queries always share a
//! cache entry and an in-flight request. Every write is a [`Mutation`]. The
//! tags each one provides or invalidates are fixed per variant.

use std::fmt;

use crate::client::AdminClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::tags::Tag;
use crate::types::{BlogInput, Credentials, FileUpload, OrderStatus, ProductInput, UserQuery, UserStatus};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    AllProducts,
    SingleProduct(String),
    /// `None` lists orders in every status.
    OrderHistory(Option<OrderStatus>),
    AllUsers(UserQuery),
    Blogs,
}

impl Query {
    pub fn name(&self) -> &'static str {
        match self {
            Query::AllProducts => "allProducts",
            Query::SingleProduct(_) => "singleProduct",
            Query::OrderHistory(_) => "orderHistory",
            Query::AllUsers(_) => "allUsers",
            Query::Blogs => "blog",
        }
    }

    pub fn provides(&self) -> &'static [Tag] {
        match self {
            Query::AllProducts | Query::SingleProduct(_) => &[Tag::AllProducts],
            Query::OrderHistory(_) => &[Tag::AllOrders],
            Query::AllUsers(_) => &[Tag::AllUsers],
            Query::Blogs => &[Tag::Blogs],
        }
    }

    pub fn build(&self, client: &AdminClient) -> HttpRequest {
        match self {
            Query::AllProducts => client.build_list_products(),
            Query::SingleProduct(id) => client.build_get_product(id),
            Query::OrderHistory(status) => client.build_list_orders(*status),
            Query::AllUsers(params) => client.build_list_users(params),
            Query::Blogs => client.build_list_blogs(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::SingleProduct(id) => write!(f, "{}({id})", self.name()),
            Query::OrderHistory(Some(status)) => write!(f, "{}({status})", self.name()),
            Query::OrderHistory(None) => write!(f, "{}()", self.name()),
            Query::AllUsers(p) => write!(f, "{}(page={}, limit={}, email={:?})", self.name(), p.page, p.limit, p.email),
            Query::AllProducts | Query::Blogs => f.write_str(self.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Login(Credentials),
    UpdateUserStatus {
        id: String,
        status: UserStatus,
    },
    AddProduct {
        input: ProductInput,
        image: Option<FileUpload>,
    },
    UpdateProduct {
        id: String,
        input: ProductInput,
        image: Option<FileUpload>,
    },
    DeleteProduct(String),
    UploadFile(FileUpload),
    UpdateOrderStatus {
        id: String,
        status: OrderStatus,
    },
    AddBlog(BlogInput),
    UpdateBlog {
        id: String,
        input: BlogInput,
    },
    DeleteBlog(String),
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Login(_) => "loginUser",
            Mutation::UpdateUserStatus { .. } => "userStatusUpdate",
            Mutation::AddProduct { .. } => "addProduct",
            Mutation::UpdateProduct { .. } => "updateProduct",
            Mutation::DeleteProduct(_) => "deleteProduct",
            Mutation::UploadFile(_) => "upload",
            Mutation::UpdateOrderStatus { .. } => "orderStatus",
            Mutation::AddBlog(_) => "addblog",
            Mutation::UpdateBlog { .. } => "updateBlog",
            Mutation::DeleteBlog(_) => "deleteBlog",
        }
    }

    pub fn invalidates(&self) -> &'static [Tag] {
        match self {
            Mutation::Login(_) => &[Tag::LogIn],
            Mutation::UpdateUserStatus { .. } => &[Tag::AllUsers],
            Mutation::AddProduct { .. } | Mutation::UpdateProduct { .. } | Mutation::DeleteProduct(_) => {
                &[Tag::AllProducts]
            }
            Mutation::UpdateOrderStatus { .. } => &[Tag::AllOrders],
            // Uploaded files end up as blog images.
            Mutation::UploadFile(_) => &[Tag::Blogs],
            Mutation::AddBlog(_) | Mutation::UpdateBlog { .. } | Mutation::DeleteBlog(_) => &[Tag::Blogs],
        }
    }

    /// Login is the only request sent without the session token.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Mutation::Login(_))
    }

    pub fn build(&self, client: &AdminClient) -> Result<HttpRequest, ApiError> {
        match self {
            Mutation::Login(credentials) => client.build_login(credentials),
            Mutation::UpdateUserStatus { id, status } => client.build_update_user_status(id, *status),
            Mutation::AddProduct { input, image } => client.build_create_product(input, image.as_ref()),
            Mutation::UpdateProduct { id, input, image } => {
                client.build_update_product(id, input, image.as_ref())
            }
            Mutation::DeleteProduct(id) => Ok(client.build_delete_product(id)),
            Mutation::UploadFile(file) => Ok(client.build_upload_file(file)),
            Mutation::UpdateOrderStatus { id, status } => client.build_update_order_status(id, *status),
            Mutation::AddBlog(input) => client.build_create_blog(input),
            Mutation::UpdateBlog { id, input } => client.build_update_blog(id, input),
            Mutation::DeleteBlog(id) => Ok(client.build_delete_blog(id)),
        }
    }
}
