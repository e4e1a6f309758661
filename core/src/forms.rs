//! Create/edit forms and their validation gate.
//!
//! Form state is kept as the raw text the user typed so a failed submission
//! never loses input. `validate` turns that text into a typed payload or a
//! set of per-field messages; `submit` refuses to touch the network until
//! validation passes.

use crate::client::decode_data;
use crate::endpoints::Mutation;
use crate::error::{ApiError, FieldErrors};
use crate::notify::Notifications;
use crate::store::ApiStore;
use crate::transport::Transport;
use crate::types::{BlogInput, BlogPost, FileUpload, Product, ProductInput, UploadedFile};

/// Notification text for a failed submission: the fixed prefix plus the
/// server's message when it sent one.
pub(crate) fn failure_message(prefix: &str, err: &ApiError) -> String {
    match err {
        ApiError::HttpError { message, .. } | ApiError::Unauthorized { message } if !message.is_empty() => {
            format!("{prefix}: {message}")
        }
        _ => prefix.to_string(),
    }
}

fn required(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub color: String,
    /// Comma-separated size labels, e.g. `S,M,L`.
    pub size: String,
    pub price: String,
    pub in_stock: String,
    pub description: String,
    pub image: Option<FileUpload>,
    editing: Option<String>,
    existing_image: Option<String>,
    errors: FieldErrors,
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill the form from an existing product.
    pub fn edit(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            color: product.color.clone(),
            size: product.size.join(","),
            price: product.price.to_string(),
            in_stock: product.in_stock.to_string(),
            description: product.description.clone(),
            image: None,
            editing: Some(product.id.clone()),
            existing_image: product.product_image.clone(),
            errors: FieldErrors::new(),
        }
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn existing_image(&self) -> Option<&str> {
        self.existing_image.as_deref()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn validate(&self) -> Result<ProductInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        required(&mut errors, "name", &self.name, "Product Name is required");
        required(&mut errors, "category", &self.category, "Category is required");
        required(&mut errors, "color", &self.color, "Color is required");
        required(&mut errors, "description", &self.description, "Description is required");

        let size: Vec<String> = self
            .size
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if size.is_empty() {
            errors.add("size", "Size is required");
        }

        let price = match self.price.trim().parse::<f64>() {
            Ok(p) if p.is_finite() && p > 0.0 => Some(p),
            Ok(p) if p.is_finite() => {
                errors.add("price", "Price must be greater than zero");
                None
            }
            _ => {
                errors.add("price", "Price must be a number");
                None
            }
        };

        let in_stock = match self.in_stock.trim().parse::<f64>() {
            Ok(n) if !n.is_finite() => {
                errors.add("inStock", "In Stock must be a number");
                None
            }
            Ok(n) if n < 0.0 => {
                errors.add("inStock", "In Stock must be a non-negative number");
                None
            }
            Ok(n) if n.fract() != 0.0 => {
                errors.add("inStock", "In Stock must be a whole number");
                None
            }
            Ok(n) if n > f64::from(u32::MAX) => {
                errors.add("inStock", "In Stock is too large");
                None
            }
            Ok(n) => Some(n as u32),
            Err(_) => {
                errors.add("inStock", "In Stock must be a number");
                None
            }
        };

        if self.editing.is_none() && self.image.is_none() {
            errors.add("productImage", "Product image is required");
        }

        match (price, in_stock) {
            (Some(price), Some(in_stock)) if errors.is_empty() => Ok(ProductInput {
                name: self.name.trim().to_string(),
                category: self.category.trim().to_string(),
                color: self.color.trim().to_string(),
                size,
                price,
                in_stock,
                description: self.description.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }

    /// Validate and send. Create resets the form on success; edit keeps it.
    /// Any failure leaves the entered values in place.
    pub async fn submit<T: Transport>(
        &mut self,
        store: &ApiStore<T>,
        notifications: &mut Notifications,
    ) -> Result<Product, ApiError> {
        let input = match self.validate() {
            Ok(input) => input,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(ApiError::Validation(errors));
            }
        };
        self.errors = FieldErrors::new();

        let (mutation, done, failed) = match &self.editing {
            Some(id) => (
                Mutation::UpdateProduct {
                    id: id.clone(),
                    input,
                    image: self.image.clone(),
                },
                "Product updated successfully",
                "Failed to update product",
            ),
            None => (
                Mutation::AddProduct {
                    input,
                    image: self.image.clone(),
                },
                "Product added successfully",
                "Failed to add product",
            ),
        };

        let data = match store.mutate(&mutation).await {
            Ok(data) => data,
            Err(err) => {
                if let Some(fields) = err.field_errors() {
                    self.errors = fields.clone();
                }
                notifications.error(failure_message(failed, &err));
                return Err(err);
            }
        };

        // The server accepted the change even if its echo does not decode.
        notifications.success(done);
        let product = decode_data::<Product>(&data);
        if self.editing.is_some() {
            if let Ok(product) = &product {
                self.existing_image = product.product_image.clone();
            }
            self.image = None;
        } else {
            *self = Self::new();
        }
        product
    }
}

// ---------------------------------------------------------------------------
// Blog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct BlogForm {
    pub title: String,
    /// Rich-text HTML from the editor; kept opaque.
    pub description: String,
    pub image: String,
    editing: Option<String>,
    errors: FieldErrors,
}

impl BlogForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            description: post.description.clone(),
            image: post.image.clone(),
            editing: Some(post.id.clone()),
            errors: FieldErrors::new(),
        }
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn validate(&self) -> Result<BlogInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        required(&mut errors, "title", &self.title, "Title is required");
        required(&mut errors, "description", &self.description, "Description is required");
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(BlogInput {
            title: self.title.trim().to_string(),
            image: self.image.clone(),
            description: self.description.clone(),
        })
    }

    /// Upload a cover image and remember its URL.
    pub async fn upload_image<T: Transport>(
        &mut self,
        store: &ApiStore<T>,
        file: FileUpload,
        notifications: &mut Notifications,
    ) -> Result<String, ApiError> {
        let result = store
            .mutate(&Mutation::UploadFile(file))
            .await
            .and_then(|data| decode_data::<UploadedFile>(&data));
        match result {
            Ok(uploaded) if !uploaded.url.is_empty() => {
                self.image = uploaded.url.clone();
                notifications.success("Image uploaded successfully!");
                Ok(uploaded.url)
            }
            Ok(_) => {
                let err = ApiError::DeserializationError("upload response has no url".to_string());
                notifications.error("No image URL provided in the response.");
                Err(err)
            }
            Err(err) => {
                notifications.error(failure_message("Failed to upload image", &err));
                Err(err)
            }
        }
    }

    pub fn clear_image(&mut self) {
        self.image.clear();
    }

    pub async fn submit<T: Transport>(
        &mut self,
        store: &ApiStore<T>,
        notifications: &mut Notifications,
    ) -> Result<BlogPost, ApiError> {
        let input = match self.validate() {
            Ok(input) => input,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(ApiError::Validation(errors));
            }
        };
        self.errors = FieldErrors::new();

        let (mutation, done, failed) = match &self.editing {
            Some(id) => (
                Mutation::UpdateBlog { id: id.clone(), input },
                "Blog updated successfully!",
                "Failed to update blog",
            ),
            None => (Mutation::AddBlog(input), "Blog added successfully!", "Failed to add blog"),
        };

        let data = match store.mutate(&mutation).await {
            Ok(data) => data,
            Err(err) => {
                if let Some(fields) = err.field_errors() {
                    self.errors = fields.clone();
                }
                notifications.error(failure_message(failed, &err));
                return Err(err);
            }
        };

        notifications.success(done);
        if self.editing.is_none() {
            *self = Self::new();
        }
        decode_data::<BlogPost>(&data)
    }
}
