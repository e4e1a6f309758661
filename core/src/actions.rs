//! One-click mutations triggered from listings: status changes and deletes.
//!
//! Each action reports its outcome as a notification and returns the typed
//! result. Failures never touch the cache.

use crate::client::decode_data;
use crate::endpoints::Mutation;
use crate::error::ApiError;
use crate::forms::failure_message;
use crate::notify::Notifications;
use crate::store::ApiStore;
use crate::transport::Transport;
use crate::types::{Order, OrderStatus, User, UserStatus};

async fn run<T: Transport>(
    store: &ApiStore<T>,
    mutation: Mutation,
    notifications: &mut Notifications,
    done: &str,
    failed: &str,
) -> Result<serde_json::Value, ApiError> {
    match store.mutate(&mutation).await {
        Ok(data) => {
            notifications.success(done);
            Ok((*data).clone())
        }
        Err(err) => {
            notifications.error(failure_message(failed, &err));
            Err(err)
        }
    }
}

pub async fn change_order_status<T: Transport>(
    store: &ApiStore<T>,
    id: &str,
    status: OrderStatus,
    notifications: &mut Notifications,
) -> Result<Order, ApiError> {
    let mutation = Mutation::UpdateOrderStatus {
        id: id.to_string(),
        status,
    };
    let data = run(store, mutation, notifications, "Order status updated", "Failed to update order status").await?;
    decode_data(&data)
}

pub async fn change_user_status<T: Transport>(
    store: &ApiStore<T>,
    id: &str,
    status: UserStatus,
    notifications: &mut Notifications,
) -> Result<User, ApiError> {
    let mutation = Mutation::UpdateUserStatus {
        id: id.to_string(),
        status,
    };
    let data = run(store, mutation, notifications, "User status updated", "Failed to update user status").await?;
    decode_data(&data)
}

pub async fn delete_product<T: Transport>(
    store: &ApiStore<T>,
    id: &str,
    notifications: &mut Notifications,
) -> Result<(), ApiError> {
    let mutation = Mutation::DeleteProduct(id.to_string());
    run(store, mutation, notifications, "Product deleted successfully", "Failed to delete product")
        .await
        .map(|_| ())
}

pub async fn delete_blog<T: Transport>(
    store: &ApiStore<T>,
    id: &str,
    notifications: &mut Notifications,
) -> Result<(), ApiError> {
    let mutation = Mutation::DeleteBlog(id.to_string());
    run(store, mutation, notifications, "Blog deleted successfully", "Failed to delete blog")
        .await
        .map(|_| ())
}
