//! The endpoint for the category list.

use axum::{
    Json,
    response::{IntoResponse, Response},
};

use crate::expense::Category;

/// A route handler that returns every category name in display order.
pub async fn get_categories_endpoint() -> Response {
    Json(Category::ALL).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::get_categories_endpoint;

    #[tokio::test]
    async fn returns_ok() {
        let response = get_categories_endpoint().await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
