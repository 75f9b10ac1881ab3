//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::{
    AppState, endpoints,
    expense::{
        create_expense_endpoint, get_categories_endpoint, get_expense_endpoint,
        get_summary_endpoint, list_expenses_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::EXPENSES_SUMMARY, get(get_summary_endpoint))
        .route(endpoints::EXPENSE, get(get_expense_endpoint))
        .route(endpoints::CATEGORIES, get(get_categories_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "the requested resource could not be found" })),
    )
        .into_response()
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState, build_router,
        endpoints::{self, format_expense_endpoint},
        expense::{Category, CreateExpenseForm, CreateExpenseResponse, Expense, ExpenseSummary},
    };

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().expect("Could not open database in memory."),
        )
        .expect("Could not create app state.");
        let app = build_router(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn form(
        amount_minor_units: i64,
        category: &str,
        date: &str,
        idempotency_key: &str,
    ) -> CreateExpenseForm {
        CreateExpenseForm {
            amount_minor_units,
            category: category.to_owned(),
            description: "Lunch".to_owned(),
            date: date.to_owned(),
            idempotency_key: idempotency_key.to_owned(),
        }
    }

    async fn list(server: &TestServer, category: Option<&str>) -> Vec<Expense> {
        let request = server.get(endpoints::EXPENSES);
        let request = match category {
            Some(category) => request.add_query_param("category", category),
            None => request,
        };

        let response = request.await;
        response.assert_status_ok();
        response.json::<Vec<Expense>>()
    }

    #[tokio::test]
    async fn create_then_retry_then_list() {
        let server = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&form(1050, "Food", "2024-05-01", "k1"))
            .await;
        response.assert_status(StatusCode::CREATED);
        let first = response.json::<CreateExpenseResponse>();
        assert!(first.created);

        let response = server
            .post(endpoints::EXPENSES)
            .json(&form(1050, "Food", "2024-05-01", "k1"))
            .await;
        response.assert_status_ok();
        let second = response.json::<CreateExpenseResponse>();
        assert_eq!(
            second,
            CreateExpenseResponse {
                id: first.id,
                created: false
            }
        );

        let expenses = list(&server, Some("Food")).await;
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].id, first.id);
        assert_eq!(expenses[0].amount_minor_units.get(), 1050);
        assert_eq!(expenses[0].category, Category::Food);
        assert_eq!(list(&server, None).await.len(), 1);
    }

    #[tokio::test]
    async fn list_sorts_newest_first_and_filters() {
        let server = get_test_server();
        let fixtures = [
            ("Food", "2024-01-01"),
            ("Transport", "2024-03-05"),
            ("Food", "2024-02-10"),
        ];
        for (i, (category, date)) in fixtures.iter().enumerate() {
            server
                .post(endpoints::EXPENSES)
                .json(&form(100, category, date, &format!("k{i}")))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let dates: Vec<_> = list(&server, Some("All"))
            .await
            .into_iter()
            .map(|expense| expense.date.to_string())
            .collect();
        assert_eq!(dates, ["2024-03-05", "2024-02-10", "2024-01-01"]);

        let dates: Vec<_> = list(&server, Some("Food"))
            .await
            .into_iter()
            .map(|expense| expense.date.to_string())
            .collect();
        assert_eq!(dates, ["2024-02-10", "2024-01-01"]);
    }

    #[tokio::test]
    async fn expense_json_uses_iso_date() {
        let server = get_test_server();
        server
            .post(endpoints::EXPENSES)
            .json(&form(1050, "Food", "2024-05-01", "k1"))
            .await
            .assert_status(StatusCode::CREATED);

        let body = server.get(endpoints::EXPENSES).await.json::<Value>();

        assert_eq!(body[0]["date"], json!("2024-05-01"));
        assert_eq!(body[0]["category"], json!("Food"));
        assert_eq!(body[0]["amount_minor_units"], json!(1050));
    }

    #[tokio::test]
    async fn create_rejects_invalid_input() {
        let server = get_test_server();

        for invalid_form in [
            form(-5, "Food", "2024-05-01", "k1"),
            form(100, "Rent", "2024-05-01", "k2"),
            form(100, "Food", "2024-13-01", "k3"),
            form(100, "Food", "2024-05-01", " "),
        ] {
            server
                .post(endpoints::EXPENSES)
                .json(&invalid_form)
                .await
                .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        }

        assert!(list(&server, None).await.is_empty());
    }

    #[tokio::test]
    async fn list_rejects_unknown_category() {
        let server = get_test_server();

        server
            .get(endpoints::EXPENSES)
            .add_query_param("category", "Rent")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn get_expense_by_id() {
        let server = get_test_server();
        let created = server
            .post(endpoints::EXPENSES)
            .json(&form(1050, "Food", "2024-05-01", "k1"))
            .await
            .json::<CreateExpenseResponse>();

        let response = server.get(&format_expense_endpoint(created.id)).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Expense>().id, created.id);
    }

    #[tokio::test]
    async fn get_missing_expense_is_not_found() {
        let server = get_test_server();

        server
            .get(&format_expense_endpoint(42))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn summary_with_and_without_filter() {
        let server = get_test_server();
        for (i, (amount, category)) in [(1000, "Food"), (2500, "Transport"), (750, "Food")]
            .iter()
            .enumerate()
        {
            server
                .post(endpoints::EXPENSES)
                .json(&form(*amount, category, "2024-05-01", &format!("k{i}")))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let summary = server
            .get(endpoints::EXPENSES_SUMMARY)
            .await
            .json::<ExpenseSummary>();
        assert_eq!(summary.total_minor_units, 4250);
        let category_totals = summary
            .category_totals
            .expect("Unfiltered summary should have category totals");
        assert_eq!(category_totals.get(&Category::Food), Some(&1750));
        assert_eq!(category_totals.get(&Category::Transport), Some(&2500));

        let summary = server
            .get(endpoints::EXPENSES_SUMMARY)
            .add_query_param("category", "Food")
            .await
            .json::<ExpenseSummary>();
        assert_eq!(summary.total_minor_units, 1750);
        assert_eq!(summary.category_totals, None);
    }

    #[tokio::test]
    async fn categories_in_display_order() {
        let server = get_test_server();

        let categories = server.get(endpoints::CATEGORIES).await.json::<Vec<String>>();

        assert_eq!(
            categories,
            ["Food", "Transport", "Utilities", "Entertainment", "Other"]
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server.get("/nope").await.assert_status_not_found();
    }
}
