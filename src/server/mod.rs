//! HTTP server for OpalDB
//!
//! This module implements the JSON API that remote clients (including the
//! browser front end) talk to. One executor serves all requests behind a
//! mutex; every statement runs to completion before the next one starts.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::TableSchema;
use crate::error::Result;
use crate::executor::{ExecutionResult, QueryExecutor};
use crate::sql::ast::{DropTableStatement, Statement};

/// Default server port
pub const DEFAULT_PORT: u16 = 8001;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host address
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Get the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The executor shared by all request handlers
pub type SharedExecutor = Arc<Mutex<QueryExecutor>>;

/// Build the application router
pub fn router(executor: SharedExecutor) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/query", post(execute_query))
        .route("/tables", get(list_tables))
        .route("/tables/:table", get(get_table).delete(drop_table))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(executor)
}

/// Bind and serve until the process exits
pub async fn serve(config: ServerConfig, executor: QueryExecutor) -> Result<()> {
    let app = router(Arc::new(Mutex::new(executor)));
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(address = %config.bind_address(), "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// ========== Handlers ==========

/// Body of a POST /query request
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The SQL statement to execute
    pub sql: String,
}

async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "message": "OpalDB API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/query", "/tables", "/tables/{name}"],
    }))
}

async fn execute_query(
    State(executor): State<SharedExecutor>,
    Json(request): Json<QueryRequest>,
) -> Json<ExecutionResult> {
    let mut executor = executor.lock().unwrap();
    Json(executor.execute_sql(&request.sql))
}

async fn list_tables(State(executor): State<SharedExecutor>) -> Json<serde_json::Value> {
    let executor = executor.lock().unwrap();
    let database = executor.database();

    let mut tables = Vec::new();
    for name in database.table_names() {
        let schema = match database.schema(name) {
            Ok(schema) => schema,
            Err(_) => continue,
        };
        tables.push(json!({
            "name": name,
            "row_count": database.row_count(name).unwrap_or(0),
            "columns": column_info(schema),
            "primary_key": schema.primary_key(),
            "unique_constraints": schema.unique_columns(),
        }));
    }

    Json(json!({ "tables": tables }))
}

async fn get_table(
    State(executor): State<SharedExecutor>,
    Path(table): Path<String>,
) -> Response {
    let executor = executor.lock().unwrap();
    let database = executor.database();

    let schema = match database.schema(&table) {
        Ok(schema) => schema,
        Err(_) => return table_not_found(&table),
    };
    let rows = database.rows(&table).unwrap_or(&[]);

    Json(json!({
        "name": table,
        "columns": column_info(schema),
        "primary_key": schema.primary_key(),
        "unique_constraints": schema.unique_columns(),
        "row_count": rows.len(),
        "data": rows,
    }))
    .into_response()
}

async fn drop_table(
    State(executor): State<SharedExecutor>,
    Path(table): Path<String>,
) -> Response {
    let mut executor = executor.lock().unwrap();
    if !executor.database().contains_table(&table) {
        return table_not_found(&table);
    }

    let statement = Statement::DropTable(DropTableStatement {
        table_name: table.clone(),
    });
    let result = executor.execute(statement);
    if result.success {
        Json(json!({
            "message": format!("Table '{}' dropped successfully", table)
        }))
        .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": result.message })),
        )
            .into_response()
    }
}

fn table_not_found(table: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "detail": format!("Table '{}' not found", table)
        })),
    )
        .into_response()
}

fn column_info(schema: &TableSchema) -> Vec<serde_json::Value> {
    schema
        .columns()
        .iter()
        .map(|col| {
            let mut info = json!({
                "name": col.name,
                "type": col.data_type.to_string(),
                "nullable": col.nullable,
            });
            if let Some(max) = col.data_type.max_length() {
                info["max_length"] = json!(max);
            }
            info
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_executor() -> SharedExecutor {
        let mut executor = QueryExecutor::new();
        let result = executor.execute_sql(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR(50), email VARCHAR(50) UNIQUE)",
        );
        assert!(result.success, "{}", result.message);
        executor.execute_sql("INSERT INTO users VALUES (1, 'Alice', 'alice@x')");
        Arc::new(Mutex::new(executor))
    }

    #[tokio::test]
    async fn test_query_endpoint_runs_sql() {
        let executor = seeded_executor();
        let request = QueryRequest {
            sql: "SELECT * FROM users".to_string(),
        };

        let Json(result) = execute_query(State(executor), Json(request)).await;
        assert!(result.success);
        assert_eq!(result.message, "1 row(s) returned");
        assert_eq!(result.rows.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_query_endpoint_reports_errors_in_body() {
        let executor = seeded_executor();
        let request = QueryRequest {
            sql: "SELECT * FROM ghosts".to_string(),
        };

        let Json(result) = execute_query(State(executor), Json(request)).await;
        assert!(!result.success);
        assert!(result.message.contains("not found"));
    }

    #[tokio::test]
    async fn test_list_tables_shape() {
        let executor = seeded_executor();
        let Json(body) = list_tables(State(executor)).await;

        let tables = body["tables"].as_array().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0]["name"], "users");
        assert_eq!(tables[0]["row_count"], 1);
        assert_eq!(tables[0]["primary_key"], "id");
        assert_eq!(tables[0]["unique_constraints"][0], "email");
        let columns = tables[0]["columns"].as_array().unwrap();
        assert_eq!(columns[0]["name"], "id");
        assert_eq!(columns[0]["type"], "INTEGER");
        assert_eq!(columns[1]["max_length"], 50);
    }

    #[tokio::test]
    async fn test_get_table_missing_is_404() {
        let executor = seeded_executor();
        let response = get_table(State(executor), Path("ghosts".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_drop_table_endpoint() {
        let executor = seeded_executor();

        let response = drop_table(State(executor.clone()), Path("users".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!executor.lock().unwrap().database().contains_table("users"));

        let response = drop_table(State(executor), Path("users".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bind_address() {
        let config = ServerConfig::new().host("0.0.0.0").port(9000);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }
}
