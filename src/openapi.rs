//! OpenAPI document and route table.
//!
//! [`ROUTES`] is the single list of public operations. It drives both the
//! document served at `GET /api/docs.json` and the endpoint listing logged
//! at startup, so the two cannot drift apart.

use axum::http::{Method, StatusCode};
use serde_json::{Map, Value, json};

use crate::auth::SecurityScheme;

/// Prefix every API route is mounted under.
pub const API_PREFIX: &str = "/api";

/// One documented operation.
#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub method: &'static str,
    /// Path relative to [`API_PREFIX`], using OpenAPI `{param}` syntax.
    pub path: &'static str,
    pub summary: &'static str,
    pub tag: &'static str,
    pub security: Option<SecurityScheme>,
    pub success: StatusCode,
    pub parameters: &'static [ParamSpec],
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub location: &'static str,
    pub required: bool,
    pub schema_type: &'static str,
}

const USER_ID_PARAM: &[ParamSpec] = &[ParamSpec {
    name: "id",
    location: "path",
    required: true,
    schema_type: "integer",
}];

const SEARCH_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "id",
        location: "query",
        required: true,
        schema_type: "integer",
    },
    ParamSpec {
        name: "age",
        location: "query",
        required: false,
        schema_type: "integer",
    },
    ParamSpec {
        name: "active",
        location: "query",
        required: false,
        schema_type: "boolean",
    },
];

pub const ROUTES: &[RouteSpec] = &[
    RouteSpec {
        method: "GET",
        path: "/health",
        summary: "Health check",
        tag: "health",
        security: None,
        success: StatusCode::OK,
        parameters: &[],
    },
    RouteSpec {
        method: "GET",
        path: "/users",
        summary: "List users",
        tag: "users",
        security: Some(SecurityScheme::Basic),
        success: StatusCode::OK,
        parameters: &[],
    },
    RouteSpec {
        method: "POST",
        path: "/users",
        summary: "Create a user",
        tag: "users",
        security: None,
        success: StatusCode::CREATED,
        parameters: &[],
    },
    RouteSpec {
        method: "GET",
        path: "/users/search",
        summary: "Search users",
        tag: "users",
        security: None,
        success: StatusCode::OK,
        parameters: SEARCH_PARAMS,
    },
    RouteSpec {
        method: "GET",
        path: "/users/{id}",
        summary: "Get a user by id",
        tag: "users",
        security: None,
        success: StatusCode::OK,
        parameters: USER_ID_PARAM,
    },
    RouteSpec {
        method: "GET",
        path: "/docs.json",
        summary: "OpenAPI document",
        tag: "docs",
        security: None,
        success: StatusCode::OK,
        parameters: &[],
    },
];

impl RouteSpec {
    pub fn full_path(&self) -> String {
        format!("{API_PREFIX}{}", self.path)
    }

    /// `true` when the method string is a valid HTTP method.
    pub fn is_valid_method(&self) -> bool {
        Method::from_bytes(self.method.as_bytes()).is_ok()
    }

    fn operation(&self) -> Value {
        let mut op = Map::new();
        op.insert("summary".into(), json!(self.summary));
        op.insert("tags".into(), json!([self.tag]));

        if !self.parameters.is_empty() {
            let params: Vec<Value> = self
                .parameters
                .iter()
                .map(|p| {
                    json!({
                        "name": p.name,
                        "in": p.location,
                        "required": p.required,
                        "schema": { "type": p.schema_type },
                    })
                })
                .collect();
            op.insert("parameters".into(), Value::Array(params));
        }

        if let Some(scheme) = self.security {
            op.insert("security".into(), json!([{ (scheme.name()): [] }]));
        }

        let reason = self.success.canonical_reason().unwrap_or("Success");
        op.insert(
            "responses".into(),
            json!({ (self.success.as_str()): { "description": reason } }),
        );

        Value::Object(op)
    }
}

/// Build the OpenAPI 3.0.3 document from [`ROUTES`].
pub fn openapi_document() -> Value {
    let mut paths = Map::new();
    for route in ROUTES {
        let entry = paths
            .entry(route.path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(methods) = entry {
            methods.insert(route.method.to_ascii_lowercase(), route.operation());
        }
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "User API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "User API with authentication and request logging",
        },
        "servers": [{ "url": API_PREFIX }],
        "components": {
            "securitySchemes": {
                (SecurityScheme::Basic.name()): { "type": "http", "scheme": "basic" },
                (SecurityScheme::Bearer.name()): {
                    "type": "http",
                    "scheme": "bearer",
                    "bearerFormat": "JWT",
                },
            }
        },
        "tags": [
            { "name": "health" },
            { "name": "users" },
            { "name": "docs" },
        ],
        "paths": Value::Object(paths),
    })
}

/// Human-readable endpoint lines, e.g. `GET    /api/users [basic]`.
pub fn route_listing() -> Vec<String> {
    ROUTES
        .iter()
        .map(|r| {
            let auth = r
                .security
                .map(|s| format!(" [{s}]"))
                .unwrap_or_default();
            format!("{:<6} {}{auth} - {}", r.method, r.full_path(), r.summary)
        })
        .collect()
}
