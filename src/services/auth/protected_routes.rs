/*
 * Responsibility
 * - どの (method, route pattern) に access token が必須かを保持する
 * - 起動時に一度だけ組み立て、以後は Arc 越しに読むだけ (lock なし)
 *
 * Notes
 * - pattern は axum の MatchedPath と同じ表記 (`/api/v1/resumes/{id}`)
 * - 未登録の組み合わせは public 扱い (default-public)
 */
use std::collections::{HashMap, HashSet};

use axum::http::Method;

/// The methods `register_any` covers.
pub const STANDARD_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

#[derive(Debug, Clone, Default)]
pub struct ProtectedRoutes {
    routes: HashMap<Method, HashSet<String>>,
}

impl ProtectedRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Protect `path` for each of `methods`. Registering twice is a no-op.
    pub fn register(mut self, path: &str, methods: &[Method]) -> Self {
        for method in methods {
            self.routes
                .entry(method.clone())
                .or_default()
                .insert(path.to_string());
        }
        self
    }

    pub fn register_any(self, path: &str) -> Self {
        self.register(path, &STANDARD_METHODS)
    }

    pub fn is_protected(&self, method: &Method, path: &str) -> bool {
        self.routes
            .get(method)
            .is_some_and(|paths| paths.contains(path))
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
