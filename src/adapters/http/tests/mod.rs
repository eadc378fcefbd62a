//! Router-level tests driving the full axum surface with tower `oneshot`.
