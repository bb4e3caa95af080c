//! Test-only root package. Integration tests live in `tests/`; the
//! library itself is the `poolkit` crate under `crates/`.
