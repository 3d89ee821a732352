//! End to end tests run against an already started service.
//! Enabled with the `system_tests` feature, the service url is taken from
//! `BOOKCATALOG_URL` (defaults to `http://127.0.0.1:3000`).
