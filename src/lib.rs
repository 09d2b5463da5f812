// Library root
// -----------
// This crate exposes the library surface behind the `neteflix` CLI. The
// binary (`main.rs`) wires these modules together and runs the menu.
//
// Module responsibilities:
// - `store`: durable string key/value storage (file-backed or in memory).
// - `credentials`: the registry of local users (email + password).
// - `session`: current user, keep-login flag and the active API key.
// - `accounts`: sign up / sign in / sign out flows over the two above.
// - `resolver`: picks the API key for outgoing requests.
// - `catalog`: read-only HTTP client for the movie catalog.
// - `config`: command-line and environment configuration.
// - `ui`: terminal menus that drive `accounts` and `catalog`.
//
// A user's password is also their catalog API key. Registering or logging
// in is how a key gets into the session.
pub mod accounts;
pub mod catalog;
pub mod config;
pub mod credentials;
pub mod resolver;
pub mod session;
pub mod store;
pub mod ui;
