// Library root
// -----------
// The binary (`main.rs`) only wires these modules together; everything that
// can be tested without a terminal or a live account lives here.
//
// Module responsibilities:
// - `config`: loads the access token and API settings from the environment
//   and dotenv files.
// - `api`: the `FollowApi` seam and its blocking GitHub implementation.
// - `diff`: compares the following and followers lists.
// - `selection`: parses row selections such as `1-3,7`.
// - `ui`: the `Presenter` seam and its terminal implementation.
// - `app`: the orchestrator that sequences all of the above.
pub mod api;
pub mod app;
pub mod config;
pub mod diff;
pub mod error;
pub mod selection;
pub mod ui;

pub use error::{SelectionParseError, SyncError};
