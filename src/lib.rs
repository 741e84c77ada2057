// Library root
// -----------
// This crate exposes the pieces of the ViewEngine demo client. The binary
// (`main.rs`) wires them into the interactive CLI.
//
// Module responsibilities:
// - `api`: HTTP client for the MCP endpoints and the wire DTOs.
// - `error`: typed error kinds returned by each stage.
// - `poll`: the status polling loop and its sleep/status seams.
// - `preview`: bounded pretty-printed preview of downloaded page data.
// - `workflow`: discover / submit / poll / download stages with explicit
//   per-stage results and no console I/O.
// - `ui`: prompts, spinners and console rendering on top of `workflow`.
// - `logging`: simplelog setup.
//
// Keeping the workflow free of prompts means parameters can come from any
// source and the stages can be exercised against a mock server.
pub mod api;
pub mod error;
pub mod logging;
pub mod poll;
pub mod preview;
pub mod ui;
pub mod workflow;
