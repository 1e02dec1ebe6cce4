//! Output generation for extraction results.
//!
//! # Submodules
//!
//! - [`json`]: Writes success payloads to dated JSON files
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-11-12/
//!     ├── infoq.json
//!     ├── opengithub.json
//!     └── qbitai.json
//! ```

pub mod json;
