//! Utility modules.
//!
//! | Module   | Purpose                                   |
//! |----------|-------------------------------------------|
//! | `path`   | Filesystem path normalization             |
//! | `plural` | Count formatting for log messages         |

pub mod path;
pub mod plural;
