//! Configuration section definitions.
//!
//! Each module corresponds to a section in `hashpack.toml`:
//!
//! | Module   | TOML Section  | Purpose                                   |
//! |----------|---------------|-------------------------------------------|
//! | `paths`  | `[paths]`     | Source dirs, resource root, store file    |
//! | `output` | `[output]`    | Kind directories under the resource root  |
//! | `tools`  | `[tools]`     | External commands overriding built-ins    |
//! | `post`   | `[post]`      | Cleanup and precompression switches       |
//! | `types`  | `[types]`     | Filename → kind bindings                  |

mod output;
mod paths;
mod post;
mod tools;
mod types;

pub use output::OutputConfig;
pub use paths::PathsConfig;
pub use post::PostConfig;
pub use tools::ToolsConfig;
pub use types::TypesConfig;
