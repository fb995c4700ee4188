/**
 * Responsibility
 *  - core (decode / extractor) と types (リソースごとの ID 型) を束ねる
 */
mod core;
mod types;

pub use types::*;
