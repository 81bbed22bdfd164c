//! Engine configuration.
//!
//! A [`Config`] is bound into a client at construction time and passed by
//! reference into engine functions. There is no ambient global state; two
//! clients with different configurations never interfere.

use serde::{Deserialize, Serialize};

/// Configuration consulted by the normalizer, resolver, merge engine and
/// the action orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Name of the reserved metadata key in the flattened JSON view
    /// of a record (see [`Record::to_flat_value`](crate::Record::to_flat_value)).
    pub jvtag: String,
    /// Resolve relationship `data` entries against the store before
    /// returning records to the caller.
    pub follow_relationships_data: bool,
    /// Keep the original wire document verbatim on normalized data.
    pub preserve_json: bool,
    /// Default merge mode for `add_records`: merge into existing records
    /// instead of replacing them.
    pub merge_records: bool,
    /// When a fetch returns a full collection, delete stored records of
    /// that type that are absent from the response.
    pub clear_on_update: bool,
    /// Strip patch payloads down to attributes that differ from the
    /// stored copy before sending.
    pub clean_patch: bool,
    /// Metadata sub-keys (`links`, `meta`, `relationships`) kept on a
    /// cleaned patch payload.
    pub clean_patch_props: Vec<String>,
    /// Recurse into resolved records' own relationships. Cycles are cut
    /// with a per-resolution visited set.
    pub recurse_relationships: bool,
    /// Highest status id handed out before the counter wraps. Negative
    /// means unlimited.
    #[serde(rename = "maxStatusID")]
    pub max_status_id: i64,
    /// Ask the server to side-load related resources on the refresh GET
    /// issued after a relationship write.
    pub related_includes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jvtag: "_jv".to_string(),
            follow_relationships_data: true,
            preserve_json: false,
            merge_records: false,
            clear_on_update: false,
            clean_patch: false,
            clean_patch_props: Vec::new(),
            recurse_relationships: false,
            max_status_id: -1,
            related_includes: true,
        }
    }
}
