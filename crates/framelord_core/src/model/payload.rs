//! Contract between typed entity payloads and the generic store.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Entity-specific data stored inside a `Record`.
///
/// The store never inspects payload fields; it only needs to clone,
/// serialize, and shallow-patch them.
pub trait Payload: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Short lowercase prefix used in generated record ids, e.g. `fs`.
    const ID_PREFIX: &'static str;

    /// Partial update shape. Each `Some` field replaces the current value.
    type Patch: Default + Clone + Send;

    fn apply_patch(&mut self, patch: Self::Patch);
}
