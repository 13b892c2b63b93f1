use crate::entities::Profile;
use crate::policy::EntityKind;
use crate::store::{select_one, Filter, Query, RowStore, StoreError};
use uuid::Uuid;

/// `Ok(None)` means the identity has no profile row; `Err` is a store failure.
pub async fn resolve_role(
    store: &dyn RowStore,
    token: &str,
    identity_id: Uuid,
) -> Result<Option<Profile>, StoreError> {
    let query = Query::table(EntityKind::Users.table()).filter(Filter::eq("id", identity_id.to_string()));
    select_one(store, token, query).await
}
