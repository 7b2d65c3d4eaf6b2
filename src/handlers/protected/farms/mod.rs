// handlers/protected/farms/mod.rs - Farm resource (/farms)
//
// collection.rs: GET/POST on the collection
// record.rs:     GET/PUT/DELETE on a single farm by id
//
// Every handler opens exactly one store session (unit of work) and commits it
// only after the operation has fully succeeded.

pub mod collection;
pub mod record;

pub use collection::list as farms_list;
pub use collection::create as farm_create;

pub use record::get as farm_get;
pub use record::update as farm_update;
pub use record::delete as farm_delete;

use crate::error::ApiError;

pub(crate) fn farm_not_found() -> ApiError {
    ApiError::not_found("Farm not found")
}

/// Ids past the range of the `id` column cannot name a stored farm
pub(crate) fn farm_id(id: i64) -> Result<i32, ApiError> {
    i32::try_from(id).map_err(|_| farm_not_found())
}
