use axum::extract::State;
use macros::route;

use crate::{extract::Json, openapi::tag, Database};

use super::{model, RouteError};

/// Get locations
/// Returns the map markers of every post, newest first.
#[route(tag = tag::LOCATION)]
pub async fn get_locations(
	State(database): State<Database>,
) -> Result<Json<Vec<model::Location>>, RouteError> {
	let locations = sqlx::query_as::<_, model::Location>(
		"SELECT * FROM location ORDER BY created_at DESC",
	)
	.fetch_all(&database)
	.await?;

	Ok(Json(locations))
}
