use aide::axum::{routing::get_with, ApiRouter};

use crate::{error, AppState};

pub mod model;
pub mod route;

pub type RouteError = error::RouteError<error::Never>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/", get_with(get_locations, get_locations_docs))
}
