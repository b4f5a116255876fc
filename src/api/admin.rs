//! Admin maintenance endpoints.

use axum::extract::State;

use super::{success, ApiResult};
use crate::migrate::MigrationReport;
use crate::AppState;

/// POST /api/admin/migrate - Import any legacy JSON exports found on disk.
pub async fn run_migration(State(state): State<AppState>) -> ApiResult<MigrationReport> {
    success(state.importer.run().await?)
}
