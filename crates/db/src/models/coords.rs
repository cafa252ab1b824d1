use pereval_core::models::Coords;
use pereval_core::types::DbId;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct CoordsRow {
    pub id: DbId,
    pub pereval_id: DbId,
    pub latitude: f64,
    pub longitude: f64,
    pub height: i32,
}

impl From<CoordsRow> for Coords {
    fn from(row: CoordsRow) -> Self {
        Coords {
            id: row.id,
            pereval_id: row.pereval_id,
            latitude: row.latitude,
            longitude: row.longitude,
            height: row.height,
        }
    }
}
