use pereval_core::models::Level;
use pereval_core::types::DbId;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct LevelRow {
    pub id: DbId,
    pub pereval_id: DbId,
    pub winter: String,
    pub summer: String,
    pub spring: String,
    pub autumn: String,
}

impl From<LevelRow> for Level {
    fn from(row: LevelRow) -> Self {
        Level {
            id: row.id,
            pereval_id: row.pereval_id,
            winter: row.winter,
            summer: row.summer,
            spring: row.spring,
            autumn: row.autumn,
        }
    }
}
