use chrono::{DateTime, Utc};
use contracts::domain::a001_sales_record::{DatasetOrigin, SalesRecord};

/// Строки продаж одной сессии.
///
/// Создается один раз (из загрузки или генератором) и больше не меняется.
/// Новая загрузка заменяет датасет целиком.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<SalesRecord>,
    origin: DatasetOrigin,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(records: Vec<SalesRecord>, origin: DatasetOrigin) -> Self {
        Self {
            records,
            origin,
            loaded_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn origin(&self) -> &DatasetOrigin {
        &self.origin
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
