use contracts::domain::a001_sales_record::DatasetOrigin;

use super::dataset::Dataset;
use super::error::DatasetError;
use super::generator::{self, GeneratorConfig};
use super::{parser, validation};

// ============================================================================
// Сервисные функции
// ============================================================================

/// Новый синтетический датасет за 60 дней по сегодняшний
pub fn generate_dataset(seed: Option<u64>) -> Dataset {
    let config = GeneratorConfig::for_today().with_seed(seed);
    let records = generator::generate(&config);
    Dataset::new(records, DatasetOrigin::Generated { seed })
}

/// Разбор и проверка загруженного CSV или файла таблицы
pub fn load_uploaded_dataset(file_name: &str, bytes: &[u8]) -> Result<Dataset, DatasetError> {
    let table = parser::parse_upload(file_name, bytes)?;
    let records = validation::validate(&table)?;
    tracing::info!(
        "Loaded {} sales rows from upload '{}' ({} bytes)",
        records.len(),
        file_name,
        bytes.len()
    );
    Ok(Dataset::new(
        records,
        DatasetOrigin::Uploaded {
            file_name: file_name.to_string(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_dataset_records_seed() {
        let dataset = generate_dataset(Some(9));
        assert_eq!(dataset.origin(), &DatasetOrigin::Generated { seed: Some(9) });
        assert_eq!(dataset.records(), generate_dataset(Some(9)).records());
    }

    #[test]
    fn test_upload_with_missing_columns_fails() {
        let err = load_uploaded_dataset("sales.csv", b"Date,Region\n2024-01-01,North\n").unwrap_err();
        match err {
            DatasetError::MissingColumns { missing } => {
                assert_eq!(missing, vec!["Product", "Rep", "Sales"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_example_upload() {
        let csv = "Date,Region,Rep,Product,Sales\n\
                   2024-01-01,North,Alice,Widget A,100\n\
                   2024-01-02,South,Bob,Widget B,200\n\
                   2024-01-03,North,Alice,Widget A,300\n";
        let dataset = load_uploaded_dataset("example.csv", csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(
            dataset.origin(),
            &DatasetOrigin::Uploaded {
                file_name: "example.csv".to_string()
            }
        );
    }
}
