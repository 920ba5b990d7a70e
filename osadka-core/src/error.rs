use thiserror::Error;

#[derive(Debug, Error)]
pub enum OsadkaError {
    #[error("Object {0} not found in project")]
    ObjectNotFound(i32),

    #[error("Cycle {cycle} not found for object {object}")]
    CycleNotFound { object: i32, cycle: i32 },

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse JSON from '{0}': {1}")]
    JsonParsing(String, #[source] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),

    #[error("Invalid record in '{path}' at line {line}: {message}")]
    InvalidRecord {
        path: String,
        line: u64,
        message: String,
    },
}
