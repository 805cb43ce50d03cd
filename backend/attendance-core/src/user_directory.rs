// src/user_directory.rs
use std::{collections::HashMap, fs::File, io::Read, path::Path};
use tracing::{info, warn};

use crate::error::AppError;
use crate::normalizer::UserId;
use crate::punch_source::column_index;

/// Loads the `User ID`,`Name` directory used to label reports.
pub fn load_user_directory(path: &Path) -> Result<HashMap<UserId, String>, AppError> {
    info!("Loading user directory from {}", path.display());
    let file = File::open(path)?;
    read_user_directory(file)
}

/// Rows with a non-numeric id or a missing cell are skipped. Duplicate ids
/// keep the last name.
pub fn read_user_directory<R: Read>(reader: R) -> Result<HashMap<UserId, String>, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Default::default());
    }
    let user_id_at = column_index(&headers, "User ID")?;
    let name_at = column_index(&headers, "Name")?;

    let mut names = HashMap::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let (Some(raw_id), Some(name)) = (row.get(user_id_at), row.get(name_at)) else {
            warn!("Skipping directory line {}: too few columns", index + 2);
            continue;
        };
        match raw_id.parse::<UserId>() {
            Ok(user_id) => {
                if let Some(previous) = names.insert(user_id, name.to_string()) {
                    warn!("Duplicate user id {} in directory (replacing '{}')", user_id, previous);
                }
            }
            Err(_) => warn!("Skipping directory row with invalid user id '{}'", raw_id),
        }
    }

    info!("Loaded {} users", names.len());
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_names_by_id() {
        let directory = "User ID,Name,Department\n1,Asha Rao,Ops\n2,Ben Ortiz,Finance\n";
        let names = read_user_directory(directory.as_bytes()).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.get(&1).map(String::as_str), Some("Asha Rao"));
        assert_eq!(names.get(&2).map(String::as_str), Some("Ben Ortiz"));
    }

    #[test]
    fn skips_invalid_ids_and_keeps_last_duplicate() {
        let directory = "User ID,Name\nadmin,Root\n3,Old Name\n3,New Name\n";
        let names = read_user_directory(directory.as_bytes()).unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names.get(&3).map(String::as_str), Some("New Name"));
    }

    #[test]
    fn short_rows_do_not_drop_the_directory() {
        let directory = "User ID,Name\n1,Asha Rao\n2\n3,Chen Li\n";
        let names = read_user_directory(directory.as_bytes()).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.get(&1).map(String::as_str), Some("Asha Rao"));
        assert_eq!(names.get(&3).map(String::as_str), Some("Chen Li"));
    }

    #[test]
    fn missing_name_column_is_an_error() {
        let directory = "User ID,Full Name\n1,Asha Rao\n";
        assert!(matches!(
            read_user_directory(directory.as_bytes()),
            Err(AppError::MissingColumn(column)) if column == "Name"
        ));
    }
}
