//! Column resolution for heterogeneous exports.

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ColumnConfig;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ColumnError {
    #[error("Could not resolve the {0} column from headers {1:?}")]
    Unresolved(&'static str, Vec<String>),
}

/// Indices of the columns the pipelines read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub document: usize,
    pub medication: usize,
    pub given_names: Vec<usize>,
    pub family_names: Vec<usize>,
    pub birth_date: Option<usize>,
    pub sex: Option<usize>,
}

impl ColumnMap {
    /// Resolve columns by exact candidates, then name hints, then position.
    pub fn resolve(headers: &[String], config: &ColumnConfig) -> Result<Self, ColumnError> {
        let document = find_exact(headers, &config.document_candidates)
            .or_else(|| find_hint(headers, &config.document_hints))
            .or_else(|| positional(headers, &[1, 0]))
            .ok_or_else(|| ColumnError::Unresolved("document", headers.to_vec()))?;

        let medication = find_exact(headers, &config.medication_candidates)
            .or_else(|| find_hint(headers, &config.medication_hints))
            .or_else(|| positional(headers, &[4, 2]))
            .ok_or_else(|| ColumnError::Unresolved("medication", headers.to_vec()))?;

        let indices = |names: &[String]| -> Vec<usize> {
            names
                .iter()
                .filter_map(|n| headers.iter().position(|h| h == n))
                .collect()
        };
        let single = |name: &str| headers.iter().position(|h| h == name);

        let map = Self {
            document,
            medication,
            given_names: indices(&config.given_names),
            family_names: indices(&config.family_names),
            birth_date: single(&config.birth_date),
            sex: single(&config.sex),
        };

        if map.given_names.is_empty() && map.family_names.is_empty() {
            warn!("No name columns found; patient names will be blank");
        }
        debug!(
            document = %headers[document],
            medication = %headers[medication],
            "Resolved columns"
        );

        Ok(map)
    }
}

fn find_exact(headers: &[String], candidates: &[String]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| headers.iter().position(|h| h == c))
}

fn find_hint(headers: &[String], hints: &[String]) -> Option<usize> {
    headers.iter().position(|h| {
        let lower = h.to_lowercase();
        hints.iter().any(|hint| lower.contains(hint.as_str()))
    })
}

fn positional(headers: &[String], positions: &[usize]) -> Option<usize> {
    positions.iter().copied().find(|&i| i < headers.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_candidates() {
        let h = headers(&["Fecha", "NroDocumento", "Sexo", "MEDICAMENTO"]);
        let map = ColumnMap::resolve(&h, &ColumnConfig::default()).unwrap();
        assert_eq!(map.document, 1);
        assert_eq!(map.medication, 3);
        assert_eq!(map.sex, Some(2));
        assert_eq!(map.birth_date, None);
    }

    #[test]
    fn test_hint_fallback() {
        let h = headers(&["Fecha", "IdPaciente", "Descripcion", "Farmaco"]);
        let map = ColumnMap::resolve(&h, &ColumnConfig::default()).unwrap();
        assert_eq!(map.document, 1);
        assert_eq!(map.medication, 3);
    }

    #[test]
    fn test_positional_fallback() {
        let h = headers(&["a", "b", "c", "e", "f"]);
        let map = ColumnMap::resolve(&h, &ColumnConfig::default()).unwrap();
        assert_eq!(map.document, 1);
        assert_eq!(map.medication, 4);

        let h = headers(&["a", "b", "c"]);
        let map = ColumnMap::resolve(&h, &ColumnConfig::default()).unwrap();
        assert_eq!(map.medication, 2);
    }

    #[test]
    fn test_unresolved_medication() {
        let h = headers(&["a", "b"]);
        let err = ColumnMap::resolve(&h, &ColumnConfig::default()).unwrap_err();
        assert!(matches!(err, ColumnError::Unresolved("medication", _)));
    }

    #[test]
    fn test_name_columns_in_order() {
        let h = headers(&["Documento", "Apell2Pac", "Nom1PAc", "Apell1Pac", "Medicamento"]);
        let map = ColumnMap::resolve(&h, &ColumnConfig::default()).unwrap();
        assert_eq!(map.given_names, vec![2]);
        assert_eq!(map.family_names, vec![3, 1]);
    }
}
