//! Tokens that never count as an additional drug.

use std::collections::HashSet;

use crate::models::DrugTaxonomy;

use super::normalizer::prepare_text;

/// Set of normalized, accent-folded tokens ignored by the extra-drug check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// Default Spanish dosage/route/filler vocabulary plus every token of the
    /// taxonomy's drug names.
    pub fn new(taxonomy: &DrugTaxonomy) -> Self {
        Self::default()
            .with_words(Self::default_words().iter().copied())
            .with_taxonomy(taxonomy)
    }

    /// Add words, normalizing each.
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = prepare_text(Some(word.as_ref()));
            if !word.is_empty() {
                self.words.insert(word);
            }
        }
        self
    }

    /// Add every alphabetic token of the taxonomy's drug names.
    pub fn with_taxonomy(mut self, taxonomy: &DrugTaxonomy) -> Self {
        for entry in taxonomy.entries() {
            let tokens = entry
                .name
                .split(|c: char| !c.is_ascii_alphabetic())
                .filter(|token| !token.is_empty());
            self.words.extend(tokens.map(str::to_string));
        }
        self
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn default_words() -> &'static [&'static str] {
        &[
            // Units
            "mg", "mcg", "g", "ml", "l", "cc", "ui", "unidad", "unidades",
            // Pharmaceutical forms
            "tableta", "tabletas", "comprimido", "comprimidos", "capsula", "capsulas",
            "cápsula", "cápsulas", "gragea", "grageas", "inyección", "ampolla", "frasco",
            "sobre", "suspension", "suspensión", "jarabe", "crema", "pomada", "supositorio",
            "spray", "inhalador", "parche", "ungüento",
            // Routes
            "oral", "intramuscular", "intravenoso", "subcutaneo", "subcutáneo", "topico",
            "tópico", "rectal", "vaginal", "oftalmico", "oftálmico", "otico", "ótico", "nasal",
            "via",
            // Frequency and posology
            "cada", "horas", "día", "dias", "semana", "semanas", "mes", "meses", "año", "años",
            "dosis", "frecuencia", "tratamiento", "tomar", "aplicar", "uso", "adultos", "niños",
            "pacientes", "administrar", "cad", "diaria", "semanal", "mensual", "anual",
            "continuo", "alternos",
            // Spanish function words
            "por", "con", "sin", "de", "la", "el", "y", "o", "para", "entre", "hasta", "desde",
            "bajo", "tras", "durante", "antes", "después", "al", "del", "se", "es", "en", "a",
            "u", "un", "una", "unos", "unas",
            // Numerals
            "uno", "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve", "diez",
            "cien", "mil", "medio", "media", "cuarto", "cuarta", "primera", "segunda", "tercera",
            // Salts
            "tartrato", "clorhidrato", "maleato", "succinato", "besilato",
            // Class names
            "bloqueadores", "bloqueador", "antihipertensivos", "antihipertensivo", "diuréticos",
            "diurético", "calcioantagonistas", "calcioantagonista",
        ]
    }
}
