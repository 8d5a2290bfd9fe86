use crate::schema::{Institution, SymbolShape};
use crate::vocabulary::{Classification, Vocabulary};

/// Maps free-text stage names onto a symbol and an institution.
///
/// Rules are tried in vocabulary order and the first match wins; text that
/// matches nothing gets the vocabulary's fallback classification.
#[derive(Debug, Clone, Copy)]
pub struct StageClassifier<'v> {
    vocabulary: &'v Vocabulary,
}

impl Default for StageClassifier<'static> {
    fn default() -> Self {
        Self::new(Vocabulary::polish())
    }
}

impl<'v> StageClassifier<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &'v Vocabulary {
        self.vocabulary
    }

    pub fn classify(&self, stage_name: &str) -> (SymbolShape, Institution) {
        let lowered = stage_name.to_lowercase();
        let Classification { shape, institution } = self
            .vocabulary
            .rules
            .iter()
            .find(|rule| rule.when.matches(&lowered))
            .map(|rule| rule.resolve(&lowered))
            .unwrap_or(self.vocabulary.fallback);
        (shape, institution)
    }

    /// Whether the stage is a milestone that always stands as its own node.
    pub fn is_major_event(&self, stage_name: &str) -> bool {
        self.vocabulary.is_boundary(&stage_name.to_lowercase())
    }

    /// Canonical reference ("Druk nr 123-A") of the first print mentioned in `text`.
    pub fn document_reference(&self, text: &str) -> Option<String> {
        self.print_number(text)
            .map(|number| self.vocabulary.document_reference.format(number))
    }

    /// Bare print number of the first print mentioned in `text`.
    pub fn print_number<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.vocabulary.document_reference.find_number(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(name: &str) -> (SymbolShape, Institution) {
        StageClassifier::default().classify(name)
    }

    #[test]
    fn submitted_project_is_start_marker() {
        assert_eq!(
            classify("Projekt wpłynął do Sejmu"),
            (SymbolShape::Circle, Institution::LowerHouse)
        );
        assert_eq!(
            classify("Inicjatywa ustawodawcza"),
            (SymbolShape::Circle, Institution::LowerHouse)
        );
    }

    #[test]
    fn reading_is_rectangle_unless_voted() {
        assert_eq!(
            classify("I czytanie na posiedzeniu Sejmu"),
            (SymbolShape::Rectangle, Institution::LowerHouse)
        );
        assert_eq!(
            classify("III czytanie - głosowanie"),
            (SymbolShape::Diamond, Institution::LowerHouse)
        );
    }

    #[test]
    fn committee_institution_depends_on_senate_committee() {
        assert_eq!(
            classify("I czytanie w komisjach"),
            (SymbolShape::Rectangle, Institution::LowerHouse),
            "reading language outranks committee language"
        );
        assert_eq!(
            classify("Praca w komisjach po I czytaniu"),
            (SymbolShape::RoundedRect, Institution::LowerHouse)
        );
        assert_eq!(
            classify("Skierowano do komisji"),
            (SymbolShape::RoundedRect, Institution::LowerHouse)
        );
        assert_eq!(
            classify("Posiedzenie komisji senackiej"),
            (SymbolShape::RoundedRect, Institution::UpperHouse)
        );
    }

    #[test]
    fn senate_position_is_a_decision() {
        assert_eq!(
            classify("Stanowisko Senatu"),
            (SymbolShape::Diamond, Institution::UpperHouse)
        );
        assert_eq!(
            classify("Ustawa przekazana Senatowi"),
            (SymbolShape::Rectangle, Institution::UpperHouse)
        );
    }

    #[test]
    fn remaining_institutions() {
        assert_eq!(
            classify("Prezydent podpisał ustawę"),
            (SymbolShape::Diamond, Institution::President)
        );
        assert_eq!(
            classify("Wniosek do Trybunału Konstytucyjnego"),
            (SymbolShape::RoundedRect, Institution::ConstitutionalCourt)
        );
        assert_eq!(
            classify("Ustawa ogłoszona w Dzienniku Ustaw"),
            (SymbolShape::DoubleCircle, Institution::Publication)
        );
        assert_eq!(
            classify("Projekt wycofany przez wnioskodawców"),
            (SymbolShape::CircleX, Institution::LowerHouse)
        );
    }

    #[test]
    fn unknown_text_falls_back() {
        assert_eq!(
            classify("Opinia Biura Legislacyjnego"),
            (SymbolShape::RoundedRect, Institution::LowerHouse)
        );
        assert_eq!(classify(""), (SymbolShape::RoundedRect, Institution::LowerHouse));
    }

    #[test]
    fn classification_ignores_case() {
        assert_eq!(classify("CZYTANIE"), classify("czytanie"));
    }

    #[test]
    fn major_events() {
        let classifier = StageClassifier::default();
        assert!(classifier.is_major_event("Projekt wpłynął do Sejmu"));
        assert!(classifier.is_major_event("II czytanie"));
        assert!(classifier.is_major_event("Uchwała Senatu"));
        assert!(classifier.is_major_event("Prezydent podpisał"));
        assert!(classifier.is_major_event("Ustawa ogłoszona"));
        assert!(classifier.is_major_event("Projekt odrzucony"));
        assert!(!classifier.is_major_event("Senat otrzymał ustawę"));
        assert!(!classifier.is_major_event("Skierowano do komisji"));
    }

    #[test]
    fn document_reference_extraction() {
        let classifier = StageClassifier::default();
        assert_eq!(
            classifier.document_reference("Sprawozdanie komisji, druk nr 512"),
            Some("Druk nr 512".to_string())
        );
        assert_eq!(
            classifier.document_reference("autopoprawka do DRUKU NR 77-A oraz druk nr 80"),
            Some("Druk nr 77-A".to_string())
        );
        assert_eq!(classifier.document_reference("bez odniesienia"), None);
    }
}
