//! Golden tests for medication text classification.
//!
//! Each case pins the matched groups, the extra-drug flag and the final label
//! for a realistic free-text medication field.

use hta_classifier_core::classify::{build_label, label_for, NOT_APPLICABLE};
use hta_classifier_core::{GroupId, TextMatcher};

use GroupId::*;

/// Test case from the golden table.
struct GoldenCase {
    id: &'static str,
    input: &'static str,
    expected_groups: &'static [GroupId],
    expected_extra: bool,
    expected_label: &'static str,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "ieca-single",
            input: "Enalapril 10 mg",
            expected_groups: &[Ieca],
            expected_extra: false,
            expected_label: "IECA univ",
        },
        GoldenCase {
            id: "no-word-boundary",
            input: "captoprilo 50mg",
            expected_groups: &[],
            expected_extra: false,
            expected_label: NOT_APPLICABLE,
        },
        GoldenCase {
            id: "upper-case-with-form",
            input: "LOSARTAN 50 MG TABLETA",
            expected_groups: &[AraII],
            expected_extra: false,
            expected_label: "ARA II univ",
        },
        GoldenCase {
            id: "connector-between-known-drugs",
            input: "losartan + metoprolol",
            expected_groups: &[AraII, GeMetoprolol],
            expected_extra: true,
            expected_label: "GE Meto && ARA II - X",
        },
        GoldenCase {
            id: "unknown-drug-token",
            input: "Losartan aspirina 100mg",
            expected_groups: &[AraII],
            expected_extra: true,
            expected_label: "ARA II-X univ",
        },
        GoldenCase {
            id: "salt-is-not-extra",
            input: "Metoprolol tartrato 50 mg",
            expected_groups: &[GeMetoprolol],
            expected_extra: false,
            expected_label: "GE metoprolol univ",
        },
        GoldenCase {
            id: "hydrochlorothiazide-single",
            input: "hidroclorotiazida 25mg",
            expected_groups: &[GeHydrochlorothiazide],
            expected_extra: false,
            expected_label: "GE Hidroclorotiazida univ",
        },
        GoldenCase {
            id: "ge-merge-slash",
            input: "Metoprolol/Hidroclorotiazida",
            expected_groups: &[GeMetoprolol, GeHydrochlorothiazide],
            expected_extra: true,
            expected_label: "GE Hidro-Meto - X",
        },
        GoldenCase {
            id: "slash-before-number",
            input: "Hidroclorotiazida 25 mg / 12.5",
            expected_groups: &[GeHydrochlorothiazide],
            expected_extra: false,
            expected_label: "GE Hidroclorotiazida univ",
        },
        GoldenCase {
            id: "accents-and-stopwords",
            input: "Cápsulas de nifedipino",
            expected_groups: &[CalciumAntagonists],
            expected_extra: false,
            expected_label: "Calcioantagonistas univ",
        },
        GoldenCase {
            id: "posology-words",
            input: "Propranolol 40mg cada 12 horas",
            expected_groups: &[GeMetoprolol],
            expected_extra: false,
            expected_label: "GE metoprolol univ",
        },
        GoldenCase {
            id: "comma-list-no-connector",
            input: "enalapril, hidroclorotiazida, furosemida",
            expected_groups: &[GeHydrochlorothiazide, Ieca, OtherDiuretics],
            expected_extra: false,
            expected_label: "GE Hidro && IECA && Otros diuréticos",
        },
        GoldenCase {
            id: "y-connector",
            input: "valsartan y amlodipino",
            expected_groups: &[AraII, CalciumAntagonists],
            expected_extra: true,
            expected_label: "ARA II && Calcioantagonistas - X",
        },
        GoldenCase {
            id: "con-connector-hierarchy",
            input: "Bisoprolol con amlodipino",
            expected_groups: &[CalciumAntagonists, OtherBetaBlockers],
            expected_extra: true,
            expected_label: "Calcioantagonistas && Otros Beta-Bloqueadores - X",
        },
        GoldenCase {
            id: "three-groups",
            input: "metoprolol 50 mg, losartan 50 mg, enalapril 5 mg",
            expected_groups: &[GeMetoprolol, AraII, Ieca],
            expected_extra: false,
            expected_label: "GE Meto && ARA II && IECA",
        },
        GoldenCase {
            id: "other-antihypertensive-with-unknown-form",
            input: "Minoxidil solución tópica",
            expected_groups: &[OtherAntihypertensives],
            expected_extra: true,
            expected_label: "Otros Anti-Hipertensivos-X univ",
        },
        GoldenCase {
            id: "not-antihypertensive",
            input: "paracetamol 500mg",
            expected_groups: &[],
            expected_extra: false,
            expected_label: NOT_APPLICABLE,
        },
        GoldenCase {
            id: "blank",
            input: "   ",
            expected_groups: &[],
            expected_extra: false,
            expected_label: NOT_APPLICABLE,
        },
    ]
}

#[test]
fn test_golden_cases() {
    let matcher = TextMatcher::with_defaults().unwrap();

    for case in get_golden_cases() {
        let result = matcher.analyze(Some(case.input));

        let groups: Vec<GroupId> = result.groups.iter().copied().collect();
        let mut expected = case.expected_groups.to_vec();
        expected.sort();
        assert_eq!(groups, expected, "Case {}: group mismatch", case.id);

        assert_eq!(
            result.has_extra, case.expected_extra,
            "Case {}: extra flag mismatch", case.id
        );

        assert_eq!(
            label_for(&result),
            case.expected_label,
            "Case {}: label mismatch",
            case.id
        );
    }
}

#[test]
fn test_missing_text() {
    let matcher = TextMatcher::with_defaults().unwrap();
    let result = matcher.analyze(None);
    assert!(result.groups.is_empty());
    assert!(!result.has_extra);
    assert_eq!(label_for(&result), NOT_APPLICABLE);
}

#[test]
fn test_connector_fires_between_known_drugs() {
    let matcher = TextMatcher::with_defaults().unwrap();
    let groups = matcher.find_groups("losartan + metoprolol");
    assert_eq!(groups, [AraII, GeMetoprolol].into_iter().collect());
    assert!(matcher.has_extra_component("losartan + metoprolol", &groups));
}

#[test]
fn test_label_properties() {
    assert_eq!(build_label([Ieca], false), "IECA univ");
    assert_eq!(build_label([AraII], true), "ARA II-X univ");
    assert_eq!(build_label([Ieca, AraII], false), "ARA II && IECA");
    assert_eq!(build_label([AraII, Ieca], false), "ARA II && IECA");
    assert_eq!(
        build_label([GeMetoprolol, GeHydrochlorothiazide, Ieca], false),
        "GE Hidro-Meto && IECA"
    );
}

#[test]
fn test_every_default_drug_is_recognized() {
    let matcher = TextMatcher::with_defaults().unwrap();

    for entry in matcher.taxonomy().entries() {
        let text = format!("{} 10 mg tableta", entry.name.to_uppercase());
        let result = matcher.analyze(Some(text.as_str()));
        assert_eq!(
            result.groups.iter().copied().collect::<Vec<_>>(),
            vec![entry.group],
            "Drug {} not recognized",
            entry.name
        );
        assert!(!result.has_extra, "Drug {} flagged extra", entry.name);
    }
}
