use arbor::frontend::elaborate::DiagnosticKind as K;

use crate::common::{pass_frontend, programs};

// The diagnostic each failing program must produce, by file stem.
const EXPECTED: &[(&str, fn(&K) -> bool)] = &[
	("arrow_expected", |kind| matches!(kind, K::ArrowExpected { .. })),
	("code_expected", |kind| matches!(kind, K::CodeExpected { .. })),
	("compound_width", |kind| matches!(kind, K::ObjectTypeMismatch { .. })),
	("computed_path_mismatch", |kind| matches!(kind, K::MetaTypeMismatch { .. })),
	("end_is_not_top", |kind| matches!(kind, K::ObjectTypeMismatch { .. })),
	("invalid_path", |kind| matches!(kind, K::InvalidPath { .. })),
	("list_mismatch", |kind| matches!(kind, K::ObjectTypeMismatch { .. })),
	("meta_mismatch", |kind| matches!(kind, K::MetaTypeMismatch { .. })),
	("not_found", |kind| matches!(kind, K::NotFound(_))),
	("quoted_mismatch", |kind| matches!(kind, K::ObjectTypeMismatch { .. })),
	("recovered_domain", |kind| matches!(kind, K::ArrowExpected { .. })),
	("recovered_list", |kind| matches!(kind, K::ArrowExpected { .. })),
	("recovered_meta_list", |kind| matches!(kind, K::ArrowExpected { .. })),
	("unexpected_construct", |kind| matches!(kind, K::UnexpectedConstruct)),
	("unfilled_hole", |kind| matches!(kind, K::UnfilledHole)),
	("unsolved", |kind| matches!(kind, K::UnsolvedMetavariable(_))),
];

#[test]
fn run_fail_tests() {
	let paths = programs("tests/fail/programs");
	assert!(!paths.is_empty());
	for path in paths {
		let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap();
		let (_, expected) = EXPECTED
			.iter()
			.find(|(name, _)| *name == stem)
			.unwrap_or_else(|| panic!("no expected diagnostic for {}", path.display()));
		let frontend = pass_frontend(&path);
		let diagnostics = &frontend.elaboration.diagnostics;
		assert!(diagnostics.iter().any(|diagnostic| expected(&diagnostic.kind)), "{}: {diagnostics:?}", path.display());
	}
}

#[test]
fn each_error_is_reported_once() {
	for name in [
		"list_mismatch",
		"arrow_expected",
		"recovered_list",
		"recovered_meta_list",
		"recovered_domain",
		"computed_path_mismatch",
	] {
		let path = format!("tests/fail/programs/{name}.arb");
		let frontend = pass_frontend(path.as_ref());
		assert_eq!(frontend.elaboration.diagnostics.len(), 1, "{path}: {:?}", frontend.elaboration.diagnostics);
	}
}
