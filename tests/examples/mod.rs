use arbor::{
	backend::interpret::Data,
	config::Config,
	driver::run,
	frontend::pretty::Print as _,
};

use crate::common::{pass_frontend, programs};

#[test]
fn demos_run_without_diagnostics() {
	let paths = programs("demos");
	assert!(!paths.is_empty());
	for path in paths {
		let frontend = pass_frontend(&path);
		assert!(frontend.elaboration.diagnostics.is_empty(), "{}: {:?}", path.display(), frontend.elaboration.diagnostics);
		frontend.execute().unwrap_or_else(|error| panic!("{}: {error}", path.display()));
	}
}

fn output(path: &str) -> String {
	let frontend = pass_frontend(path.as_ref());
	let data = frontend.execute().expect(path);
	data.pretty(&frontend.resolver).to_string()
}

#[test]
fn staging_duplicates_quoted_code() {
	assert_eq!(output("demos/staging.arb"), "[7, 7]");
}

#[test]
fn dependent_application_instantiates_types() {
	assert_eq!(output("demos/dependent.arb"), "[5]");
}

#[test]
fn nested_quotations_splice_twice() {
	assert_eq!(output("demos/nested_staging.arb"), "3");
}

#[test]
fn functions_are_lexically_scoped() {
	assert_eq!(output("demos/lexical.arb"), "[1L, 2L]");
}

#[test]
fn functions_build_compounds() {
	assert_eq!(
		output("demos/functions.arb"),
		r#"{first: ["hello", "world"], second: [I; 1, 2, 3], "third key": [B; -1b, 2b]}"#
	);
}

#[test]
fn inferred_annotations_are_zonked() {
	let frontend = pass_frontend("demos/inference.arb".as_ref());
	assert_eq!(frontend.elaboration.ty.pretty(&frontend.resolver).to_string(), "List(Short)");
	assert_eq!(frontend.execute().ok(), Some(Data::List(vec![Data::Short(1), Data::Short(2)])));
}

#[test]
fn computed_paths_are_evaluated_while_checking() {
	let source = std::fs::read_to_string("demos/paths.arb").unwrap();
	let frontend = pass_frontend("demos/paths.arb".as_ref());
	let offset = source.find("get inventory (").unwrap();
	assert_eq!(frontend.elaboration.hover_at(offset, &frontend.resolver).as_deref(), Some("List(String)"));
}

#[test]
fn literals_execute_to_their_tags() {
	let cases = [("1b", Data::Byte(1)), ("2s", Data::Short(2)), ("3", Data::Int(3)), ("4L", Data::Long(4)), ("\"s\"", Data::String("s".to_owned()))];
	for (source, expected) in cases {
		assert_eq!(run(source, &Config::default()).ok(), Some(expected), "{source}");
	}
}
