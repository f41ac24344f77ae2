use std::{
	ffi::OsStr,
	fs,
	path::{Path, PathBuf},
};

use arbor::{
	config::Config,
	driver::{compile, Frontend},
};

pub const EXTENSION: &str = "arb";

pub fn programs(directory: impl AsRef<Path>) -> Vec<PathBuf> {
	let mut paths: Vec<_> = fs::read_dir(directory)
		.unwrap()
		.flatten()
		.map(|x| x.path())
		.filter(|x| x.extension() == Some(OsStr::new(EXTENSION)))
		.collect();
	paths.sort();
	paths
}

pub fn pass_frontend(path: &Path) -> Frontend {
	let path_str = path.as_os_str().to_str().unwrap().to_owned();
	let source = fs::read_to_string(path).expect(&path_str);
	compile(&source, &Config::default()).expect(&path_str)
}
