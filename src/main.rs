use std::process::ExitCode;

use arbor::{
	config::Config,
	driver::compile,
	frontend::pretty::Print as _,
	report::{report_diagnostic, report_run_error},
};
use bpaf::{construct, long, short, Parser};
use tracing::Level;

fn run(source: &str, config: &Config, show_core: bool) -> bool {
	let frontend = match compile(source, config) {
		Ok(frontend) => frontend,
		Err(error) => {
			report_run_error(source, &error);
			return false;
		}
	};
	for diagnostic in &frontend.elaboration.diagnostics {
		report_diagnostic(source, diagnostic, &frontend.resolver);
	}

	if show_core {
		println!("Core term: {}", frontend.elaboration.term.pretty(&frontend.resolver));
		println!("Type: {}", frontend.elaboration.ty.pretty(&frontend.resolver));
	}

	match frontend.execute() {
		Ok(data) => {
			println!("{}", data.pretty(&frontend.resolver));
			true
		}
		Err(error) => {
			report_run_error(source, &error);
			false
		}
	}
}

enum InputOption {
	Direct(String),
	FilePath(String),
}

struct Options {
	input: InputOption,
	occurs_check: bool,
	verbosity: usize,
	show_core: bool,
}

fn main() -> ExitCode {
	let options: Options = construct!(Options {
		input(construct!([
			c(short('c').argument::<String>("\"source\"").help("Read input from argument").map(InputOption::Direct)),
			f(short('f').argument::<String>("PATH").help("Read input from file").map(InputOption::FilePath)),
		])),
		occurs_check(long("occurs-check").help("Reject cyclic metavariable solutions").switch()),
		verbosity(short('v').long("verbose").help("Log more; repeat for more detail").req_flag(()).many().map(|flags| flags.len())),
		show_core(long("show-core").help("Print the elaborated core term and its type").switch()),
	})
	.to_options()
	.run();

	let level = match options.verbosity {
		0 => Level::WARN,
		1 => Level::INFO,
		2 => Level::DEBUG,
		_ => Level::TRACE,
	};
	tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();

	let source = match options.input {
		InputOption::Direct(source) => source,
		InputOption::FilePath(path) => match std::fs::read_to_string(&path) {
			Ok(source) => source,
			Err(error) => {
				eprintln!("error: cannot read `{path}`: {error}");
				return ExitCode::from(2);
			}
		},
	};

	let config = Config::default().with_occurs_check(options.occurs_check);
	if run(&source, &config, options.show_core) {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	}
}
