#[macro_use]
extern crate clap;

use std::io::Write;
use std::{path, process};

use cdcl_sat::{run, RunOptions};


fn main() {
    let matches = clap::App::new("cdcl-sat")
        .version(crate_version!())
        .about("CDCL SAT solver with model enumeration")
        .arg(
            clap::Arg::with_name("enumerate")
                .short("e")
                .long("enumerate")
                .help("After each model, block it and keep searching until UNSAT"),
        )
        .arg(
            clap::Arg::with_name("verb")
                .long("verb")
                .takes_value(true)
                .possible_values(&["0", "1", "2"])
                .help("Verbosity level (0=silent, 1=some, 2=more)"),
        )
        .arg(
            clap::Arg::with_name("input")
                .required(true)
                .help("DIMACS CNF file, optionally gzipped"),
        )
        .get_matches();

    {
        let mut builder = env_logger::Builder::new();
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
        builder.filter(
            None,
            match matches.value_of("verb") {
                Some("1") => log::LevelFilter::Info,
                Some("2") => log::LevelFilter::Trace,
                _ => log::LevelFilter::Off,
            },
        );
        builder.init();
    }

    let options = RunOptions {
        enumerate: matches.is_present("enumerate"),
        in_path: path::PathBuf::from(matches.value_of("input").unwrap()),
    };

    if let Err(error) = run(&options) {
        eprintln!("{}", error);
        process::exit(1);
    }
}
