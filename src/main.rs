/*!
## Gima (Graph Isomorphism Matching)

A command-line utility for matching query graphs against a graph
database: exact isomorphism or subgraph isomorphism, one result per
query/data pair.

### License

MIT
*/
use graph_isomorphism::*;

use std::path::Path;
use std::time::Instant;

use eyre::Result;

fn main() -> Result<()> {
    let args = cli::main()?;

    println!("------");
    let database = measure("Load data graphs", || load_graphs(&args.data_graph))?;
    println!("Database size: {}", database.len());
    if let Some(first) = database.first() {
        println!("First data graph: {}", first);
    }
    println!("Mode: {}", args.mode);
    println!("------");

    for query_path in &args.query_graphs {
        run_query_file(query_path, &database, args.mode, args.counts)?;
        println!("------");
    }

    Ok(())
}

fn run_query_file(
    query_path: &Path,
    database: &[Graph],
    mode: Mode,
    counts: bool,
) -> Result<()> {
    let queries = measure("Load query graphs", || load_graphs(query_path))?;

    let matches: fn(&Graph, &Graph) -> bool = match mode {
        Mode::Isomorphism => isomorphism,
        Mode::Subisomorphism => subisomorphism,
    };

    let start = Instant::now();
    let mut matched = 0_usize;
    for query in &queries {
        for data in database {
            if matches(query, data) {
                matched += 1;
            }
        }
    }

    println!(
        "{:?}: {} queries x {} data graphs took {:?}",
        query_path,
        queries.len(),
        database.len(),
        start.elapsed()
    );
    if counts {
        println!("Matched pairs: {}", matched);
    }

    Ok(())
}

fn measure<R>(desc: &str, func: impl FnOnce() -> R) -> R {
    println!("Start :: {}", desc);
    let start = Instant::now();
    let result = func();
    println!("Finish :: {} took {:?}", desc, start.elapsed());
    result
}

mod cli {
    use graph_isomorphism::Mode;
    use pico_args::Arguments;
    use std::{ffi::OsStr, path::PathBuf, str::FromStr};

    use crate::Result;

    #[derive(Debug)]
    pub(crate) struct AppArgs {
        pub(crate) data_graph: PathBuf,
        pub(crate) query_graphs: Vec<PathBuf>,
        pub(crate) mode: Mode,
        pub(crate) counts: bool,
    }

    pub(crate) fn main() -> Result<AppArgs> {
        let mut pargs = Arguments::from_env();

        fn as_path_buf(arg: &OsStr) -> Result<PathBuf> {
            Ok(arg.into())
        }

        let args = AppArgs {
            counts: pargs.contains(["-c", "--counts"]),
            data_graph: pargs.value_from_os_str(["-d", "--data-graph"], as_path_buf)?,
            mode: pargs
                .opt_value_from_fn(["-m", "--mode"], ModeWrapper::from_str)?
                .unwrap_or(ModeWrapper(Mode::Isomorphism))
                .into(),
            query_graphs: pargs.values_from_os_str(["-q", "--query-graph"], as_path_buf)?,
        };

        if args.query_graphs.is_empty() {
            return Err(eyre::eyre!("at least one query graph file is required"));
        }

        Ok(args)
    }

    struct ModeWrapper(Mode);

    impl From<ModeWrapper> for Mode {
        fn from(mode: ModeWrapper) -> Self {
            mode.0
        }
    }

    impl FromStr for ModeWrapper {
        type Err = eyre::Report;

        fn from_str(s: &str) -> Result<ModeWrapper> {
            match s {
                "ISO" | "iso" => Ok(ModeWrapper(Mode::Isomorphism)),
                "SUB" | "sub" => Ok(ModeWrapper(Mode::Subisomorphism)),
                _ => Err(eyre::eyre!("Unsupported mode {}", s)),
            }
        }
    }
}
