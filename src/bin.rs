use clap::Parser;
use crossfill::backtracking_search::{solve, SolveFailure, SolveOptions};
use crossfill::domains::DomainStore;
use crossfill::puzzle::{render_solution, Puzzle};
use crossfill::word_list::WordList;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::time::{Duration, Instant};

/// crossfill: Command-line crossword generation tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the grid structure file, as ASCII with # representing blocks and . or _
    /// representing empty squares
    structure_path: String,

    /// Path to a word list file with one word per line
    words_path: String,

    /// Optional path to write the rendered solution to, in addition to printing it
    output_path: Option<String>,

    /// Time limit for the search, in seconds [default: none]
    #[arg(long)]
    timeout: Option<u64>,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();

    let raw_grid_content = fs::read_to_string(&args.structure_path)
        .map_err(|_| Error(format!("Couldn't read file '{}'", args.structure_path)))?;

    let puzzle = Puzzle::from_template(&raw_grid_content).map_err(|e| Error(format!("{e}")))?;

    let word_list = WordList::from_file(&args.words_path).map_err(|e| Error(format!("{e}")))?;

    let mut domains = DomainStore::new(&puzzle, &word_list);

    let options = SolveOptions {
        deadline: args
            .timeout
            .map(|seconds| Instant::now() + Duration::from_secs(seconds)),
        abort: None,
    };

    match solve(&puzzle, &word_list, &mut domains, options) {
        Ok(solution) => {
            let rendered = render_solution(&puzzle, &word_list, &solution.choices);
            println!("{rendered}");

            if let Some(output_path) = args.output_path {
                fs::write(&output_path, rendered + "\n")
                    .map_err(|_| Error(format!("Couldn't write file '{output_path}'")))?;
            }
        }
        Err(SolveFailure::NoSolution) => println!("No solution."),
        Err(failure) => return Err(Error(format!("{failure}"))),
    }

    Ok(())
}
