use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use inkwell::context::Context;
use tracing::info;

use dulek::{
    compiler::compiler::compile,
    display_error,
    errors::errors::{Error, ErrorImpl},
    init_tracing, Position,
};

#[derive(Parser, Debug)]
#[command(name = "dulek", about = "Dulek to LLVM IR compiler")]
struct Args {
    /// Source file to compile.
    input: PathBuf,

    /// Where to write the textual IR. Defaults to the input with an `.ll`
    /// extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the generated IR to stdout.
    #[arg(long)]
    print_ir: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            display_error(&error, &args.input);
            ExitCode::from(error.kind().exit_code())
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let start = Instant::now();

    let source = fs::read_to_string(&args.input).map_err(|error| io_error(&args.input, error))?;
    let file_name = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| args.input.to_string_lossy().to_string());

    let context = Context::create();
    let compiler = compile(source, &file_name, &context)?;
    info!(elapsed = ?start.elapsed(), "generated IR");

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("ll"));
    compiler.save_module_to_file(&output)?;
    info!(output = %output.display(), "wrote module");

    if args.print_ir {
        print!("{}", compiler.print_ir());
    }

    info!(elapsed = ?start.elapsed(), "done");
    Ok(())
}

fn io_error(path: &Path, error: std::io::Error) -> Error {
    Error::new(
        ErrorImpl::Io {
            path: path.to_string_lossy().to_string(),
            message: error.to_string(),
        },
        Position::null(),
    )
}
