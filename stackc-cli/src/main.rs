//! Entrypoint for CLI
use std::{env, error::Error, fs, io::Write};

use log::{error, info};
use stackc::{lex::Lexer, tokens::TokenKind, Compiler, VERSION};

static USAGE: &str = r#"
usage: stackc CMD FILE

commands:
    build   Compile the target source file into an instruction listing
    lex     Dump the token stream of the target source file

examples:
    stackc build counter.stk
    stackc lex counter.stk
"#;

fn run_build(filepath: impl AsRef<str>) -> Result<(), Box<dyn Error>> {
    info!("running compiler");

    let file_bytes = fs::read(filepath.as_ref())?;
    let source_code = String::from_utf8(file_bytes)?;

    let mut compiler = Compiler::new();
    match compiler.compile(source_code.as_str()) {
        Ok(program) => {
            let listing = program.listing();

            let mut outfile = fs::File::create("out.lst")?;
            outfile.write_all(listing.as_bytes())?;

            println!("{listing}");
            Ok(())
        }
        Err(err) => {
            error!("compile error\n{err}");
            // Exit process with error
            Err(err.into())
        }
    }
}

fn run_lex(filepath: impl AsRef<str>) -> Result<(), Box<dyn Error>> {
    use TokenKind as TK;

    info!("running lexer");

    let file_bytes = fs::read(filepath.as_ref())?;
    let source_code = String::from_utf8(file_bytes)?;

    let mut lexer = Lexer::new(source_code.as_str());

    println!("offset | len | token       | fragment ");
    loop {
        let token = lexer.next_token()?;

        match token.kind {
            TK::EOS => println!(
                "{0:7}:{1: <3} {2: <16?}",
                token.span.index, token.span.size, token.kind
            ),
            _ => {
                let offset = token.span.index;
                let len = token.span.size;
                let kind = format!("{:?}", token.kind); // cannot format debug print {:?} into columns
                let fragment = token.span.fragment(source_code.as_str());
                println!("{offset:7}:{len: <3} {kind: <20} \"{fragment}\"")
            }
        }

        if matches!(token.kind, TK::EOS) {
            break;
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init().unwrap();

    match parse_args() {
        Some(Cmd::Build { filepath }) => run_build(filepath)?,
        Some(Cmd::Lex { filepath }) => run_lex(filepath)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next() {
        Some(cmd) => match cmd.as_str() {
            "build" => Some(Cmd::Build {
                filepath: args.next()?,
            }),
            "lex" => Some(Cmd::Lex {
                filepath: args.next()?,
            }),
            _ => None,
        },
        None => None,
    }
}

fn print_usage() {
    println!("stackc v{VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Compile file
    Build { filepath: String },
    /// Tokenize file
    Lex { filepath: String },
}
