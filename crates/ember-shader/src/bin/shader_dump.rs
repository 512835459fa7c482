use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use ember_dxbc::{report_string, Container, ShaderReflection};

fn usage() -> &'static str {
    "\
shader_dump: print the reflection report of a compiled shader

USAGE:
    cargo run -p ember-shader --bin shader_dump -- <path> [--label NAME] [--message FILE]

FLAGS:
    --label NAME      Shader name shown in the report header (default: the input path)
    --message FILE    Attach the compiler's textual output from FILE
"
}

fn main() {
    if let Err(err) = real_main() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn real_main() -> anyhow::Result<()> {
    let mut path: Option<PathBuf> = None;
    let mut label: Option<String> = None;
    let mut message_path: Option<PathBuf> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print!("{}", usage());
                return Ok(());
            }
            "--label" => {
                let Some(v) = args.next() else {
                    bail!("--label requires a value");
                };
                label = Some(v);
            }
            "--message" => {
                let Some(v) = args.next() else {
                    bail!("--message requires a value");
                };
                message_path = Some(PathBuf::from(v));
            }
            _ if arg.starts_with('-') => {
                bail!("unknown option {arg:?}\n\n{}", usage());
            }
            _ => {
                if path.is_some() {
                    bail!("unexpected positional argument {arg:?}\n\n{}", usage());
                }
                path = Some(PathBuf::from(arg));
            }
        }
    }

    let Some(path) = path else {
        bail!("missing shader input path\n\n{}", usage());
    };

    let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;

    let container = Container::parse(&bytes)
        .with_context(|| format!("failed to parse {} as a shader container", path.display()))?;
    println!("container: {} chunk(s)", container.chunk_count());
    for (idx, (fourcc, data)) in container.chunks().enumerate() {
        println!("  [{idx:02}] {fourcc} {} bytes", data.len());
    }
    println!();

    let mut reflection = ShaderReflection::parse(&bytes)
        .with_context(|| format!("failed to parse {} as a shader container", path.display()))?;

    if let Some(message_path) = message_path {
        let message = fs::read_to_string(&message_path)
            .with_context(|| format!("failed to read {}", message_path.display()))?;
        reflection = reflection.with_compiler_message(message);
    }

    let label = label.unwrap_or_else(|| path.display().to_string());
    print!("{}", report_string(&label, &reflection));
    Ok(())
}
