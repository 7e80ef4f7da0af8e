//! trace-to-tla: convert a text trace into a value stream TLC can load.
//!
//! Usage: trace-to-tla [OPTIONS] <INPUT> [OUTPUT]
//!
//! Every line of INPUT is parsed as a six-field trace tuple; the whole trace
//! is written to OUTPUT as one aggregate value. OUTPUT `-` writes to stdout.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use libtlatrace::{count_lines, encode, format_trace, parse_trace_with_filename, Format, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

mod transcode;

#[derive(Parser, Debug)]
#[command(
    name = "trace-to-tla",
    version,
    about = "Convert a line-oriented TLA+ trace into a single serialized value"
)]
struct Cli {
    /// Trace file to read.
    input: PathBuf,

    /// Destination file, or `-` for stdout.
    #[arg(required_unless_present = "check")]
    output: Option<PathBuf>,

    /// Input format.
    #[arg(short, long, value_enum, default_value_t = InputFormat::Trace)]
    from: InputFormat,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tlc)]
    to: OutputFormat,

    /// Parse the input and report, without writing anything.
    #[arg(long)]
    check: bool,

    /// Suppress progress messages.
    #[arg(short, long)]
    quiet: bool,

    /// Log debug diagnostics to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// One TLA+ tuple per line.
    Trace,
    /// A TLC value stream written by this tool.
    Tlc,
    /// CBOR written by this tool.
    Cbor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// TLC value stream.
    Tlc,
    Cbor,
    Yaml,
    Json,
    /// TLA+ text, one tuple per line.
    Tla,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(&cli)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let input_name = cli.input.display().to_string();
    let output_name = cli
        .output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let to_stdout = cli.output.as_deref() == Some(Path::new("-"));
    // Progress on stdout would corrupt output written there.
    let progress = !cli.quiet && !cli.check && !to_stdout;

    let value = match cli.from {
        InputFormat::Trace => {
            let text = fs::read_to_string(&cli.input)
                .with_context(|| format!("reading {}", input_name))?;
            if progress {
                println!(
                    "Parsing {} lines in {} to {}.",
                    count_lines(&text),
                    input_name,
                    output_name
                );
            }
            let filename = cli.input.file_name().map(|n| n.to_string_lossy());
            parse_trace_with_filename(&text, filename.as_deref())?
        }
        InputFormat::Tlc | InputFormat::Cbor => {
            let bytes = fs::read(&cli.input).with_context(|| format!("reading {}", input_name))?;
            if progress {
                println!("Converting {} to {}.", input_name, output_name);
            }
            let decoded = match cli.from {
                InputFormat::Tlc => transcode::tlc::decode(&bytes),
                _ => transcode::cbor::decode(&bytes),
            };
            let value = decoded.map_err(|e| anyhow!("{}: {}", input_name, e))?;
            if value.as_tuple().is_none() {
                warn!(input = %input_name, "top-level value is a {}, not a trace tuple", value.kind());
            }
            value
        }
    };

    let lines = value.as_tuple().map_or(1, <[Value]>::len);
    info!(input = %input_name, lines, "parsed input");

    if cli.check {
        if !cli.quiet {
            println!("{}: ok ({} lines)", input_name, lines);
        }
        return Ok(());
    }

    let Some(output) = cli.output.as_deref() else {
        bail!("an OUTPUT path is required unless --check is given");
    };
    let bytes = encode_output(&value, cli.to)?;
    debug!(format = ?cli.to, bytes = bytes.len(), "encoded output");

    if to_stdout {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&bytes).context("writing to stdout")?;
        stdout.flush().context("writing to stdout")?;
    } else {
        write_atomic(output, &bytes)?;
        info!(output = %output_name, "wrote output");
    }

    if progress {
        match cli.from {
            InputFormat::Trace => {
                println!("Successfully parsed {} to {}.", input_name, output_name)
            }
            _ => println!("Successfully converted {} to {}.", input_name, output_name),
        }
    }
    Ok(())
}

/// Serialize the aggregate value in one call.
fn encode_output(value: &Value, format: OutputFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        OutputFormat::Tlc => transcode::tlc::encode(value)
            .map_err(|e| anyhow!("Cannot convert to TLC: {}", e))?,
        OutputFormat::Cbor => transcode::cbor::encode(value)
            .map_err(|e| anyhow!("Cannot convert to CBOR: {}", e))?,
        OutputFormat::Yaml => transcode::yaml::encode(value)
            .map_err(|e| anyhow!("Cannot convert to YAML: {}", e))?
            .into_bytes(),
        OutputFormat::Json => {
            let mut text = encode(value, Format::Json);
            text.push('\n');
            text.into_bytes()
        }
        OutputFormat::Tla => format_trace(value).into_bytes(),
    };
    Ok(bytes)
}

/// Write `bytes` to a temporary file next to `path`, then rename it over
/// `path`. A failed write leaves `path` untouched.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("flushing {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("renaming temporary file to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TRACE: &str = concat!(
        r#"<<1,"Leader",<<<<[a |-> 1]>>,<<[b |-> 2]>>,<<>>>>,<<"Leader","Follower","Follower">>,<<[c |-> 3]>>,"done">>"#,
        "\n",
        r#"<<2,"Follower",<<<<>>,<<>>,<<>>>>,<<"Follower","Leader","Follower">>,<<>>,"next">>"#,
        "\n",
    );

    fn cli(input: &Path, output: Option<&Path>) -> Cli {
        Cli {
            input: input.to_path_buf(),
            output: output.map(Path::to_path_buf),
            from: InputFormat::Trace,
            to: OutputFormat::Tlc,
            check: false,
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_args() {
        let parsed = Cli::try_parse_from(["trace-to-tla", "in.trace", "out.bin"]).unwrap();
        assert_eq!(parsed.from, InputFormat::Trace);
        assert_eq!(parsed.to, OutputFormat::Tlc);

        let parsed = Cli::try_parse_from(["trace-to-tla", "--check", "in.trace"]).unwrap();
        assert!(parsed.check && parsed.output.is_none());

        assert!(Cli::try_parse_from(["trace-to-tla", "in.trace"]).is_err());
        assert!(Cli::try_parse_from(["trace-to-tla", "-t", "toml", "a", "b"]).is_err());
    }

    #[test]
    fn test_trace_to_tlc_and_back() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("run.trace");
        let output = dir.path().join("run.bin");
        fs::write(&input, TRACE).unwrap();

        run(&cli(&input, Some(&output))).unwrap();
        let bytes = fs::read(&output).unwrap();
        let expected = parse_trace_with_filename(TRACE, None).unwrap();
        assert_eq!(transcode::tlc::decode(&bytes).unwrap(), expected);

        let text = dir.path().join("run.tla");
        let mut back = cli(&output, Some(&text));
        back.from = InputFormat::Tlc;
        back.to = OutputFormat::Tla;
        run(&back).unwrap();
        assert_eq!(fs::read_to_string(&text).unwrap(), TRACE);
    }

    #[test]
    fn test_cbor_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("run.trace");
        let output = dir.path().join("run.cbor");
        fs::write(&input, TRACE).unwrap();

        let mut args = cli(&input, Some(&output));
        args.to = OutputFormat::Cbor;
        run(&args).unwrap();

        let bytes = fs::read(&output).unwrap();
        let cbor: ciborium::value::Value = ciborium::de::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(cbor.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_malformed_line_leaves_no_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.trace");
        let output = dir.path().join("bad.bin");
        fs::write(&input, format!("{}<<x\n", TRACE)).unwrap();

        let err = run(&cli(&input, Some(&output))).unwrap_err();
        assert_eq!(err.to_string(), "Expected decimal digit at 3:3 of <bad.trace>");
        assert!(!output.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_encode_failure_keeps_existing_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("big.trace");
        let output = dir.path().join("big.bin");
        fs::write(
            &input,
            r#"<<1,"L",<<<<[a |-> 4294967296]>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"m">>"#,
        )
        .unwrap();
        fs::write(&output, b"previous").unwrap();

        let err = run(&cli(&input, Some(&output))).unwrap_err();
        assert!(err.to_string().contains("Cannot convert to TLC"), "{}", err);
        assert_eq!(fs::read(&output).unwrap(), b"previous");
    }

    #[test]
    fn test_check_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("run.trace");
        fs::write(&input, TRACE).unwrap();

        let mut args = cli(&input, None);
        args.check = true;
        run(&args).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("absent.trace");
        let output = dir.path().join("out.bin");
        let err = run(&cli(&input, Some(&output))).unwrap_err();
        assert!(err.to_string().starts_with("reading "), "{}", err);
    }

    #[test]
    fn test_write_atomic_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"two");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
