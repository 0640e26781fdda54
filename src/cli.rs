//! Command-line surface of `smartstest`.
//!
//! ```text
//! # Verify against files/smartsresults.txt
//! smartstest
//!
//! # Regenerate the reference file
//! smartstest -g
//!
//! # Point at another data set
//! TESTDATADIR=/data/smarts smartstest --strict -v
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use crate::config::{DataFiles, Leniency, RunConfig, DEFAULT_DATA_DIR};
use crate::generate::run_generate;
use crate::tap::TapWriter;
use crate::verify::run_verify;

/// Exit status of a bailed-out verify run.
pub const BAIL_OUT_STATUS: u8 = 255;

#[derive(Parser, Debug)]
#[command(name = "smartstest")]
#[command(version)]
#[command(about = "Tests SMILES/SMARTS pattern matching against reference results")]
pub struct Cli {
    /// `-g` to regenerate the reference file; anything else prints usage
    #[arg(allow_hyphen_values = true)]
    pub mode: Option<String>,

    /// Words after MODE; only the first argument selects the mode
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<String>,

    /// Directory holding the pattern, reference and molecule files
    #[arg(long, env = "TESTDATADIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Pattern file (default: <DATA_DIR>/smartstest.txt)
    #[arg(long)]
    pub patterns: Option<PathBuf>,

    /// Reference file (default: <DATA_DIR>/smartsresults.txt)
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Molecule file (default: <DATA_DIR>/attype.00.smi)
    #[arg(long)]
    pub molecules: Option<PathBuf>,

    /// Treat uncompilable patterns and non-numeric reference tokens as fatal
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Verify,
    Generate,
    Usage,
}

impl Mode {
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => Mode::Verify,
            Some(a) if a.starts_with("-g") => Mode::Generate,
            Some(_) => Mode::Usage,
        }
    }
}

impl Cli {
    pub fn mode(&self) -> Mode {
        Mode::from_arg(self.mode.as_deref())
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            files: DataFiles::in_dir(&self.data_dir).with_overrides(
                self.patterns.clone(),
                self.reference.clone(),
                self.molecules.clone(),
            ),
            leniency: Leniency::from(self.strict),
        }
    }
}

pub fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = cli.run_config();
    match cli.mode() {
        Mode::Verify => verify(&config),
        Mode::Generate => {
            generate(&config);
            Ok(ExitCode::SUCCESS)
        }
        Mode::Usage => {
            print_usage(&mut io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Verification failures are reported on the TAP stream and still exit 0;
/// only a bail-out changes the status.
fn verify(config: &RunConfig) -> anyhow::Result<ExitCode> {
    let mut tap = TapWriter::new(io::stdout().lock());
    match run_verify(config, &mut tap) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tap.bail_out(&e).context("writing bail-out line")?;
            Ok(ExitCode::from(BAIL_OUT_STATUS))
        }
    }
}

/// Errors end generation with a message on stderr but do not change the
/// exit status.
fn generate(config: &RunConfig) {
    let result = run_generate(config).with_context(|| {
        format!(
            "Cannot generate SMARTS reference data in {}",
            config.files.reference.display()
        )
    });
    match result {
        Ok(_) => eprintln!(" SMARTS test results written successfully"),
        Err(e) => eprintln!("{e:#}"),
    }
}

pub fn print_usage<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Usage: smartstest")?;
    writeln!(out, "   Tests SMILES/SMARTS pattern matching.")
}
