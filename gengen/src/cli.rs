use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser};
use eyre::Result;
use gengen_build::{BuildConfig, BuildOrchestrator, BuildRequest, ListingCompiler, RequestArgs};
use gengen_generator::{FactoryRegistry, FieldRegistry};

use crate::{
    generators,
    reports::{BuildReport, Report, TerminalOutput},
};

/// Extension trait for exiting on gengen errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for gengen_core::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "gengen")]
#[command(version)]
#[command(about = "Build registered generators for one or more targets")]
#[command(after_help = "Options are passed as key=value. target=<t1>[,<t2>...] is required.")]
pub(crate) struct Cli {
    /// Generator to build (optional if exactly one is registered)
    #[arg(short = 'g', value_name = "NAME")]
    pub generator: Option<String>,

    /// Name of the generated function (defaults to the generator name)
    #[arg(short = 'f', value_name = "NAME")]
    pub function: Option<String>,

    /// Output directory
    #[arg(short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Also build a standalone runtime with this name
    #[arg(short = 'r', value_name = "NAME")]
    pub runtime: Option<String>,

    /// Artifacts to emit: assembly, bitcode, cpp, h, html, o, static_library, stmt
    #[arg(short = 'e', value_name = "LIST", value_delimiter = ',')]
    pub emit: Option<Vec<String>>,

    /// Extension overrides, e.g. .o=.obj,.a=.lib
    #[arg(short = 'x', value_name = "LIST", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Base name of the output files (defaults to the function name)
    #[arg(short = 'n', value_name = "NAME")]
    pub file_base_name: Option<String>,

    /// Read defaults from a TOML build file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Generator options as key=value
    #[arg(value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,
}

impl Cli {
    /// Parse the command line. Usage errors exit with status 1.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(e) => {
                let code = if e.use_stderr() { 1 } else { 0 };
                let _ = e.print();
                std::process::exit(code);
            }
        }
    }

    pub fn run(&self) -> Result<()> {
        let fields = FieldRegistry::shared();
        let factories = Arc::new(FactoryRegistry::new());
        generators::register_all(&factories, &fields).unwrap_or_exit();

        let request = self.request().unwrap_or_exit();
        let mut orchestrator = BuildOrchestrator::new(factories, ListingCompiler::new());
        let outcome = orchestrator.run(&request).map_err(with_usage).unwrap_or_exit();

        BuildReport::new(outcome).render(&mut TerminalOutput::new());
        Ok(())
    }

    fn args(&self) -> RequestArgs {
        RequestArgs {
            generator: self.generator.clone(),
            function: self.function.clone(),
            output_dir: self.output.clone(),
            runtime: self.runtime.clone(),
            emit: self.emit.clone(),
            extensions: self.extensions.clone(),
            file_base_name: self.file_base_name.clone(),
            assignments: self.assignments.clone(),
        }
    }

    fn request(&self) -> gengen_core::Result<BuildRequest> {
        let args = match &self.config {
            Some(path) => BuildConfig::from_file(path)?.apply(self.args()),
            None => self.args(),
        };
        let request = BuildRequest::parse(args).map_err(with_usage)?;
        tracing::debug!(
            generator = ?request.generator,
            runtime = ?request.runtime,
            targets = request.targets.len(),
            output = %request.output_dir.display(),
            "parsed build request"
        );
        Ok(request)
    }
}

fn with_usage(err: gengen_core::Error) -> gengen_core::Error {
    err.with_usage(Cli::command().render_usage().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gengen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_and_assignments() {
        let cli = parse(&[
            "-g",
            "brighten",
            "-o",
            "out",
            "-e",
            "o,h",
            "-x",
            ".o=.obj,.h=.hpp",
            "target=x86-64-linux",
            "gain=2",
        ]);
        let args = cli.args();

        assert_eq!(args.generator.as_deref(), Some("brighten"));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.emit, Some(vec!["o".to_string(), "h".to_string()]));
        assert_eq!(args.extensions, vec![".o=.obj", ".h=.hpp"]);
        assert_eq!(args.assignments, vec!["target=x86-64-linux", "gain=2"]);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = Cli::try_parse_from(["gengen", "-q"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_usage_attached_to_request_errors() {
        let cli = parse(&["target=host"]);
        let err = cli.request().unwrap_err();
        match err {
            gengen_core::Error::Usage { usage, .. } => {
                assert!(usage.unwrap().contains("gengen"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_emit_flag_uses_defaults() {
        let cli = parse(&["-o", "out", "-e", "", "target=x86-64-linux"]);
        assert_eq!(cli.emit, Some(vec![String::new()]));

        let request = cli.request().unwrap();
        assert_eq!(request.emit, gengen_core::EmitOptions::default());
    }

    #[test]
    fn test_config_file_fills_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gengen.toml");
        std::fs::write(
            &path,
            "output = \"build\"\nemit = [\"h\"]\n\n[options]\ntarget = \"arm-32-linux\"\n",
        )
        .unwrap();

        let cli = parse(&["--config", path.to_str().unwrap(), "-o", "out"]);
        let request = cli.request().unwrap();

        assert_eq!(request.output_dir, PathBuf::from("out"));
        assert_eq!(request.targets[0].to_string(), "arm-32-linux");
        assert_eq!(request.emit.kinds.len(), 1);
    }
}
