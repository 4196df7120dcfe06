use std::{path::PathBuf, sync::Arc};

use gengen_build::{
    BuildOrchestrator, BuildRequest, ModuleCompiler, ModuleProducer, OutputFiles, RequestArgs,
};
use gengen_core::{ArtifactKind, ErrorKind, Module, Result, ScalarType, Target};
use gengen_generator::{
    DeclaredPipeline, FactoryRegistry, FieldRegistry, Generator, GeneratorBase, GeneratorOption,
    Input, ParamStyle, Pipeline, PipelineOutput,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Compile {
        module: Module,
        outputs: OutputFiles,
    },
    Multitarget {
        function_name: String,
        modules: Vec<Module>,
        outputs: OutputFiles,
    },
    Runtime {
        target: Target,
        outputs: OutputFiles,
    },
}

#[derive(Debug, Default)]
struct RecordingCompiler {
    calls: Vec<Call>,
}

impl ModuleCompiler for RecordingCompiler {
    fn compile(&mut self, module: &Module, outputs: &OutputFiles) -> Result<()> {
        self.calls.push(Call::Compile {
            module: module.clone(),
            outputs: outputs.clone(),
        });
        Ok(())
    }

    fn compile_multitarget(
        &mut self,
        function_name: &str,
        outputs: &OutputFiles,
        targets: &[Target],
        producer: &mut ModuleProducer<'_>,
    ) -> Result<()> {
        let modules = targets
            .iter()
            .map(|t| producer(&format!("{}_{}", function_name, t.bits), t))
            .collect::<Result<Vec<_>>>()?;
        self.calls.push(Call::Multitarget {
            function_name: function_name.to_string(),
            modules,
            outputs: outputs.clone(),
        });
        Ok(())
    }

    fn compile_standalone_runtime(
        &mut self,
        outputs: &OutputFiles,
        target: &Target,
    ) -> Result<()> {
        self.calls.push(Call::Runtime {
            target: target.clone(),
            outputs: outputs.clone(),
        });
        Ok(())
    }
}

/// Output element type follows the `wide` option.
struct Histogram {
    base: GeneratorBase,
    wide: GeneratorOption<bool>,
    _input: Input,
}

impl Histogram {
    fn boxed(fields: &Arc<FieldRegistry>) -> Box<dyn Generator> {
        let base = GeneratorBase::new(fields, ParamStyle::Inputs);
        let wide = base.option("wide", false);
        let input = base.input_buffer("input", ScalarType::UInt8, 2);
        Box::new(Self {
            base,
            wide,
            _input: input,
        })
    }
}

impl Generator for Histogram {
    fn base(&self) -> &GeneratorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GeneratorBase {
        &mut self.base
    }

    fn build_pipeline(&mut self) -> Result<Box<dyn Pipeline>> {
        let ty = if self.wide.get() {
            ScalarType::UInt32
        } else {
            ScalarType::UInt16
        };
        Ok(Box::new(
            DeclaredPipeline::new().output(PipelineOutput::new(ty, 1)),
        ))
    }
}

fn registry(names: &[&str]) -> Arc<FactoryRegistry> {
    let fields = FieldRegistry::shared();
    let factories = FactoryRegistry::new();
    for name in names {
        let fields = Arc::clone(&fields);
        factories
            .register_factory(name, move || Histogram::boxed(&fields))
            .unwrap();
    }
    Arc::new(factories)
}

fn request(f: impl FnOnce(&mut RequestArgs)) -> BuildRequest {
    let mut args = RequestArgs {
        output_dir: Some(PathBuf::from("/out")),
        assignments: vec!["target=x86-64-linux".to_string()],
        ..Default::default()
    };
    f(&mut args);
    BuildRequest::parse(args).unwrap()
}

fn run(names: &[&str], request: &BuildRequest) -> (Result<gengen_build::BuildOutcome>, Vec<Call>) {
    let mut orchestrator = BuildOrchestrator::new(registry(names), RecordingCompiler::default());
    let outcome = orchestrator.run(request);
    (outcome, orchestrator.into_compiler().calls)
}

#[test]
fn test_single_generator_is_default() {
    let (outcome, calls) = run(&["histogram"], &request(|_| {}));
    let outcome = outcome.unwrap();

    let built = outcome.generator.unwrap();
    assert_eq!(built.name, "histogram");
    assert_eq!(built.function_name, "histogram");
    assert!(outcome.runtime.is_none());

    let [Call::Compile { module, outputs }] = calls.as_slice() else {
        panic!("unexpected calls: {calls:?}");
    };
    assert_eq!(module.function_name, "histogram");
    assert_eq!(module.target.to_string(), "x86-64-linux");
    assert_eq!(
        outputs.get(ArtifactKind::StaticLibrary),
        Some(PathBuf::from("/out/histogram.a").as_path())
    );
    assert_eq!(
        outputs.get(ArtifactKind::CHeader),
        Some(PathBuf::from("/out/histogram.h").as_path())
    );
}

#[test]
fn test_several_generators_need_a_name() {
    let (outcome, calls) = run(&["histogram", "blur"], &request(|_| {}));
    let err = outcome.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(err.to_string().ends_with("available generators are: blur, histogram"));
    assert!(calls.is_empty());
}

#[test]
fn test_no_generators_and_no_runtime() {
    let (outcome, calls) = run(&[], &request(|_| {}));
    assert_eq!(outcome.unwrap_err().kind(), ErrorKind::Usage);
    assert!(calls.is_empty());
}

#[test]
fn test_unknown_generator() {
    let (outcome, calls) = run(
        &["histogram"],
        &request(|args| args.generator = Some("sharpen".into())),
    );
    assert_eq!(outcome.unwrap_err().kind(), ErrorKind::NotFound);
    assert!(calls.is_empty());
}

#[test]
fn test_function_and_file_names() {
    let (outcome, calls) = run(
        &["histogram", "blur"],
        &request(|args| {
            args.generator = Some("histogram".into());
            args.function = Some("vision::histogram256".into());
            args.file_base_name = Some("libhist".into());
            args.emit = Some(vec!["o".into()]);
            args.assignments.push("wide=true".into());
        }),
    );
    let built = outcome.unwrap().generator.unwrap();
    assert_eq!(built.function_name, "vision::histogram256");

    let [Call::Compile { module, outputs }] = calls.as_slice() else {
        panic!("unexpected calls: {calls:?}");
    };
    assert_eq!(module.function_name, "vision::histogram256");
    assert_eq!(module.outputs[0].element_type, ScalarType::UInt32);
    assert_eq!(
        outputs.get(ArtifactKind::Object),
        Some(PathBuf::from("/out/libhist.o").as_path())
    );
    assert_eq!(outputs.len(), 1);
}

#[test]
fn test_unknown_option_fails_request() {
    let (outcome, calls) = run(
        &["histogram"],
        &request(|args| args.assignments.push("bins=64".into())),
    );
    assert_eq!(outcome.unwrap_err().kind(), ErrorKind::Configuration);
    assert!(calls.is_empty());
}

#[test]
fn test_multitarget_rejects_object_before_dispatch() {
    let (outcome, calls) = run(
        &["histogram"],
        &request(|args| {
            args.emit = Some(vec!["o".into()]);
            args.assignments = vec!["target=x86-64-linux-avx,x86-64-linux".into()];
        }),
    );
    let err = outcome.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(err.to_string().ends_with("got: o"));
    assert!(calls.is_empty());
}

#[test]
fn test_multitarget_creates_generator_per_target() {
    let (outcome, calls) = run(
        &["histogram"],
        &request(|args| {
            args.assignments = vec![
                "wide=true".into(),
                "target=x86-64-windows-avx,x86-32-windows".into(),
            ];
        }),
    );
    let outcome = outcome.unwrap();
    assert_eq!(outcome.targets.len(), 2);

    let [
        Call::Multitarget {
            function_name,
            modules,
            outputs,
        },
    ] = calls.as_slice()
    else {
        panic!("unexpected calls: {calls:?}");
    };
    assert_eq!(function_name, "histogram");

    let names: Vec<_> = modules.iter().map(|m| m.function_name.as_str()).collect();
    assert_eq!(names, vec!["histogram_64", "histogram_32"]);
    let targets: Vec<_> = modules.iter().map(|m| m.target.to_string()).collect();
    assert_eq!(targets, vec!["x86-64-windows-avx", "x86-32-windows"]);
    assert!(
        modules
            .iter()
            .all(|m| m.outputs[0].element_type == ScalarType::UInt32)
    );

    // paths follow the first target
    assert_eq!(
        outputs.get(ArtifactKind::StaticLibrary),
        Some(PathBuf::from("/out/histogram.lib").as_path())
    );
}

#[test]
fn test_runtime_only() {
    let (outcome, calls) = run(
        &["histogram", "blur"],
        &request(|args| args.runtime = Some("gengen_runtime".into())),
    );
    let outcome = outcome.unwrap();
    assert!(outcome.generator.is_none());
    assert_eq!(outcome.runtime.unwrap().name, "gengen_runtime");

    let [Call::Runtime { target, outputs }] = calls.as_slice() else {
        panic!("unexpected calls: {calls:?}");
    };
    assert_eq!(target.to_string(), "x86-64-linux");
    assert_eq!(
        outputs.get(ArtifactKind::StaticLibrary),
        Some(PathBuf::from("/out/gengen_runtime.a").as_path())
    );
}

#[test]
fn test_runtime_without_generators() {
    let (outcome, calls) = run(
        &[],
        &request(|args| args.runtime = Some("gengen_runtime".into())),
    );
    assert!(outcome.is_ok());
    assert_eq!(calls.len(), 1);
}

#[test]
fn test_runtime_and_generator() {
    let (outcome, calls) = run(
        &["histogram"],
        &request(|args| {
            args.runtime = Some("gengen_runtime".into());
            args.generator = Some("histogram".into());
        }),
    );
    let outcome = outcome.unwrap();
    assert!(outcome.runtime.is_some());
    assert!(outcome.generator.is_some());
    assert!(matches!(calls.as_slice(), [Call::Runtime { .. }, Call::Compile { .. }]));
}

#[test]
fn test_runtime_needs_one_target() {
    let (outcome, calls) = run(
        &["histogram"],
        &request(|args| {
            args.runtime = Some("gengen_runtime".into());
            args.assignments = vec!["target=x86-64-linux,arm-64-linux".into()];
        }),
    );
    let err = outcome.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(err.to_string().contains("only one target"));
    assert!(calls.is_empty());
}
