//! Files written by the listing compiler.

use std::{fs, sync::Arc};

use gengen_build::{
    BuildOrchestrator, BuildRequest, ListingCompiler, ModuleCompiler, OutputFiles, RequestArgs,
    compiler::render_header,
};
use gengen_core::{Argument, ArgumentKind, ArtifactKind, ErrorKind, Module, ScalarType, Target};
use gengen_generator::{
    DeclaredPipeline, FactoryRegistry, FieldRegistry, Generator, GeneratorBase, Param,
    ParamStyle, Pipeline, PipelineOutput,
};

fn module(name: &str, target: &str) -> Module {
    Module::new(name, target.parse().unwrap())
        .with_arguments(vec![
            Argument::buffer("input", ArgumentKind::InputBuffer, ScalarType::UInt8, 2),
            Argument::scalar("gain", ScalarType::Float32),
        ])
        .with_outputs(vec![Argument::buffer(
            "result_0",
            ArgumentKind::OutputBuffer,
            ScalarType::UInt16,
            2,
        )])
}

fn produce(name: &str, target: &Target) -> gengen_core::Result<Module> {
    Ok(module(name, &target.to_string()))
}

#[test]
fn test_header() {
    let header = render_header(&module("vision::brighten", "x86-64-linux"));
    insta::assert_snapshot!(header, @r#"
    #ifndef GENGEN_VISION_BRIGHTEN_H
    #define GENGEN_VISION_BRIGHTEN_H

    #include <stdbool.h>
    #include <stdint.h>

    struct buffer_t;

    #ifdef __cplusplus
    extern "C" {
    #endif

    int brighten(struct buffer_t *input, float gain, struct buffer_t *result_0);

    #ifdef __cplusplus
    }
    #endif

    #endif
    "#);
}

#[test]
fn test_compile_writes_requested_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut outputs = OutputFiles::new();
    outputs.insert(ArtifactKind::CHeader, dir.path().join("nested/brighten.h"));
    outputs.insert(ArtifactKind::Stmt, dir.path().join("nested/brighten.stmt"));

    let mut compiler = ListingCompiler::new();
    compiler
        .compile(&module("brighten", "arm-64-android"), &outputs)
        .unwrap();

    assert_eq!(compiler.written().len(), 2);
    let header = fs::read_to_string(dir.path().join("nested/brighten.h")).unwrap();
    assert!(header.contains("int brighten("));
    let stmt = fs::read_to_string(dir.path().join("nested/brighten.stmt")).unwrap();
    assert!(stmt.starts_with("; gengen stmt\nmodule brighten\ntarget arm-64-android\n"));
}

#[test]
fn test_multitarget_listing() {
    let dir = tempfile::tempdir().unwrap();
    let mut outputs = OutputFiles::new();
    outputs.insert(ArtifactKind::StaticLibrary, dir.path().join("brighten.a"));
    outputs.insert(ArtifactKind::CHeader, dir.path().join("brighten.h"));
    let targets: Vec<Target> = vec![
        "x86-64-linux-avx2".parse().unwrap(),
        "x86-64-linux".parse().unwrap(),
    ];

    let mut compiler = ListingCompiler::new();
    compiler
        .compile_multitarget("brighten", &outputs, &targets, &mut produce)
        .unwrap();

    let library = fs::read_to_string(dir.path().join("brighten.a")).unwrap();
    assert!(library.starts_with(
        "; gengen static_library\n\
         dispatch brighten\n\
         \x20 x86-64-linux-avx2 -> brighten_x86_64_linux_avx2\n\
         \x20 x86-64-linux -> brighten_x86_64_linux\n"
    ));
    let header = fs::read_to_string(dir.path().join("brighten.h")).unwrap();
    assert!(header.contains("int brighten(struct buffer_t *input, float gain"));
}

#[test]
fn test_multitarget_signature_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let mut outputs = OutputFiles::new();
    outputs.insert(ArtifactKind::StaticLibrary, dir.path().join("brighten.a"));
    let targets: Vec<Target> = vec![
        "x86-64-linux-avx2".parse().unwrap(),
        "x86-64-linux".parse().unwrap(),
    ];

    let mut compiler = ListingCompiler::new();
    let mut producer = |name: &str, target: &Target| -> gengen_core::Result<Module> {
        let mut m = module(name, &target.to_string());
        if target.features.is_empty() {
            m.arguments.pop();
        }
        Ok(m)
    };
    let err = compiler
        .compile_multitarget("brighten", &outputs, &targets, &mut producer)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Compile);
    assert!(compiler.written().is_empty());
}

#[test]
fn test_multitarget_mixed_arch_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut outputs = OutputFiles::new();
    outputs.insert(ArtifactKind::StaticLibrary, dir.path().join("brighten.a"));
    let targets: Vec<Target> = vec![
        "x86-64-linux".parse().unwrap(),
        "arm-64-linux".parse().unwrap(),
    ];

    let mut compiler = ListingCompiler::new();
    let err = compiler
        .compile_multitarget("brighten", &outputs, &targets, &mut produce)
        .unwrap_err();
    assert!(err.to_string().contains("arch-bits-os"));
}

#[test]
fn test_standalone_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let mut outputs = OutputFiles::new();
    outputs.insert(ArtifactKind::Object, dir.path().join("runtime.o"));

    let mut compiler = ListingCompiler::new();
    compiler
        .compile_standalone_runtime(&outputs, &"x86-32-linux".parse().unwrap())
        .unwrap();

    let content = fs::read_to_string(dir.path().join("runtime.o")).unwrap();
    assert_eq!(content, "; gengen o\nruntime\ntarget x86-32-linux\n");
}

struct Scale {
    base: GeneratorBase,
    factor: Param<f32>,
}

impl Generator for Scale {
    fn base(&self) -> &GeneratorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GeneratorBase {
        &mut self.base
    }

    fn build_pipeline(&mut self) -> gengen_core::Result<Box<dyn Pipeline>> {
        let _ = self.factor.get();
        Ok(Box::new(
            DeclaredPipeline::new().output(PipelineOutput::new(ScalarType::Float32, 1)),
        ))
    }
}

#[test]
fn test_end_to_end() {
    let fields = FieldRegistry::shared();
    let factories = FactoryRegistry::new();
    factories
        .register_factory("scale", move || -> Box<dyn Generator> {
            let base = GeneratorBase::new(&fields, ParamStyle::Params);
            let factor = base.param("factor", 2.0f32);
            Box::new(Scale { base, factor })
        })
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let request = BuildRequest::parse(RequestArgs {
        output_dir: Some(dir.path().to_path_buf()),
        emit: Some(vec!["h".into(), "stmt".into()]),
        assignments: vec!["target=x86-64-osx".into()],
        ..Default::default()
    })
    .unwrap();

    let mut orchestrator = BuildOrchestrator::new(Arc::new(factories), ListingCompiler::new());
    let outcome = orchestrator.run(&request).unwrap();
    let built = outcome.generator.unwrap();
    assert_eq!(built.outputs.len(), 2);

    let header = fs::read_to_string(dir.path().join("scale.h")).unwrap();
    assert!(header.contains("int scale(float factor, struct buffer_t *result_0);"));
    let stmt = fs::read_to_string(dir.path().join("scale.stmt")).unwrap();
    assert!(stmt.contains("  input_scalar factor: float32 = 2\n"));
}
