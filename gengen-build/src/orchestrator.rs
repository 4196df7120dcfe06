//! Runs a build request against the generator registry.

use std::sync::Arc;

use gengen_core::{Error, Module, Result, Target};
use gengen_generator::FactoryRegistry;

use crate::{
    BuildRequest, ModuleCompiler, OutputFiles, TARGET_KEY, compute_base_path, compute_outputs,
};

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub targets: Vec<Target>,
    pub runtime: Option<BuiltArtifacts>,
    pub generator: Option<BuiltArtifacts>,
}

/// Artifacts written for the runtime or for one generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifacts {
    /// Runtime or generator name.
    pub name: String,
    pub function_name: String,
    pub outputs: OutputFiles,
}

/// Resolves generators and hands their modules to a [`ModuleCompiler`].
pub struct BuildOrchestrator<C> {
    factories: Arc<FactoryRegistry>,
    compiler: C,
}

impl<C: ModuleCompiler> BuildOrchestrator<C> {
    pub fn new(factories: Arc<FactoryRegistry>, compiler: C) -> Self {
        Self {
            factories,
            compiler,
        }
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn into_compiler(self) -> C {
        self.compiler
    }

    /// Run one build request to completion.
    ///
    /// The first failure aborts the whole request.
    pub fn run(&mut self, request: &BuildRequest) -> Result<BuildOutcome> {
        let registered = self.factories.enumerate();
        if registered.is_empty() && request.runtime.is_none() {
            return Err(Error::usage(
                "no generators have been registered and not compiling a standalone runtime",
            ));
        }

        let generator_name = match (&request.generator, &request.runtime) {
            (Some(name), _) => Some(name.clone()),
            (None, Some(_)) => None,
            (None, None) => match registered.as_slice() {
                [only] => Some(only.clone()),
                _ => {
                    return Err(Error::usage(format!(
                        "either -g <name> or -r must be specified; available generators are: {}",
                        registered.join(", ")
                    )));
                }
            },
        };

        let runtime = match &request.runtime {
            Some(name) => Some(self.build_runtime(name, request)?),
            None => None,
        };
        let generator = match generator_name {
            Some(name) => Some(self.build_generator(&name, request)?),
            None => None,
        };

        Ok(BuildOutcome {
            targets: request.targets.clone(),
            runtime,
            generator,
        })
    }

    fn build_runtime(&mut self, name: &str, request: &BuildRequest) -> Result<BuiltArtifacts> {
        let [target] = request.targets.as_slice() else {
            return Err(Error::usage(
                "only one target is allowed when building a standalone runtime",
            ));
        };
        let base_path = compute_base_path(&request.output_dir, name, None);
        let outputs = compute_outputs(target, &base_path, &request.emit);

        tracing::info!(runtime = name, %target, "compiling standalone runtime");
        self.compiler.compile_standalone_runtime(&outputs, target)?;
        Ok(BuiltArtifacts {
            name: name.to_string(),
            function_name: name.to_string(),
            outputs,
        })
    }

    fn build_generator(&mut self, name: &str, request: &BuildRequest) -> Result<BuiltArtifacts> {
        let function_name = request
            .function_name
            .clone()
            .unwrap_or_else(|| name.to_string());
        let base_path = compute_base_path(
            &request.output_dir,
            &function_name,
            request.file_base_name.as_deref(),
        );
        let Some(first) = request.targets.first() else {
            return Err(Error::usage("target missing"));
        };
        let outputs = compute_outputs(first, &base_path, &request.emit);

        let multitarget = request.targets.len() > 1;
        if multitarget && !request.emit.is_multitarget_compatible() {
            let requested: Vec<_> = request.emit.kinds.iter().map(|k| k.to_string()).collect();
            return Err(Error::usage(format!(
                "multi-target builds can only emit static_library and h, got: {}",
                requested.join(", ")
            )));
        }

        // Each target gets a fresh generator, since the target option can
        // change the pipeline it builds.
        let factories = &self.factories;
        let mut producer = |variant: &str, target: &Target| -> Result<Module> {
            let mut values = request.options.clone();
            values.insert(TARGET_KEY.to_string(), target.to_string());
            let mut generator = factories.create(name, &values)?;
            generator.build_module(variant)
        };

        if multitarget {
            tracing::info!(
                generator = name,
                targets = request.targets.len(),
                "compiling multi-target module"
            );
            self.compiler.compile_multitarget(
                &function_name,
                &outputs,
                &request.targets,
                &mut producer,
            )?;
        } else {
            let module = producer(&function_name, first)?;
            tracing::info!(generator = name, target = %first, "compiling module");
            self.compiler.compile(&module, &outputs)?;
        }

        Ok(BuiltArtifacts {
            name: name.to_string(),
            function_name,
            outputs,
        })
    }
}

impl<C> std::fmt::Debug for BuildOrchestrator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOrchestrator")
            .field("factories", &self.factories)
            .finish_non_exhaustive()
    }
}
