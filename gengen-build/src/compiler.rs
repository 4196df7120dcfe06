//! The module compiler seam.
//!
//! Lowering a module to machine code happens outside gengen. The
//! orchestrator talks to it through [`ModuleCompiler`]. [`ListingCompiler`]
//! is a reference implementation that writes a C header and a textual
//! listing of each module instead of object code.

use std::path::{Path, PathBuf};

use gengen_core::{
    Argument, ArgumentKind, ArtifactKind, Error, Module, Result, ScalarValue, Target,
    split_namespaces,
};

use crate::OutputFiles;

/// Produces the module for one target of a multi-target build.
///
/// Called with the function name to give the per-target variant.
pub type ModuleProducer<'a> = dyn FnMut(&str, &Target) -> Result<Module> + 'a;

/// Writes compiled artifacts.
pub trait ModuleCompiler {
    /// Write every artifact in `outputs` for a single module.
    fn compile(&mut self, module: &Module, outputs: &OutputFiles) -> Result<()>;

    /// Write a library and header that dispatch among per-target variants.
    ///
    /// `outputs` only contains kinds a multi-target build can produce.
    fn compile_multitarget(
        &mut self,
        function_name: &str,
        outputs: &OutputFiles,
        targets: &[Target],
        producer: &mut ModuleProducer<'_>,
    ) -> Result<()>;

    /// Write the runtime support code on its own.
    fn compile_standalone_runtime(&mut self, outputs: &OutputFiles, target: &Target)
    -> Result<()>;
}

/// Writes C headers and textual module listings.
#[derive(Debug, Default)]
pub struct ListingCompiler {
    written: Vec<PathBuf>,
}

impl ListingCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every file written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::write(path, content).map_err(|e| Error::io(path, e))?;
        tracing::debug!(path = %path.display(), "wrote artifact");
        self.written.push(path.to_path_buf());
        Ok(())
    }
}

impl ModuleCompiler for ListingCompiler {
    fn compile(&mut self, module: &Module, outputs: &OutputFiles) -> Result<()> {
        for (kind, path) in outputs.iter() {
            let content = match kind {
                ArtifactKind::CHeader => render_header(module),
                _ => render_listing(kind, module),
            };
            self.write(path, &content)?;
        }
        Ok(())
    }

    fn compile_multitarget(
        &mut self,
        function_name: &str,
        outputs: &OutputFiles,
        targets: &[Target],
        producer: &mut ModuleProducer<'_>,
    ) -> Result<()> {
        let Some(base) = targets.first() else {
            return Err(Error::compile("multi-target build needs at least one target"));
        };
        if let Some(kind) = outputs.kinds().find(|k| {
            !matches!(k, ArtifactKind::StaticLibrary | ArtifactKind::CHeader)
        }) {
            return Err(Error::compile(format!(
                "multi-target build cannot emit '{}'",
                kind
            )));
        }

        let mut modules: Vec<Module> = Vec::with_capacity(targets.len());
        for target in targets {
            if (target.arch, target.bits, target.os) != (base.arch, base.bits, base.os) {
                return Err(Error::compile(format!(
                    "all targets must share arch-bits-os: '{}' does not match '{}'",
                    target, base
                )));
            }
            let name = variant_name(function_name, target);
            let module = producer(&name, target)?;
            if let Some(first) = modules.first() {
                if !same_signature(first, &module) {
                    return Err(Error::compile(format!(
                        "signature for target '{}' differs from target '{}'",
                        target, first.target
                    )));
                }
            }
            modules.push(module);
        }

        // The dispatcher carries the public name and the shared signature.
        let Some(first) = modules.first() else {
            return Err(Error::internal("no module produced"));
        };
        let mut dispatcher = first.clone();
        dispatcher.function_name = function_name.to_string();
        dispatcher.target = base.clone();

        for (kind, path) in outputs.iter() {
            let content = match kind {
                ArtifactKind::CHeader => render_header(&dispatcher),
                _ => render_multitarget_listing(kind, &dispatcher, &modules),
            };
            self.write(path, &content)?;
        }
        Ok(())
    }

    fn compile_standalone_runtime(
        &mut self,
        outputs: &OutputFiles,
        target: &Target,
    ) -> Result<()> {
        for (kind, path) in outputs.iter() {
            let content = format!("; gengen {}\nruntime\ntarget {}\n", kind, target);
            self.write(path, &content)?;
        }
        Ok(())
    }
}

/// Name of the per-target variant of `function_name`.
pub fn variant_name(function_name: &str, target: &Target) -> String {
    format!("{}_{}", function_name, target.to_string().replace('-', "_"))
}

fn same_signature(a: &Module, b: &Module) -> bool {
    a.signature().eq(b.signature())
}

/// Line-oriented text builder with two-space indentation.
#[derive(Debug, Default)]
struct TextBuilder {
    indent_level: usize,
    buffer: String,
}

impl TextBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn push_line(&mut self, s: impl AsRef<str>) -> &mut Self {
        for _ in 0..self.indent_level {
            self.buffer.push_str("  ");
        }
        self.buffer.push_str(s.as_ref());
        self.buffer.push('\n');
        self
    }

    fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    fn push_indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    fn push_dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    fn build(self) -> String {
        self.buffer
    }
}

/// Render a C header declaring the module's entry point.
pub fn render_header(module: &Module) -> String {
    let (namespaces, name) = split_namespaces(&module.function_name);
    let guard = format!(
        "GENGEN_{}_H",
        namespaces
            .iter()
            .chain(std::iter::once(&name))
            .map(|s| s.to_uppercase())
            .collect::<Vec<_>>()
            .join("_")
    );
    let params: Vec<String> = module.signature().map(c_parameter).collect();

    let mut builder = TextBuilder::new();
    builder
        .push_line(format!("#ifndef {}", guard))
        .push_line(format!("#define {}", guard))
        .push_blank()
        .push_line("#include <stdbool.h>")
        .push_line("#include <stdint.h>")
        .push_blank()
        .push_line("struct buffer_t;")
        .push_blank()
        .push_line("#ifdef __cplusplus")
        .push_line("extern \"C\" {")
        .push_line("#endif")
        .push_blank()
        .push_line(format!("int {}({});", name, params.join(", ")))
        .push_blank()
        .push_line("#ifdef __cplusplus")
        .push_line("}")
        .push_line("#endif")
        .push_blank()
        .push_line("#endif");
    builder.build()
}

fn c_parameter(arg: &Argument) -> String {
    if arg.is_buffer() {
        format!("struct buffer_t *{}", arg.name)
    } else {
        format!("{} {}", arg.element_type.c_type(), arg.name)
    }
}

fn describe(arg: &Argument) -> String {
    let kind = match arg.kind {
        ArgumentKind::InputScalar => "input_scalar",
        ArgumentKind::InputBuffer => "input_buffer",
        ArgumentKind::OutputBuffer => "output_buffer",
    };
    let mut line = if arg.is_buffer() {
        format!("{} {}: {}[{}]", kind, arg.name, arg.element_type, arg.rank)
    } else {
        format!("{} {}: {}", kind, arg.name, arg.element_type)
    };
    if let Some(default) = arg.default {
        line.push_str(&format!(" = {}", default));
    }
    if arg.min.is_some() || arg.max.is_some() {
        let bound = |v: Option<ScalarValue>| v.map(|v| v.to_string()).unwrap_or_default();
        line.push_str(&format!(" in [{}, {}]", bound(arg.min), bound(arg.max)));
    }
    line
}

fn push_module(builder: &mut TextBuilder, module: &Module) {
    builder
        .push_line(format!("module {}", module.function_name))
        .push_line(format!("target {}", module.target))
        .push_indent();
    for arg in module.signature() {
        builder.push_line(describe(arg));
    }
    builder.push_dedent();
}

/// Render a deterministic textual listing of one module.
pub fn render_listing(kind: ArtifactKind, module: &Module) -> String {
    let mut builder = TextBuilder::new();
    builder.push_line(format!("; gengen {}", kind));
    push_module(&mut builder, module);
    builder.build()
}

fn render_multitarget_listing(kind: ArtifactKind, dispatcher: &Module, modules: &[Module]) -> String {
    let mut builder = TextBuilder::new();
    builder
        .push_line(format!("; gengen {}", kind))
        .push_line(format!("dispatch {}", dispatcher.function_name))
        .push_indent();
    for module in modules {
        builder.push_line(format!("{} -> {}", module.target, module.function_name));
    }
    builder.push_dedent();
    for module in modules {
        builder.push_blank();
        push_module(&mut builder, module);
    }
    builder.build()
}
