//! Build report.

use gengen_build::{BuildOutcome, BuiltArtifacts};

use super::output::{Output, Report};

/// What a build wrote, per runtime and generator.
#[derive(Debug)]
pub struct BuildReport {
    outcome: BuildOutcome,
}

impl BuildReport {
    pub fn new(outcome: BuildOutcome) -> Self {
        Self { outcome }
    }

    fn render_artifacts(&self, out: &mut dyn Output, heading: &str, built: &BuiltArtifacts) {
        out.newline();
        out.section(heading);
        if built.outputs.is_empty() {
            out.warning(&format!("no artifacts were requested for {}", built.name));
        }
        for (kind, path) in built.outputs.iter() {
            out.added_item(&format!("{} ({})", path.display(), kind));
        }
    }
}

impl Report for BuildReport {
    fn render(&self, out: &mut dyn Output) {
        let targets: Vec<_> = self.outcome.targets.iter().map(|t| t.to_string()).collect();
        out.key_value("Targets", &targets.join(", "));

        if let Some(runtime) = &self.outcome.runtime {
            self.render_artifacts(out, &format!("Runtime {}", runtime.name), runtime);
        }
        if let Some(generator) = &self.outcome.generator {
            let heading = if generator.function_name == generator.name {
                format!("Generator {}", generator.name)
            } else {
                format!("Generator {} as {}", generator.name, generator.function_name)
            };
            self.render_artifacts(out, &heading, generator);
        }
    }
}

#[cfg(test)]
mod tests {
    use gengen_build::OutputFiles;
    use gengen_core::ArtifactKind;

    use super::*;

    #[derive(Default)]
    struct Captured(Vec<String>);

    impl Output for Captured {
        fn section(&mut self, name: &str) {
            self.0.push(format!("{}:", name));
        }

        fn key_value(&mut self, key: &str, value: &str) {
            self.0.push(format!("{}: {}", key, value));
        }

        fn added_item(&mut self, text: &str) {
            self.0.push(format!("+ {}", text));
        }

        fn warning(&mut self, msg: &str) {
            self.0.push(format!("warning: {}", msg));
        }

        fn newline(&mut self) {
            self.0.push(String::new());
        }
    }

    #[test]
    fn test_render() {
        let mut outputs = OutputFiles::new();
        outputs.insert(ArtifactKind::CHeader, "/out/blur.h");
        outputs.insert(ArtifactKind::StaticLibrary, "/out/blur.a");
        let report = BuildReport::new(BuildOutcome {
            targets: vec!["x86-64-linux-avx".parse().unwrap(), "x86-64-linux".parse().unwrap()],
            runtime: None,
            generator: Some(BuiltArtifacts {
                name: "blur".to_string(),
                function_name: "vision::blur".to_string(),
                outputs,
            }),
        });

        let mut out = Captured::default();
        report.render(&mut out);
        assert_eq!(
            out.0,
            vec![
                "Targets: x86-64-linux-avx, x86-64-linux",
                "",
                "Generator blur as vision::blur:",
                "+ /out/blur.h (h)",
                "+ /out/blur.a (static_library)",
            ]
        );
    }

    #[test]
    fn test_render_empty_outputs_warns() {
        let report = BuildReport::new(BuildOutcome {
            targets: vec!["arm-32-linux".parse().unwrap()],
            runtime: Some(BuiltArtifacts {
                name: "rt".to_string(),
                function_name: "rt".to_string(),
                outputs: OutputFiles::new(),
            }),
            generator: None,
        });

        let mut out = Captured::default();
        report.render(&mut out);
        assert_eq!(out.0[2], "Runtime rt:");
        assert_eq!(out.0[3], "warning: no artifacts were requested for rt");
    }
}
