//! Android build utilities: Kotlin → class files → DEX.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Configuration for compiling Kotlin sources into a DEX file.
#[derive(Debug, Clone)]
pub struct AndroidConfig {
    /// Kotlin sources, relative to the crate manifest directory.
    pub kotlin_sources: Vec<PathBuf>,
    /// Directory receiving `classes.dex`.
    pub out_dir: PathBuf,
}

impl AndroidConfig {
    /// Create a config writing into `out_dir`.
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            kotlin_sources: Vec::new(),
            out_dir: out_dir.into(),
        }
    }

    /// Add a Kotlin source file.
    #[must_use]
    pub fn kotlin_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.kotlin_sources.push(path.into());
        self
    }

    /// Compile the sources and dex them into `out_dir/classes.dex`.
    ///
    /// # Panics
    /// Panics if the Android SDK, `kotlinc` or D8 cannot be found, or if any
    /// compilation step fails. Build scripts surface the panic as a build error.
    pub fn build(&self) {
        let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
        let android_jar = find_android_jar();

        let classes_dir = self.out_dir.join("classes");
        let _ = std::fs::remove_dir_all(&classes_dir);
        std::fs::create_dir_all(&classes_dir).expect("Failed to create classes directory");

        let mut kotlinc = Command::new("kotlinc");
        kotlinc
            .arg("-classpath")
            .arg(&android_jar)
            .arg("-d")
            .arg(&classes_dir);
        for source in &self.kotlin_sources {
            println!("cargo:rerun-if-changed={}", source.display());
            kotlinc.arg(manifest_dir.join(source));
        }

        let status = kotlinc
            .status()
            .expect("Failed to run kotlinc - is Kotlin compiler installed?");
        assert!(status.success(), "kotlinc compilation failed");

        let mut class_files = Vec::new();
        collect_class_files(&classes_dir, &mut class_files);
        assert!(!class_files.is_empty(), "kotlinc produced no class files");

        let mut d8 = android_build::JavaRun::new();
        d8.class_path(find_d8_jar())
            .main_class("com.android.tools.r8.D8")
            .arg("--classpath")
            .arg(&android_jar)
            .arg("--output")
            .arg(&self.out_dir);
        for class_file in &class_files {
            d8.arg(class_file);
        }

        assert!(
            d8.run()
                .expect("failed to acquire exit status for java d8.jar invocation")
                .success(),
            "D8 dexing failed"
        );
    }
}

/// Compile Kotlin sources into `OUT_DIR/classes.dex`.
///
/// # Panics
/// See [`AndroidConfig::build`].
pub fn build_kotlin(sources: &[&str]) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    sources
        .iter()
        .fold(AndroidConfig::new(out_dir), |config, source| {
            config.kotlin_source(*source)
        })
        .build();
}

/// Locate `android.jar` for the configured SDK platform.
///
/// # Panics
/// Panics if the Android SDK cannot be found.
#[must_use]
pub fn find_android_jar() -> PathBuf {
    android_build::android_jar(None).expect("Failed to find android.jar")
}

/// Locate the D8 dexer jar from the SDK build tools.
///
/// # Panics
/// Panics if the build tools cannot be found.
#[must_use]
pub fn find_d8_jar() -> PathBuf {
    android_build::android_d8_jar(None).expect("Failed to find d8.jar")
}

fn collect_class_files(dir: &Path, found: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_class_files(&path, found);
        } else if path.extension().is_some_and(|ext| ext == "class") {
            found.push(path);
        }
    }
}
